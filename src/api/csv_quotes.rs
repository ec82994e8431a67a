// ============================================================================
// API Client : endpoint CSV des cotations
// ============================================================================
// Une requête = une ligne CSV pour un symbole.
// URL = base + SYMBOLE + sélecteur de champs (dépend du schéma)
//
// Une seule tentative par fetch, pas de retry : en cas d'échec l'appelant
// garde les dernières données valides.
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, error, instrument};

use crate::api::QuoteSource;
use crate::models::QuoteSchema;

/// User-Agent envoyé avec chaque requête
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Source de cotations HTTP
#[derive(Debug, Clone)]
pub struct CsvQuoteSource {
    /// Client réutilisé entre les requêtes (pool de connexions)
    client: reqwest::Client,

    /// Début de l'URL, le symbole est concaténé directement derrière
    base_url: String,
}

impl CsvQuoteSource {
    /// Crée la source avec un timeout HTTP
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Construit l'URL de l'endpoint
///
/// Le symbole est passé en majuscules, sans autre encodage.
pub fn build_quote_url(base_url: &str, symbol: &str, schema: QuoteSchema) -> String {
    format!(
        "{}{}{}",
        base_url,
        symbol.to_uppercase(),
        schema.selector_suffix()
    )
}

#[async_trait]
impl QuoteSource for CsvQuoteSource {
    /// CONCEPT RUST : #[instrument]
    /// - Ajoute un span avec le symbole et le schéma
    /// - Tous les logs à l'intérieur ont ce contexte
    #[instrument(skip(self, schema), fields(schema = schema.label()))]
    async fn fetch_raw(&self, symbol: &str, schema: QuoteSchema) -> Result<String> {
        let url = build_quote_url(&self.base_url, symbol, schema);
        debug!(url = %url, "Built quote URL");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Échec de la requête HTTP vers l'endpoint de cotations")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, "Quote endpoint returned error status");
            anyhow::bail!("L'endpoint de cotations a retourné une erreur : HTTP {}", status);
        }

        let body = response
            .text()
            .await
            .context("Échec de la lecture du corps de la réponse")?;

        debug!(bytes = body.len(), "Quote line received");
        Ok(body)
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://download.finance.yahoo.com/d/quotes.csv?s=";

    #[test]
    fn test_build_quote_url_detail() {
        let url = build_quote_url(BASE, "aapl", QuoteSchema::Detail);
        assert_eq!(
            url,
            "http://download.finance.yahoo.com/d/quotes.csv?s=AAPL&f=snbapohgkjl1t1c1p2a5b6&e=.csv"
        );
    }

    #[test]
    fn test_build_quote_url_list() {
        let url = build_quote_url(BASE, "Goog", QuoteSchema::List);
        assert!(url.ends_with("s=GOOG&f=snl1c1p2aba5b6&e=.csv"));
    }

    // Aucun serveur n'écoute sur ce port : le fetch doit échouer
    // proprement (Err) sans paniquer
    #[tokio::test]
    async fn test_fetch_unreachable_host_is_error() {
        let source = CsvQuoteSource::new("http://127.0.0.1:9/quotes.csv?s=", Duration::from_secs(2)).unwrap();
        assert_eq!(source.base_url(), "http://127.0.0.1:9/quotes.csv?s=");

        let result = source.fetch_raw("AAPL", QuoteSchema::List).await;
        assert!(result.is_err());
    }
}
