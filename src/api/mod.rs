// ============================================================================
// Module : api
// ============================================================================
// Ce module contient les sources de cotations. Le reste de la librairie ne
// connaît que le trait QuoteSource : fetch(symbol) -> texte brut | échec.
//
// - CsvQuoteSource    : endpoint CSV réel (reqwest)
// - RandomQuoteSource : données aléatoires pour tester l'UI marché fermé
// ============================================================================

pub mod csv_quotes;    // Client HTTP de l'endpoint CSV
pub mod random;        // Source hors-ligne

use anyhow::Result;
use async_trait::async_trait;

use crate::models::QuoteSchema;

// Re-export des sources principales
pub use csv_quotes::{build_quote_url, CsvQuoteSource};
pub use random::RandomQuoteSource;

/// Collaborateur externe qui récupère la ligne brute d'un symbole
///
/// CONCEPT RUST : #[async_trait]
/// - Permet une méthode async dans un trait utilisé en `dyn QuoteSource`
/// - Send + Sync : la source est partagée entre les tâches tokio via Arc
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Récupère la ligne CSV brute pour `symbol` avec le jeu de champs `schema`
    async fn fetch_raw(&self, symbol: &str, schema: QuoteSchema) -> Result<String>;

    /// Nom de la source pour les logs
    fn name(&self) -> &'static str;
}
