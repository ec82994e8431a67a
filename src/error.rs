// ============================================================================
// Erreurs de la librairie
// ============================================================================
// Deux façons d'échouer pour une cotation :
// - le fetch réseau n'aboutit pas (FetchFailure)
// - la ligne reçue n'a pas le bon nombre de champs (MalformedRecord)
//
// Une valeur "N/A" dans un champ numérique n'est PAS une erreur : c'est
// une sentinelle reconnue, les formatters la laissent passer telle quelle.
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] implémente std::error::Error et Display
// - #[error("...")] donne le message de chaque variant
// ============================================================================

use thiserror::Error;

/// Résultat typé d'une récupération de cotation
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Échecs possibles lors de la récupération d'une cotation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// Erreur réseau/transport : aucune mise à jour, les données restent
    #[error("fetch failed for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    /// Nombre de champs inattendu après découpage de la ligne
    #[error("malformed record: expected {expected} fields, got {actual}")]
    MalformedRecord { expected: usize, actual: usize },
}

impl QuoteError {
    /// Construit une FetchFailure à partir d'une erreur anyhow
    ///
    /// Le format `{:#}` conserve toute la chaîne de contexte
    /// ("Échec de la requête HTTP: connection refused").
    pub fn fetch(symbol: &str, err: &anyhow::Error) -> Self {
        QuoteError::Fetch {
            symbol: symbol.to_string(),
            reason: format!("{:#}", err),
        }
    }

    /// Nom court du type d'échec, pour les logs
    pub fn kind(&self) -> &'static str {
        match self {
            QuoteError::Fetch { .. } => "fetch_failure",
            QuoteError::MalformedRecord { .. } => "malformed_record",
        }
    }
}
