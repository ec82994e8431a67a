// ============================================================================
// Structure : TrackedTicker
// ============================================================================
// Représente un ticker suivi dans la watchlist avec sa dernière cotation
//
// CONCEPTS RUST :
// 1. Composition : TrackedTicker contient un QuoteRecord optionnel
// 2. Option : gérer les données pas encore chargées
// ============================================================================

use chrono::{DateTime, Utc};

use crate::format::{self, ChangeDirection};
use crate::models::QuoteRecord;

/// Un ticker de la watchlist avec sa dernière cotation connue
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedTicker {
    /// Symbole en majuscules (ex: "AAPL")
    pub symbol: String,

    /// Dernière cotation reçue (None si pas encore chargée)
    /// CONCEPT RUST : Option pour les données optionnelles
    /// - Some(record) : cotation disponible
    /// - None : jamais chargée, ou tous les fetchs ont échoué
    pub record: Option<QuoteRecord>,

    /// Moment où `record` a été remplacé pour la dernière fois
    pub updated_at: Option<DateTime<Utc>>,
}

impl TrackedTicker {
    /// Crée un ticker sans données
    pub fn new(symbol: String) -> Self {
        Self {
            symbol,
            record: None,
            updated_at: None,
        }
    }

    /// Crée un ticker avec une cotation déjà chargée
    pub fn with_record(symbol: String, record: QuoteRecord) -> Self {
        Self {
            symbol,
            record: Some(record),
            updated_at: Some(Utc::now()),
        }
    }

    /// Remplace la cotation en bloc
    pub fn replace_record(&mut self, record: QuoteRecord) {
        self.record = Some(record);
        self.updated_at = Some(Utc::now());
    }

    /// Vérifie si des données sont chargées
    pub fn has_data(&self) -> bool {
        self.record.is_some()
    }

    /// Nom de la société, ou chaîne vide si pas encore chargé
    pub fn company_name(&self) -> &str {
        self.record
            .as_ref()
            .map(|r| r.company_name.as_str())
            .unwrap_or("")
    }

    /// Sens de la variation du jour
    ///
    /// CONCEPT RUST : Option chaining avec ?
    /// - self.record.as_ref()? : early return si pas de données
    /// - parse_number(..)? : early return si "N/A"
    pub fn direction(&self) -> Option<ChangeDirection> {
        let record = self.record.as_ref()?;
        let points = format::parse_number(&record.points_change)?;
        Some(format::classify_change(points))
    }
}

// ============================================================================
// Tests
// ============================================================================
