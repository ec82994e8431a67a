// ============================================================================
// Module : models
// ============================================================================
// Ce module contient les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod quote;          // Cotation parsée (QuoteRecord, QuoteSchema)
pub mod tracked_ticker; // Ticker suivi + dernière cotation

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use quotewatch::models::quote::QuoteRecord;
// On peut faire : use quotewatch::models::QuoteRecord;
pub use quote::{QuoteRecord, QuoteSchema, SessionDetail};
pub use tracked_ticker::TrackedTicker;
