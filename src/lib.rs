// ============================================================================
// QuoteWatch - Library
// ============================================================================
// Expose les modules publics pour le binaire TUI et les tests
// ============================================================================

pub mod api;       // Sources de cotations (endpoint CSV, hors-ligne)
pub mod app;       // État de l'application
pub mod config;    // Configuration (variables d'environnement)
pub mod error;     // Erreurs typées
pub mod format;    // Formatage des champs pour l'affichage
pub mod models;    // Structures de données
pub mod parser;    // Ligne CSV brute -> QuoteRecord
pub mod registry;  // Watchlist ordonnée
pub mod scheduler; // Update manuel / auto / pause
pub mod ui;        // Interface utilisateur
pub mod worker;    // Fetchs en arrière-plan

pub use error::{QuoteError, QuoteResult};
