// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod dashboard; // Rendu de la watchlist et routage des écrans
pub mod detail;    // Rendu de la vue détaillée d'un ticker

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use dashboard::render;
