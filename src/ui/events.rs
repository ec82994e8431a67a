// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier (crossterm) et traduit les touches en actions
//
// Raccourcis :
//   Watchlist : r refresh, a add, d delete, Shift+↑/↓ ou K/J déplacer,
//               Enter détail, ↑/↓ ou k/j naviguer
//   Détail    : u update, s auto-update, p pause, Esc retour
//   Partout   : q quitter (deux fois)
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Pas de touche pendant le poll : l'UI en profite pour drainer les
    /// résultats des workers et redessiner
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant au plus tick_rate)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

// ============================================================================
// Helpers : KeyEvent -> action
// ============================================================================

fn key_of(event: &Event) -> Option<&KeyEvent> {
    match event {
        Event::Key(key) => Some(key),
        Event::Tick => None,
    }
}

fn is_char(event: &Event, chars: &[char]) -> bool {
    matches!(key_of(event), Some(KeyEvent { code: KeyCode::Char(c), .. }) if chars.contains(c))
}

fn has_shift(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::SHIFT)
}

/// 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    is_char(event, &['q', 'Q'])
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_of(event), Some(key) if key.code == KeyCode::Esc)
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_of(event), Some(key) if key.code == KeyCode::Enter)
}

/// Flèche haut ou 'k' (vim), sans Shift
pub fn is_up_event(event: &Event) -> bool {
    match key_of(event) {
        Some(key) if key.code == KeyCode::Up => !has_shift(key),
        Some(key) => key.code == KeyCode::Char('k'),
        None => false,
    }
}

/// Flèche bas ou 'j' (vim), sans Shift
pub fn is_down_event(event: &Event) -> bool {
    match key_of(event) {
        Some(key) if key.code == KeyCode::Down => !has_shift(key),
        Some(key) => key.code == KeyCode::Char('j'),
        None => false,
    }
}

/// Shift+↑ ou 'K' : remonte le ticker sélectionné
pub fn is_move_up_event(event: &Event) -> bool {
    match key_of(event) {
        Some(key) if key.code == KeyCode::Up => has_shift(key),
        Some(key) => key.code == KeyCode::Char('K'),
        None => false,
    }
}

/// Shift+↓ ou 'J' : descend le ticker sélectionné
pub fn is_move_down_event(event: &Event) -> bool {
    match key_of(event) {
        Some(key) if key.code == KeyCode::Down => has_shift(key),
        Some(key) => key.code == KeyCode::Char('J'),
        None => false,
    }
}

/// 'r' : rafraîchit toute la watchlist
pub fn is_refresh_event(event: &Event) -> bool {
    is_char(event, &['r', 'R'])
}

/// 'a' (add ticker)
pub fn is_add_event(event: &Event) -> bool {
    is_char(event, &['a', 'A'])
}

/// 'd' (delete ticker), confirmé par un second 'd'
pub fn is_delete_event(event: &Event) -> bool {
    is_char(event, &['d', 'D'])
}

/// 'u' : update manuel de la vue détail
pub fn is_update_event(event: &Event) -> bool {
    is_char(event, &['u', 'U'])
}

/// 's' : démarre l'auto-update
pub fn is_auto_update_event(event: &Event) -> bool {
    is_char(event, &['s', 'S'])
}

/// 'p' : pause de l'auto-update
pub fn is_pause_event(event: &Event) -> bool {
    is_char(event, &['p', 'P'])
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_of(event), Some(key) if key.code == KeyCode::Backspace)
}

/// Caractère valide dans un symbole (alphanumérique, '-', '.', '^')
pub fn is_ticker_char_event(event: &Event) -> bool {
    matches!(
        key_of(event),
        Some(KeyEvent { code: KeyCode::Char(c), .. }) if c.is_alphanumeric() || matches!(c, '-' | '.' | '^')
    )
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_of(event) {
        Some(KeyEvent { code: KeyCode::Char(c), .. }) => Some(*c),
        _ => None,
    }
}
