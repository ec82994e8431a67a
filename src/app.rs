// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Les résultats des workers sont appliqués UNIQUEMENT via apply_outcome(),
//   appelé depuis la boucle de l'UI
// ============================================================================

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::QuoteResult;
use crate::format::{self, ChangeDirection};
use crate::models::{QuoteRecord, TrackedTicker};
use crate::registry::{AddOutcome, TickerRegistry};
use crate::scheduler::{Controls, RefreshScheduler, RefreshState};
use crate::worker::{Dispatcher, FetchOutcome};

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : la watchlist
    List,

    /// Vue détaillée du ticker sélectionné
    Detail,

    /// Mode saisie : ajout d'un ticker
    /// CONCEPT : Modal input mode (Vim-like)
    /// - Capture les touches pour construire un buffer
    /// - Enter valide, ESC annule
    InputMode,
}

// ============================================================================
// Libellés de la vue détail
// ============================================================================
// Les libellés sont mis à jour à chaque cotation reçue. Points et pourcentage
// ne sont PAS effacés si la nouvelle valeur n'est pas numérique : on garde
// l'ancien texte (et l'ancienne couleur).
// ============================================================================

/// Textes affichés par la vue détail
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailLabels {
    pub symbol: String,
    pub company_name: String,
    pub price: String,
    pub last_trade_time: String,
    pub points_change: String,
    pub percent_change: String,
    pub direction: Option<ChangeDirection>,
    pub ask: String,
    pub bid: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub week52_high: String,
    pub week52_low: String,
    pub previous_close: String,
}

impl DetailLabels {
    /// Met à jour les libellés à partir d'une nouvelle cotation
    pub fn apply(&mut self, record: &QuoteRecord) {
        self.symbol = record.symbol.clone();
        self.company_name = format::wrap_company_name(&record.company_name);
        self.price = record.last_traded_price.clone();

        if let Some(points) = format::parse_number(&record.points_change) {
            self.direction = Some(format::classify_change(points));
        }
        if let Some(points) = format::format_signed_change(&record.points_change) {
            self.points_change = points;
        }
        if let Some(percent) = format::format_percent(&record.percent_change) {
            self.percent_change = percent;
        }

        self.ask = format::format_quoted_field("Ask", &record.ask_price, &record.ask_size);
        self.bid = format::format_quoted_field("Bid", &record.bid_price, &record.bid_size);

        if let Some(session) = &record.session {
            self.last_trade_time = session.last_trade_time.clone();
            self.open = format::format_labeled_price("Open", &session.open_price);
            self.high = format::format_labeled_price("High", &session.day_high);
            self.low = format::format_labeled_price("Low", &session.day_low);
            self.week52_high = format::format_labeled_price("52w high", &session.week52_high);
            self.week52_low = format::format_labeled_price("52w low", &session.week52_low);
            self.previous_close = format::format_labeled_price("Pre-Close", &session.previous_close);
        }
    }
}

/// Vue détaillée ouverte sur un symbole
pub struct DetailView {
    pub symbol: String,
    pub labels: DetailLabels,

    /// Dernière cotation appliquée
    pub record: Option<QuoteRecord>,
    pub updated_at: Option<DateTime<Utc>>,

    /// Update manuel / auto / pause ; le timer meurt avec la vue
    pub scheduler: RefreshScheduler,
}

impl DetailView {
    pub fn new(symbol: String, scheduler: RefreshScheduler) -> Self {
        Self {
            symbol,
            labels: DetailLabels::default(),
            record: None,
            updated_at: None,
            scheduler,
        }
    }

    /// Remplace la cotation et met à jour les libellés
    pub fn apply_record(&mut self, record: QuoteRecord) {
        self.labels.apply(&record);
        self.record = Some(record);
        self.updated_at = Some(Utc::now());
    }

    pub fn controls(&self) -> Controls {
        self.scheduler.controls()
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.scheduler.state()
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Tickers suivis, dans l'ordre de l'utilisateur
    pub registry: TickerRegistry,

    /// Index du ticker sélectionné dans la watchlist
    pub selected_index: usize,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Two-step quit : première pression de 'q' = demande de confirmation
    pub confirm_quit: bool,

    /// Two-step delete : première pression de 'd' = demande de confirmation
    pub confirm_delete: bool,

    /// Faux pendant un rafraîchissement complet de la liste
    /// CONCEPT : pas de suppression/déplacement pendant que le snapshot
    /// est en vol, il est appliqué en un seul bloc à son retour
    pub list_interaction_enabled: bool,

    /// Message d'état affiché en bas de l'écran
    pub status_message: Option<String>,

    /// Buffer de saisie pour le mode Input
    pub input_buffer: String,

    /// Prompt affiché en mode Input
    pub input_prompt: String,

    /// Vue détail ouverte (None sur la watchlist)
    pub detail: Option<DetailView>,

    /// Sondes revenues pendant un rafraîchissement complet, admises une
    /// fois le snapshot appliqué
    pending_admissions: Vec<(String, QuoteResult<QuoteRecord>)>,

    /// Intervalle de l'auto-update de la vue détail
    poll_interval: Duration,
}

impl App {
    /// Crée l'application avec un registre donné
    pub fn new(registry: TickerRegistry, poll_interval: Duration) -> Self {
        Self {
            running: true,
            registry,
            selected_index: 0,
            current_screen: Screen::List,
            confirm_quit: false,
            confirm_delete: false,
            list_interaction_enabled: true,
            status_message: None,
            input_buffer: String::new(),
            input_prompt: String::new(),
            detail: None,
            pending_admissions: Vec::new(),
            poll_interval,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigue vers le haut dans la watchlist
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() : soustrait mais ne descend pas en dessous de 0
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Navigue vers le bas dans la watchlist
    pub fn navigate_down(&mut self) {
        let max_index = self.registry.len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Retourne le ticker sélectionné
    pub fn selected_ticker(&self) -> Option<&TrackedTicker> {
        self.registry.get_index(self.selected_index)
    }

    /// Échange le ticker sélectionné avec celui du dessus
    pub fn move_selected_up(&mut self) {
        if !self.list_interaction_enabled || self.selected_index == 0 {
            return;
        }
        if self.registry.swap(self.selected_index, self.selected_index - 1) {
            self.selected_index -= 1;
        }
    }

    /// Échange le ticker sélectionné avec celui du dessous
    pub fn move_selected_down(&mut self) {
        if !self.list_interaction_enabled {
            return;
        }
        if self.registry.swap(self.selected_index, self.selected_index + 1) {
            self.selected_index += 1;
        }
    }

    pub fn is_on_list(&self) -> bool {
        self.current_screen == Screen::List
    }

    pub fn is_on_detail(&self) -> bool {
        self.current_screen == Screen::Detail
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }

    // ========================================================================
    // Confirmations (quit / delete)
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    pub fn request_delete(&mut self) {
        if self.list_interaction_enabled {
            self.confirm_delete = true;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = false;
    }

    pub fn is_awaiting_delete_confirmation(&self) -> bool {
        self.confirm_delete
    }

    /// Supprime le ticker sélectionné (et sa cotation)
    pub fn delete_selected(&mut self) {
        if self.list_interaction_enabled {
            if let Some(removed) = self.registry.remove_index(self.selected_index) {
                info!(ticker = %removed.symbol, "Ticker deleted");
            }

            // Ajuste l'index si on a supprimé le dernier élément
            if self.selected_index >= self.registry.len() && self.selected_index > 0 {
                self.selected_index -= 1;
            }
        }

        self.confirm_delete = false;
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    /// Entre en mode input avec un prompt donné
    pub fn start_input(&mut self, prompt: String) {
        self.current_screen = Screen::InputMode;
        self.input_buffer.clear();
        self.input_prompt = prompt;
    }

    /// Annule le mode input et retourne à la watchlist
    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::List;
        self.input_buffer.clear();
        self.input_prompt.clear();
    }

    /// Récupère la valeur saisie et retourne à la watchlist
    pub fn submit_input(&mut self) -> String {
        let value = std::mem::take(&mut self.input_buffer);
        self.current_screen = Screen::List;
        self.input_prompt.clear();
        value
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    // ========================================================================
    // Actions qui partent en arrière-plan
    // ========================================================================

    /// Rafraîchit toute la watchlist
    ///
    /// L'interaction est coupée jusqu'au retour du snapshot.
    pub fn refresh_list(&mut self, dispatcher: &Dispatcher) {
        if !self.list_interaction_enabled {
            debug!("List refresh already in progress");
            return;
        }

        self.list_interaction_enabled = false;
        self.confirm_delete = false;
        self.status_message = Some("Refreshing...".to_string());
        info!(count = self.registry.len(), "List refresh started");
        dispatcher.refresh_list(self.registry.symbols());
    }

    /// Valide la saisie et lance la sonde du symbole
    pub fn submit_add(&mut self, dispatcher: &Dispatcher) {
        let input = self.submit_input();
        let symbol = match self.registry.check_candidate(&input) {
            Ok(symbol) => symbol,
            Err(AddOutcome::Duplicate) => {
                self.status_message = Some(format!("{} is already tracked", input.trim().to_uppercase()));
                return;
            }
            Err(_) => {
                debug!("Empty ticker symbol, ignoring");
                return;
            }
        };

        if !self.list_interaction_enabled {
            self.status_message = Some("Wait for the refresh to finish".to_string());
            return;
        }

        info!(ticker = %symbol, "Probing ticker before adding");
        self.status_message = Some(format!("Checking {}...", symbol));
        dispatcher.probe(&symbol);
    }

    /// Ouvre la vue détail sur le ticker sélectionné + fetch immédiat
    pub fn open_detail(&mut self, dispatcher: &Dispatcher) {
        if !self.list_interaction_enabled {
            return;
        }
        let Some(symbol) = self.selected_ticker().map(|t| t.symbol.clone()) else {
            return;
        };

        info!(ticker = %symbol, "Opening detail view");
        let scheduler = RefreshScheduler::new(dispatcher.clone(), symbol.clone(), self.poll_interval);
        let mut view = DetailView::new(symbol, scheduler);
        view.scheduler.manual_refresh();

        self.detail = Some(view);
        self.current_screen = Screen::Detail;
    }

    /// Ferme la vue détail ; le drop du scheduler annule le timer
    pub fn close_detail(&mut self) {
        if let Some(view) = self.detail.take() {
            debug!(ticker = %view.symbol, "Closing detail view");
        }
        self.current_screen = Screen::List;
    }

    /// Bouton "update" de la vue détail
    pub fn manual_update(&mut self) {
        if let Some(view) = self.detail.as_mut() {
            if view.controls().manual_update {
                view.scheduler.manual_refresh();
            }
        }
    }

    /// Bouton "auto-update" de la vue détail
    pub fn start_auto_update(&mut self) {
        if let Some(view) = self.detail.as_mut() {
            if view.controls().auto_update {
                view.scheduler.start_auto_update();
            }
        }
    }

    /// Bouton "pause" de la vue détail
    pub fn pause_auto_update(&mut self) {
        if let Some(view) = self.detail.as_mut() {
            if view.controls().pause {
                view.scheduler.pause();
            }
        }
    }

    // ========================================================================
    // Application des résultats (thread de l'UI uniquement)
    // ========================================================================

    /// Applique un résultat renvoyé par le worker
    ///
    /// Les échecs sont absorbés : log + on garde les dernières données.
    pub fn apply_outcome(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Detail { symbol, result } => {
                let Some(view) = self.detail.as_mut().filter(|v| v.symbol == symbol) else {
                    debug!(ticker = %symbol, "Detail result for a closed view, dropping");
                    return;
                };

                match result {
                    Ok(record) => view.apply_record(record),
                    Err(e) => warn!(ticker = %symbol, kind = e.kind(), error = %e, "Keeping last detail quote"),
                }
            }

            FetchOutcome::ListRefreshed { snapshot } => {
                let summary = self.registry.apply_snapshot(snapshot);
                info!(updated = summary.updated, failed = summary.failed, "List refresh applied");

                self.list_interaction_enabled = true;
                self.status_message = if summary.failed > 0 {
                    Some(format!("{} quote(s) could not be refreshed", summary.failed))
                } else {
                    None
                };

                for (symbol, result) in std::mem::take(&mut self.pending_admissions) {
                    self.admit_probe(&symbol, result);
                }
            }

            FetchOutcome::Probed { symbol, result } => {
                // La liste ne bouge pas tant que le snapshot n'est pas appliqué
                if !self.list_interaction_enabled {
                    debug!(ticker = %symbol, "List refresh in progress, deferring admission");
                    self.pending_admissions.push((symbol, result));
                    return;
                }
                self.admit_probe(&symbol, result);
            }
        }
    }

    fn admit_probe(&mut self, symbol: &str, result: QuoteResult<QuoteRecord>) {
        let message = match self.registry.admit(symbol, result) {
            AddOutcome::Added | AddOutcome::Empty => None,
            AddOutcome::Duplicate => Some(format!("{} is already tracked", symbol)),
            AddOutcome::UnknownSymbol => Some(format!("{} is not a valid ticker", symbol)),
            AddOutcome::ProbeFailed => Some(format!("Could not reach quotes for {}", symbol)),
        };
        self.status_message = message;
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QuoteSource;
    use crate::error::QuoteError;
    use crate::models::QuoteSchema;
    use crate::parser::parse_quote_line;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::runtime::Handle;

    const DETAIL_LINE: &str = "\"AAPL\",\"Apple Inc.\",114.75,114.77,115.00,116.36,116.69,114.02,134.54,92.00,114.71,\"4:00pm\",-0.29,\"-0.25%\",300,200";

    struct EchoSource;

    #[async_trait]
    impl QuoteSource for EchoSource {
        async fn fetch_raw(&self, _symbol: &str, _schema: QuoteSchema) -> Result<String> {
            Ok(DETAIL_LINE.to_string())
        }

        fn name(&self) -> &'static str {
            "echo"
        }
    }

    fn app() -> App {
        App::new(
            TickerRegistry::with_symbols(["AAPL", "MSFT", "GOOG"]),
            Duration::from_secs(1),
        )
    }

    fn list_record(symbol: &str, name: &str) -> QuoteRecord {
        let raw = format!("{},{},10.00,0.10,0.05%,10.01,9.99,100,100", symbol, name);
        parse_quote_line(&raw, QuoteSchema::List).unwrap()
    }

    #[test]
    fn test_app_creation() {
        let app = app();
        assert!(app.is_running());
        assert!(app.is_on_list());
        assert!(app.list_interaction_enabled);
        assert_eq!(app.selected_ticker().unwrap().symbol, "AAPL");
    }

    #[test]
    fn test_navigation() {
        let mut app = app();

        app.navigate_down();
        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.selected_index, 2);

        app.navigate_up();
        assert_eq!(app.selected_index, 1);
    }

    #[test]
    fn test_move_selected_swaps_rows() {
        let mut app = app();

        app.move_selected_down();
        assert_eq!(app.registry.symbols(), vec!["MSFT", "AAPL", "GOOG"]);
        assert_eq!(app.selected_index, 1);

        app.move_selected_up();
        app.move_selected_up();
        assert_eq!(app.registry.symbols(), vec!["AAPL", "MSFT", "GOOG"]);
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_delete_selected() {
        let mut app = app();
        app.selected_index = 2;

        app.request_delete();
        assert!(app.is_awaiting_delete_confirmation());
        app.delete_selected();

        assert_eq!(app.registry.symbols(), vec!["AAPL", "MSFT"]);
        assert_eq!(app.selected_index, 1);
        assert!(!app.is_awaiting_delete_confirmation());
    }

    #[test]
    fn test_list_locked_during_refresh() {
        let mut app = app();
        app.list_interaction_enabled = false;

        app.move_selected_down();
        app.request_delete();
        app.delete_selected();

        assert_eq!(app.registry.symbols(), vec!["AAPL", "MSFT", "GOOG"]);
        assert!(!app.is_awaiting_delete_confirmation());
    }

    #[test]
    fn test_apply_list_snapshot_unlocks() {
        let mut app = app();
        app.list_interaction_enabled = false;

        app.apply_outcome(FetchOutcome::ListRefreshed {
            snapshot: vec![
                ("AAPL".to_string(), Ok(list_record("AAPL", "Apple Inc."))),
                (
                    "MSFT".to_string(),
                    Err(QuoteError::Fetch {
                        symbol: "MSFT".to_string(),
                        reason: "timeout".to_string(),
                    }),
                ),
            ],
        });

        assert!(app.list_interaction_enabled);
        assert!(app.registry.get("AAPL").is_some());
        assert!(app.registry.get("MSFT").is_none());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_apply_probe_outcomes() {
        let mut app = app();

        app.apply_outcome(FetchOutcome::Probed {
            symbol: "ZZZZINVALID".to_string(),
            result: Ok(list_record("ZZZZINVALID", "N/A")),
        });
        assert_eq!(app.registry.len(), 3);

        app.apply_outcome(FetchOutcome::Probed {
            symbol: "TSLA".to_string(),
            result: Ok(list_record("TSLA", "Tesla Motors")),
        });
        assert_eq!(app.registry.symbols(), vec!["AAPL", "MSFT", "GOOG", "TSLA"]);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_probe_during_refresh_waits_for_snapshot() {
        let mut app = app();
        app.list_interaction_enabled = false;

        app.apply_outcome(FetchOutcome::Probed {
            symbol: "TSLA".to_string(),
            result: Ok(list_record("TSLA", "Tesla Motors")),
        });
        assert_eq!(app.registry.symbols(), vec!["AAPL", "MSFT", "GOOG"]);

        app.apply_outcome(FetchOutcome::ListRefreshed {
            snapshot: vec![("AAPL".to_string(), Ok(list_record("AAPL", "Apple Inc.")))],
        });

        assert!(app.list_interaction_enabled);
        assert_eq!(app.registry.symbols(), vec!["AAPL", "MSFT", "GOOG", "TSLA"]);
        assert!(app.registry.get("TSLA").is_some());
    }

    #[test]
    fn test_detail_labels_keep_previous_change_on_na() {
        let mut labels = DetailLabels::default();
        labels.apply(&parse_quote_line(DETAIL_LINE, QuoteSchema::Detail).unwrap());

        assert_eq!(labels.points_change, "-0.29");
        assert_eq!(labels.percent_change, "-0.25%");
        assert_eq!(labels.direction, Some(ChangeDirection::Negative));
        assert_eq!(labels.ask, "Ask: 114.77 x 300");
        assert_eq!(labels.bid, "Bid: 114.75 x 200");
        assert_eq!(labels.open, "Open: 116.36");
        assert_eq!(labels.week52_low, "52w low: 92.00");
        assert_eq!(labels.previous_close, "Pre-Close: 115.00");

        let na_line = DETAIL_LINE
            .replace("-0.29", "N/A")
            .replace("-0.25%", "N/A")
            .replace("114.77", "N/A");
        labels.apply(&parse_quote_line(&na_line, QuoteSchema::Detail).unwrap());

        assert_eq!(labels.points_change, "-0.29");
        assert_eq!(labels.percent_change, "-0.25%");
        assert_eq!(labels.direction, Some(ChangeDirection::Negative));
        assert_eq!(labels.ask, "Ask: N/A x 300");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_detail_view_round_trip() {
        let (dispatcher, rx) = Dispatcher::new(Arc::new(EchoSource), Handle::current());
        let mut app = app();

        app.open_detail(&dispatcher);
        assert!(app.is_on_detail());
        assert_eq!(app.detail.as_ref().unwrap().refresh_state(), RefreshState::Idle);

        // Le fetch initial revient par le channel et est appliqué ici
        let outcome = tokio::task::block_in_place(|| rx.recv_timeout(Duration::from_secs(5)).unwrap());
        app.apply_outcome(outcome);

        let view = app.detail.as_ref().unwrap();
        assert_eq!(view.labels.company_name, "Apple Inc.");
        assert!(view.updated_at.is_some());

        // Boutons mutuellement exclusifs
        app.start_auto_update();
        assert!(!app.detail.as_ref().unwrap().controls().manual_update);
        app.pause_auto_update();
        assert_eq!(app.detail.as_ref().unwrap().refresh_state(), RefreshState::Paused);

        app.close_detail();
        assert!(app.detail.is_none());
        assert!(app.is_on_list());
    }

    #[test]
    fn test_detail_outcome_without_view_is_dropped() {
        let mut app = app();
        app.apply_outcome(FetchOutcome::Detail {
            symbol: "AAPL".to_string(),
            result: parse_quote_line(DETAIL_LINE, QuoteSchema::Detail),
        });
        assert!(app.detail.is_none());
        assert!(app.registry.get("AAPL").is_none());
    }
}
