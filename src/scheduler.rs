// ============================================================================
// RefreshScheduler : mise à jour manuelle / automatique / pause
// ============================================================================
// Machine à états de la vue détail :
//
//   Idle --start_auto_update--> AutoUpdating --pause--> Paused
//   Paused --start_auto_update--> AutoUpdating (nouveau timer)
//   manual_refresh : fetch unique, aucun changement d'état
//
// L'état des boutons (update / auto / pause) est DÉRIVÉ de l'état, pas
// stocké à part : impossible d'avoir deux boutons incohérents.
//
// Le timer est une tâche tokio qui, à chaque tick, lance un fetch séparé.
// La pause annule le timer : plus de nouveaux ticks, mais un fetch déjà
// parti arrive quand même.
// ============================================================================

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::worker::Dispatcher;

/// Intervalle par défaut du mode auto-update
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// États du scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// Pas de timer, jamais démarré
    Idle,

    /// Timer actif : un fetch par intervalle
    AutoUpdating,

    /// Timer annulé par l'utilisateur
    Paused,
}

/// Boutons activés, dérivés de l'état
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub manual_update: bool,
    pub auto_update: bool,
    pub pause: bool,
}

impl RefreshState {
    /// Calcule l'état des boutons
    ///
    /// Pendant l'auto-update seul "pause" est disponible ; sinon c'est
    /// l'inverse.
    pub fn controls(&self) -> Controls {
        let auto = *self == RefreshState::AutoUpdating;
        Controls {
            manual_update: !auto,
            auto_update: !auto,
            pause: auto,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RefreshState::Idle => "idle",
            RefreshState::AutoUpdating => "auto-updating",
            RefreshState::Paused => "paused",
        }
    }
}

/// Scheduler des rafraîchissements d'un symbole
pub struct RefreshScheduler {
    dispatcher: Dispatcher,
    symbol: String,
    interval: Duration,
    state: RefreshState,

    /// Tâche du timer, Some(..) seulement en AutoUpdating
    timer: Option<JoinHandle<()>>,

    /// Diagnostic : nombre de timers armés depuis la création
    timers_armed: usize,
}

impl RefreshScheduler {
    /// Un intervalle nul est remplacé par DEFAULT_POLL_INTERVAL
    /// (tokio refuse une période nulle)
    pub fn new(dispatcher: Dispatcher, symbol: impl Into<String>, interval: Duration) -> Self {
        let symbol = symbol.into();
        let interval = if interval.is_zero() {
            warn!(ticker = %symbol, "Zero poll interval, using default");
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };

        Self {
            dispatcher,
            symbol,
            interval,
            state: RefreshState::Idle,
            timer: None,
            timers_armed: 0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn controls(&self) -> Controls {
        self.state.controls()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Diagnostic (logs, tests) : aucun comportement n'en dépend
    pub fn timers_armed(&self) -> usize {
        self.timers_armed
    }

    /// Vrai si un timer tourne encore
    pub fn is_timer_armed(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Fetch unique, l'état ne change pas
    pub fn manual_refresh(&mut self) {
        debug!(ticker = %self.symbol, state = self.state.label(), "Manual refresh");
        self.dispatcher.fetch_detail(&self.symbol);
    }

    /// Passe en AutoUpdating et arme un timer s'il n'y en a pas déjà un
    ///
    /// Le premier tick arrive après un intervalle complet, pas immédiatement.
    pub fn start_auto_update(&mut self) {
        if self.timer.is_none() {
            let dispatcher = self.dispatcher.clone();
            let symbol = self.symbol.clone();
            let period = self.interval;

            let handle = self.dispatcher.runtime().spawn(async move {
                let mut ticker = time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    dispatcher.fetch_detail(&symbol);
                }
            });

            self.timer = Some(handle);
            self.timers_armed += 1;
            info!(ticker = %self.symbol, interval_ms = period.as_millis() as u64, "Auto-update started");
        }

        self.state = RefreshState::AutoUpdating;
    }

    /// Annule le timer ; sans effet hors AutoUpdating
    pub fn pause(&mut self) {
        if self.state != RefreshState::AutoUpdating {
            debug!(ticker = %self.symbol, state = self.state.label(), "Pause ignored");
            return;
        }

        self.cancel_timer();
        self.state = RefreshState::Paused;
        info!(ticker = %self.symbol, "Auto-update paused");
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}

// Quitter la vue détail ne doit pas laisser un timer orphelin
impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

// ============================================================================
// Tests
// ============================================================================
// CONCEPT : horloge tokio en pause (start_paused = true)
// - le temps n'avance que quand toutes les tâches sont bloquées
// - sleep(3.5s) fait passer exactement 3 ticks, instantanément
// ============================================================================
