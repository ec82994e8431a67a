// ============================================================================
// Background worker : fetch + parse hors du thread de l'UI
// ============================================================================
// Chaque opération suit le même chemin :
//   1. l'UI demande un fetch au Dispatcher
//   2. une tâche tokio fait l'I/O réseau + le parse (peut échouer)
//   3. le résultat part sur un channel mpsc (FetchOutcome)
//   4. l'UI le reçoit (try_recv) et applique la mutation elle-même
//
// Les workers n'écrivent jamais dans le registre. Il n'y a pas de
// numéro de séquence : si deux fetchs du même symbole se croisent, le
// plus lent peut écraser un résultat plus récent (course connue).
// ============================================================================

use std::sync::mpsc;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::api::QuoteSource;
use crate::error::{QuoteError, QuoteResult};
use crate::models::{QuoteRecord, QuoteSchema};
use crate::parser::parse_quote_line;

/// Fetch + parse d'un symbole
///
/// Convertit l'erreur réseau (anyhow) en QuoteError::Fetch.
pub async fn fetch_quote(source: &dyn QuoteSource, symbol: &str, schema: QuoteSchema) -> QuoteResult<QuoteRecord> {
    let raw = source
        .fetch_raw(symbol, schema)
        .await
        .map_err(|e| QuoteError::fetch(symbol, &e))?;

    parse_quote_line(&raw, schema)
}

/// Résultats renvoyés par les tâches de fond
#[derive(Debug)]
pub enum FetchOutcome {
    /// Cotation détaillée d'un symbole (vue détail)
    Detail {
        symbol: String,
        result: QuoteResult<QuoteRecord>,
    },

    /// Rafraîchissement complet de la watchlist, dans l'ordre demandé
    ListRefreshed {
        snapshot: Vec<(String, QuoteResult<QuoteRecord>)>,
    },

    /// Sonde d'un symbole candidat à l'ajout
    Probed {
        symbol: String,
        result: QuoteResult<QuoteRecord>,
    },
}

/// Lance les fetchs sur le runtime tokio et renvoie les résultats à l'UI
///
/// CONCEPT RUST : Clone bon marché
/// - Arc<dyn QuoteSource> : la source est partagée, pas copiée
/// - Handle : référence vers le runtime, clonable
/// - mpsc::Sender : plusieurs producteurs, un seul consommateur (l'UI)
#[derive(Clone)]
pub struct Dispatcher {
    source: Arc<dyn QuoteSource>,
    runtime: Handle,
    results: mpsc::Sender<FetchOutcome>,
}

impl Dispatcher {
    /// Crée le dispatcher et le Receiver que l'UI doit drainer
    pub fn new(source: Arc<dyn QuoteSource>, runtime: Handle) -> (Self, mpsc::Receiver<FetchOutcome>) {
        let (results, receiver) = mpsc::channel();
        (
            Self {
                source,
                runtime,
                results,
            },
            receiver,
        )
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Envoie un résultat à l'UI ; un Receiver fermé veut dire que l'UI
    /// s'arrête, le résultat est simplement perdu
    fn deliver(results: &mpsc::Sender<FetchOutcome>, outcome: FetchOutcome) {
        if results.send(outcome).is_err() {
            debug!("Result channel closed, dropping outcome");
        }
    }

    /// Fetch unique pour la vue détail
    pub fn fetch_detail(&self, symbol: &str) {
        let source = Arc::clone(&self.source);
        let results = self.results.clone();
        let symbol = symbol.to_string();

        self.runtime.spawn(async move {
            let result = fetch_quote(source.as_ref(), &symbol, QuoteSchema::Detail).await;
            if let Err(e) = &result {
                warn!(ticker = %symbol, kind = e.kind(), error = %e, "Detail fetch failed");
            }
            Self::deliver(&results, FetchOutcome::Detail { symbol, result });
        });
    }

    /// Rafraîchit tous les symboles, un par un, puis renvoie un seul snapshot
    pub fn refresh_list(&self, symbols: Vec<String>) {
        let source = Arc::clone(&self.source);
        let results = self.results.clone();

        self.runtime.spawn(async move {
            let mut snapshot = Vec::with_capacity(symbols.len());
            for symbol in symbols {
                let result = fetch_quote(source.as_ref(), &symbol, QuoteSchema::List).await;
                snapshot.push((symbol, result));
            }
            debug!(count = snapshot.len(), "List refresh finished");
            Self::deliver(&results, FetchOutcome::ListRefreshed { snapshot });
        });
    }

    /// Sonde un symbole avant de l'ajouter à la watchlist
    pub fn probe(&self, symbol: &str) {
        let source = Arc::clone(&self.source);
        let results = self.results.clone();
        let symbol = symbol.to_string();

        self.runtime.spawn(async move {
            let result = fetch_quote(source.as_ref(), &symbol, QuoteSchema::List).await;
            Self::deliver(&results, FetchOutcome::Probed { symbol, result });
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
