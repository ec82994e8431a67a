// ============================================================================
// Structure : TickerRegistry
// ============================================================================
// Collection ordonnée des tickers suivis + leur dernière cotation
//
// Invariants :
// - symboles en majuscules, uniques
// - l'ordre est celui de l'utilisateur (ajout en fin, échange de positions)
// - supprimer un ticker supprime aussi sa cotation
//
// Le registre n'est modifié que depuis le thread de l'UI : les workers
// produisent des résultats, c'est l'UI qui les applique ici.
// ============================================================================

use tracing::{debug, info, warn};

use crate::api::QuoteSource;
use crate::error::QuoteResult;
use crate::models::{QuoteRecord, QuoteSchema, TrackedTicker};
use crate::worker::fetch_quote;

/// Les 8 symboles suivis au démarrage
pub const DEFAULT_TICKERS: [&str; 8] = ["AAPL", "AMZN", "FB", "GOOG", "MSFT", "INTC", "AMD", "QCOM"];

/// Normalise un symbole saisi par l'utilisateur
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Résultat d'une demande d'ajout
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// Ticker ajouté en fin de liste
    Added,

    /// Déjà présent : rien n'a changé
    Duplicate,

    /// Symbole vide après normalisation
    Empty,

    /// Le fetch de vérification a échoué
    ProbeFailed,

    /// L'endpoint ne connaît pas ce symbole (nom = "N/A")
    UnknownSymbol,
}

/// Bilan de l'application d'un rafraîchissement complet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub updated: usize,
    pub failed: usize,
}

/// Registre ordonné des tickers suivis
#[derive(Debug, Clone, Default)]
pub struct TickerRegistry {
    tickers: Vec<TrackedTicker>,
}

impl TickerRegistry {
    /// Registre vide
    pub fn new() -> Self {
        Self { tickers: Vec::new() }
    }

    /// Registre pré-rempli, sans cotations
    ///
    /// Les doublons et les symboles vides sont ignorés, l'ordre est conservé.
    pub fn with_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for symbol in symbols {
            let symbol = normalize_symbol(symbol.as_ref());
            if !symbol.is_empty() && !registry.contains(&symbol) {
                registry.tickers.push(TrackedTicker::new(symbol));
            }
        }
        registry
    }

    /// Registre avec les 8 symboles par défaut
    pub fn with_defaults() -> Self {
        Self::with_symbols(DEFAULT_TICKERS)
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Vérifie la présence d'un symbole (insensible à la casse)
    pub fn contains(&self, symbol: &str) -> bool {
        self.position(symbol).is_some()
    }

    fn position(&self, symbol: &str) -> Option<usize> {
        let symbol = normalize_symbol(symbol);
        self.tickers.iter().position(|t| t.symbol == symbol)
    }

    /// Tous les tickers, dans l'ordre d'affichage
    pub fn all(&self) -> &[TrackedTicker] {
        &self.tickers
    }

    /// Ticker à une position donnée
    pub fn get_index(&self, index: usize) -> Option<&TrackedTicker> {
        self.tickers.get(index)
    }

    /// Dernière cotation connue d'un symbole
    pub fn get(&self, symbol: &str) -> Option<&QuoteRecord> {
        self.position(symbol)
            .and_then(|i| self.tickers[i].record.as_ref())
    }

    /// Liste des symboles, dans l'ordre
    pub fn symbols(&self) -> Vec<String> {
        self.tickers.iter().map(|t| t.symbol.clone()).collect()
    }

    /// Décide de l'ajout d'un symbole à partir du résultat de la sonde
    ///
    /// La sonde est un fetch + parse du symbole candidat. Le symbole est
    /// refusé si le fetch échoue ou si le nom contient "N/A". En cas
    /// d'ajout, la cotation de la sonde devient la première cotation.
    pub fn admit(&mut self, symbol: &str, probe: QuoteResult<QuoteRecord>) -> AddOutcome {
        let symbol = normalize_symbol(symbol);

        if symbol.is_empty() {
            return AddOutcome::Empty;
        }

        // Revérifié ici : un autre ajout du même symbole a pu arriver
        // pendant que la sonde tournait
        if self.contains(&symbol) {
            debug!(ticker = %symbol, "Ticker already tracked");
            return AddOutcome::Duplicate;
        }

        match probe {
            Ok(record) if record.has_unknown_company() => {
                info!(ticker = %symbol, "Rejected unknown ticker");
                AddOutcome::UnknownSymbol
            }
            Ok(record) => {
                info!(ticker = %symbol, "Ticker added");
                self.tickers.push(TrackedTicker::with_record(symbol, record));
                AddOutcome::Added
            }
            Err(e) => {
                warn!(ticker = %symbol, error = %e, "Probe failed, ticker not added");
                AddOutcome::ProbeFailed
            }
        }
    }

    /// Normalise un symbole candidat avant la sonde
    ///
    /// Err(Empty) ou Err(Duplicate) : inutile de sonder. Utilisé par `add`
    /// et par l'ajout depuis l'UI, qui sonde via le Dispatcher.
    pub fn check_candidate(&self, symbol: &str) -> Result<String, AddOutcome> {
        let symbol = normalize_symbol(symbol);

        if symbol.is_empty() {
            return Err(AddOutcome::Empty);
        }
        if self.contains(&symbol) {
            return Err(AddOutcome::Duplicate);
        }
        Ok(symbol)
    }

    /// Ajoute un symbole après l'avoir sondé via `source`
    ///
    /// Point d'entrée synchrone de la librairie : sonde puis `admit` dans
    /// la même tâche. L'UI fait `check_candidate`, sonde en arrière-plan,
    /// puis `admit` au retour du résultat.
    pub async fn add(&mut self, symbol: &str, source: &dyn QuoteSource) -> AddOutcome {
        let symbol = match self.check_candidate(symbol) {
            Ok(symbol) => symbol,
            Err(outcome) => return outcome,
        };

        let probe = fetch_quote(source, &symbol, QuoteSchema::List).await;
        self.admit(&symbol, probe)
    }

    /// Supprime un ticker et sa cotation
    pub fn remove(&mut self, symbol: &str) -> Option<TrackedTicker> {
        let index = self.position(symbol)?;
        let removed = self.tickers.remove(index);
        info!(ticker = %removed.symbol, "Ticker removed");
        Some(removed)
    }

    /// Supprime le ticker à une position donnée
    pub fn remove_index(&mut self, index: usize) -> Option<TrackedTicker> {
        if index < self.tickers.len() {
            Some(self.tickers.remove(index))
        } else {
            None
        }
    }

    /// Échange deux positions (pas de décalage des autres lignes)
    ///
    /// Retourne false si l'un des index est hors limites.
    pub fn swap(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tickers.len() || to >= self.tickers.len() {
            return false;
        }
        self.tickers.swap(from, to);
        true
    }

    /// Remplace la cotation d'un symbole suivi
    ///
    /// Retourne false si le symbole n'est plus dans le registre.
    pub fn apply_record(&mut self, symbol: &str, record: QuoteRecord) -> bool {
        match self.position(symbol) {
            Some(i) => {
                self.tickers[i].replace_record(record);
                true
            }
            None => false,
        }
    }

    /// Applique en une fois le résultat d'un rafraîchissement complet
    ///
    /// Un échec garde la dernière cotation valide. Les symboles supprimés
    /// entre-temps sont ignorés.
    pub fn apply_snapshot(&mut self, snapshot: Vec<(String, QuoteResult<QuoteRecord>)>) -> SnapshotSummary {
        let mut summary = SnapshotSummary::default();

        for (symbol, result) in snapshot {
            match result {
                Ok(record) => {
                    if self.apply_record(&symbol, record) {
                        summary.updated += 1;
                    }
                }
                Err(e) => {
                    warn!(ticker = %symbol, kind = e.kind(), error = %e, "Keeping stale quote");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuoteError;
    use crate::parser::parse_quote_line;
    use anyhow::Result;
    use async_trait::async_trait;

    fn record(symbol: &str, name: &str, price: &str) -> QuoteRecord {
        let raw = format!("{},{},{},0.10,0.05%,1.00,0.90,100,100", symbol, name, price);
        parse_quote_line(&raw, QuoteSchema::List).unwrap()
    }

    /// Source de test : "ZZZZINVALID" renvoie un nom "N/A", "DOWN" échoue
    struct FakeSource;

    #[async_trait]
    impl QuoteSource for FakeSource {
        async fn fetch_raw(&self, symbol: &str, _schema: QuoteSchema) -> Result<String> {
            match symbol {
                "DOWN" => anyhow::bail!("network unreachable"),
                "ZZZZINVALID" => Ok("ZZZZINVALID,N/A,N/A,N/A,N/A,N/A,N/A,N/A,N/A\n".to_string()),
                _ => Ok(format!("{},{} Corp,10.00,0.10,0.05%,10.01,9.99,100,100\n", symbol, symbol)),
            }
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    #[test]
    fn test_defaults() {
        let registry = TickerRegistry::with_defaults();
        assert_eq!(registry.len(), 8);
        assert_eq!(registry.symbols()[0], "AAPL");
        assert_eq!(registry.symbols()[7], "QCOM");
        assert!(registry.get("AAPL").is_none());
    }

    #[test]
    fn test_with_symbols_normalizes_and_dedups() {
        let registry = TickerRegistry::with_symbols(["aapl", " msft ", "AAPL", ""]);
        assert_eq!(registry.symbols(), vec!["AAPL", "MSFT"]);
        assert!(registry.contains("msft"));
    }

    #[test]
    fn test_admit_duplicate_is_noop() {
        let mut registry = TickerRegistry::with_defaults();
        let outcome = registry.admit("aapl", Ok(record("AAPL", "Apple Inc.", "114.71")));

        assert_eq!(outcome, AddOutcome::Duplicate);
        assert_eq!(registry.len(), 8);
        assert!(registry.get("AAPL").is_none());
    }

    #[test]
    fn test_admit_rejects_unknown_and_failed() {
        let mut registry = TickerRegistry::new();

        let outcome = registry.admit("zzzzinvalid", Ok(record("ZZZZINVALID", "N/A", "N/A")));
        assert_eq!(outcome, AddOutcome::UnknownSymbol);

        let failure = QuoteError::Fetch {
            symbol: "TSLA".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(registry.admit("tsla", Err(failure)), AddOutcome::ProbeFailed);
        assert_eq!(registry.admit("  ", Ok(record("X", "X", "1"))), AddOutcome::Empty);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_admit_stores_probe_record() {
        let mut registry = TickerRegistry::new();
        let outcome = registry.admit("tsla", Ok(record("TSLA", "Tesla Motors", "230.01")));

        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(registry.symbols(), vec!["TSLA"]);
        assert_eq!(registry.get("TSLA").unwrap().last_traded_price, "230.01");
        assert!(registry.get_index(0).unwrap().updated_at.is_some());
    }

    #[test]
    fn test_check_candidate() {
        let registry = TickerRegistry::with_symbols(["AAPL"]);

        assert_eq!(registry.check_candidate(" nvda "), Ok("NVDA".to_string()));
        assert_eq!(registry.check_candidate("aapl"), Err(AddOutcome::Duplicate));
        assert_eq!(registry.check_candidate("   "), Err(AddOutcome::Empty));
    }

    #[tokio::test]
    async fn test_add_with_probe() {
        let mut registry = TickerRegistry::with_defaults();

        assert_eq!(registry.add("AAPL", &FakeSource).await, AddOutcome::Duplicate);
        assert_eq!(registry.add("ZZZZINVALID", &FakeSource).await, AddOutcome::UnknownSymbol);
        assert_eq!(registry.add("down", &FakeSource).await, AddOutcome::ProbeFailed);
        assert_eq!(registry.len(), 8);

        assert_eq!(registry.add("nvda", &FakeSource).await, AddOutcome::Added);
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.get("NVDA").unwrap().company_name, "NVDA Corp");
    }

    #[test]
    fn test_remove_discards_record() {
        let mut registry = TickerRegistry::with_symbols(["AAPL", "MSFT"]);
        assert!(registry.apply_record("AAPL", record("AAPL", "Apple Inc.", "114.71")));

        let removed = registry.remove("aapl").unwrap();
        assert!(removed.has_data());
        assert!(registry.get("AAPL").is_none());
        assert!(!registry.contains("AAPL"));
        assert!(registry.remove("AAPL").is_none());
        assert!(!registry.apply_record("AAPL", record("AAPL", "Apple Inc.", "1")));
    }

    #[test]
    fn test_swap_exchanges_positions() {
        let mut registry = TickerRegistry::with_symbols(["A", "B", "C", "D"]);

        assert!(registry.swap(0, 2));
        assert_eq!(registry.symbols(), vec!["C", "B", "A", "D"]);

        assert!(!registry.swap(1, 4));
        assert_eq!(registry.symbols(), vec!["C", "B", "A", "D"]);
    }

    #[test]
    fn test_apply_snapshot_keeps_stale_on_failure() {
        let mut registry = TickerRegistry::with_symbols(["AAPL", "MSFT"]);
        registry.apply_record("MSFT", record("MSFT", "Microsoft", "50.00"));

        let snapshot = vec![
            ("AAPL".to_string(), Ok(record("AAPL", "Apple Inc.", "114.71"))),
            (
                "MSFT".to_string(),
                Err(QuoteError::MalformedRecord { expected: 9, actual: 2 }),
            ),
            ("GONE".to_string(), Ok(record("GONE", "Gone Inc", "1.00"))),
        ];

        let summary = registry.apply_snapshot(snapshot);
        assert_eq!(summary, SnapshotSummary { updated: 1, failed: 1 });
        assert_eq!(registry.get("AAPL").unwrap().last_traded_price, "114.71");
        assert_eq!(registry.get("MSFT").unwrap().last_traded_price, "50.00");
        assert!(!registry.contains("GONE"));
    }
}
