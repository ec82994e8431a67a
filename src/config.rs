// ============================================================================
// Configuration
// ============================================================================
// Valeurs par défaut raisonnables, surchargées par variables d'environnement :
//
//   QUOTEWATCH_BASE_URL            début de l'URL de l'endpoint CSV
//   QUOTEWATCH_POLL_INTERVAL_MS    intervalle de l'auto-update (> 0)
//   QUOTEWATCH_TICKERS             watchlist initiale, "AAPL,MSFT,..."
//   QUOTEWATCH_OFFLINE             "1"/"true" : données aléatoires
//   QUOTEWATCH_HTTP_TIMEOUT_SECS   timeout des requêtes HTTP
//
// Une valeur invalide est loggée puis ignorée (on garde le défaut).
// ============================================================================

use std::time::Duration;

use tracing::warn;

use crate::registry::{normalize_symbol, DEFAULT_TICKERS};
use crate::scheduler::DEFAULT_POLL_INTERVAL;

pub const DEFAULT_BASE_URL: &str = "http://download.finance.yahoo.com/d/quotes.csv?s=";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub poll_interval: Duration,
    pub tickers: Vec<String>,
    pub offline: bool,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            tickers: DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect(),
            offline: false,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl Config {
    /// Lit la configuration depuis l'environnement du process
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lit la configuration depuis une fonction de lookup
    ///
    /// CONCEPT RUST : Generic avec trait bound Fn
    /// - Permet de tester sans toucher aux vraies variables d'environnement
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("QUOTEWATCH_BASE_URL") {
            let url = url.trim();
            if url.is_empty() {
                warn!("QUOTEWATCH_BASE_URL is empty, using default");
            } else {
                config.base_url = url.to_string();
            }
        }

        if let Some(raw) = lookup("QUOTEWATCH_POLL_INTERVAL_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.poll_interval = Duration::from_millis(ms),
                _ => warn!(value = %raw, "Invalid QUOTEWATCH_POLL_INTERVAL_MS, using default"),
            }
        }

        if let Some(raw) = lookup("QUOTEWATCH_TICKERS") {
            let tickers = parse_ticker_list(&raw);
            if tickers.is_empty() {
                warn!(value = %raw, "QUOTEWATCH_TICKERS has no symbol, using defaults");
            } else {
                config.tickers = tickers;
            }
        }

        if let Some(raw) = lookup("QUOTEWATCH_OFFLINE") {
            config.offline = matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(raw) = lookup("QUOTEWATCH_HTTP_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.http_timeout = Duration::from_secs(secs),
                _ => warn!(value = %raw, "Invalid QUOTEWATCH_HTTP_TIMEOUT_SECS, using default"),
            }
        }

        config
    }
}

/// Découpe "aapl, msft,,AAPL" en ["AAPL", "MSFT"] (ordre conservé)
pub fn parse_ticker_list(raw: &str) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let symbol = normalize_symbol(part);
        if !symbol.is_empty() && !tickers.contains(&symbol) {
            tickers.push(symbol);
        }
    }
    tickers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.tickers.len(), 8);
        assert!(!config.offline);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("QUOTEWATCH_BASE_URL", "http://localhost:8080/q?s="),
            ("QUOTEWATCH_POLL_INTERVAL_MS", "250"),
            ("QUOTEWATCH_TICKERS", "tsla, nvda,,TSLA"),
            ("QUOTEWATCH_OFFLINE", "TRUE"),
            ("QUOTEWATCH_HTTP_TIMEOUT_SECS", "3"),
        ]));

        assert_eq!(config.base_url, "http://localhost:8080/q?s=");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.tickers, vec!["TSLA", "NVDA"]);
        assert!(config.offline);
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("QUOTEWATCH_POLL_INTERVAL_MS", "0"),
            ("QUOTEWATCH_TICKERS", " , ,"),
            ("QUOTEWATCH_HTTP_TIMEOUT_SECS", "soon"),
            ("QUOTEWATCH_BASE_URL", "   "),
        ]));

        assert_eq!(config, Config::default());
    }
}
