// ============================================================================
// Source hors-ligne : cotations aléatoires
// ============================================================================
// Sert à vérifier que l'UI se met bien à jour quand le marché est fermé
// (ou quand l'endpoint ne répond plus). Les lignes produites ont le même
// format que celles de l'endpoint CSV et passent par le même parser.
// ============================================================================

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;

use crate::api::QuoteSource;
use crate::models::QuoteSchema;

/// Génère une ligne plausible à chaque appel
#[derive(Debug, Clone)]
pub struct RandomQuoteSource {
    /// Variation relative max autour du prix de référence (0.05 = 5%)
    max_rel_step: f64,
}

impl RandomQuoteSource {
    pub fn new(max_rel_step: f64) -> Self {
        Self { max_rel_step }
    }

    /// Prix de référence stable par symbole, entre 10 et 500
    fn base_price(symbol: &str) -> f64 {
        let seed: u32 = symbol.bytes().map(u32::from).sum();
        10.0 + f64::from(seed % 490)
    }

    /// Construit une ligne CSV brute (avec guillemets, comme l'endpoint)
    pub fn generate_line(&self, symbol: &str, schema: QuoteSchema) -> String {
        let mut rng = rand::rng();
        let symbol = symbol.to_uppercase();
        let previous_close = Self::base_price(&symbol);

        let mut jitter = |scale: f64| {
            let step = self.max_rel_step * scale;
            previous_close * (1.0 + rng.random_range(-step..=step))
        };

        let last = jitter(1.0);
        let open = jitter(0.5);
        let high = last.max(open) * 1.01;
        let low = last.min(open) * 0.99;
        let ask = last + 0.02;
        let bid = last - 0.02;
        let change = last - previous_close;
        let percent = change / previous_close * 100.0;

        let ask_size: u32 = rng.random_range(1..=20) * 100;
        let bid_size: u32 = rng.random_range(1..=20) * 100;
        let name = format!("{} Demo Corp", symbol);

        match schema {
            QuoteSchema::Detail => format!(
                "\"{}\",\"{}\",{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},\"4:00pm\",{:+.2},\"{:+.2}%\",{},{}\n",
                symbol,
                name,
                bid,
                ask,
                previous_close,
                open,
                high,
                low,
                previous_close * 1.3,
                previous_close * 0.7,
                last,
                change,
                percent,
                ask_size,
                bid_size
            ),
            QuoteSchema::List => format!(
                "\"{}\",\"{}\",{:.2},{:+.2},\"{:+.2}%\",{:.2},{:.2},{},{}\n",
                symbol, name, last, change, percent, ask, bid, ask_size, bid_size
            ),
        }
    }
}

impl Default for RandomQuoteSource {
    fn default() -> Self {
        Self::new(0.05)
    }
}

#[async_trait]
impl QuoteSource for RandomQuoteSource {
    async fn fetch_raw(&self, symbol: &str, schema: QuoteSchema) -> Result<String> {
        Ok(self.generate_line(symbol, schema))
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_quote_line;

    #[test]
    fn test_generated_lines_parse() {
        let source = RandomQuoteSource::default();

        for _ in 0..20 {
            let detail = parse_quote_line(&source.generate_line("msft", QuoteSchema::Detail), QuoteSchema::Detail).unwrap();
            assert_eq!(detail.symbol, "MSFT");
            assert!(!detail.has_unknown_company());

            let list = parse_quote_line(&source.generate_line("msft", QuoteSchema::List), QuoteSchema::List).unwrap();
            assert!(list.last_traded_price.parse::<f64>().is_ok());
        }
    }

    #[tokio::test]
    async fn test_fetch_raw() {
        let source = RandomQuoteSource::default();
        let raw = source.fetch_raw("AMD", QuoteSchema::List).await.unwrap();
        assert!(raw.starts_with("\"AMD\""));
    }
}
