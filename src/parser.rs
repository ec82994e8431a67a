// ============================================================================
// Parser : ligne CSV brute -> QuoteRecord
// ============================================================================
// L'endpoint renvoie une seule ligne du genre :
//
//   "GOOG","Alphabet, Inc.",114.75,114.77,...,"4:00pm",-0.29,"-0.25%",300,200
//
// Algorithme :
// 1. retire les retours à la ligne de fin
// 2. supprime tous les guillemets
// 3. remplace chaque ", " par une sentinelle pour protéger la virgule du nom
// 4. découpe sur ','
// 5. restaure ", " UNIQUEMENT dans le champ 1 (nom de la société)
// 6. vérifie le nombre de champs
//
// Limitation connue : un autre champ contenant ", " garde la sentinelle.
// ============================================================================

use tracing::debug;

use crate::error::{QuoteError, QuoteResult};
use crate::models::{QuoteRecord, QuoteSchema};

/// Marqueur temporaire qui remplace ", " pendant le découpage
pub const COMMA_SENTINEL: &str = "<<";

/// Index du champ "nom de la société" (le seul restauré)
const COMPANY_NAME_INDEX: usize = 1;

/// Découpe une ligne brute en champs (étapes 1 à 5)
///
/// Aucun contrôle de taille ici, voir `parse_fields`.
pub fn split_fields(raw: &str) -> Vec<String> {
    let normalized = raw
        .trim_end_matches(['\r', '\n'])
        .replace('"', "")
        .replace(", ", COMMA_SENTINEL);

    let mut fields: Vec<String> = normalized.split(',').map(str::to_string).collect();

    if let Some(name) = fields.get_mut(COMPANY_NAME_INDEX) {
        *name = name.replace(COMMA_SENTINEL, ", ");
    }

    fields
}

/// Découpe une ligne et vérifie qu'elle a exactement `expected` champs
///
/// # Exemple
/// let fields = parse_fields("\"AAPL\",\"Apple Inc.\"\n", 2)?;
/// assert_eq!(fields, vec!["AAPL", "Apple Inc."]);
pub fn parse_fields(raw: &str, expected: usize) -> QuoteResult<Vec<String>> {
    let fields = split_fields(raw);

    if fields.len() != expected {
        debug!(expected, actual = fields.len(), "Field count mismatch");
        return Err(QuoteError::MalformedRecord {
            expected,
            actual: fields.len(),
        });
    }

    Ok(fields)
}

/// Parse une ligne brute selon un schéma (Detail ou List)
pub fn parse_quote_line(raw: &str, schema: QuoteSchema) -> QuoteResult<QuoteRecord> {
    let expected = schema.field_count();
    let fields = parse_fields(raw, expected)?;
    let actual = fields.len();

    QuoteRecord::from_fields(schema, fields)
        .ok_or(QuoteError::MalformedRecord { expected, actual })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_LINE: &str = "\"AAPL\",\"Apple Inc.\",114.75,114.77,115.00,116.36,116.69,114.02,134.54,92.00,114.71,\"4:00pm\",-0.29,\"-0.25%\",300,200\n";

    #[test]
    fn test_parse_detail_line() {
        let record = parse_quote_line(DETAIL_LINE, QuoteSchema::Detail).unwrap();

        assert_eq!(record.symbol, "AAPL");
        assert_eq!(record.company_name, "Apple Inc.");
        assert_eq!(record.bid_price, "114.75");
        assert_eq!(record.ask_price, "114.77");
        assert_eq!(record.last_traded_price, "114.71");
        assert_eq!(record.points_change, "-0.29");
        assert_eq!(record.percent_change, "-0.25%");
        assert_eq!(record.ask_size, "300");
        assert_eq!(record.bid_size, "200");

        let session = record.session.unwrap();
        assert_eq!(session.previous_close, "115.00");
        assert_eq!(session.open_price, "116.36");
        assert_eq!(session.day_high, "116.69");
        assert_eq!(session.day_low, "114.02");
        assert_eq!(session.week52_high, "134.54");
        assert_eq!(session.week52_low, "92.00");
        assert_eq!(session.last_trade_time, "4:00pm");
    }

    #[test]
    fn test_company_name_with_comma() {
        let raw = "\"GOOG\",\"Alphabet, Inc.\",720.50,\"+1.20\",\"+0.17%\",721.00,720.00,100,N/A\r\n";
        let record = parse_quote_line(raw, QuoteSchema::List).unwrap();

        assert_eq!(record.company_name, "Alphabet, Inc.");
        assert_eq!(record.last_traded_price, "720.50");
        assert_eq!(record.bid_size, "N/A");
    }

    #[test]
    fn test_fields_keep_original_order() {
        let fields = parse_fields("a,b,c,d", 4).unwrap();
        assert_eq!(fields, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_field_count_mismatch_is_malformed() {
        let err = parse_quote_line("\"AAPL\",\"Apple Inc.\",114.71", QuoteSchema::List).unwrap_err();
        assert_eq!(err, QuoteError::MalformedRecord { expected: 9, actual: 3 });

        // Une ligne Detail n'est pas un record List valide
        assert!(parse_quote_line(DETAIL_LINE, QuoteSchema::List).is_err());
    }

    #[test]
    fn test_sentinel_only_restored_in_company_field() {
        // ", " dans un autre champ que le nom : la sentinelle reste
        let fields = parse_fields("\"X\",\"Big, Corp\",\"4:00pm, EST\"", 3).unwrap();
        assert_eq!(fields[1], "Big, Corp");
        assert_eq!(fields[2], "4:00pm<<EST");
    }

    #[test]
    fn test_reparse_normalized_line_is_idempotent() {
        let raw = "\"GOOG\",\"Alphabet, Inc.\",720.50,1.20,\"+0.17%\",721.00,720.00,100,200";
        let first = parse_quote_line(raw, QuoteSchema::List).unwrap();
        let second = parse_quote_line(&first.to_line(), QuoteSchema::List).unwrap();
        assert_eq!(first, second);

        let detail = parse_quote_line(DETAIL_LINE, QuoteSchema::Detail).unwrap();
        let again = parse_quote_line(&detail.to_line(), QuoteSchema::Detail).unwrap();
        assert_eq!(detail, again);
    }

    #[test]
    fn test_empty_input() {
        let err = parse_fields("", 9).unwrap_err();
        assert_eq!(err, QuoteError::MalformedRecord { expected: 9, actual: 1 });
    }
}
