// ============================================================================
// Structure : QuoteRecord
// ============================================================================
// Décomposition structurée d'une ligne de cotation CSV
//
// L'endpoint renvoie une ligne à positions fixes. Deux jeux de champs sont
// demandés selon l'écran :
// - Detail (16 champs) : vue d'un seul ticker, toutes les infos de séance
// - List (9 champs)    : une ligne de la watchlist
//
// Un QuoteRecord est créé par un parse réussi et remplace en bloc le
// précédent : il n'est jamais modifié partiellement.
//
// CONCEPTS RUST :
// 1. Enum avec méthodes : QuoteSchema porte sa taille et son sélecteur
// 2. Option<T> : les champs de séance n'existent qu'avec le schéma Detail
// ============================================================================

/// Jeu de champs demandé à l'endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteSchema {
    /// Vue détaillée : 16 champs
    Detail,

    /// Ligne de la watchlist : 9 champs
    List,
}

impl QuoteSchema {
    /// Nombre exact de champs attendus dans la ligne brute
    pub fn field_count(&self) -> usize {
        match self {
            QuoteSchema::Detail => 16,
            QuoteSchema::List => 9,
        }
    }

    /// Suffixe de l'URL qui sélectionne les champs
    ///
    /// Codes du format CSV :
    /// s=symbol n=name b=bid a=ask p=previous close o=open h=high g=low
    /// k=52w high j=52w low l1=last trade t1=trade time c1=change
    /// p2=change % a5=ask size b6=bid size
    pub fn selector_suffix(&self) -> &'static str {
        match self {
            QuoteSchema::Detail => "&f=snbapohgkjl1t1c1p2a5b6&e=.csv",
            QuoteSchema::List => "&f=snl1c1p2aba5b6&e=.csv",
        }
    }

    /// Label pour les logs
    pub fn label(&self) -> &'static str {
        match self {
            QuoteSchema::Detail => "detail",
            QuoteSchema::List => "list",
        }
    }
}

/// Champs présents uniquement avec le schéma Detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetail {
    pub previous_close: String,
    pub open_price: String,
    pub day_high: String,
    pub day_low: String,
    pub week52_high: String,
    pub week52_low: String,

    /// Heure du dernier échange (ex: "4:00pm")
    pub last_trade_time: String,
}

/// Une cotation parsée
///
/// Les valeurs restent des String : un champ numérique peut contenir la
/// sentinelle "N/A", la conversion se fait au moment du formatage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRecord {
    /// Schéma d'origine (détermine l'ordre des champs)
    pub schema: QuoteSchema,

    /// Symbole en majuscules (ex: "AAPL")
    pub symbol: String,

    /// Nom de la société, peut contenir une virgule ("Alphabet, Inc.")
    pub company_name: String,

    pub bid_price: String,
    pub ask_price: String,
    pub last_traded_price: String,

    /// Variation en points (signée)
    pub points_change: String,

    /// Variation en pourcentage, signée et suffixée par "%"
    pub percent_change: String,

    pub ask_size: String,
    pub bid_size: String,

    /// Some(..) seulement pour QuoteSchema::Detail
    pub session: Option<SessionDetail>,
}

impl QuoteRecord {
    /// Construit un record à partir des champs découpés
    ///
    /// Retourne None si le nombre de champs ne correspond pas au schéma.
    /// Le parser vérifie déjà la taille : ce garde-fou évite toute
    /// indexation hors limites.
    pub fn from_fields(schema: QuoteSchema, fields: Vec<String>) -> Option<Self> {
        if fields.len() != schema.field_count() {
            return None;
        }

        // CONCEPT RUST : Slice pattern
        // - Destructure le Vec en une seule fois, sans indexation
        match schema {
            QuoteSchema::Detail => {
                let [symbol, company_name, bid_price, ask_price, previous_close, open_price, day_high, day_low, week52_high, week52_low, last_traded_price, last_trade_time, points_change, percent_change, ask_size, bid_size]: [String; 16] =
                    fields.try_into().ok()?;

                Some(Self {
                    schema,
                    symbol,
                    company_name,
                    bid_price,
                    ask_price,
                    last_traded_price,
                    points_change,
                    percent_change,
                    ask_size,
                    bid_size,
                    session: Some(SessionDetail {
                        previous_close,
                        open_price,
                        day_high,
                        day_low,
                        week52_high,
                        week52_low,
                        last_trade_time,
                    }),
                })
            }
            QuoteSchema::List => {
                let [symbol, company_name, last_traded_price, points_change, percent_change, ask_price, bid_price, ask_size, bid_size]: [String; 9] =
                    fields.try_into().ok()?;

                Some(Self {
                    schema,
                    symbol,
                    company_name,
                    bid_price,
                    ask_price,
                    last_traded_price,
                    points_change,
                    percent_change,
                    ask_size,
                    bid_size,
                    session: None,
                })
            }
        }
    }

    /// Retourne les champs dans l'ordre du schéma
    pub fn fields(&self) -> Vec<&str> {
        match (self.schema, &self.session) {
            (QuoteSchema::Detail, Some(s)) => vec![
                self.symbol.as_str(),
                self.company_name.as_str(),
                self.bid_price.as_str(),
                self.ask_price.as_str(),
                s.previous_close.as_str(),
                s.open_price.as_str(),
                s.day_high.as_str(),
                s.day_low.as_str(),
                s.week52_high.as_str(),
                s.week52_low.as_str(),
                self.last_traded_price.as_str(),
                s.last_trade_time.as_str(),
                self.points_change.as_str(),
                self.percent_change.as_str(),
                self.ask_size.as_str(),
                self.bid_size.as_str(),
            ],
            _ => vec![
                self.symbol.as_str(),
                self.company_name.as_str(),
                self.last_traded_price.as_str(),
                self.points_change.as_str(),
                self.percent_change.as_str(),
                self.ask_price.as_str(),
                self.bid_price.as_str(),
                self.ask_size.as_str(),
                self.bid_size.as_str(),
            ],
        }
    }

    /// Reconstruit la ligne brute normalisée (sans guillemets)
    pub fn to_line(&self) -> String {
        self.fields().join(",")
    }

    /// Vrai si le nom contient la sentinelle "N/A"
    ///
    /// L'endpoint renvoie "N/A" comme nom pour un symbole inconnu : c'est
    /// le critère de validité utilisé à l'ajout d'un ticker.
    pub fn has_unknown_company(&self) -> bool {
        self.company_name.contains(crate::format::NOT_AVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_fields() -> Vec<String> {
        ["AAPL", "Apple Inc.", "114.71", "-0.29", "-0.25%", "114.77", "114.75", "300", "200"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_schema_sizes() {
        assert_eq!(QuoteSchema::Detail.field_count(), 16);
        assert_eq!(QuoteSchema::List.field_count(), 9);
        assert!(QuoteSchema::List.selector_suffix().starts_with("&f="));
    }

    #[test]
    fn test_list_record_mapping() {
        let record = QuoteRecord::from_fields(QuoteSchema::List, list_fields()).unwrap();

        assert_eq!(record.symbol, "AAPL");
        assert_eq!(record.last_traded_price, "114.71");
        assert_eq!(record.ask_price, "114.77");
        assert_eq!(record.bid_price, "114.75");
        assert_eq!(record.bid_size, "200");
        assert!(record.session.is_none());
        assert_eq!(record.to_line(), list_fields().join(","));
    }

    #[test]
    fn test_wrong_field_count() {
        let mut fields = list_fields();
        fields.pop();
        assert!(QuoteRecord::from_fields(QuoteSchema::List, fields.clone()).is_none());
        assert!(QuoteRecord::from_fields(QuoteSchema::Detail, fields).is_none());
    }

    #[test]
    fn test_unknown_company() {
        let mut fields = list_fields();
        fields[1] = "N/A".to_string();
        let record = QuoteRecord::from_fields(QuoteSchema::List, fields).unwrap();
        assert!(record.has_unknown_company());
    }
}
