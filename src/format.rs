// ============================================================================
// Formatage : champs bruts -> chaînes d'affichage
// ============================================================================
// Fonctions pures : elles ne modifient jamais le record.
//
// Règles principales :
// - un nombre s'affiche avec exactement deux décimales
// - "N/A" (ou tout texte non numérique) passe tel quel
// - variation >= 0 affichée avec "+", mais la couleur verte exige > 0
// ============================================================================

/// Sentinelle renvoyée par l'endpoint pour une valeur indisponible
pub const NOT_AVAILABLE: &str = "N/A";

/// Au-delà de cette longueur, le nom de la société passe sur deux lignes
pub const COMPANY_NAME_WRAP_LEN: usize = 20;

/// Sens d'une variation, pilote la couleur d'arrière-plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    /// Strictement positive : vert #5B9F34
    Positive,

    /// Négative OU nulle : rouge #AE2923
    Negative,
}

impl ChangeDirection {
    /// Couleur en notation hexadécimale
    pub fn hex(&self) -> &'static str {
        match self {
            ChangeDirection::Positive => "#5B9F34",
            ChangeDirection::Negative => "#AE2923",
        }
    }

    /// Couleur en composantes RGB
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            ChangeDirection::Positive => (0x5B, 0x9F, 0x34),
            ChangeDirection::Negative => (0xAE, 0x29, 0x23),
        }
    }
}

/// Parse un champ numérique, None pour "N/A" ou tout texte invalide
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok()
}

/// Prix avec deux décimales, ou texte brut si non numérique
pub fn format_price(raw: &str) -> String {
    match parse_number(raw) {
        Some(value) => format!("{:.2}", value),
        None => raw.to_string(),
    }
}

/// Variation en points avec signe explicite
///
/// Zéro est traité comme positif ("+0.00"). Retourne None si le champ
/// n'est pas numérique : l'appelant laisse alors l'affichage inchangé.
pub fn format_signed_change(raw: &str) -> Option<String> {
    let value = parse_number(raw)?;

    // abs() évite "+-0.00" pour un zéro négatif
    if value >= 0.0 {
        Some(format!("+{:.2}", value.abs()))
    } else {
        Some(format!("{:.2}", value))
    }
}

/// Pourcentage normalisé : "-0.25%" / "+0.25%"
pub fn format_percent(raw: &str) -> Option<String> {
    let stripped = raw.replace('%', "");

    let (negative, magnitude) = if stripped.starts_with('-') {
        (true, stripped.replace('-', ""))
    } else {
        (false, stripped.trim_start_matches('+').to_string())
    };

    let value = parse_number(&magnitude)?;
    let sign = if negative { '-' } else { '+' };

    Some(format!("{}{:.2}%", sign, value.abs()))
}

/// Couleur d'une variation : vert seulement si strictement positive
pub fn classify_change(value: f64) -> ChangeDirection {
    if value > 0.0 {
        ChangeDirection::Positive
    } else {
        ChangeDirection::Negative
    }
}

/// Ligne "Ask: 114.77 x 300"
pub fn format_quoted_field(label: &str, raw: &str, suffix: &str) -> String {
    format!("{}: {} x {}", label, format_price(raw), suffix)
}

/// Ligne "Open: 116.36"
pub fn format_labeled_price(label: &str, raw: &str) -> String {
    format!("{}: {}", label, format_price(raw))
}

/// Badge de la watchlist : points signés puis pourcentage
///
/// None si l'un des deux champs n'est pas numérique.
pub fn format_change_badge(points: &str, percent: &str) -> Option<String> {
    let points = format_signed_change(points)?;
    let percent = format_percent(percent)?;
    Some(format!("{}\n{}", points, percent))
}

/// Coupe un nom de société trop long sur deux lignes
///
/// Le dernier mot passe à la ligne. Un nom d'un seul mot reste inchangé.
///
/// # Exemple
/// "Alphabet Inc Holdings Company" -> "Alphabet Inc Holdings\nCompany"
pub fn wrap_company_name(name: &str) -> String {
    if name.chars().count() <= COMPANY_NAME_WRAP_LEN {
        return name.to_string();
    }

    let tokens: Vec<&str> = name.split(' ').collect();
    match tokens.split_last() {
        Some((last, head)) if !head.is_empty() => format!("{}\n{}", head.join(" "), last),
        _ => name.to_string(),
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price("114.75"), "114.75");
        assert_eq!(format_price("92"), "92.00");
        assert_eq!(format_price("N/A"), "N/A");
    }

    #[test]
    fn test_format_signed_change() {
        assert_eq!(format_signed_change("-0.29").as_deref(), Some("-0.29"));
        assert_eq!(format_signed_change("0.29").as_deref(), Some("+0.29"));
        assert_eq!(format_signed_change("0.0").as_deref(), Some("+0.00"));
        assert_eq!(format_signed_change("-0.0").as_deref(), Some("+0.00"));
        assert_eq!(format_signed_change("+1.5").as_deref(), Some("+1.50"));
        assert!(format_signed_change("N/A").is_none());
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent("-0.25%").as_deref(), Some("-0.25%"));
        assert_eq!(format_percent("0.25%").as_deref(), Some("+0.25%"));
        assert_eq!(format_percent("+12.344%").as_deref(), Some("+12.34%"));
        assert_eq!(format_percent("abc"), None);
        assert_eq!(format_percent("N/A"), None);
        assert_eq!(format_percent(""), None);
    }

    #[test]
    fn test_classify_change() {
        assert_eq!(classify_change(0.0), ChangeDirection::Negative);
        assert_eq!(classify_change(0.01), ChangeDirection::Positive);
        assert_eq!(classify_change(-0.01), ChangeDirection::Negative);
        assert_eq!(ChangeDirection::Positive.hex(), "#5B9F34");
        assert_eq!(ChangeDirection::Negative.rgb(), (174, 41, 35));
    }

    #[test]
    fn test_zero_change_is_plus_but_red() {
        // "+0.00" affiché en rouge : le signe utilise >=, la couleur >
        assert_eq!(format_signed_change("0").as_deref(), Some("+0.00"));
        assert_eq!(classify_change(0.0), ChangeDirection::Negative);
    }

    #[test]
    fn test_format_quoted_field() {
        assert_eq!(format_quoted_field("Ask", "114.77", "300"), "Ask: 114.77 x 300");
        assert_eq!(format_quoted_field("Bid", "N/A", "N/A"), "Bid: N/A x N/A");
        assert_eq!(format_labeled_price("Open", "116.3"), "Open: 116.30");
    }

    #[test]
    fn test_format_change_badge() {
        assert_eq!(
            format_change_badge("-0.29", "-0.25%").as_deref(),
            Some("-0.29\n-0.25%")
        );
        assert!(format_change_badge("1.0", "N/A").is_none());
    }

    #[test]
    fn test_wrap_company_name() {
        assert_eq!(
            wrap_company_name("Alphabet Inc Holdings Company"),
            "Alphabet Inc Holdings\nCompany"
        );
        assert_eq!(wrap_company_name("Apple Inc."), "Apple Inc.");
        assert_eq!(
            wrap_company_name("Advanced Micro-Devices"),
            "Advanced\nMicro-Devices"
        );
        // Un seul mot : pas de coupure possible
        assert_eq!(
            wrap_company_name("Supercalifragilisticexpialidocious"),
            "Supercalifragilisticexpialidocious"
        );
    }
}
