//! CD4 count parsing.

use std::sync::LazyLock;

use datim_model::Cd4Count;
use regex::Regex;

/// Text that marks the cell as holding something other than a CD4 count,
/// typically a viral load or a TB result pasted into the wrong column.
static DISQUALIFYING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)copies/ml|cells|positive|p0sitive|suggestive|failed|n/a")
        .expect("Invalid disqualifying regex")
});

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("Invalid number regex")
});

/// Parses a CD4 cell.
///
/// Blanks are [`Cd4Count::Missing`]. Disqualifying text, the literal `NULL`,
/// and values without digits are [`Cd4Count::Null`]. The letter `O` is read as
/// a zero before the first number is extracted.
///
/// # Examples
///
/// ```
/// use datim_model::Cd4Count;
/// use datim_normalize::parse_cd4;
///
/// assert_eq!(parse_cd4(Some("350")), Cd4Count::Value(350.0));
/// assert_eq!(parse_cd4(Some("2O0")), Cd4Count::Value(200.0));
/// assert_eq!(parse_cd4(Some("400 copies/ml")), Cd4Count::Null);
/// assert_eq!(parse_cd4(Some("")), Cd4Count::Missing);
/// ```
pub fn parse_cd4(raw: Option<&str>) -> Cd4Count {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Cd4Count::Missing;
    };

    if DISQUALIFYING.is_match(value) {
        return Cd4Count::Null;
    }

    let corrected = value.replace(['O', 'o'], "0");
    FIRST_NUMBER
        .find(&corrected)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map_or(Cd4Count::Null, Cd4Count::Value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datim_model::Cd4Class;

    #[test]
    fn disqualifying_text() {
        for raw in ["300 cells/ul", "POSITIVE", "P0sitive", "Suggestive", "Test failed", "N/A"] {
            assert_eq!(parse_cd4(Some(raw)), Cd4Count::Null, "{raw}");
        }
    }

    #[test]
    fn first_number_wins() {
        assert_eq!(parse_cd4(Some("512.5 (12/03)")), Cd4Count::Value(512.5));
        assert_eq!(parse_cd4(Some(">1600")), Cd4Count::Value(1600.0));
    }

    #[test]
    fn null_literal() {
        assert_eq!(parse_cd4(Some("NULL")), Cd4Count::Null);
        assert_eq!(parse_cd4(Some("pending")), Cd4Count::Null);
    }

    #[test]
    fn classification_follows_parse() {
        assert_eq!(parse_cd4(Some("1700")).classify(), Cd4Class::Excess);
        assert_eq!(parse_cd4(Some("  ")).classify(), Cd4Class::Unknown);
    }
}
