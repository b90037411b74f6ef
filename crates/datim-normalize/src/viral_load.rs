//! Viral load result parsing.

use std::sync::LazyLock;

use datim_model::ViralLoad;
use regex::Regex;

/// Phrases that mean "target not detected" anywhere in the value. Matched
/// against the lowercased value with all spaces removed, so "Not Detected" and
/// "notdetected" agree.
static UNDETECTED_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"undetected|notdetected|notdet|not/d").expect("Invalid undetected phrase regex")
});

/// Abbreviations that only count when they are the whole value; "nd" also
/// occurs inside "pending" and "second".
static UNDETECTED_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:nd|tnd|tnf|t\.n\.d\.?)$").expect("Invalid undetected token regex")
});

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[<>=]?(-?[0-9,]+(?:[.,][0-9]+)?)")
        .expect("Invalid leading number regex")
});

/// Parses a viral load cell.
///
/// Undetected phrases anywhere in the value, or an undetected abbreviation as
/// the whole value, map to `0`. Otherwise a leading number (optionally after
/// `<`, `>` or `=`, with comma thousands separators) is read and any trailing
/// text ignored. Everything else, blanks included, is [`ViralLoad::Null`].
///
/// # Examples
///
/// ```
/// use datim_model::ViralLoad;
/// use datim_normalize::parse_viral_load;
///
/// assert_eq!(parse_viral_load(Some("Not Detected")), ViralLoad::Value(0.0));
/// assert_eq!(parse_viral_load(Some("<40")), ViralLoad::Value(40.0));
/// assert_eq!(parse_viral_load(Some("1,250")), ViralLoad::Value(1250.0));
/// assert_eq!(parse_viral_load(Some("abnormal")), ViralLoad::Null);
/// assert_eq!(parse_viral_load(Some("Pending")), ViralLoad::Null);
/// ```
pub fn parse_viral_load(raw: Option<&str>) -> ViralLoad {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return ViralLoad::Null;
    };

    let compact: String = value
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if UNDETECTED_PHRASE.is_match(&compact) || UNDETECTED_TOKEN.is_match(&compact) {
        return ViralLoad::Value(0.0);
    }

    LEADING_NUMBER
        .captures(&compact)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map_or(ViralLoad::Null, ViralLoad::Value)
}
