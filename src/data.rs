use std::sync::OnceLock;

use regex::Regex;

/// First numeric substring of a free-text cell: digits with at most one
/// decimal separator, written as `.` or `,`.
fn numeric_fragment() -> &'static Regex {
    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    NUMERIC.get_or_init(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid numeric pattern"))
}

/// Extracts a numeric score from a free-text rating cell.
///
/// `"9.2"`, `"9,2"`, and `"9.2/10"` all clean to `9.2`; anything without a
/// numeric fragment cleans to `None`. Total over arbitrary input and
/// idempotent: cleaning the display form of a cleaned value returns the
/// same value.
pub fn clean_rating(raw: &str) -> Option<f64> {
    let fragment = numeric_fragment().find(raw.trim())?;
    let normalized = fragment.as_str().replace(',', ".");
    normalized.parse().ok()
}

/// Parses a 1-based rank cell, tolerating the `#N` form the source data
/// stores ranks in. Unparseable input is a missing value, not an error.
pub fn parse_rank(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
    parse_lenient_int(stripped)
}

/// Lenient integer coercion for year and episode-count cells.
///
/// Accepts plain integers and float renderings with a zero fraction
/// (`"16"` and `"16.0"` both coerce to 16). Everything else, including
/// the empty string, is a missing value.
pub fn parse_lenient_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    let as_float: f64 = trimmed.parse().ok()?;
    if as_float.fract() == 0.0 && as_float.abs() < i64::MAX as f64 {
        Some(as_float as i64)
    } else {
        None
    }
}

/// Renders a float the way the normalized table displays it: integral
/// values without a trailing `.0` so re-normalizing the output parses
/// back to the same value.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
