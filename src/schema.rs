//! Canonical schema model and column resolution.
//!
//! This module owns the fixed set of canonical fields a normalized table
//! exposes, the header-cleaning regimes, and the two matching strategies
//! that bind messy raw columns to canonical fields:
//!
//! - **Alias matching**: a declared table of known production header
//!   names, including the truncated/garbled forms observed in real
//!   exports (`"Year of re"`, `"Original N"`, `"Screenwri"`, ...).
//!   Unmapped raw columns are dropped.
//! - **Keyword matching**: the declared fallback; each canonical field
//!   binds to the first not-yet-bound column whose cleaned name contains
//!   one of the field's keywords, in input column order.
//!
//! Both strategies are deterministic: resolution order is fixed, first
//! match wins, and a column never serves two fields.

use heck::ToSnakeCase;

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Name,
    Year,
    Network,
    AiredOn,
    NumEpisodes,
    Duration,
    ContentRating,
    Rating,
    Synopsis,
    Genre,
    Tags,
    Director,
    Screenwriter,
    Cast,
    Production,
    Rank,
}

pub const FIELD_COUNT: usize = 16;

impl CanonicalField {
    pub const ALL: [CanonicalField; FIELD_COUNT] = [
        CanonicalField::Name,
        CanonicalField::Year,
        CanonicalField::Network,
        CanonicalField::AiredOn,
        CanonicalField::NumEpisodes,
        CanonicalField::Duration,
        CanonicalField::ContentRating,
        CanonicalField::Rating,
        CanonicalField::Synopsis,
        CanonicalField::Genre,
        CanonicalField::Tags,
        CanonicalField::Director,
        CanonicalField::Screenwriter,
        CanonicalField::Cast,
        CanonicalField::Production,
        CanonicalField::Rank,
    ];

    fn variant_name(self) -> &'static str {
        match self {
            CanonicalField::Name => "Name",
            CanonicalField::Year => "Year",
            CanonicalField::Network => "Network",
            CanonicalField::AiredOn => "AiredOn",
            CanonicalField::NumEpisodes => "NumEpisodes",
            CanonicalField::Duration => "Duration",
            CanonicalField::ContentRating => "ContentRating",
            CanonicalField::Rating => "Rating",
            CanonicalField::Synopsis => "Synopsis",
            CanonicalField::Genre => "Genre",
            CanonicalField::Tags => "Tags",
            CanonicalField::Director => "Director",
            CanonicalField::Screenwriter => "Screenwriter",
            CanonicalField::Cast => "Cast",
            CanonicalField::Production => "Production",
            CanonicalField::Rank => "Rank",
        }
    }

    /// Header name this field carries in normalized output.
    pub fn output_name(self) -> String {
        self.variant_name().to_snake_case()
    }

    /// Looks a field up by name, tolerant of case and separator style
    /// (`"num_episodes"`, `"Num Episodes"`, and `"NumEpisodes"` all
    /// resolve to the same field).
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match_key(name);
        Self::ALL
            .into_iter()
            .find(|field| match_key(&field.output_name()) == key || field.variant_name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output_name())
    }
}

/// Header-cleaning regime applied before any matching. Two regimes exist
/// in the wild for this dataset family; both are explicit configuration
/// rather than incidental behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Trim, drop every character outside `[A-Za-z0-9 _]`, collapse
    /// interior whitespace runs to a single space. Default, because the
    /// alias table is keyed on names cleaned this way.
    #[default]
    Strict,
    /// Trim, replace every run of non-alphanumeric characters with a
    /// single `_`, trim leading/trailing underscores.
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Alias,
    Keyword,
}

pub fn clean_header(raw: &str, mode: HeaderMode) -> String {
    match mode {
        HeaderMode::Strict => {
            let kept: String = raw
                .trim()
                .chars()
                .filter(|ch| ch.is_ascii_alphanumeric() || *ch == ' ' || *ch == '_')
                .collect();
            kept.split_whitespace().collect::<Vec<_>>().join(" ")
        }
        HeaderMode::Collapse => {
            let mut cleaned = String::with_capacity(raw.len());
            for ch in raw.trim().chars() {
                if ch.is_ascii_alphanumeric() {
                    cleaned.push(ch);
                } else if !cleaned.ends_with('_') {
                    cleaned.push('_');
                }
            }
            cleaned.trim_matches('_').to_string()
        }
    }
}

/// Folds a cleaned header into the space alias keys live in, so both
/// cleaning regimes resolve against one table: lowercase, underscores as
/// spaces, single interior spaces.
fn match_key(cleaned: &str) -> String {
    cleaned
        .to_ascii_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Known production header names, including truncated exports, keyed in
/// match-key space. Canonical output names appear here too so a
/// normalized table resolves back onto itself.
const ALIASES: &[(&str, CanonicalField)] = &[
    ("name", CanonicalField::Name),
    ("title", CanonicalField::Name),
    ("aired date", CanonicalField::AiredOn),
    ("aired on", CanonicalField::AiredOn),
    ("year", CanonicalField::Year),
    ("year of re", CanonicalField::Year),
    ("year of release", CanonicalField::Year),
    ("network", CanonicalField::Network),
    ("original n", CanonicalField::Network),
    ("original network", CanonicalField::Network),
    ("number c", CanonicalField::NumEpisodes),
    ("number of episodes", CanonicalField::NumEpisodes),
    ("num episodes", CanonicalField::NumEpisodes),
    ("episodes", CanonicalField::NumEpisodes),
    ("duration", CanonicalField::Duration),
    ("content r", CanonicalField::ContentRating),
    ("content rating", CanonicalField::ContentRating),
    ("rating", CanonicalField::Rating),
    ("synopsis", CanonicalField::Synopsis),
    ("genre", CanonicalField::Genre),
    ("tags", CanonicalField::Tags),
    ("director", CanonicalField::Director),
    ("screenwri", CanonicalField::Screenwriter),
    ("screenwriter", CanonicalField::Screenwriter),
    ("cast", CanonicalField::Cast),
    ("production", CanonicalField::Production),
    ("production companies", CanonicalField::Production),
    ("rank", CanonicalField::Rank),
];

/// Keyword fallback, in resolution order. `ContentRating` resolves before
/// `Rating` so a "Content Rating" column cannot shadow the numeric score.
const KEYWORDS: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::Name, &["name", "title"]),
    (CanonicalField::Year, &["year"]),
    (CanonicalField::Network, &["network"]),
    (CanonicalField::AiredOn, &["aired"]),
    (CanonicalField::NumEpisodes, &["episode", "number"]),
    (CanonicalField::Duration, &["duration"]),
    (CanonicalField::ContentRating, &["content"]),
    (CanonicalField::Rating, &["rating", "score"]),
    (CanonicalField::Synopsis, &["synopsis"]),
    (CanonicalField::Genre, &["genre"]),
    (CanonicalField::Tags, &["tag"]),
    (CanonicalField::Director, &["director"]),
    (CanonicalField::Screenwriter, &["screenwri", "writer"]),
    (CanonicalField::Cast, &["cast"]),
    (CanonicalField::Production, &["production"]),
    (CanonicalField::Rank, &["rank"]),
];

/// Binding of canonical fields to source column positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    bindings: [Option<usize>; FIELD_COUNT],
}

impl ColumnMap {
    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        self.bindings[field.index()]
    }

    pub fn is_bound(&self, field: CanonicalField) -> bool {
        self.get(field).is_some()
    }

    pub fn bound_fields(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| self.is_bound(*field))
    }

    fn bind(&mut self, field: CanonicalField, column: usize) {
        let slot = &mut self.bindings[field.index()];
        if slot.is_none() {
            *slot = Some(column);
        }
    }

    fn column_taken(&self, column: usize) -> bool {
        self.bindings.iter().any(|slot| *slot == Some(column))
    }

    /// Fails with the named condition when any of `required` is unbound.
    /// Callers surface this as a specific "missing required column"
    /// message instead of a generic failure.
    pub fn ensure_required(&self, required: &[CanonicalField]) -> Result<(), PipelineError> {
        for field in required {
            if !self.is_bound(*field) {
                return Err(PipelineError::MissingRequiredColumn(*field));
            }
        }
        Ok(())
    }
}

/// Resolves raw headers to canonical fields. Total: unresolvable fields
/// stay unbound and every downstream consumer treats them as optional.
pub fn resolve_columns(
    headers: &[String],
    header_mode: HeaderMode,
    match_mode: MatchMode,
) -> ColumnMap {
    let keys: Vec<String> = headers
        .iter()
        .map(|raw| match_key(&clean_header(raw, header_mode)))
        .collect();

    let mut map = ColumnMap::default();
    match match_mode {
        MatchMode::Alias => {
            for (column, key) in keys.iter().enumerate() {
                if let Some((_, field)) = ALIASES.iter().find(|(alias, _)| alias == key) {
                    map.bind(*field, column);
                }
            }
        }
        MatchMode::Keyword => {
            for (field, keywords) in KEYWORDS {
                let found = keys.iter().enumerate().find(|(column, key)| {
                    !map.column_taken(*column) && keywords.iter().any(|kw| key.contains(kw))
                });
                if let Some((column, _)) = found {
                    map.bind(*field, column);
                }
            }
        }
    }
    map
}

/// Canonical header row every normalized table exposes, in field order.
pub fn output_headers() -> Vec<String> {
    CanonicalField::ALL
        .iter()
        .map(|field| field.output_name())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn strict_cleaning_drops_punctuation_and_collapses_spaces() {
        assert_eq!(clean_header("  Content R. ", HeaderMode::Strict), "Content R");
        assert_eq!(clean_header("Year  of   re", HeaderMode::Strict), "Year of re");
        assert_eq!(clean_header("num_episodes", HeaderMode::Strict), "num_episodes");
    }

    #[test]
    fn collapse_cleaning_folds_separator_runs_to_underscores() {
        assert_eq!(clean_header(" Aired Date ", HeaderMode::Collapse), "Aired_Date");
        assert_eq!(clean_header("Content-R.", HeaderMode::Collapse), "Content_R");
        assert_eq!(clean_header("%%Rating%%", HeaderMode::Collapse), "Rating");
    }

    #[test]
    fn alias_mode_resolves_truncated_production_headers() {
        let raw = headers(&[
            "Name",
            "Aired Date",
            "Year of re",
            "Original N",
            "Number c",
            "Content R",
            "Rating",
            "Screenwri",
            "Rank",
        ]);
        let map = resolve_columns(&raw, HeaderMode::Strict, MatchMode::Alias);
        assert_eq!(map.get(CanonicalField::Name), Some(0));
        assert_eq!(map.get(CanonicalField::AiredOn), Some(1));
        assert_eq!(map.get(CanonicalField::Year), Some(2));
        assert_eq!(map.get(CanonicalField::Network), Some(3));
        assert_eq!(map.get(CanonicalField::NumEpisodes), Some(4));
        assert_eq!(map.get(CanonicalField::ContentRating), Some(5));
        assert_eq!(map.get(CanonicalField::Rating), Some(6));
        assert_eq!(map.get(CanonicalField::Screenwriter), Some(7));
        assert_eq!(map.get(CanonicalField::Rank), Some(8));
        assert!(!map.is_bound(CanonicalField::Genre));
    }

    #[test]
    fn alias_mode_drops_unknown_columns() {
        let raw = headers(&["Name", "Poster URL", "Genre"]);
        let map = resolve_columns(&raw, HeaderMode::Strict, MatchMode::Alias);
        assert_eq!(map.get(CanonicalField::Name), Some(0));
        assert_eq!(map.get(CanonicalField::Genre), Some(2));
        assert_eq!(map.bound_fields().count(), 2);
    }

    #[test]
    fn alias_mode_resolves_canonical_output_headers() {
        let map = resolve_columns(&output_headers(), HeaderMode::Strict, MatchMode::Alias);
        for field in CanonicalField::ALL {
            assert!(map.is_bound(field), "canonical header for {field} unresolved");
        }
    }

    #[test]
    fn keyword_mode_binds_first_match_in_column_order() {
        let raw = headers(&["Show Title", "Release Year", "Airing Year"]);
        let map = resolve_columns(&raw, HeaderMode::Strict, MatchMode::Keyword);
        assert_eq!(map.get(CanonicalField::Name), Some(0));
        assert_eq!(map.get(CanonicalField::Year), Some(1));
    }

    #[test]
    fn keyword_mode_keeps_content_rating_and_rating_apart() {
        let raw = headers(&["Rating", "Content Rating"]);
        let map = resolve_columns(&raw, HeaderMode::Strict, MatchMode::Keyword);
        assert_eq!(map.get(CanonicalField::ContentRating), Some(1));
        assert_eq!(map.get(CanonicalField::Rating), Some(0));
    }

    #[test]
    fn keyword_mode_leaves_unmatched_fields_unbound() {
        let raw = headers(&["Name", "Network"]);
        let map = resolve_columns(&raw, HeaderMode::Strict, MatchMode::Keyword);
        assert!(!map.is_bound(CanonicalField::Genre));
        assert!(!map.is_bound(CanonicalField::Rating));
    }

    #[test]
    fn ensure_required_reports_the_missing_field() {
        let raw = headers(&["Genre", "Rating"]);
        let map = resolve_columns(&raw, HeaderMode::Strict, MatchMode::Alias);
        let err = map
            .ensure_required(&[CanonicalField::Name])
            .expect_err("name is not resolvable");
        assert_eq!(
            err,
            crate::error::PipelineError::MissingRequiredColumn(CanonicalField::Name)
        );
        assert!(err.to_string().contains("required column 'name'"));
    }
}
