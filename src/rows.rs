//! Raw row to canonical record conversion.
//!
//! [`parse_series()`] turns one positional raw row into a [`Series`]
//! using a resolved [`ColumnMap`]. Cells under unbound fields become
//! missing values; cells that fail numeric coercion also become missing
//! values and are tallied in the [`CoercionReport`] rather than raised.

use serde::Serialize;

use crate::{
    data::{clean_rating, format_number, parse_lenient_int, parse_rank},
    schema::{CanonicalField, ColumnMap},
};

/// One normalized television-series record. Every normalized table
/// exposes exactly this field set; absence is `None`, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub name: Option<String>,
    pub year: Option<i64>,
    pub network: Option<String>,
    pub aired_on: Option<String>,
    pub num_episodes: Option<i64>,
    pub duration: Option<String>,
    pub content_rating: Option<String>,
    pub rating: Option<f64>,
    pub synopsis: Option<String>,
    pub genre: Option<String>,
    pub tags: Option<String>,
    pub director: Option<String>,
    pub screenwriter: Option<String>,
    pub cast: Option<String>,
    pub production: Option<String>,
    pub rank: Option<i64>,
}

impl Series {
    /// Genre tokens in cell order: split on commas, trimmed, empties
    /// dropped. Records without a genre yield nothing.
    pub fn genre_tokens(&self) -> impl Iterator<Item = &str> {
        self.genre
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Display cells in canonical field order, for CSV and table sinks.
    /// Integral floats render without a trailing `.0` so the output
    /// re-normalizes to the same record.
    pub fn to_row(&self) -> Vec<String> {
        let opt_string = |value: &Option<String>| value.clone().unwrap_or_default();
        let opt_int = |value: &Option<i64>| value.map(|v| v.to_string()).unwrap_or_default();
        vec![
            opt_string(&self.name),
            opt_int(&self.year),
            opt_string(&self.network),
            opt_string(&self.aired_on),
            opt_int(&self.num_episodes),
            opt_string(&self.duration),
            opt_string(&self.content_rating),
            self.rating.map(format_number).unwrap_or_default(),
            opt_string(&self.synopsis),
            opt_string(&self.genre),
            opt_string(&self.tags),
            opt_string(&self.director),
            opt_string(&self.screenwriter),
            opt_string(&self.cast),
            opt_string(&self.production),
            opt_int(&self.rank),
        ]
    }

    /// Label shown for this record in ranked output.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// Tally of cells that failed numeric coercion. Non-fatal by design:
/// each one resolved locally to a missing value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoercionReport {
    pub unparseable_years: usize,
    pub unparseable_episode_counts: usize,
    pub unparseable_ratings: usize,
    pub unparseable_ranks: usize,
}

impl CoercionReport {
    pub fn total(&self) -> usize {
        self.unparseable_years
            + self.unparseable_episode_counts
            + self.unparseable_ratings
            + self.unparseable_ranks
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    pub fn merge(&mut self, other: &CoercionReport) {
        self.unparseable_years += other.unparseable_years;
        self.unparseable_episode_counts += other.unparseable_episode_counts;
        self.unparseable_ratings += other.unparseable_ratings;
        self.unparseable_ranks += other.unparseable_ranks;
    }
}

fn coerce_counted(
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<i64>,
    misses: &mut usize,
) -> Option<i64> {
    let raw = raw?;
    let parsed = parse(raw);
    if parsed.is_none() {
        *misses += 1;
    }
    parsed
}

pub fn parse_series(map: &ColumnMap, raw: &[String], report: &mut CoercionReport) -> Series {
    let cell = |field: CanonicalField| -> Option<&str> {
        let idx = map.get(field)?;
        let value = raw.get(idx)?.trim();
        (!value.is_empty()).then_some(value)
    };
    let text = |field: CanonicalField| cell(field).map(str::to_string);

    let year = coerce_counted(
        cell(CanonicalField::Year),
        parse_lenient_int,
        &mut report.unparseable_years,
    );
    let num_episodes = coerce_counted(
        cell(CanonicalField::NumEpisodes),
        parse_lenient_int,
        &mut report.unparseable_episode_counts,
    );
    let rank = coerce_counted(
        cell(CanonicalField::Rank),
        parse_rank,
        &mut report.unparseable_ranks,
    );

    let rating = match cell(CanonicalField::Rating) {
        Some(raw_value) => {
            let cleaned = clean_rating(raw_value);
            if cleaned.is_none() {
                report.unparseable_ratings += 1;
            }
            cleaned
        }
        None => None,
    };

    Series {
        name: text(CanonicalField::Name),
        year,
        network: text(CanonicalField::Network),
        aired_on: text(CanonicalField::AiredOn),
        num_episodes,
        duration: text(CanonicalField::Duration),
        content_rating: text(CanonicalField::ContentRating),
        rating,
        synopsis: text(CanonicalField::Synopsis),
        genre: text(CanonicalField::Genre),
        tags: text(CanonicalField::Tags),
        director: text(CanonicalField::Director),
        screenwriter: text(CanonicalField::Screenwriter),
        cast: text(CanonicalField::Cast),
        production: text(CanonicalField::Production),
        rank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HeaderMode, MatchMode, resolve_columns};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn map_for(headers: &[&str]) -> ColumnMap {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        resolve_columns(&headers, HeaderMode::Strict, MatchMode::Alias)
    }

    #[test]
    fn parses_bound_cells_and_leaves_unbound_fields_missing() {
        let map = map_for(&["Name", "Rating", "Rank"]);
        let mut report = CoercionReport::default();
        let series = parse_series(&map, &row(&["Signal", "9.1", "#2"]), &mut report);
        assert_eq!(series.name.as_deref(), Some("Signal"));
        assert_eq!(series.rating, Some(9.1));
        assert_eq!(series.rank, Some(2));
        assert_eq!(series.genre, None);
        assert!(report.is_clean());
    }

    #[test]
    fn unparseable_cells_become_missing_and_are_counted() {
        let map = map_for(&["Name", "Year of re", "Rating", "Rank"]);
        let mut report = CoercionReport::default();
        let series = parse_series(&map, &row(&["Misaeng", "unknown", "n/a", "#x"]), &mut report);
        assert_eq!(series.year, None);
        assert_eq!(series.rating, None);
        assert_eq!(series.rank, None);
        assert_eq!(report.unparseable_years, 1);
        assert_eq!(report.unparseable_ratings, 1);
        assert_eq!(report.unparseable_ranks, 1);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn empty_cells_are_missing_but_not_counted() {
        let map = map_for(&["Name", "Rating"]);
        let mut report = CoercionReport::default();
        let series = parse_series(&map, &row(&["Stranger", "  "]), &mut report);
        assert_eq!(series.rating, None);
        assert!(report.is_clean());
    }

    #[test]
    fn genre_tokens_split_trim_and_drop_empties() {
        let series = Series {
            genre: Some("Romance,  Comedy , ,Drama".to_string()),
            ..Series::default()
        };
        let tokens: Vec<&str> = series.genre_tokens().collect();
        assert_eq!(tokens, vec!["Romance", "Comedy", "Drama"]);
    }

    #[test]
    fn to_row_renders_missing_as_empty_and_ints_without_fraction() {
        let series = Series {
            name: Some("Signal".to_string()),
            rating: Some(9.0),
            rank: Some(1),
            ..Series::default()
        };
        let cells = series.to_row();
        assert_eq!(cells[0], "Signal");
        assert_eq!(cells[7], "9");
        assert_eq!(cells[15], "1");
        assert_eq!(cells[9], "");
    }
}
