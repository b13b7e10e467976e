use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    normalize::NormalizeOptions,
    rank::{GroupBy, SortKey},
    schema::{CanonicalField, HeaderMode, MatchMode},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Normalize and rank television-series CSV datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize a raw export into the canonical column set
    Normalize(NormalizeArgs),
    /// Preview the first few raw rows in a formatted table
    Preview(PreviewArgs),
    /// Count how often each genre appears across the catalog
    Genres(GenresArgs),
    /// Select the top records by rating or rank, optionally per group
    Top(TopArgs),
    /// Pick the single strongest record in every genre
    Pick(PickArgs),
}

/// Source options shared by every command that normalizes its input.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Header-cleaning regime applied before column matching
    #[arg(long = "header-mode", default_value = "strict")]
    pub header_mode: HeaderModeArg,
    /// Column-matching strategy binding raw headers to canonical fields
    #[arg(long = "match-mode", default_value = "alias")]
    pub match_mode: MatchModeArg,
    /// Canonical field that must resolve for the run to proceed (repeatable)
    #[arg(long = "require", value_parser = parse_canonical_field, action = clap::ArgAction::Append)]
    pub require: Vec<CanonicalField>,
}

impl SourceArgs {
    pub fn options(&self) -> NormalizeOptions {
        NormalizeOptions {
            header_mode: self.header_mode.into(),
            match_mode: self.match_mode.into(),
            required: self.require.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Emit the normalized records as JSON instead of CSV
    #[arg(long)]
    pub json: bool,
    /// Render the normalized table to stdout instead of writing CSV
    #[arg(long)]
    pub table: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct GenresArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Show only the most frequent genres (0 shows all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
}

#[derive(Debug, Args)]
pub struct TopArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Ranking key
    #[arg(long = "by", default_value = "rating")]
    pub by: SortKeyArg,
    /// Restrict candidates to groups before ranking
    #[arg(long = "group")]
    pub group: Option<GroupByArg>,
    /// Number of records to keep (per group when --group is set)
    #[arg(short = 'n', long = "limit", default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct PickArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Ranking key
    #[arg(long = "by", default_value = "rating")]
    pub by: SortKeyArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HeaderModeArg {
    /// Drop characters outside letters, digits, spaces, and underscores
    Strict,
    /// Collapse separator runs into single underscores
    Collapse,
}

impl From<HeaderModeArg> for HeaderMode {
    fn from(arg: HeaderModeArg) -> Self {
        match arg {
            HeaderModeArg::Strict => HeaderMode::Strict,
            HeaderModeArg::Collapse => HeaderMode::Collapse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatchModeArg {
    /// Declared table of known production header names
    Alias,
    /// First column whose cleaned name contains a field keyword
    Keyword,
}

impl From<MatchModeArg> for MatchMode {
    fn from(arg: MatchModeArg) -> Self {
        match arg {
            MatchModeArg::Alias => MatchMode::Alias,
            MatchModeArg::Keyword => MatchMode::Keyword,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKeyArg {
    /// Numeric score, highest first
    Rating,
    /// Chart position, lowest number first
    Rank,
}

impl From<SortKeyArg> for SortKey {
    fn from(arg: SortKeyArg) -> Self {
        match arg {
            SortKeyArg::Rating => SortKey::RatingDesc,
            SortKeyArg::Rank => SortKey::RankAsc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupByArg {
    Year,
    Genre,
}

impl From<GroupByArg> for GroupBy {
    fn from(arg: GroupByArg) -> Self {
        match arg {
            GroupByArg::Year => GroupBy::Year,
            GroupByArg::Genre => GroupBy::Genre,
        }
    }
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

fn parse_canonical_field(value: &str) -> Result<CanonicalField, String> {
    CanonicalField::from_name(value).ok_or_else(|| {
        let known = CanonicalField::ALL
            .iter()
            .map(|field| field.output_name())
            .collect::<Vec<_>>()
            .join(", ");
        format!("Unknown canonical field '{value}'. Known fields: {known}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_single_characters() {
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("pipe").unwrap(), b'|');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn parse_canonical_field_accepts_output_names() {
        assert_eq!(parse_canonical_field("name").unwrap(), CanonicalField::Name);
        assert_eq!(
            parse_canonical_field("num_episodes").unwrap(),
            CanonicalField::NumEpisodes
        );
        assert!(parse_canonical_field("poster").is_err());
    }
}
