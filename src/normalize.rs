//! The schema-normalization pipeline.
//!
//! [`normalize()`] is the core contract: raw headers and rows in, a
//! [`Frame`] of canonical records out. Each stage is total and
//! side-effect-free on its input; the only hard failure is a required
//! column the active matching strategy cannot resolve. The `execute`
//! entry point is the CLI collaborator around that core: it owns file
//! I/O, sink selection, and logging, none of which the core touches.

use std::{fs::File, io::Write};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::{NormalizeArgs, SourceArgs},
    error::PipelineError,
    io_utils,
    rows::{self, CoercionReport, Series},
    schema::{self, CanonicalField, HeaderMode, MatchMode},
    table,
};

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub header_mode: HeaderMode,
    pub match_mode: MatchMode,
    /// Fields that must resolve for the run to proceed; empty means the
    /// whole canonical set stays optional.
    pub required: Vec<CanonicalField>,
}

/// A normalized table: canonical records plus the coercion tally
/// accumulated while producing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub records: Vec<Series>,
    pub report: CoercionReport,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Display cells for every record, in canonical field order.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        self.records.iter().map(Series::to_row).collect()
    }
}

/// Normalizes a raw in-memory table into canonical form.
///
/// Idempotent once canonical headers are produced: feeding the display
/// form of a frame back through yields an equal frame.
pub fn normalize(
    headers: &[String],
    raw_rows: &[Vec<String>],
    options: &NormalizeOptions,
) -> Result<Frame, PipelineError> {
    let map = schema::resolve_columns(headers, options.header_mode, options.match_mode);
    map.ensure_required(&options.required)?;

    let mut report = CoercionReport::default();
    let records = raw_rows
        .iter()
        .map(|raw| rows::parse_series(&map, raw, &mut report))
        .collect();
    Ok(Frame { records, report })
}

/// Reads and normalizes the source a CLI command points at.
pub fn load_frame(source: &SourceArgs) -> Result<Frame> {
    let delimiter = io_utils::resolve_input_delimiter(&source.input, source.delimiter);
    let encoding = io_utils::resolve_encoding(source.input_encoding.as_deref())?;
    info!(
        "Reading '{}' with delimiter '{}'",
        source.input.display(),
        crate::printable_delimiter(delimiter)
    );
    let (headers, raw_rows) = io_utils::read_raw_table(&source.input, delimiter, encoding, None)
        .with_context(|| format!("Reading {:?}", source.input))?;

    let frame = normalize(&headers, &raw_rows, &source.options())
        .with_context(|| format!("Normalizing {:?}", source.input))?;
    if !frame.report.is_clean() {
        let report = &frame.report;
        warn!(
            "{} cell(s) failed numeric coercion (years: {}, episodes: {}, ratings: {}, ranks: {})",
            report.total(),
            report.unparseable_years,
            report.unparseable_episode_counts,
            report.unparseable_ratings,
            report.unparseable_ranks,
        );
    }
    Ok(frame)
}

pub fn execute(args: &NormalizeArgs) -> Result<()> {
    let frame = load_frame(&args.source)?;
    let headers = schema::output_headers();

    if args.json {
        write_json(args.output.as_deref(), &frame.records)?;
    } else if args.table {
        table::print_table(&headers, &frame.to_rows());
    } else {
        let delimiter = io_utils::resolve_input_delimiter(&args.source.input, args.source.delimiter);
        let mut writer = io_utils::open_csv_writer(args.output.as_deref(), delimiter)?;
        writer
            .write_record(headers.iter())
            .context("Writing canonical headers")?;
        for record in &frame.records {
            writer
                .write_record(record.to_row().iter())
                .context("Writing normalized row")?;
        }
        writer.flush().context("Flushing normalized output")?;
    }

    info!(
        "Normalized {} row(s) across {} canonical column(s)",
        frame.len(),
        CanonicalField::ALL.len()
    );
    Ok(())
}

fn write_json(path: Option<&std::path::Path>, records: &[Series]) -> Result<()> {
    let mut sink: Box<dyn Write> = match path {
        Some(p) if !io_utils::is_dash(p) => Box::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        ),
        _ => Box::new(std::io::stdout()),
    };
    serde_json::to_writer_pretty(&mut sink, records).context("Writing JSON output")?;
    writeln!(sink).context("Finishing JSON output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn normalize_coerces_and_counts_without_failing() {
        let headers = strings(&["Name", "Year of re", "Rating", "Rank"]);
        let raw_rows = vec![
            strings(&["Signal", "2016", "9.1", "#2"]),
            strings(&["Misaeng", "bad-year", "8,7", "#5"]),
        ];
        let frame = normalize(&headers, &raw_rows, &NormalizeOptions::default()).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.records[0].year, Some(2016));
        assert_eq!(frame.records[1].year, None);
        assert_eq!(frame.records[1].rating, Some(8.7));
        assert_eq!(frame.report.unparseable_years, 1);
    }

    #[test]
    fn normalize_is_idempotent_on_its_own_output() {
        let headers = strings(&["Name", "Aired Date", "Genre", "Rating", "Rank"]);
        let raw_rows = vec![
            strings(&["Signal", "2016-01-22", "Thriller, Fantasy", "9.0", "#2"]),
            strings(&["Misaeng", "2014-10-17", "Drama", "8.5/10", ""]),
        ];
        let once = normalize(&headers, &raw_rows, &NormalizeOptions::default()).unwrap();
        let replayed = once.to_rows();
        let twice =
            normalize(&schema::output_headers(), &replayed, &NormalizeOptions::default()).unwrap();
        assert_eq!(once.records, twice.records);
        assert!(twice.report.is_clean());
    }

    #[test]
    fn missing_required_column_stops_the_run() {
        let headers = strings(&["Genre", "Rating"]);
        let options = NormalizeOptions {
            required: vec![CanonicalField::Name],
            ..NormalizeOptions::default()
        };
        let err = normalize(&headers, &[], &options).unwrap_err();
        assert_eq!(err, PipelineError::MissingRequiredColumn(CanonicalField::Name));
    }

    #[test]
    fn ragged_rows_fill_missing_cells_with_none() {
        let headers = strings(&["Name", "Genre", "Rating"]);
        let raw_rows = vec![strings(&["Signal"])];
        let frame = normalize(&headers, &raw_rows, &NormalizeOptions::default()).unwrap();
        assert_eq!(frame.records[0].genre, None);
        assert_eq!(frame.records[0].rating, None);
        assert!(frame.report.is_clean());
    }
}
