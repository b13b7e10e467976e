//! Genre explosion and frequency counting.
//!
//! A record whose genre cell holds `"Romance, Comedy"` contributes one
//! entry to each of `Romance` and `Comedy`; the record itself is never
//! mutated or duplicated. Frequency counts order by descending count with
//! ties broken by first-seen token order, which is a documented contract
//! here, not an artifact of sort stability in one implementation.

use std::collections::HashMap;

use anyhow::Result;
use itertools::Itertools;
use log::info;

use crate::{cli::GenresArgs, normalize, rows::Series, table};

/// One (record, genre-token) pair from exploding a multi-valued genre
/// cell. `record` indexes into the frame the entry was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreEntry {
    pub record: usize,
    pub token: String,
}

pub fn explode_genres(records: &[Series]) -> Vec<GenreEntry> {
    let mut entries = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        for token in record.genre_tokens() {
            entries.push(GenreEntry {
                record: idx,
                token: token.to_string(),
            });
        }
    }
    entries
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// Counts distinct contributing records per genre token. A record listing
/// the same token twice still counts once.
pub fn genre_frequency(records: &[Series]) -> Vec<GenreCount> {
    let mut first_seen: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for record in records {
        for token in record.genre_tokens().unique() {
            match counts.get_mut(token) {
                Some(count) => *count += 1,
                None => {
                    first_seen.push(token.to_string());
                    counts.insert(token.to_string(), 1);
                }
            }
        }
    }

    let mut ordered: Vec<GenreCount> = first_seen
        .into_iter()
        .map(|genre| {
            let count = counts[&genre];
            GenreCount { genre, count }
        })
        .collect();
    // Stable sort over first-seen order is exactly the documented tie-break.
    ordered.sort_by_key(|entry| std::cmp::Reverse(entry.count));
    ordered
}

pub fn execute(args: &GenresArgs) -> Result<()> {
    let frame = normalize::load_frame(&args.source)?;
    let mut counts = genre_frequency(&frame.records);
    let total = counts.len();
    if args.top > 0 && counts.len() > args.top {
        counts.truncate(args.top);
    }

    if counts.is_empty() {
        println!("No genre data.");
        info!("No genre column resolved or no records carried genres");
        return Ok(());
    }

    let headers = vec!["genre".to_string(), "count".to_string()];
    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|entry| vec![entry.genre.clone(), entry.count.to_string()])
        .collect();
    table::print_table(&headers, &rows);
    info!(
        "Displayed {} of {} genre(s) across {} record(s)",
        counts.len(),
        total,
        frame.len()
    );
    Ok(())
}
