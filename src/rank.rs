//! Top-N selection by rating or rank, with optional grouping.
//!
//! Both orderings are explicit configuration: rating sorts descending,
//! rank sorts ascending (rank 1 is the top of the chart). Records missing
//! the chosen key are discarded before sorting, and ties always retain
//! input order via stable sorts.

use std::collections::HashMap;

use anyhow::Result;
use itertools::Itertools;
use log::info;

use crate::{
    cli::{PickArgs, TopArgs},
    data::format_number,
    normalize,
    rows::Series,
    table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Highest rating first.
    RatingDesc,
    /// Lowest rank number first.
    RankAsc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Year,
    Genre,
}

impl GroupBy {
    pub fn label(self) -> &'static str {
        match self {
            GroupBy::Year => "year",
            GroupBy::Genre => "genre",
        }
    }
}

/// One group's ranked selection; groups surface in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTop<'a> {
    pub group: String,
    pub picks: Vec<&'a Series>,
}

fn has_key(series: &Series, key: SortKey) -> bool {
    match key {
        SortKey::RatingDesc => series.rating.is_some(),
        SortKey::RankAsc => series.rank.is_some(),
    }
}

fn sort_candidates<'a>(mut candidates: Vec<&'a Series>, key: SortKey, n: usize) -> Vec<&'a Series> {
    // Candidates were filtered on the key; the fallbacks below never order.
    match key {
        SortKey::RatingDesc => candidates.sort_by(|a, b| {
            let left = a.rating.unwrap_or(f64::NEG_INFINITY);
            let right = b.rating.unwrap_or(f64::NEG_INFINITY);
            right.total_cmp(&left)
        }),
        SortKey::RankAsc => candidates.sort_by_key(|series| series.rank.unwrap_or(i64::MAX)),
    }
    candidates.truncate(n);
    candidates
}

/// The first `n` records under `key`, ties in input order. Asking for
/// more records than exist returns every candidate, sorted.
pub fn top_n(records: &[Series], key: SortKey, n: usize) -> Vec<&Series> {
    let candidates = records
        .iter()
        .filter(|series| has_key(series, key))
        .collect();
    sort_candidates(candidates, key, n)
}

/// Top-N within each group. Group membership restricts candidates before
/// sorting; genre groups come from the exploded tokens, so one record can
/// appear in several groups.
pub fn top_n_by_group(
    records: &[Series],
    group: GroupBy,
    key: SortKey,
    n: usize,
) -> Vec<GroupTop<'_>> {
    let mut order: Vec<String> = Vec::new();
    let mut members: HashMap<String, Vec<&Series>> = HashMap::new();

    for record in records.iter().filter(|series| has_key(series, key)) {
        match group {
            GroupBy::Year => {
                if let Some(year) = record.year {
                    insert_member(&mut order, &mut members, year.to_string(), record);
                }
            }
            GroupBy::Genre => {
                for token in record.genre_tokens().unique() {
                    insert_member(&mut order, &mut members, token.to_string(), record);
                }
            }
        }
    }

    order
        .into_iter()
        .map(|group_key| {
            let candidates = members.remove(&group_key).unwrap_or_default();
            GroupTop {
                picks: sort_candidates(candidates, key, n),
                group: group_key,
            }
        })
        .collect()
}

fn insert_member<'a>(
    order: &mut Vec<String>,
    members: &mut HashMap<String, Vec<&'a Series>>,
    group_key: String,
    record: &'a Series,
) {
    if !members.contains_key(&group_key) {
        order.push(group_key.clone());
    }
    members.entry(group_key).or_default().push(record);
}

/// One recommended pick per genre: the n=1 special case.
pub fn top_pick_per_genre(records: &[Series], key: SortKey) -> Vec<GroupTop<'_>> {
    top_n_by_group(records, GroupBy::Genre, key, 1)
}

fn summary_headers(group: Option<GroupBy>) -> Vec<String> {
    let mut headers = Vec::new();
    if let Some(group) = group {
        headers.push(group.label().to_string());
    }
    headers.extend(
        ["name", "year", "network", "rating", "rank"]
            .iter()
            .map(|h| h.to_string()),
    );
    headers
}

fn summary_row(series: &Series, group_key: Option<&str>) -> Vec<String> {
    let mut row = Vec::new();
    if let Some(group_key) = group_key {
        row.push(group_key.to_string());
    }
    row.push(series.display_name().to_string());
    row.push(series.year.map(|y| y.to_string()).unwrap_or_default());
    row.push(series.network.clone().unwrap_or_default());
    row.push(series.rating.map(format_number).unwrap_or_default());
    row.push(series.rank.map(|r| r.to_string()).unwrap_or_default());
    row
}

pub fn execute_top(args: &TopArgs) -> Result<()> {
    let frame = normalize::load_frame(&args.source)?;
    let key = args.by.into();

    match args.group.map(Into::into) {
        None => {
            let picks = top_n(&frame.records, key, args.limit);
            if picks.is_empty() {
                println!("No data.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> =
                picks.iter().map(|series| summary_row(series, None)).collect();
            table::print_table(&summary_headers(None), &rows);
            info!("Selected top {} of {} record(s)", rows.len(), frame.len());
        }
        Some(group) => {
            let groups = top_n_by_group(&frame.records, group, key, args.limit);
            if groups.is_empty() {
                println!("No data.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = groups
                .iter()
                .flat_map(|entry| {
                    entry
                        .picks
                        .iter()
                        .map(|series| summary_row(series, Some(&entry.group)))
                })
                .collect();
            table::print_table(&summary_headers(Some(group)), &rows);
            info!(
                "Selected top {} per {} across {} group(s)",
                args.limit,
                group.label(),
                groups.len()
            );
        }
    }
    Ok(())
}

pub fn execute_pick(args: &PickArgs) -> Result<()> {
    let frame = normalize::load_frame(&args.source)?;
    let picks = top_pick_per_genre(&frame.records, args.by.into());
    if picks.is_empty() {
        println!("No data.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = picks
        .iter()
        .filter_map(|entry| {
            entry
                .picks
                .first()
                .map(|series| summary_row(series, Some(&entry.group)))
        })
        .collect();
    table::print_table(&summary_headers(Some(GroupBy::Genre)), &rows);
    info!("Picked a top record for {} genre(s)", rows.len());
    Ok(())
}
