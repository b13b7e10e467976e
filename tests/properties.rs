//! Property coverage for the cleaning primitives: totality over
//! arbitrary input and idempotence over their own output.

use proptest::prelude::*;

use series_tidy::{
    data::{clean_rating, format_number},
    normalize::{NormalizeOptions, normalize},
    rank::{SortKey, top_n},
    rows::Series,
    schema::{HeaderMode, clean_header},
};

proptest! {
    #[test]
    fn clean_rating_is_total(raw in any::<String>()) {
        // Never panics; the value itself is unconstrained.
        let _ = clean_rating(&raw);
    }

    #[test]
    fn clean_rating_is_idempotent_on_ratings(raw in r"[0-9]{1,2}([.,][0-9]{1,2})?(/10)?") {
        let once = clean_rating(&raw).expect("numeric input cleans");
        let twice = clean_rating(&format_number(once)).expect("cleaned input cleans");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn header_cleaning_is_idempotent(raw in any::<String>()) {
        for mode in [HeaderMode::Strict, HeaderMode::Collapse] {
            let once = clean_header(&raw, mode);
            prop_assert_eq!(&clean_header(&once, mode), &once);
        }
    }

    #[test]
    fn normalize_never_errors_without_required_fields(
        headers in proptest::collection::vec(any::<String>(), 0..8),
        rows in proptest::collection::vec(
            proptest::collection::vec(any::<String>(), 0..8),
            0..10,
        ),
    ) {
        let frame = normalize(&headers, &rows, &NormalizeOptions::default());
        prop_assert!(frame.is_ok());
        prop_assert_eq!(frame.unwrap().len(), rows.len());
    }

    #[test]
    fn top_n_never_exceeds_limit_or_candidates(
        ratings in proptest::collection::vec(proptest::option::of(0.0f64..10.0), 0..40),
        n in 0usize..50,
    ) {
        let records: Vec<Series> = ratings
            .iter()
            .map(|rating| Series { rating: *rating, ..Series::default() })
            .collect();
        let candidates = ratings.iter().filter(|r| r.is_some()).count();
        let picks = top_n(&records, SortKey::RatingDesc, n);
        prop_assert_eq!(picks.len(), candidates.min(n));
        for pair in picks.windows(2) {
            prop_assert!(pair[0].rating >= pair[1].rating);
        }
    }
}
