//! Temporal index: normalized collection dates and strictly-older lookups.
//!
//! Both resolvers filter candidates through the same index, so partial
//! dates are normalized once, here, and nowhere else. A date missing its
//! day (or month) is pinned to the first day of the period: `2020-03` and
//! `2020-03-XX` both become 2020-03-01, `2020` becomes 2020-01-01.

use crate::error::{PriorkinError, Result};
use crate::types::CollectionDate;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;

/// Normalize a possibly-partial date string to a canonical calendar day.
///
/// Accepted forms: `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, with any number of
/// trailing `-XX` placeholder segments.
pub fn normalize_date(isolate: &str, raw: &str) -> Result<CollectionDate> {
    let mut s = raw.trim();
    while let Some(stripped) = s.strip_suffix("-XX") {
        s = stripped;
    }

    let invalid = || PriorkinError::InvalidDate {
        isolate: isolate.to_string(),
        date: raw.to_string(),
    };

    let parts: Vec<&str> = s.split('-').collect();
    let date = match parts.as_slice() {
        [y, m, d] => {
            let (y, m, d) = (
                y.parse().map_err(|_| invalid())?,
                m.parse().map_err(|_| invalid())?,
                d.parse().map_err(|_| invalid())?,
            );
            NaiveDate::from_ymd_opt(y, m, d)
        }
        [y, m] => {
            let (y, m) = (
                y.parse().map_err(|_| invalid())?,
                m.parse().map_err(|_| invalid())?,
            );
            NaiveDate::from_ymd_opt(y, m, 1)
        }
        [y] => NaiveDate::from_ymd_opt(y.parse().map_err(|_| invalid())?, 1, 1),
        _ => None,
    };

    date.ok_or_else(invalid)
}

/// Mapping from isolate identifier to normalized collection date.
#[derive(Debug, Clone, Default)]
pub struct TemporalIndex {
    dates: FxHashMap<String, CollectionDate>,
}

impl TemporalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already-normalized dates.
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = (String, CollectionDate)>,
    {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, isolate: impl Into<String>, date: CollectionDate) {
        self.dates.insert(isolate.into(), date);
    }

    pub fn date_of(&self, isolate: &str) -> Option<CollectionDate> {
        self.dates.get(isolate).copied()
    }

    pub fn contains(&self, isolate: &str) -> bool {
        self.dates.contains_key(isolate)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.dates.keys().map(String::as_str)
    }

    /// True when `candidate` has a known date strictly before
    /// `reference_date`. Same-day isolates are never eligible.
    pub fn is_older(&self, candidate: &str, reference_date: CollectionDate) -> bool {
        self.dates
            .get(candidate)
            .is_some_and(|d| *d < reference_date)
    }

    /// All indexed identifiers strictly older than `reference_date`.
    pub fn older_than(&self, reference_date: CollectionDate) -> impl Iterator<Item = &str> {
        self.dates
            .iter()
            .filter(move |(_, d)| **d < reference_date)
            .map(|(id, _)| id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> CollectionDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn full_date_parses() {
        assert_eq!(normalize_date("a", "2020-03-17").unwrap(), day(2020, 3, 17));
    }

    #[test]
    fn partial_dates_pin_to_first_day() {
        assert_eq!(normalize_date("a", "2020-03").unwrap(), day(2020, 3, 1));
        assert_eq!(normalize_date("a", "2020").unwrap(), day(2020, 1, 1));
    }

    #[test]
    fn xx_placeholders_are_stripped() {
        assert_eq!(normalize_date("a", "2020-03-XX").unwrap(), day(2020, 3, 1));
        assert_eq!(normalize_date("a", "2020-XX-XX").unwrap(), day(2020, 1, 1));
    }

    #[test]
    fn garbage_names_the_isolate() {
        let err = normalize_date("hCoV/x1", "not-a-date").unwrap_err();
        assert!(err.to_string().contains("hCoV/x1"));
    }

    #[test]
    fn strictly_older_excludes_same_day() {
        let idx = TemporalIndex::from_dates([
            ("a".to_string(), day(2020, 3, 10)),
            ("b".to_string(), day(2020, 3, 5)),
            ("c".to_string(), day(2020, 3, 10)),
        ]);

        let older: Vec<&str> = idx.older_than(day(2020, 3, 10)).collect();
        assert_eq!(older, vec!["b"]);
        assert!(idx.is_older("b", day(2020, 3, 10)));
        assert!(!idx.is_older("c", day(2020, 3, 10)));
        assert!(!idx.is_older("missing", day(2020, 3, 10)));
    }
}
