//! Genome-metric resolution over an external pairwise distance provider.
//!
//! Distance computation itself is delegated: the resolver only filters a
//! per-query hit stream to strictly-older candidates and keeps the
//! co-minimal subset, with the same tie policy as the tree metric.

use super::MinSet;
use crate::error::Result;
use crate::temporal::TemporalIndex;
use crate::types::{DistanceRecord, Metric};

/// One (query, reference) comparison as reported by the distance tool.
/// Auxiliary statistics ride along for diagnostics; only `distance`
/// participates in minimum selection, on whatever scale the tool emits.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceHit {
    pub reference: String,
    pub distance: f64,
    pub p_value: f64,
    pub shared_hashes: String,
}

/// Source of pairwise genome distances, one invocation per query isolate
/// against the full reference sketch.
///
/// Abstracting the subprocess behind this trait keeps process mechanics out
/// of the resolution algorithm and allows a deterministic fake in tests.
pub trait DistanceProvider: Sync {
    fn distances(&self, isolate: &str) -> Result<Vec<DistanceHit>>;
}

/// Per-query resolver over a shared provider and temporal index.
pub struct GenomicResolver<'a, P: DistanceProvider> {
    provider: &'a P,
    temporal: &'a TemporalIndex,
}

impl<'a, P: DistanceProvider> GenomicResolver<'a, P> {
    pub fn new(provider: &'a P, temporal: &'a TemporalIndex) -> Self {
        Self { provider, temporal }
    }

    /// Resolve one query isolate to its co-minimal strictly-older hit set.
    ///
    /// An empty filtered set is not an error for this metric: the isolate
    /// yields zero records, is reported by name, and its tree-metric result
    /// is unaffected. Provider failures propagate and are fatal.
    pub fn resolve(&self, isolate: &str) -> Result<Vec<DistanceRecord>> {
        let query_date = match self.temporal.date_of(isolate) {
            Some(date) => date,
            None => {
                log::warn!("genomic metric: no collection date for {isolate}, skipping");
                return Ok(Vec::new());
            }
        };

        let mut min_set = MinSet::new();
        for hit in self.provider.distances(isolate)? {
            if hit.reference == isolate {
                continue;
            }
            if !hit.distance.is_finite() {
                log::debug!(
                    "genomic metric: ignoring non-finite distance {} -> {}",
                    isolate,
                    hit.reference
                );
                continue;
            }
            if !self.temporal.is_older(&hit.reference, query_date) {
                continue;
            }
            min_set.push(&hit.reference, hit.distance);
        }

        let Some((distance, ties)) = min_set.into_ties() else {
            log::warn!("genomic metric: no strictly older hit for {isolate}");
            return Ok(Vec::new());
        };

        Ok(ties
            .into_iter()
            .map(|candidate| DistanceRecord {
                query: isolate.to_string(),
                candidate,
                metric: Metric::Genomic,
                distance,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::normalize_date;
    use rustc_hash::FxHashMap;

    struct FakeProvider {
        hits: FxHashMap<String, Vec<DistanceHit>>,
    }

    impl FakeProvider {
        fn new(entries: &[(&str, &[(&str, f64)])]) -> Self {
            let hits = entries
                .iter()
                .map(|(query, pairs)| {
                    let hits = pairs
                        .iter()
                        .map(|(reference, distance)| DistanceHit {
                            reference: reference.to_string(),
                            distance: *distance,
                            p_value: 0.0,
                            shared_hashes: "1000/1000".to_string(),
                        })
                        .collect();
                    (query.to_string(), hits)
                })
                .collect();
            Self { hits }
        }
    }

    impl DistanceProvider for FakeProvider {
        fn distances(&self, isolate: &str) -> Result<Vec<DistanceHit>> {
            Ok(self.hits.get(isolate).cloned().unwrap_or_default())
        }
    }

    fn index(entries: &[(&str, &str)]) -> TemporalIndex {
        TemporalIndex::from_dates(
            entries
                .iter()
                .map(|(id, date)| (id.to_string(), normalize_date(id, date).unwrap())),
        )
    }

    #[test]
    fn self_hits_are_filtered() {
        let provider = FakeProvider::new(&[("X", &[("X", 0.0), ("B", 0.1)])]);
        let temporal = index(&[("X", "2020-03-01"), ("B", "2020-02-01")]);
        let resolver = GenomicResolver::new(&provider, &temporal);

        let records = resolver.resolve("X").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].candidate, "B");
    }

    #[test]
    fn three_way_tie_is_preserved() {
        let provider = FakeProvider::new(&[(
            "X",
            &[("A", 0.02), ("B", 0.02), ("C", 0.02), ("D", 0.07)],
        )]);
        let temporal = index(&[
            ("X", "2020-03-01"),
            ("A", "2020-01-01"),
            ("B", "2020-01-02"),
            ("C", "2020-01-03"),
            ("D", "2020-01-04"),
        ]);
        let resolver = GenomicResolver::new(&provider, &temporal);

        let records = resolver.resolve("X").unwrap();
        let candidates: Vec<&str> = records.iter().map(|r| r.candidate.as_str()).collect();
        assert_eq!(candidates, vec!["A", "B", "C"]);
        assert!(records.iter().all(|r| r.distance == 0.02));
        assert!(records.iter().all(|r| r.metric == Metric::Genomic));
    }

    #[test]
    fn newer_hits_never_qualify() {
        let provider = FakeProvider::new(&[("X", &[("newer", 0.001), ("older", 0.5)])]);
        let temporal = index(&[
            ("X", "2020-03-01"),
            ("newer", "2020-04-01"),
            ("older", "2020-01-01"),
        ]);
        let resolver = GenomicResolver::new(&provider, &temporal);

        let records = resolver.resolve("X").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].candidate, "older");
    }

    #[test]
    fn empty_filtered_set_is_non_fatal() {
        let provider = FakeProvider::new(&[("X", &[("same_day", 0.01)])]);
        let temporal = index(&[("X", "2020-03-01"), ("same_day", "2020-03-01")]);
        let resolver = GenomicResolver::new(&provider, &temporal);

        assert!(resolver.resolve("X").unwrap().is_empty());
    }
}
