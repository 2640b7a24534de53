//! Tree-metric resolution: closest strictly-older leaves by additive
//! branch-length path distance.

use super::MinSet;
use crate::error::{PriorkinError, Result};
use crate::temporal::TemporalIndex;
use crate::tree::{NodeId, Tree};
use crate::types::{CollectionDate, DistanceRecord, Metric};

/// Per-query resolver over a shared read-only tree and temporal index.
///
/// Eligible candidate leaves (named, dated, not placeholder) are computed
/// once at construction; each [`resolve`](TreeResolver::resolve) call is a
/// pure function of the query identifier.
pub struct TreeResolver<'a> {
    tree: &'a Tree,
    temporal: &'a TemporalIndex,
    /// Leaves that may appear as candidates: dated and not placeholders.
    candidates: Vec<(NodeId, CollectionDate)>,
}

impl<'a> TreeResolver<'a> {
    pub fn new(tree: &'a Tree, temporal: &'a TemporalIndex, unknown_prefix: &str) -> Self {
        let candidates = tree
            .leaves()
            .filter(|id| {
                let name = tree.name(*id);
                !name.is_empty() && !name.starts_with(unknown_prefix)
            })
            .filter_map(|id| temporal.date_of(tree.name(id)).map(|date| (id, date)))
            .collect();
        Self {
            tree,
            temporal,
            candidates,
        }
    }

    /// Number of leaves eligible as candidates.
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Resolve one query isolate to its co-minimal strictly-older leaf set.
    ///
    /// Absence from the tree and absence of any older relative are distinct
    /// failures; the former points at the inputs, the latter at the query's
    /// collection date.
    pub fn resolve(&self, isolate: &str) -> Result<Vec<DistanceRecord>> {
        let query = self
            .tree
            .node(isolate)
            .ok_or_else(|| PriorkinError::IsolateNotInTree(isolate.to_string()))?;
        let query_date = self
            .temporal
            .date_of(isolate)
            .ok_or_else(|| PriorkinError::IsolateNotInMetadata(isolate.to_string()))?;

        let mut min_set = MinSet::new();
        for (leaf, date) in &self.candidates {
            if *leaf == query || *date >= query_date {
                continue;
            }
            let distance = self.tree.path_distance(query, *leaf);
            min_set.push(self.tree.name(*leaf), distance);
        }

        let (distance, ties) = min_set
            .into_ties()
            .ok_or_else(|| PriorkinError::NoOlderCandidate(isolate.to_string()))?;

        log::debug!(
            "tree metric: {} -> {} co-minimal candidate(s) at distance {}",
            isolate,
            ties.len(),
            distance
        );

        Ok(ties
            .into_iter()
            .map(|candidate| DistanceRecord {
                query: isolate.to_string(),
                candidate,
                metric: Metric::Tree,
                distance,
            })
            .collect())
    }
}
