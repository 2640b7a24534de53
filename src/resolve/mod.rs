//! Nearest older-relative resolution.
//!
//! Each resolver maps one query isolate to the set of strictly-older
//! candidates achieving the minimum distance under its metric, preserving
//! exact ties. The dispatcher fans single-isolate units across a fixed
//! worker pool and merges the fragments.

use smallvec::SmallVec;

mod dispatch;
mod genomic;
mod tree;

pub use dispatch::{resolve_batch, BatchOutcome};
pub use genomic::{DistanceHit, DistanceProvider, GenomicResolver};
pub use tree::TreeResolver;

/// Running minimum with exact-tie preservation.
///
/// Candidates at a strictly smaller distance displace the set; candidates
/// at exactly the current minimum join it. Non-finite distances are
/// rejected by the caller before they get here.
#[derive(Debug, Default)]
pub(crate) struct MinSet {
    best: Option<f64>,
    candidates: SmallVec<[String; 4]>,
}

impl MinSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, candidate: &str, distance: f64) {
        match self.best {
            Some(best) if distance > best => {}
            Some(best) if distance == best => self.candidates.push(candidate.to_string()),
            _ => {
                self.best = Some(distance);
                self.candidates.clear();
                self.candidates.push(candidate.to_string());
            }
        }
    }

    /// The co-minimal candidates sorted by identifier, with the distance.
    /// Sorting makes result sets directly comparable; row order carries no
    /// meaning downstream.
    pub(crate) fn into_ties(self) -> Option<(f64, SmallVec<[String; 4]>)> {
        let best = self.best?;
        let mut candidates = self.candidates;
        candidates.sort_unstable();
        Some((best, candidates))
    }
}
