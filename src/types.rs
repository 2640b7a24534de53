//! Core record types and run configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which distance metric produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Additive branch-length path distance in the phylogeny.
    Tree,
    /// Whole-genome sketch distance from the external tool.
    Genomic,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Tree => write!(f, "tree"),
            Metric::Genomic => write!(f, "genomic"),
        }
    }
}

/// The fixed geographic scales carried by ancestral trait inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoScale {
    Region,
    Country,
    Division,
}

impl GeoScale {
    pub const ALL: [GeoScale; 3] = [GeoScale::Region, GeoScale::Country, GeoScale::Division];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeoScale::Region => "region",
            GeoScale::Country => "country",
            GeoScale::Division => "division",
        }
    }
}

impl fmt::Display for GeoScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the dispatcher reacts when one isolate's unit of work fails fatally
/// (e.g. no strictly-older relative exists in the tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// First fatal per-isolate error aborts the whole batch.
    Abort,
    /// Skip the isolate, log it by name, and record it in the skip list.
    #[default]
    Skip,
}

/// One (query, candidate) pair under one metric.
///
/// Invariants: `candidate != query`, `distance` is finite and non-negative,
/// and the candidate's collection date is strictly older than the query's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub query: String,
    pub candidate: String,
    pub metric: Metric,
    pub distance: f64,
}

/// Ancestral trait inference read off a query isolate's direct parent node.
///
/// A parent node may carry several candidate values per scale, each with its
/// own confidence; confidences are preserved as given and are not required
/// to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestorTraitRecord {
    pub isolate: String,
    pub ancestor: String,
    pub scale: GeoScale,
    pub value: String,
    pub confidence: f64,
}

/// Per-isolate geographic columns from the metadata table, joined into the
/// output tables by candidate identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoLocation {
    pub region: String,
    pub country: String,
    pub division: String,
}

/// A normalized collection date. Partial input dates are canonicalized to
/// the first day of the missing period before any comparison, so both
/// resolvers see identical orderings.
pub type CollectionDate = NaiveDate;

/// Run configuration.
///
/// Serializable with per-field defaults so it can be loaded from JSON or
/// assembled from CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Worker count for the per-isolate dispatch pool. 0 means one worker
    /// per available CPU.
    #[serde(default)]
    pub workers: usize,

    /// What to do when a single isolate's resolution fails fatally.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Threads handed to `mash sketch -p`.
    #[serde(default = "Config::default_mash_threads")]
    pub mash_threads: usize,

    /// Reuse a sketch file left by a previous run instead of rebuilding it.
    #[serde(default)]
    pub reuse_sketch: bool,

    /// Leaf-name prefix marking placeholder leaves excluded from
    /// resolution.
    #[serde(default = "Config::default_unknown_prefix")]
    pub unknown_leaf_prefix: String,
}

impl Config {
    const fn default_mash_threads() -> usize {
        8
    }

    fn default_unknown_prefix() -> String {
        "unknown".to_string()
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_mash_threads(mut self, threads: usize) -> Self {
        self.mash_threads = threads;
        self
    }

    pub fn with_reuse_sketch(mut self, reuse: bool) -> Self {
        self.reuse_sketch = reuse;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 0,
            failure_policy: FailurePolicy::default(),
            mash_threads: Self::default_mash_threads(),
            reuse_sketch: false,
            unknown_leaf_prefix: Self::default_unknown_prefix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_json_with_defaults() {
        let config: Config = serde_json::from_str(r#"{"workers": 4}"#).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
        assert_eq!(config.mash_threads, 8);
        assert_eq!(config.unknown_leaf_prefix, "unknown");
    }

    #[test]
    fn failure_policy_serde_names() {
        let policy: FailurePolicy = serde_json::from_str(r#""abort""#).unwrap();
        assert_eq!(policy, FailurePolicy::Abort);
    }

    #[test]
    fn scale_names() {
        assert_eq!(GeoScale::Region.to_string(), "region");
        assert_eq!(GeoScale::ALL.len(), 3);
    }
}
