//! Nearest older-relative resolution for genomic isolates.
//!
//! For each queried isolate, finds the closest strictly-older relative(s)
//! in a reference collection under two independent metrics: additive path
//! distance in a phylogeny, and whole-genome sketch distance from an
//! external tool. All exact ties are kept, and the geographic trait
//! inference attached to the isolate's immediate ancestor node is
//! recovered alongside.
//!
//! ```rust
//! use priorkin::temporal::{normalize_date, TemporalIndex};
//! use priorkin::tree::parse_newick;
//! use priorkin::resolve::TreeResolver;
//!
//! let tree = parse_newick("(A:1,B:2,C:3)root;")?;
//! let temporal = TemporalIndex::from_dates([
//!     ("A".to_string(), normalize_date("A", "2020-01-10")?),
//!     ("B".to_string(), normalize_date("B", "2020-01-05")?),
//!     ("C".to_string(), normalize_date("C", "2020-01-03")?),
//! ]);
//!
//! let resolver = TreeResolver::new(&tree, &temporal, "unknown");
//! let closest = resolver.resolve("A")?;
//! assert_eq!(closest[0].candidate, "B");
//! # Ok::<(), priorkin::PriorkinError>(())
//! ```

pub mod ancestry;
pub mod error;
pub mod genome;
pub mod io;
pub mod pipeline;
pub mod resolve;
pub mod temporal;
pub mod tree;
pub mod types;

pub use error::{PriorkinError, Result};

pub use types::{
    AncestorTraitRecord, CollectionDate, Config, DistanceRecord, FailurePolicy, GeoLocation,
    GeoScale, Metric,
};

pub use temporal::TemporalIndex;

pub use tree::{parse_newick, NodeId, Tree};

pub use resolve::{
    resolve_batch, BatchOutcome, DistanceHit, DistanceProvider, GenomicResolver, TreeResolver,
};

pub use ancestry::{extract_ancestor_traits, TraitAnnotation, TraitTable};

pub use pipeline::{run, InputPaths, RunSummary};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Config, FailurePolicy, Metric, PriorkinError, Result};

    pub use crate::temporal::{normalize_date, TemporalIndex};

    pub use crate::tree::{parse_newick, Tree};

    pub use crate::resolve::{resolve_batch, GenomicResolver, TreeResolver};

    pub use crate::pipeline::{run, InputPaths};
}
