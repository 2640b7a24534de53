//! Crate-wide error type.
//!
//! Every fatal condition names the offending isolate, node, or file so a
//! failed run can be traced back to a concrete input record.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PriorkinError>;

#[derive(Debug, Error)]
pub enum PriorkinError {
    /// A queried isolate has no entry in the metadata table.
    #[error("isolate '{0}' could not be found in metadata, check the strain name provided is correct")]
    IsolateNotInMetadata(String),

    /// A queried isolate is not a leaf of the tree (e.g. removed by
    /// subsampling upstream). Distinct from `NoOlderCandidate`.
    #[error("isolate '{0}' could not be found in the tree, check it was not removed by subsampling")]
    IsolateNotInTree(String),

    /// A queried isolate has no record in the reference FASTA.
    #[error("isolate '{0}' could not be found in the reference FASTA")]
    IsolateNotInFasta(String),

    /// Tree leaves missing from the metadata table.
    #[error("{count} strains are in the tree but not in metadata (e.g. '{example}'); all tree strains must have metadata")]
    TreeLeavesMissingMetadata { count: usize, example: String },

    /// Tree leaves missing from the reference FASTA.
    #[error("{count} strains are in the tree but not in the FASTA (e.g. '{example}'); all tree strains must have a sequence")]
    TreeLeavesMissingFasta { count: usize, example: String },

    /// FASTA records missing from the metadata table.
    #[error("{count} strains are in the FASTA but not in metadata (e.g. '{example}')")]
    FastaMissingMetadata { count: usize, example: String },

    /// Tree nodes with no entry in the traits file.
    #[error("{count} tree nodes have no entry in the traits file (e.g. '{example}'); use the traits file inferred for this tree")]
    NodesMissingTraits { count: usize, example: String },

    /// No strictly-older candidate exists for an isolate under the tree
    /// metric. Batch-level handling is decided by `FailurePolicy`.
    #[error("no strictly older relative of '{0}' exists in the tree")]
    NoOlderCandidate(String),

    /// A tree node referenced during resolution does not exist.
    #[error("tree node '{0}' does not exist")]
    UnknownTreeNode(String),

    /// A date string could not be normalized to a calendar date.
    #[error("could not parse collection date '{date}' for '{isolate}'")]
    InvalidDate { isolate: String, date: String },

    /// Newick parse failure with byte offset into the input.
    #[error("malformed newick at byte {offset}: {reason}")]
    Newick { offset: usize, reason: String },

    /// The metadata table is missing a required column.
    #[error("metadata is missing required column '{0}'")]
    MissingColumn(&'static str),

    /// The external distance tool is not installed or not runnable.
    #[error("tool '{0}' is not installed or not executable")]
    ToolMissing(String),

    /// The external distance tool exited with a failure.
    #[error("'{command}' failed: {detail}")]
    ToolFailed { command: String, detail: String },

    /// The external distance tool produced output we cannot parse.
    #[error("unparseable output from '{command}': {line}")]
    MalformedToolOutput { command: String, line: String },

    /// Two distinct query isolates sanitize to the same FASTA filename.
    #[error("isolates '{first}' and '{second}' both map to query file '{path}'; rename one of them")]
    QueryFileCollision {
        first: String,
        second: String,
        path: PathBuf,
    },

    /// The dispatch worker pool could not be constructed.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),

    /// Output directory already exists and overwrite was not requested.
    #[error("output directory '{0}' already exists, remove it or pass --overwrite")]
    OutputDirExists(PathBuf),

    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("traits json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PriorkinError {
    /// Attach a path to a bare i/o error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PriorkinError::Io {
            path: path.into(),
            source,
        }
    }
}
