//! Input parsing, consistency checking, and table output.
//!
//! Thin collaborators around the resolution core: each module turns one
//! external format into (or out of) the crate's own types and nothing else.

pub mod consistency;
pub mod fasta;
pub mod metadata;
pub mod output;
pub mod traits;

pub use consistency::check_inputs;
pub use fasta::extract_query_fastas;
pub use metadata::Metadata;
pub use output::OutputTables;
pub use traits::parse_traits_file;
