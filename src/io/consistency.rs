//! Cross-input consistency checks, run once before any resolution.
//!
//! Hard requirements (fatal): every non-placeholder tree leaf has
//! metadata and a sequence, every FASTA strain has metadata, and every
//! named tree node has a trait entry. Query isolates missing from any
//! input are soft failures: warned about by name and excluded, returning
//! the usable subset.

use crate::ancestry::TraitTable;
use crate::error::{PriorkinError, Result};
use crate::io::metadata::Metadata;
use crate::tree::Tree;
use rustc_hash::FxHashSet;

fn missing_example(missing: &FxHashSet<&str>) -> String {
    let mut names: Vec<&str> = missing.iter().copied().collect();
    names.sort_unstable();
    names.first().unwrap_or(&"").to_string()
}

/// Validate inputs against each other and return the queried isolates
/// present everywhere, sorted.
pub fn check_inputs(
    isolates: &[String],
    metadata: &Metadata,
    tree: &Tree,
    traits: &TraitTable,
    fasta_strains: &FxHashSet<String>,
    unknown_prefix: &str,
) -> Result<Vec<String>> {
    let tree_strains: FxHashSet<&str> = tree
        .leaf_names()
        .filter(|name| !name.is_empty() && !name.starts_with(unknown_prefix))
        .collect();

    let missing_metadata: FxHashSet<&str> = tree_strains
        .iter()
        .copied()
        .filter(|s| !metadata.contains(s))
        .collect();
    if !missing_metadata.is_empty() {
        return Err(PriorkinError::TreeLeavesMissingMetadata {
            count: missing_metadata.len(),
            example: missing_example(&missing_metadata),
        });
    }

    let missing_traits: FxHashSet<&str> = tree
        .node_names()
        .filter(|n| !traits.contains_key(*n))
        .collect();
    if !missing_traits.is_empty() {
        return Err(PriorkinError::NodesMissingTraits {
            count: missing_traits.len(),
            example: missing_example(&missing_traits),
        });
    }

    let missing_fasta: FxHashSet<&str> = tree_strains
        .iter()
        .copied()
        .filter(|s| !fasta_strains.contains(*s))
        .collect();
    if !missing_fasta.is_empty() {
        return Err(PriorkinError::TreeLeavesMissingFasta {
            count: missing_fasta.len(),
            example: missing_example(&missing_fasta),
        });
    }

    let fasta_missing_metadata: FxHashSet<&str> = fasta_strains
        .iter()
        .map(String::as_str)
        .filter(|s| !metadata.contains(s))
        .collect();
    if !fasta_missing_metadata.is_empty() {
        return Err(PriorkinError::FastaMissingMetadata {
            count: fasta_missing_metadata.len(),
            example: missing_example(&fasta_missing_metadata),
        });
    }

    // Queried isolates may be missing from individual inputs; warn and
    // restrict to the usable subset rather than failing the run.
    let mut usable = Vec::new();
    for isolate in isolates {
        let mut missing_from = Vec::new();
        if !metadata.contains(isolate) {
            missing_from.push("metadata");
        } else if metadata.temporal().date_of(isolate).is_none() {
            // present but undated: cannot anchor a strictly-older search
            missing_from.push("dated metadata");
        }
        if !tree_strains.contains(isolate.as_str()) {
            missing_from.push("tree");
        }
        if !fasta_strains.contains(isolate) {
            missing_from.push("fasta");
        }
        if missing_from.is_empty() {
            usable.push(isolate.clone());
        } else {
            log::warn!(
                "isolate {} is missing from {} and will not be queried",
                isolate,
                missing_from.join(", ")
            );
        }
    }

    if usable.len() != isolates.len() {
        log::warn!(
            "querying {}/{} isolates present in all input files",
            usable.len(),
            isolates.len()
        );
    }
    usable.sort_unstable();
    usable.dedup();
    Ok(usable)
}
