//! Ancestral geographic trait extraction.
//!
//! For each query isolate, reads the inferred trait annotation of the
//! leaf's *direct parent* node, never a more distant ancestor, and emits
//! every candidate value with its confidence for the three fixed scales.

use crate::error::{PriorkinError, Result};
use crate::tree::Tree;
use crate::types::{AncestorTraitRecord, GeoScale};
use rustc_hash::FxHashMap;

/// One node's inferred annotation: per scale, candidate values with
/// confidences. Confidences are carried as given in the source inference
/// and are not renormalized.
pub type TraitAnnotation = FxHashMap<GeoScale, Vec<(String, f64)>>;

/// Mapping from tree node name to its trait annotation. Upstream
/// consistency checking guarantees an entry for every tree node.
pub type TraitTable = FxHashMap<String, TraitAnnotation>;

/// Emit ancestor trait records for one isolate leaf.
///
/// Records reference the direct parent only. The root has no parent; a
/// query isolate sitting at the root yields no records, which cannot occur
/// for leaves of any tree with at least two nodes.
pub fn extract_ancestor_traits(
    tree: &Tree,
    traits: &TraitTable,
    isolate: &str,
) -> Result<Vec<AncestorTraitRecord>> {
    let leaf = tree
        .node(isolate)
        .ok_or_else(|| PriorkinError::IsolateNotInTree(isolate.to_string()))?;
    let Some(parent) = tree.parent(leaf) else {
        log::warn!("{isolate} is the tree root, no ancestor to read traits from");
        return Ok(Vec::new());
    };

    let ancestor = tree.name(parent);
    let annotation = traits.get(ancestor).ok_or_else(|| {
        // Guarded against upstream; reaching this means the consistency
        // check was bypassed.
        PriorkinError::NodesMissingTraits {
            count: 1,
            example: ancestor.to_string(),
        }
    })?;

    let mut records = Vec::new();
    for scale in GeoScale::ALL {
        let Some(values) = annotation.get(&scale) else {
            log::debug!("node {ancestor} carries no {scale} inference");
            continue;
        };
        for (value, confidence) in values {
            records.push(AncestorTraitRecord {
                isolate: isolate.to_string(),
                ancestor: ancestor.to_string(),
                scale,
                value: value.clone(),
                confidence: *confidence,
            });
        }
    }
    Ok(records)
}

/// Extract for a whole isolate set, concatenating per-isolate records.
pub fn extract_all(
    tree: &Tree,
    traits: &TraitTable,
    isolates: &[String],
) -> Result<Vec<AncestorTraitRecord>> {
    let mut records = Vec::new();
    for isolate in isolates {
        records.extend(extract_ancestor_traits(tree, traits, isolate)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_newick;

    fn annotation(entries: &[(GeoScale, &[(&str, f64)])]) -> TraitAnnotation {
        entries
            .iter()
            .map(|(scale, values)| {
                (
                    *scale,
                    values
                        .iter()
                        .map(|(v, c)| (v.to_string(), *c))
                        .collect::<Vec<_>>(),
                )
            })
            .collect()
    }

    #[test]
    fn reads_direct_parent_only() {
        let tree = parse_newick("((A:1,B:1)NODE_01:1,C:1)NODE_00;").unwrap();
        let mut traits = TraitTable::default();
        traits.insert(
            "NODE_01".to_string(),
            annotation(&[
                (GeoScale::Region, &[("Europe", 0.9), ("Asia", 0.1)]),
                (GeoScale::Country, &[("France", 0.8)]),
                (GeoScale::Division, &[("Ile-de-France", 0.6)]),
            ]),
        );
        traits.insert(
            "NODE_00".to_string(),
            annotation(&[(GeoScale::Region, &[("Oceania", 1.0)])]),
        );

        let records = extract_ancestor_traits(&tree, &traits, "A").unwrap();
        assert!(records.iter().all(|r| r.ancestor == "NODE_01"));
        assert_eq!(records.len(), 4);

        let regions: Vec<(&str, f64)> = records
            .iter()
            .filter(|r| r.scale == GeoScale::Region)
            .map(|r| (r.value.as_str(), r.confidence))
            .collect();
        assert!(regions.contains(&("Europe", 0.9)));
        assert!(regions.contains(&("Asia", 0.1)));
        // grandparent's annotation never leaks in
        assert!(!records.iter().any(|r| r.value == "Oceania"));
    }

    #[test]
    fn confidences_pass_through_unnormalized() {
        let tree = parse_newick("((A:1,B:1)P:1,C:1)R;").unwrap();
        let mut traits = TraitTable::default();
        // deliberately sums to more than 1
        traits.insert(
            "P".to_string(),
            annotation(&[(GeoScale::Country, &[("UK", 0.7), ("Ireland", 0.7)])]),
        );

        let records = extract_ancestor_traits(&tree, &traits, "B").unwrap();
        let total: f64 = records.iter().map(|r| r.confidence).sum();
        assert!((total - 1.4).abs() < 1e-12);
    }

    #[test]
    fn unknown_isolate_is_typed() {
        let tree = parse_newick("(A:1,B:1)R;").unwrap();
        let traits = TraitTable::default();
        assert!(matches!(
            extract_ancestor_traits(&tree, &traits, "Z"),
            Err(PriorkinError::IsolateNotInTree(_))
        ));
    }
}
