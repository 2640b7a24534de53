//! Ancestral trait file parsing (augur traits node-data JSON).
//!
//! Layout: `{"nodes": {"<name>": {"region": "Europe",
//! "region_confidence": {"Europe": 0.9, "Asia": 0.1}, ...}}}`. When a
//! scale carries a confidence map it is taken verbatim; a bare assigned
//! value with no map becomes a single candidate at confidence 1.0.

use crate::ancestry::{TraitAnnotation, TraitTable};
use crate::error::{PriorkinError, Result};
use crate::types::GeoScale;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TraitsFile {
    nodes: HashMap<String, HashMap<String, Value>>,
}

fn annotation_for(node: &HashMap<String, Value>) -> TraitAnnotation {
    let mut annotation = TraitAnnotation::default();
    for scale in GeoScale::ALL {
        let confidence_key = format!("{}_confidence", scale.as_str());
        let values: Vec<(String, f64)> = match node.get(&confidence_key) {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(value, conf)| conf.as_f64().map(|c| (value.clone(), c)))
                .collect(),
            _ => match node.get(scale.as_str()) {
                Some(Value::String(value)) => vec![(value.clone(), 1.0)],
                _ => Vec::new(),
            },
        };
        if !values.is_empty() {
            annotation.insert(scale, values);
        }
    }
    annotation
}

/// Parse a traits node-data JSON file into the trait table.
pub fn parse_traits_file(path: &Path) -> Result<TraitTable> {
    let file = File::open(path).map_err(|e| PriorkinError::io(path, e))?;
    let parsed: TraitsFile = serde_json::from_reader(BufReader::new(file))?;

    let table: TraitTable = parsed
        .nodes
        .into_iter()
        .map(|(name, node)| (name, annotation_for(&node)))
        .collect();

    log::info!("parsed trait annotations for {} nodes from {}", table.len(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn confidence_maps_win_over_bare_values() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"nodes": {{
                "NODE_01": {{
                    "region": "Europe",
                    "region_confidence": {{"Europe": 0.85, "Asia": 0.15}},
                    "country": "France"
                }}
            }}}}"#
        )
        .unwrap();

        let table = parse_traits_file(file.path()).unwrap();
        let annotation = &table["NODE_01"];

        let mut regions = annotation[&GeoScale::Region].clone();
        regions.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            regions,
            vec![("Asia".to_string(), 0.15), ("Europe".to_string(), 0.85)]
        );
        assert_eq!(
            annotation[&GeoScale::Country],
            vec![("France".to_string(), 1.0)]
        );
        assert!(!annotation.contains_key(&GeoScale::Division));
    }

    #[test]
    fn malformed_json_is_typed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            parse_traits_file(file.path()),
            Err(PriorkinError::Json(_))
        ));
    }
}
