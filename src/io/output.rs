//! Delimited output tables.
//!
//! Three TSVs per run: closest older relatives by tree metric, by genomic
//! metric, and ancestor trait records. Geographic columns are joined from
//! the metadata table by candidate identifier; internal tree nodes have no
//! metadata row and get empty geo columns.

use crate::error::Result;
use crate::io::metadata::Metadata;
use crate::types::{AncestorTraitRecord, DistanceRecord, GeoLocation};
use std::path::{Path, PathBuf};

const TREE_TABLE: &str = "closest_older_tree.tsv";
const GENOMIC_TABLE: &str = "closest_older_genomic.tsv";
const TRAITS_TABLE: &str = "ancestor_traits.tsv";

/// Paths of the three tables written by a run.
#[derive(Debug, Clone)]
pub struct OutputTables {
    pub tree: PathBuf,
    pub genomic: PathBuf,
    pub traits: PathBuf,
}

impl OutputTables {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            tree: dir.join(TREE_TABLE),
            genomic: dir.join(GENOMIC_TABLE),
            traits: dir.join(TRAITS_TABLE),
        }
    }
}

fn geo_fields(metadata: &Metadata, id: &str) -> GeoLocation {
    metadata.geo(id).cloned().unwrap_or_default()
}

/// Write one metric's distance records with candidate geo columns.
pub fn write_distance_table(
    path: &Path,
    records: &[DistanceRecord],
    metadata: &Metadata,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    writer.write_record([
        "query",
        "candidate",
        "metric",
        "distance",
        "region",
        "country",
        "division",
    ])?;
    for record in records {
        let geo = geo_fields(metadata, &record.candidate);
        writer.write_record([
            record.query.as_str(),
            record.candidate.as_str(),
            &record.metric.to_string(),
            &record.distance.to_string(),
            &geo.region,
            &geo.country,
            &geo.division,
        ])?;
    }
    writer.flush().map_err(|e| crate::error::PriorkinError::io(path, e))?;
    log::info!("wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Write ancestor trait records. Geo columns are joined by ancestor id
/// where the ancestor is itself a sampled strain with metadata.
pub fn write_trait_table(
    path: &Path,
    records: &[AncestorTraitRecord],
    metadata: &Metadata,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    writer.write_record([
        "isolate",
        "closest_ancestor",
        "scale",
        "value",
        "confidence",
        "region",
        "country",
        "division",
    ])?;
    for record in records {
        let geo = geo_fields(metadata, &record.ancestor);
        writer.write_record([
            record.isolate.as_str(),
            record.ancestor.as_str(),
            record.scale.as_str(),
            record.value.as_str(),
            &record.confidence.to_string(),
            &geo.region,
            &geo.country,
            &geo.division,
        ])?;
    }
    writer.flush().map_err(|e| crate::error::PriorkinError::io(path, e))?;
    log::info!("wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
