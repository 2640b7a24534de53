//! Metadata table parsing.
//!
//! The metadata TSV (nextstrain layout) carries one row per strain with a
//! `date` column and the geographic columns joined into the output tables.
//! Dates are normalized here, once, through `temporal::normalize_date`.

use crate::error::{PriorkinError, Result};
use crate::temporal::{normalize_date, TemporalIndex};
use crate::types::GeoLocation;
use rustc_hash::FxHashMap;
use std::path::Path;

const STRAIN: &str = "strain";
const DATE: &str = "date";
const GEO_COLUMNS: [&str; 3] = ["region", "country", "division"];

/// Parsed metadata: the temporal index plus per-strain geographic columns.
///
/// A strain whose row has no date is still *present* in the metadata (it
/// keeps its geo columns and satisfies the consistency check) but never
/// enters the temporal index, so it can never be an older candidate.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    temporal: TemporalIndex,
    geo: FxHashMap<String, GeoLocation>,
}

impl Metadata {
    pub fn temporal(&self) -> &TemporalIndex {
        &self.temporal
    }

    /// True when the strain has a metadata row, dated or not.
    pub fn contains(&self, strain: &str) -> bool {
        self.geo.contains_key(strain)
    }

    pub fn geo(&self, strain: &str) -> Option<&GeoLocation> {
        self.geo.get(strain)
    }

    /// Add one dated strain programmatically. The TSV reader funnels
    /// through here; also handy for assembling fixtures.
    pub fn insert(&mut self, strain: &str, date: crate::types::CollectionDate, geo: GeoLocation) {
        self.temporal.insert(strain, date);
        self.geo.insert(strain.to_string(), geo);
    }

    /// Add a strain with no collection date.
    pub fn insert_dateless(&mut self, strain: &str, geo: GeoLocation) {
        self.geo.insert(strain.to_string(), geo);
    }

    pub fn len(&self) -> usize {
        self.geo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geo.is_empty()
    }

    /// Parse a tab-separated metadata table.
    pub fn from_tsv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(PriorkinError::MissingColumn(name))
        };
        let strain_ix = column(STRAIN)?;
        let date_ix = column(DATE)?;
        let geo_ix: Vec<Option<usize>> = GEO_COLUMNS
            .iter()
            .map(|name| headers.iter().position(|h| h == *name))
            .collect();

        let mut metadata = Metadata::default();
        for row in reader.records() {
            let row = row?;
            let Some(strain) = row.get(strain_ix).filter(|s| !s.is_empty()) else {
                continue;
            };
            let field = |ix: Option<usize>| {
                ix.and_then(|i| row.get(i)).unwrap_or_default().to_string()
            };
            let geo = GeoLocation {
                region: field(geo_ix[0]),
                country: field(geo_ix[1]),
                division: field(geo_ix[2]),
            };

            let raw_date = row.get(date_ix).unwrap_or_default();
            if raw_date.is_empty() {
                log::debug!("{strain} has no collection date, it can never be an older candidate");
                metadata.insert_dateless(strain, geo);
                continue;
            }
            metadata.insert(strain, normalize_date(strain, raw_date)?, geo);
        }

        log::info!("parsed metadata for {} strains from {}", metadata.len(), path.display());
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_dates_and_geo_columns() {
        let file = table(
            "strain\tdate\tregion\tcountry\tdivision\n\
             s1\t2020-03-17\tEurope\tFrance\tParis\n\
             s2\t2020-02-XX\tAsia\tJapan\tTokyo\n",
        );
        let metadata = Metadata::from_tsv(file.path()).unwrap();

        assert_eq!(metadata.len(), 2);
        assert_eq!(
            metadata.temporal().date_of("s2"),
            NaiveDate::from_ymd_opt(2020, 2, 1)
        );
        assert_eq!(metadata.geo("s1").unwrap().country, "France");
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let file = table("strain\tregion\ns1\tEurope\n");
        assert!(matches!(
            Metadata::from_tsv(file.path()),
            Err(PriorkinError::MissingColumn("date"))
        ));
    }

    #[test]
    fn dateless_rows_stay_present_but_undated() {
        let file = table("strain\tdate\tregion\ns1\t2020-01-01\tEurope\ns2\t\tAsia\n");
        let metadata = Metadata::from_tsv(file.path()).unwrap();
        assert!(metadata.contains("s1"));
        // present for consistency purposes, never an older candidate
        assert!(metadata.contains("s2"));
        assert_eq!(metadata.geo("s2").unwrap().region, "Asia");
        assert!(metadata.temporal().date_of("s2").is_none());
        assert_eq!(metadata.len(), 2);
    }

    #[test]
    fn geo_columns_are_optional() {
        let file = table("strain\tdate\ns1\t2020-01-01\n");
        let metadata = Metadata::from_tsv(file.path()).unwrap();
        assert_eq!(metadata.geo("s1").unwrap().region, "");
    }
}
