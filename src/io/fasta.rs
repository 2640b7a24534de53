//! Reference FASTA scanning and per-isolate query extraction.
//!
//! One pass over the reference FASTA collects every record id (for the
//! consistency check) and writes each queried isolate's record to its own
//! file, the unit the mash provider invokes on.

use crate::error::{PriorkinError, Result};
use crate::genome::MashProvider;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Record id: first whitespace-delimited token of the header line.
fn record_id(header: &str) -> &str {
    header[1..].split_whitespace().next().unwrap_or("")
}

/// Scan `fasta` for all record ids and write one query FASTA per isolate
/// in `isolates` into `query_dir`. Returns the full id set.
pub fn extract_query_fastas(
    fasta: &Path,
    isolates: &FxHashSet<String>,
    query_dir: &Path,
) -> Result<FxHashSet<String>> {
    std::fs::create_dir_all(query_dir).map_err(|e| PriorkinError::io(query_dir, e))?;
    let reader = BufReader::new(File::open(fasta).map_err(|e| PriorkinError::io(fasta, e))?);

    let mut ids = FxHashSet::default();
    // sanitized path -> isolate that claimed it; two distinct isolates on
    // one path would silently cross their genomes
    let mut claimed: FxHashMap<PathBuf, String> = FxHashMap::default();
    let mut sink: Option<BufWriter<File>> = None;

    for line in reader.lines() {
        let line = line.map_err(|e| PriorkinError::io(fasta, e))?;
        if line.starts_with('>') {
            let id = record_id(&line);
            ids.insert(id.to_string());
            sink = if isolates.contains(id) {
                let path = MashProvider::query_path(query_dir, id);
                if let Some(first) = claimed.insert(path.clone(), id.to_string()) {
                    if first != id {
                        return Err(PriorkinError::QueryFileCollision {
                            first,
                            second: id.to_string(),
                            path,
                        });
                    }
                }
                let file = File::create(&path).map_err(|e| PriorkinError::io(&path, e))?;
                Some(BufWriter::new(file))
            } else {
                None
            };
        }
        if let Some(writer) = sink.as_mut() {
            writeln!(writer, "{line}").map_err(|e| PriorkinError::io(query_dir, e))?;
        }
    }

    log::info!(
        "scanned {} records from {}, extracted {} query genomes",
        ids.len(),
        fasta.display(),
        isolates.iter().filter(|i| ids.contains(*i)).count()
    );
    Ok(ids)
}
