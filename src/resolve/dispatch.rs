//! Parallel fan-out of per-isolate resolution units.
//!
//! Each unit is a pure function of its isolate over shared read-only
//! inputs, so worker count changes throughput only, never the result set.
//! Fragments are merged after all workers complete.

use crate::error::{PriorkinError, Result};
use crate::types::{DistanceRecord, FailurePolicy};
use rayon::prelude::*;

/// Merged result of one batch under one metric.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub records: Vec<DistanceRecord>,
    /// Isolates skipped under [`FailurePolicy::Skip`], by name.
    pub skipped: Vec<String>,
}

/// Run `unit` once per isolate across a pool of `workers` threads
/// (0 = one per available CPU) and merge the fragments.
///
/// Fatal per-isolate errors are handled per `policy`: `Abort` fails the
/// batch with the first such error in input order, `Skip` logs the isolate
/// by name and records it in the skip list. Skipping is never silent.
pub fn resolve_batch<F>(
    isolates: &[String],
    workers: usize,
    policy: FailurePolicy,
    unit: F,
) -> Result<BatchOutcome>
where
    F: Fn(&str) -> Result<Vec<DistanceRecord>> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| PriorkinError::WorkerPool(e.to_string()))?;

    let fragments: Vec<(usize, Result<Vec<DistanceRecord>>)> = pool.install(|| {
        isolates
            .par_iter()
            .enumerate()
            .map(|(i, isolate)| (i, unit(isolate)))
            .collect()
    });

    let mut outcome = BatchOutcome::default();
    for (i, fragment) in fragments {
        match fragment {
            Ok(records) => outcome.records.extend(records),
            Err(err) => match policy {
                FailurePolicy::Abort => return Err(err),
                FailurePolicy::Skip => {
                    log::warn!("skipping {}: {err}", isolates[i]);
                    outcome.skipped.push(isolates[i].clone());
                }
            },
        }
    }
    Ok(outcome)
}
