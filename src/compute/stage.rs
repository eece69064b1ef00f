//! Batch Orchestration
//!
//! Drives one request batch through the map and reduce phases. The map phase
//! runs on a pool of scoped OS threads created for this batch and joined
//! before the function returns; reduce is always sequential.

use super::mapper::map_records;
use super::reducer::{finalize, reduce};
use super::types::{ComputeError, PartialAggregate};
use crate::protocol::types::{Record, YearStats};

use std::collections::HashMap;
use std::thread;

/// Size of the per-batch worker pool: one thread per core, minus one left
/// for the accept loop, never fewer than one.
pub fn worker_count() -> usize {
    let parallelism = thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    parallelism.saturating_sub(1).max(1)
}

/// Runs the full map-reduce over one batch.
///
/// An empty batch yields an empty map without creating any pool. Failures are
/// caught here and returned as `ComputeError`; nothing escapes to the caller.
pub fn process_batch(records: &[Record]) -> Result<HashMap<i32, YearStats>, ComputeError> {
    if records.is_empty() {
        tracing::info!("Received empty batch");
        return Ok(HashMap::new());
    }

    tracing::info!("Processing {} records", records.len());

    let pairs = run_map_phase(records, worker_count())?;
    let stats = finalize(reduce(pairs));

    tracing::info!("Processed {} year groups", stats.len());

    Ok(stats)
}

/// Maps the batch across at most `num_workers` scoped threads.
///
/// The batch is split into contiguous chunks of `ceil(len / num_workers)`
/// records, one chunk per worker (the last chunk may be shorter). Outputs are
/// concatenated in chunk order, so reducing the result is indistinguishable
/// from mapping the batch on a single thread.
pub fn run_map_phase(
    records: &[Record],
    num_workers: usize,
) -> Result<Vec<(i32, PartialAggregate)>, ComputeError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let chunk_size = records.len().div_ceil(num_workers.max(1));

    thread::scope(|scope| {
        let mut handles = Vec::new();
        for chunk in records.chunks(chunk_size) {
            let handle = thread::Builder::new()
                .name("map-worker".to_string())
                .spawn_scoped(scope, move || map_records(chunk))?;
            handles.push(handle);
        }

        // Join every worker before reporting, so a panic in one chunk can't
        // leave another running past the batch boundary.
        let mut panicked = false;
        let mut pairs = Vec::with_capacity(records.len());
        for handle in handles {
            match handle.join() {
                Ok(mapped) => pairs.extend(mapped),
                Err(_) => panicked = true,
            }
        }

        if panicked {
            return Err(ComputeError::WorkerPanicked);
        }

        Ok(pairs)
    })
}
