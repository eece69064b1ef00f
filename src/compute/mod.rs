//! Engine Compute Module
//!
//! Implements the map-reduce stage that turns one request batch of records
//! into per-year statistics.
//!
//! ## Architecture Overview
//! Processing follows the classic two-phase shape:
//! 1. **Map**: each record becomes a `(year, seed aggregate)` pair. The batch
//!    is split into contiguous chunks and mapped in parallel on a worker pool
//!    created for this batch alone.
//! 2. **Reduce**: a single sequential pass folds all mapped pairs into one
//!    accumulator per year, then finalizes each accumulator into its reported
//!    statistics (min, max, rounded average).
//!
//! The pool is sized to the machine's parallelism minus one core and is torn
//! down when the batch completes; nothing is shared between requests. Any
//! failure inside the stage is caught at the batch boundary and handed back
//! as a `ComputeError`, which the server reports to the client instead of
//! crashing.
//!
//! ## Submodules
//! - **`mapper`**: the pure per-record map function.
//! - **`reducer`**: the sequential fold and the statistics finalizer.
//! - **`stage`**: batch orchestration (chunking, worker pool, join).
//! - **`types`**: the running aggregate and the stage's error type.

pub mod mapper;
pub mod reducer;
pub mod stage;
pub mod types;

#[cfg(test)]
mod tests;
