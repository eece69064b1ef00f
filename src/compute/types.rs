//! Compute Stage Types
//!
//! The running aggregate threaded through map and reduce, and the error type
//! for failures the stage catches at the batch boundary.

use thiserror::Error;

/// Streaming statistics for one year.
///
/// A mapper emits one of these per record (describing exactly that record);
/// the reducer folds them together until each year has a single accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialAggregate {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: u64,
}

impl PartialAggregate {
    /// The aggregate describing a single observed score.
    pub fn seed(score: f64) -> Self {
        Self {
            min: score,
            max: score,
            sum: score,
            count: 1,
        }
    }

    /// Folds another aggregate into this one.
    pub fn absorb(&mut self, other: &PartialAggregate) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }
}

/// Failures inside the map-reduce stage.
///
/// These never escape the engine: the server converts them into a structured
/// error response for the client.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("cannot spawn map worker: {0}")]
    SpawnFailed(#[from] std::io::Error),
    #[error("a map worker panicked")]
    WorkerPanicked,
}
