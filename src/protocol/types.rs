//! Wire Message Types
//!
//! Defines the Data Transfer Objects (DTOs) exchanged between the driver and
//! the engines. These structures are serialized via JSON and sent inside the
//! length-prefixed frames implemented in `framing`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single student score observation, keyed by the year it was recorded.
///
/// Produced by the driver while parsing one line of a score file; a request
/// batch is a JSON array of these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Year the score belongs to.
    pub year: i32,
    /// The raw score value.
    pub score: f64,
}

/// Per-year statistics produced by one engine for one batch.
///
/// `min` and `max` stay real-valued; `avg` is already rounded (half to even)
/// on the engine side. Truncation to whole numbers only happens when the
/// driver writes the final report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
    pub min: f64,
    pub max: f64,
    pub avg: i64,
}

/// The body of an engine response frame.
///
/// Engines answer with either a year-to-statistics map (keys are stringified
/// years, as JSON object keys always are) or an `{"error": ...}` object when
/// the request could not be processed. The two shapes share no fields, so the
/// untagged representation is unambiguous; an empty map decodes as an empty
/// `Stats`, not as a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EngineResponse {
    Failure { error: String },
    Stats(HashMap<String, YearStats>),
}
