//! Distributed Map-Reduce Library
//!
//! This library crate defines the core modules shared by the two role binaries
//! (`engine` and `driver`).
//!
//! ## Architecture Modules
//! The system is composed of four loosely coupled subsystems:
//!
//! - **`protocol`**: The shared wire layer. Implements the length-prefixed JSON
//!   framing both roles speak over TCP, along with the request/response
//!   message types.
//! - **`compute`**: The map-reduce stage run by engines. Maps records to
//!   per-year seed aggregates on a short-lived worker pool and reduces them
//!   into per-year statistics.
//! - **`engine`**: The server role. Accepts one connection at a time, feeds
//!   the received batch through `compute`, and reports results (or structured
//!   errors) back to the driver.
//! - **`driver`**: The client role. Loads the dataset, partitions score files
//!   across engines round-robin, retries failed exchanges, and merges all
//!   responses into the final report.

pub mod compute;
pub mod driver;
pub mod engine;
pub mod protocol;
