//! Driver Module
//!
//! The client role of the system. The driver loads a dataset of per-file
//! score records, fans the file batches out across a fixed set of engine
//! endpoints, and folds every response into a single report.
//!
//! ## Workflow
//! 1. **Ingestion**: read every eligible score file into an in-memory batch;
//!    an unusable dataset aborts the run before anything is dispatched.
//! 2. **Dispatch**: assign file `i` to engine `i mod engines`, send batches
//!    concurrently with bounded retries, degrade to "no contribution" when an
//!    engine's retry budget is spent.
//! 3. **Merge & Output**: combine per-engine statistics year by year and
//!    write the ascending `year,min,max,avg` report.
//!
//! ## Submodules
//! - **`ingestion`**: dataset discovery and line parsing.
//! - **`dispatch`**: round-robin assignment, the send/receive exchange, and
//!   the retry policy.
//! - **`merge`**: the cross-engine fold and the output artifact.

pub mod dispatch;
pub mod ingestion;
pub mod merge;
