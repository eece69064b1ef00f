//! Work Dispatch & Retry
//!
//! Sends each file batch to its round-robin-assigned engine and collects the
//! responses.
//!
//! ## Responsibilities
//! - **Assignment**: file `i` always goes to `ports[i % ports.len()]`; a
//!   static policy, not load-aware.
//! - **Fan-out**: one task per file, with in-flight exchanges capped at the
//!   number of engine endpoints.
//! - **Retry**: connection failures, timeouts, protocol failures, and
//!   `{error}` responses are all retried with a fixed delay until the attempt
//!   budget is spent; a file whose budget runs out contributes nothing and
//!   never aborts the rest of the run.

use super::ingestion::FileBatch;
use crate::protocol::framing::{self, ProtocolError};
use crate::protocol::types::{EngineResponse, Record, YearStats};

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};

/// Total attempts per file before the driver gives up on its batch.
const MAX_ATTEMPTS: usize = 3;
/// Pause between consecutive attempts for the same file.
const RETRY_DELAY: Duration = Duration::from_secs(2);
/// Bound on every socket operation against an engine.
const IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry and timeout knobs for one dispatch run.
///
/// The defaults are the production contract; tests shrink the delays.
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    pub max_attempts: usize,
    pub retry_delay: Duration,
    pub io_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            retry_delay: RETRY_DELAY,
            io_timeout: IO_TIMEOUT,
        }
    }
}

/// Connection-level failures; always retryable.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("cannot connect to engine on port {port}: {source}")]
    Connect {
        port: u16,
        source: std::io::Error,
    },
    #[error("engine on port {port} did not respond within {timeout:?}")]
    Timeout { port: u16, timeout: Duration },
}

/// Engine endpoint serving the file at `index` under round-robin assignment.
pub fn assigned_port(index: usize, ports: &[u16]) -> u16 {
    ports[index % ports.len()]
}

/// Dispatches every batch to its assigned engine and awaits all exchanges.
///
/// Returns one entry per batch, in input order: the engine's stats map on
/// success (possibly empty), or `None` when the retry budget was exhausted.
pub async fn dispatch_batches(
    batches: Vec<FileBatch>,
    ports: &[u16],
    config: DispatchConfig,
) -> Vec<Option<HashMap<String, YearStats>>> {
    if ports.is_empty() {
        return batches.into_iter().map(|_| None).collect();
    }

    let limit = Arc::new(Semaphore::new(ports.len()));
    let mut handles = Vec::with_capacity(batches.len());

    for (index, batch) in batches.into_iter().enumerate() {
        let port = assigned_port(index, ports);
        let limit = limit.clone();

        handles.push(tokio::spawn(async move {
            let Ok(_permit) = limit.acquire_owned().await else {
                return None;
            };
            send_with_retry(&batch, port, config).await
        }));
    }

    tracing::info!("Collecting results...");

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::error!("Dispatch task failed: {}", e);
                results.push(None);
            }
        }
    }

    results
}

/// Sends one file batch to the engine on `port`, retrying on any failure.
///
/// Returns `None` once the attempt budget is spent; the missing contribution
/// is logged, never propagated.
pub async fn send_with_retry(
    batch: &FileBatch,
    port: u16,
    config: DispatchConfig,
) -> Option<HashMap<String, YearStats>> {
    tracing::info!("Sending {} to engine on port {}", batch.name, port);

    for attempt in 1..=config.max_attempts {
        match attempt_exchange(&batch.records, port, config.io_timeout).await {
            Ok(stats) => {
                tracing::info!(
                    "Received {} year group(s) for {} from port {}",
                    stats.len(),
                    batch.name,
                    port
                );
                return Some(stats);
            }
            Err(e) => {
                tracing::warn!(
                    "Attempt {}/{} for {} on port {} failed: {:#}",
                    attempt,
                    config.max_attempts,
                    batch.name,
                    port,
                    e
                );
                if attempt < config.max_attempts {
                    sleep(config.retry_delay).await;
                }
            }
        }
    }

    tracing::error!(
        "No results received for {}; giving up after {} attempts",
        batch.name,
        config.max_attempts
    );
    None
}

/// One full request/response exchange with the engine on `port`.
///
/// Every socket operation is bounded by `io_timeout`. An `{error}` response
/// from the engine is a failure here so the caller's retry loop treats it
/// like any other.
async fn attempt_exchange(
    records: &[Record],
    port: u16,
    io_timeout: Duration,
) -> Result<HashMap<String, YearStats>> {
    let addr = format!("127.0.0.1:{port}");

    let mut stream = match timeout(io_timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(ConnectionError::Connect { port, source }.into()),
        Err(_) => return Err(ConnectionError::Timeout { port, timeout: io_timeout }.into()),
    };

    timeout(io_timeout, framing::write_message(&mut stream, records))
        .await
        .map_err(|_| ConnectionError::Timeout { port, timeout: io_timeout })??;

    let expected = timeout(io_timeout, framing::read_header(&mut stream))
        .await
        .map_err(|_| ConnectionError::Timeout { port, timeout: io_timeout })??;

    let payload = timeout(io_timeout, framing::read_payload(&mut stream, expected))
        .await
        .map_err(|_| ConnectionError::Timeout { port, timeout: io_timeout })??;

    let response: EngineResponse = serde_json::from_slice(&payload).map_err(ProtocolError::from)?;

    match response {
        EngineResponse::Stats(stats) => Ok(stats),
        EngineResponse::Failure { error } => Err(anyhow::anyhow!("engine reported: {error}")),
    }
}
