//! Engine TCP Server
//!
//! Runs the accept loop and the per-connection request/response exchange.
//!
//! ## Responsibilities
//! - **Accept loop**: handles one connection at a time; a failed connection
//!   never takes down the listener, only the shutdown signal stops it.
//! - **Timeouts**: each read on an accepted connection is bounded, so a
//!   stalled client cannot hang the engine.
//! - **Error reporting**: every per-connection failure is sent back to the
//!   client as a structured error response when the socket still allows it,
//!   and the connection is closed unconditionally afterwards.

use crate::compute::stage;
use crate::protocol::framing::{self, ProtocolError};
use crate::protocol::types::{EngineResponse, Record};

use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::watch;
use tokio::time::timeout;

/// Bound on each read from an accepted connection.
const READ_TIMEOUT: Duration = Duration::from_secs(30);
/// Accept queue depth for the listener.
const LISTEN_BACKLOG: u32 = 5;

/// A bound engine listener, ready to serve driver requests.
pub struct EngineServer {
    listener: TcpListener,
}

impl EngineServer {
    /// Binds a reusable loopback listener on `port` (0 picks a free port).
    pub fn bind(port: u16) -> anyhow::Result<Self> {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let socket = TcpSocket::new_v4()?;
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(LISTEN_BACKLOG)?;

        Ok(Self { listener })
    }

    /// The address the listener actually bound.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves connections until the shutdown signal changes.
    ///
    /// The signal is only checked between connections; a request already
    /// being served runs to completion before the loop can observe it.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        loop {
            let accepted = tokio::select! {
                accepted = self.listener.accept() => accepted,
                _ = shutdown.changed() => {
                    tracing::info!("Shutting down...");
                    return Ok(());
                }
            };

            match accepted {
                Ok((stream, peer)) => {
                    tracing::info!("Connection from {}", peer);
                    if let Err(e) = handle_connection(stream).await {
                        tracing::warn!("Error processing request from {}: {:#}", peer, e);
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Runs the single request/response exchange for one client connection.
///
/// A request that cannot be read or decoded is answered with an error frame
/// if the socket still accepts one; the error is returned either way so the
/// accept loop can log it.
async fn handle_connection(mut stream: TcpStream) -> anyhow::Result<()> {
    let records = match read_request(&mut stream).await {
        Ok(records) => records,
        Err(e) => {
            let reply = EngineResponse::Failure { error: e.to_string() };
            let _ = framing::write_message(&mut stream, &reply).await;
            return Err(e.into());
        }
    };

    let outcome = tokio::task::spawn_blocking(move || stage::process_batch(&records)).await;

    let response = match outcome {
        Ok(Ok(stats)) => EngineResponse::Stats(
            stats
                .into_iter()
                .map(|(year, entry)| (year.to_string(), entry))
                .collect(),
        ),
        Ok(Err(e)) => {
            tracing::error!("Error processing batch: {}", e);
            EngineResponse::Failure { error: e.to_string() }
        }
        Err(e) => {
            tracing::error!("Batch worker crashed: {}", e);
            EngineResponse::Failure { error: e.to_string() }
        }
    };

    let payload = serde_json::to_vec(&response).map_err(ProtocolError::from)?;
    tracing::info!("Sending response of {} bytes", payload.len());
    framing::write_frame(&mut stream, &payload).await?;

    Ok(())
}

/// Reads one framed record batch, bounding the header and body reads
/// separately with the read timeout.
async fn read_request(stream: &mut TcpStream) -> Result<Vec<Record>, ProtocolError> {
    let expected = timeout(READ_TIMEOUT, framing::read_header(stream))
        .await
        .map_err(|_| ProtocolError::Io(io::ErrorKind::TimedOut.into()))??;

    tracing::info!("Receiving {} bytes", expected);

    let payload = timeout(READ_TIMEOUT, framing::read_payload(stream, expected))
        .await
        .map_err(|_| ProtocolError::Io(io::ErrorKind::TimedOut.into()))??;

    Ok(serde_json::from_slice(&payload)?)
}
