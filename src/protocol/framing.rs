//! Length-Prefixed Framing
//!
//! Implements the read/write halves of the wire framing: an 8-byte ASCII
//! decimal length header followed by exactly that many payload bytes. The
//! functions are generic over any async stream so they work against real
//! sockets and in-memory pipes alike. Timeouts are the caller's concern.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Number of bytes in the fixed length header.
pub const HEADER_LEN: usize = 8;
/// Largest payload length the 8-digit decimal header can describe.
pub const MAX_PAYLOAD_LEN: usize = 99_999_999;

/// Failure modes of the wire layer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The peer closed the connection before a full length header arrived.
    #[error("connection closed before a length header arrived")]
    MissingHeader,
    /// The header bytes did not parse as a decimal length.
    #[error("invalid length header {0:?}")]
    InvalidHeader(String),
    /// The peer closed the connection before the declared payload arrived.
    #[error("connection closed mid-payload: expected {expected} bytes, got {received}")]
    Truncated { expected: usize, received: usize },
    /// The payload is too large for its length to fit the header.
    #[error("payload of {0} bytes exceeds the 8-byte length header")]
    OversizedPayload(usize),
    /// The payload arrived intact but did not decode as the expected message.
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Writes one frame: the padded length header, then the payload.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::OversizedPayload(payload.len()));
    }

    let header = format!("{:8}", payload.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;

    Ok(())
}

/// Reads the length header and returns the declared payload size.
pub async fn read_header<R>(reader: &mut R) -> Result<usize, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;

    while filled < HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            return Err(ProtocolError::MissingHeader);
        }
        filled += n;
    }

    let text = String::from_utf8_lossy(&header);
    text.trim()
        .parse::<usize>()
        .map_err(|_| ProtocolError::InvalidHeader(text.into_owned()))
}

/// Reads exactly `expected` payload bytes, looping until they are all in.
///
/// A peer that closes the connection early produces `Truncated` rather than a
/// partial buffer, so callers never deserialize half a payload.
pub async fn read_payload<R>(reader: &mut R, expected: usize) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut payload = vec![0u8; expected];
    let mut received = 0;

    while received < expected {
        let n = reader.read(&mut payload[received..]).await?;
        if n == 0 {
            return Err(ProtocolError::Truncated { expected, received });
        }
        received += n;
    }

    Ok(payload)
}

/// Reads one whole frame and returns its payload bytes.
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let expected = read_header(reader).await?;
    read_payload(reader, expected).await
}

/// Serializes `message` as JSON and writes it as one frame.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_vec(message)?;
    write_frame(writer, &payload).await
}

/// Reads one frame and deserializes its JSON payload into `T`.
pub async fn read_message<R, T>(reader: &mut R) -> Result<T, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let payload = read_frame(reader).await?;
    Ok(serde_json::from_slice(&payload)?)
}
