//! Request/response correlation over a stream-oriented socket.
//!
//! The gateway protocol is strictly lock-step: one request goes out, the
//! next inbound chunk is its response. [`exchange`] encodes that contract.
//! It writes the payload, then resolves with the first of inbound data,
//! clean end, abrupt close, idle timeout, or socket error. Exactly one
//! outcome per call; every other pending path is dropped on resolution.

use std::io::ErrorKind;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::TransportError;

/// Upper bound on a single response chunk. Gateway responses are a few
/// hundred bytes; anything near this limit is malformed.
const MAX_CHUNK: usize = 8 * 1024;

/// Writes `payload`, then resolves with the next inbound chunk.
///
/// `idle_timeout` is the socket-level quiet limit. `request_timeout`, when
/// given, is an independent cap on this one exchange; its timer is simply
/// dropped when any other path resolves first.
///
/// # Errors
/// - [`TransportError::Ended`] — peer closed cleanly before responding
/// - [`TransportError::Closed`] — reset or aborted mid-exchange
/// - [`TransportError::IdleTimeout`] / [`TransportError::RequestTimeout`]
/// - [`TransportError::Socket`] — any other I/O failure
pub async fn exchange<S>(
    stream: &mut S,
    payload: &[u8],
    idle_timeout: Duration,
    request_timeout: Option<Duration>,
) -> Result<Vec<u8>, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(payload)
        .await
        .map_err(TransportError::Socket)?;
    stream.flush().await.map_err(TransportError::Socket)?;

    match request_timeout {
        Some(limit) => {
            match tokio::time::timeout(
                limit,
                read_next_chunk(stream, idle_timeout),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(TransportError::RequestTimeout),
            }
        }
        None => read_next_chunk(stream, idle_timeout).await,
    }
}

/// Resolves with the next chunk the peer sends, or the terminal condition
/// that arrived instead.
async fn read_next_chunk<S>(
    stream: &mut S,
    idle_timeout: Duration,
) -> Result<Vec<u8>, TransportError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; MAX_CHUNK];
    match tokio::time::timeout(idle_timeout, stream.read(&mut buf)).await {
        Err(_) => Err(TransportError::IdleTimeout),
        Ok(Ok(0)) => Err(TransportError::Ended),
        Ok(Ok(n)) => {
            buf.truncate(n);
            Ok(buf)
        }
        Ok(Err(e))
            if matches!(
                e.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
            ) =>
        {
            Err(TransportError::Closed)
        }
        Ok(Err(e)) => Err(TransportError::Socket(e)),
    }
}
