//! The live game-server connection.
//!
//! A reader task owns the read half of the stream and is the only code
//! that mutates the lifecycle flags; application code never flips them
//! directly, so in-flight commands can't race a teardown. Teardown
//! completion is a `watch` signal the reader fulfills exactly once;
//! `disconnect` awaits that signal with a timeout instead of polling.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, mpsc, watch};

use crate::{EventStream, GameEventParser, SessionError};

/// Tuning for one game connection.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// How long `disconnect` waits for the reader task to observe the
    /// socket closing before giving up.
    pub disconnect_timeout: Duration,

    /// Capacity of the event channel between the reader task and the
    /// consumer; a slow consumer backpressures the reader.
    pub event_buffer: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            disconnect_timeout: Duration::from_secs(5),
            event_buffer: 256,
        }
    }
}

/// Lifecycle flags. Written only by the reader task.
///
/// Invariant: immediately after `open`, `connected` and not `destroyed`;
/// after any terminal read-side event, not `connected` and `destroyed`.
#[derive(Debug)]
struct LinkFlags {
    connected: AtomicBool,
    destroyed: AtomicBool,
}

/// Handle to one live game-server connection.
///
/// Created by [`open`](Self::open) over any byte stream: production
/// hands it the pinned TLS stream, tests an in-memory duplex. Dropping
/// the handle does not tear the socket down; call
/// [`disconnect`](Self::disconnect) for an orderly close.
pub struct GameConnection {
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    flags: Arc<LinkFlags>,
    destroyed: watch::Receiver<bool>,
    config: ConnectionConfig,
}

impl GameConnection {
    /// Wires `stream` up: spawns the reader task, connects it to
    /// `parser`, and returns the handle plus the live event stream.
    pub fn open<S, P>(
        stream: S,
        parser: P,
        config: ConnectionConfig,
    ) -> (Self, EventStream<P::Event>)
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
        P: GameEventParser,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let flags = Arc::new(LinkFlags {
            connected: AtomicBool::new(true),
            destroyed: AtomicBool::new(false),
        });
        let (destroyed_tx, destroyed_rx) = watch::channel(false);
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer);

        tokio::spawn(read_loop(
            read_half,
            parser,
            Arc::clone(&flags),
            destroyed_tx,
            event_tx,
        ));

        (
            Self {
                writer: Mutex::new(Box::new(write_half)),
                flags,
                destroyed: destroyed_rx,
                config,
            },
            EventStream::new(event_rx),
        )
    }

    /// Whether the connection is currently up.
    pub fn is_connected(&self) -> bool {
        self.flags.connected.load(Ordering::Acquire)
    }

    /// Whether the connection has been torn down.
    pub fn is_destroyed(&self) -> bool {
        self.flags.destroyed.load(Ordering::Acquire)
    }

    /// Sends one game command, appending the line terminator.
    ///
    /// Silently does nothing when the connection is down. Callers that
    /// need to react to the skip check [`is_connected`](Self::is_connected)
    /// first.
    pub async fn send(&self, command: &str) -> Result<(), SessionError> {
        if !self.is_connected() {
            tracing::debug!("dropping command, connection is down");
            return Ok(());
        }
        let mut writer = self.writer.lock().await;
        writer
            .write_all(command.as_bytes())
            .await
            .map_err(SessionError::Write)?;
        writer.write_all(b"\n").await.map_err(SessionError::Write)?;
        writer.flush().await.map_err(SessionError::Write)
    }

    /// Closes the connection and waits for teardown to complete.
    ///
    /// No-op when already destroyed. Otherwise shuts the write half down
    /// and awaits the reader task's completion signal, bounded by
    /// `disconnect_timeout`.
    ///
    /// # Errors
    /// [`SessionError::DisconnectTimeout`] if the peer never closes its
    /// side within the window.
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        if self.is_destroyed() {
            return Ok(());
        }

        {
            let mut writer = self.writer.lock().await;
            let _ = writer.shutdown().await;
        }

        match tokio::time::timeout(
            self.config.disconnect_timeout,
            self.destroyed.wait_for(|destroyed| *destroyed),
        )
        .await
        {
            Ok(Ok(_)) => {
                tracing::debug!("game connection closed");
                Ok(())
            }
            // The reader fulfills the signal before exiting; a closed
            // channel means teardown already completed.
            Ok(Err(_)) => Ok(()),
            Err(_) => Err(SessionError::DisconnectTimeout),
        }
    }
}

/// Owns the read half: feeds the parser, emits events, and flips the
/// lifecycle flags exactly once on the terminal event.
async fn read_loop<R, P>(
    mut reader: R,
    mut parser: P,
    flags: Arc<LinkFlags>,
    destroyed_tx: watch::Sender<bool>,
    events: mpsc::Sender<P::Event>,
) where
    R: AsyncRead + Unpin,
    P: GameEventParser,
{
    let mut buf = vec![0u8; 8192];
    let mut receiver_gone = false;

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                tracing::debug!("game stream ended");
                break;
            }
            Ok(n) => {
                for event in parser.feed(&buf[..n]) {
                    if receiver_gone {
                        continue;
                    }
                    if events.send(event).await.is_err() {
                        // Consumer dropped the stream; keep draining the
                        // socket so the lifecycle flags still track it.
                        receiver_gone = true;
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "game stream errored");
                break;
            }
        }
    }

    flags.connected.store(false, Ordering::Release);
    flags.destroyed.store(true, Ordering::Release);
    let _ = destroyed_tx.send(true);
}
