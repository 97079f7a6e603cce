//! The text→event seam and the live event stream.
//!
//! The downstream game-text parser is a collaborator, not part of this
//! crate: callers supply anything that turns raw socket bytes into their
//! own event type, and the session layer treats it as an opaque pipe.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;

/// Turns the raw game-server byte stream into structured events.
///
/// Implementations are stateful (a chunk may end mid-token) and are fed
/// from a single reader task, so `feed` never runs concurrently with
/// itself.
pub trait GameEventParser: Send + 'static {
    /// The event type this parser produces.
    type Event: Send + 'static;

    /// Consumes the next chunk off the socket and returns the events it
    /// completed, which may be none.
    fn feed(&mut self, chunk: &[u8]) -> Vec<Self::Event>;
}

/// Pass-through parser: every raw chunk is one event.
///
/// Useful for callers that want the untouched byte stream, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawChunks;

impl GameEventParser for RawChunks {
    type Event = Vec<u8>;

    fn feed(&mut self, chunk: &[u8]) -> Vec<Self::Event> {
        vec![chunk.to_vec()]
    }
}

/// The live, possibly-infinite sequence of parsed game events.
///
/// Ends (yields `None`) when the underlying connection is destroyed.
pub struct EventStream<E> {
    rx: mpsc::Receiver<E>,
}

impl<E> EventStream<E> {
    pub(crate) fn new(rx: mpsc::Receiver<E>) -> Self {
        Self { rx }
    }

    /// Receives the next event, or `None` once the connection is gone.
    pub async fn next_event(&mut self) -> Option<E> {
        self.rx.recv().await
    }
}

impl<E> Stream for EventStream<E> {
    type Item = E;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_chunks_passes_bytes_through() {
        let mut parser = RawChunks;
        let events = parser.feed(b"abc");
        assert_eq!(events, vec![b"abc".to_vec()]);
    }

    #[tokio::test]
    async fn test_event_stream_ends_when_sender_drops() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = EventStream::new(rx);

        tx.send(1u32).await.unwrap();
        drop(tx);

        assert_eq!(stream.next_event().await, Some(1));
        assert_eq!(stream.next_event().await, None);
    }
}
