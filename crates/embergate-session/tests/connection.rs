//! Integration tests for the game connection lifecycle.
//!
//! The peer is the far end of an in-memory duplex, so every test drives
//! the real reader task, the real flags, and the real teardown signal.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

use embergate_session::{
    ConnectionConfig, GameConnection, GameEventParser, RawChunks,
    SessionError,
};

fn config(disconnect_timeout: Duration) -> ConnectionConfig {
    ConnectionConfig {
        disconnect_timeout,
        ..ConnectionConfig::default()
    }
}

/// A well-behaved game server: drains until it sees EOF, then closes.
async fn close_on_eof(mut server: DuplexStream) {
    let mut buf = [0u8; 256];
    while let Ok(n) = server.read(&mut buf).await {
        if n == 0 {
            break;
        }
    }
}

#[tokio::test]
async fn test_open_starts_connected_and_not_destroyed() {
    let (client, _server) = tokio::io::duplex(1024);
    let (conn, _events) =
        GameConnection::open(client, RawChunks, config(Duration::from_secs(5)));

    assert!(conn.is_connected());
    assert!(!conn.is_destroyed());
}

#[tokio::test]
async fn test_events_flow_through_the_parser() {
    let (client, mut server) = tokio::io::duplex(1024);
    let (_conn, mut events) =
        GameConnection::open(client, RawChunks, config(Duration::from_secs(5)));

    server.write_all(b"You see a towering oak.").await.unwrap();

    let event = events.next_event().await.expect("one event");
    assert_eq!(event, b"You see a towering oak.".to_vec());
}

#[tokio::test]
async fn test_stateful_parser_carries_state_across_chunks() {
    /// Line parser: completes an event per newline, buffers the rest.
    #[derive(Default)]
    struct Lines {
        pending: Vec<u8>,
    }

    impl GameEventParser for Lines {
        type Event = String;

        fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
            self.pending.extend_from_slice(chunk);
            let mut out = Vec::new();
            while let Some(pos) =
                self.pending.iter().position(|&b| b == b'\n')
            {
                let line: Vec<u8> =
                    self.pending.drain(..=pos).collect();
                out.push(
                    String::from_utf8_lossy(&line[..line.len() - 1])
                        .into_owned(),
                );
            }
            out
        }
    }

    let (client, mut server) = tokio::io::duplex(1024);
    let (_conn, mut events) = GameConnection::open(
        client,
        Lines::default(),
        config(Duration::from_secs(5)),
    );

    server.write_all(b"first line\nsecond ").await.unwrap();
    server.write_all(b"line\n").await.unwrap();

    assert_eq!(events.next_event().await.unwrap(), "first line");
    assert_eq!(events.next_event().await.unwrap(), "second line");
}

#[tokio::test]
async fn test_peer_eof_flips_flags_and_ends_stream() {
    let (client, server) = tokio::io::duplex(1024);
    let (conn, mut events) =
        GameConnection::open(client, RawChunks, config(Duration::from_secs(5)));

    drop(server);

    // The stream ending is the observable edge of teardown.
    assert!(events.next_event().await.is_none());
    assert!(!conn.is_connected());
    assert!(conn.is_destroyed());
}

#[tokio::test]
async fn test_disconnect_waits_for_full_teardown() {
    let (client, server) = tokio::io::duplex(1024);
    let (mut conn, _events) =
        GameConnection::open(client, RawChunks, config(Duration::from_secs(5)));
    tokio::spawn(close_on_eof(server));

    conn.disconnect().await.expect("orderly disconnect");

    assert!(!conn.is_connected());
    assert!(conn.is_destroyed());
}

#[tokio::test]
async fn test_disconnect_on_destroyed_connection_is_noop() {
    let (client, server) = tokio::io::duplex(1024);
    let (mut conn, mut events) =
        GameConnection::open(client, RawChunks, config(Duration::from_secs(5)));

    drop(server);
    assert!(events.next_event().await.is_none());
    assert!(conn.is_destroyed());

    // Already destroyed: both calls return immediately with Ok.
    conn.disconnect().await.expect("first disconnect is a no-op");
    conn.disconnect().await.expect("second disconnect is a no-op");
    assert!(conn.is_destroyed());
}

#[tokio::test]
async fn test_disconnect_times_out_when_peer_hangs() {
    let (client, _held_open) = tokio::io::duplex(1024);
    let (mut conn, _events) = GameConnection::open(
        client,
        RawChunks,
        config(Duration::from_millis(50)),
    );

    let err = conn.disconnect().await.unwrap_err();
    assert!(matches!(err, SessionError::DisconnectTimeout));
}

#[tokio::test]
async fn test_send_writes_a_terminated_line() {
    let (client, mut server) = tokio::io::duplex(1024);
    let (conn, _events) =
        GameConnection::open(client, RawChunks, config(Duration::from_secs(5)));

    conn.send("look").await.expect("send while connected");

    let mut buf = [0u8; 16];
    let n = server.read(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"look\n");
}

#[tokio::test]
async fn test_send_after_teardown_is_a_silent_noop() {
    let (client, server) = tokio::io::duplex(1024);
    let (conn, mut events) =
        GameConnection::open(client, RawChunks, config(Duration::from_secs(5)));

    drop(server);
    assert!(events.next_event().await.is_none());

    // The command is dropped, not an error.
    conn.send("look").await.expect("send on dead link is a no-op");
    assert!(!conn.is_connected());
}
