//! Error types for the session layer.

use embergate_transport::TransportError;

/// Errors that can occur while managing the live game connection.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The connection did not finish tearing down within the configured
    /// window. The underlying socket may linger until its reader task
    /// observes EOF.
    #[error("disconnect timed out waiting for the connection to close")]
    DisconnectTimeout,

    /// Writing a command to the game stream failed.
    #[error("write to game stream failed: {0}")]
    Write(#[source] std::io::Error),

    /// A transport-level failure while dialing the game server.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
