//! Unified error type for the Embergate client.

use embergate_session::SessionError;
use embergate_sge::SgeError;
use embergate_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `embergate` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate. The
/// `#[from]` attribute on each variant auto-generates `From` impls, so
/// the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum EmbergateError {
    /// A transport-level error (connect, handshake, pin check, timeouts).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A login protocol error (authentication, entitlement, parsing).
    #[error(transparent)]
    Login(#[from] SgeError),

    /// A session-level error (game connection lifecycle).
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::IdleTimeout;
        let top: EmbergateError = err.into();
        assert!(matches!(top, EmbergateError::Transport(_)));
        assert!(top.to_string().contains("idle timeout"));
    }

    #[test]
    fn test_from_login_error() {
        let err = SgeError::GameNotFound { code: "DR".into() };
        let top: EmbergateError = err.into();
        assert!(matches!(top, EmbergateError::Login(_)));
        assert!(top.to_string().contains("DR"));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::DisconnectTimeout;
        let top: EmbergateError = err.into();
        assert!(matches!(top, EmbergateError::Session(_)));
    }
}
