/// Errors that can occur in the transport layer.
///
/// Each variant is tagged with the condition that produced it, so callers
/// can tell a pin rejection from an idle socket from an abrupt close.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The TCP connection could not be established.
    #[error("connect to {host}:{port} failed: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// The TCP connection did not come up within the configured window.
    #[error("connect to {host}:{port} timed out")]
    ConnectTimeout { host: String, port: u16 },

    /// The TLS handshake failed. Pin rejections raised by the identity
    /// check also surface here, wrapped by rustls.
    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The peer presented a certificate that does not byte-match the
    /// pinned one.
    #[error("untrusted certificate presented by {host}")]
    UntrustedCertificate { host: String },

    /// The pinned certificate's validity window does not cover the
    /// current time.
    #[error("certificate for {host} is outside its validity window")]
    ExpiredCertificate { host: String },

    /// The bootstrap handshake completed but the peer sent no certificate.
    #[error("no certificate presented by {host}")]
    NoPeerCertificate { host: String },

    /// The peer's certificate could not be parsed as X.509.
    #[error("malformed certificate: {0}")]
    CertificateParse(String),

    /// The host string is not a valid TLS server name.
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// No inbound data arrived within the socket idle timeout.
    #[error("connection idle timeout elapsed")]
    IdleTimeout,

    /// No response arrived within the per-request timeout.
    #[error("request timed out waiting for a response")]
    RequestTimeout,

    /// The peer ended the connection cleanly before responding.
    #[error("connection ended by peer")]
    Ended,

    /// The connection was closed abruptly (reset or aborted).
    #[error("connection closed abruptly")]
    Closed,

    /// Any other socket-level failure.
    #[error("socket error: {0}")]
    Socket(#[source] std::io::Error),
}
