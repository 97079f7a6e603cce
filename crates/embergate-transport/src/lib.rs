//! Transport layer for Embergate.
//!
//! Provides the pinned-certificate TLS plumbing every other layer rides
//! on:
//!
//! - [`TrustStore`] / [`PinnedCertificate`] — trust-on-first-use
//!   bootstrap and the process-lifetime certificate cache
//! - [`SecureTransport`] / [`PinnedVerifier`] — encrypted connections
//!   that only accept the pinned certificate
//! - [`exchange`] — the request/response correlator for the lock-step
//!   gateway protocol
//!
//! The protocol here is low-volume (a handful of round trips per login),
//! so correctness and exact wire compatibility dominate over throughput.

mod correlate;
mod error;
mod tls;
mod trust;

pub use correlate::exchange;
pub use error::TransportError;
pub use tls::{PinnedVerifier, SecureTransport, pinned_client_config};
pub use trust::{PinnedCertificate, TrustStore};

use std::time::Duration;

/// Timeouts for gateway connections.
///
/// `request_timeout` caps one request/response exchange and is
/// independent of `idle_timeout`, the socket-level quiet limit.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// How long to wait for the TCP connection to come up.
    pub connect_timeout: Duration,

    /// How long the socket may stay quiet while a response is pending.
    pub idle_timeout: Duration,

    /// Default per-exchange cap; individual exchanges may override it.
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(5),
        }
    }
}
