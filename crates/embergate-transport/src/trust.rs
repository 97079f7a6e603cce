//! Trust-on-first-use certificate pinning.
//!
//! The gateway presents a self-signed certificate that no public CA will
//! vouch for. Trust is established exactly once per process: a bootstrap
//! connection accepts whatever certificate the peer presents, records it,
//! and every later connection is pinned against those exact bytes.
//!
//! The bootstrap step is intentionally insecure in isolation; its output
//! is what all subsequent handshakes are checked against.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::{
    self,
    pki_types::{CertificateDer, ServerName, UnixTime},
};

use crate::{TransportConfig, TransportError};

/// The one server certificate this process trusts.
///
/// Holds the raw DER bytes plus the validity window parsed out of them.
/// Immutable once built; cloning is cheap enough for the low connection
/// rate this transport sees (a handful of handshakes per login).
#[derive(Debug, Clone)]
pub struct PinnedCertificate {
    der: CertificateDer<'static>,
    valid_from: u64,
    valid_to: u64,
}

impl PinnedCertificate {
    /// Parses the validity window out of `der` and wraps both up.
    ///
    /// # Errors
    /// Returns [`TransportError::CertificateParse`] if the bytes are not
    /// a well-formed X.509 certificate.
    pub fn from_der(
        der: CertificateDer<'static>,
    ) -> Result<Self, TransportError> {
        let (_, parsed) = x509_parser::parse_x509_certificate(der.as_ref())
            .map_err(|e| TransportError::CertificateParse(e.to_string()))?;
        let validity = parsed.validity();
        // The gateway's certificate predates 1970 in no known deployment,
        // but clamp anyway rather than wrap on a hostile timestamp.
        let valid_from = validity.not_before.timestamp().max(0) as u64;
        let valid_to = validity.not_after.timestamp().max(0) as u64;
        Ok(Self {
            der,
            valid_from,
            valid_to,
        })
    }

    /// Builds a pinned certificate from already-known parts.
    ///
    /// Used by tests and by embedders that ship a certificate out of band
    /// instead of bootstrapping it from the wire.
    pub fn new(
        der: CertificateDer<'static>,
        valid_from: u64,
        valid_to: u64,
    ) -> Self {
        Self {
            der,
            valid_from,
            valid_to,
        }
    }

    /// The raw DER bytes future peers are compared against.
    pub fn der(&self) -> &CertificateDer<'static> {
        &self.der
    }

    /// Start of the validity window, seconds since the unix epoch.
    pub fn valid_from(&self) -> u64 {
        self.valid_from
    }

    /// End of the validity window, seconds since the unix epoch.
    pub fn valid_to(&self) -> u64 {
        self.valid_to
    }

    /// Whether `now` falls inside the validity window.
    pub fn covers(&self, now: UnixTime) -> bool {
        let secs = now.as_secs();
        self.valid_from <= secs && secs <= self.valid_to
    }
}

/// Single-slot cache for the trusted gateway certificate.
///
/// The first successful bootstrap fills the slot; every later call returns
/// the cached certificate without touching the network. There is no TTL:
/// the gateway certificate carries a multi-century validity window and the
/// cache lives only as long as the process. [`invalidate`](Self::invalidate)
/// exists for tests and for embedders that need to force a refetch.
pub struct TrustStore {
    slot: Mutex<Option<PinnedCertificate>>,
}

impl TrustStore {
    /// Creates an empty trust store.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Returns the trusted certificate for the gateway, bootstrapping it
    /// on first use.
    ///
    /// Concurrent first calls serialize on the slot, so the fetch runs at
    /// most once per fill. Bootstrap failures propagate without retry;
    /// retry policy belongs to the caller.
    pub async fn trusted_certificate(
        &self,
        host: &str,
        port: u16,
        config: &TransportConfig,
    ) -> Result<PinnedCertificate, TransportError> {
        let mut slot = self.slot.lock().await;
        if let Some(cert) = slot.as_ref() {
            return Ok(cert.clone());
        }

        let cert = fetch_peer_certificate(host, port, config).await?;
        tracing::info!(%host, port, "pinned gateway certificate on first use");
        *slot = Some(cert.clone());
        Ok(cert)
    }

    /// Stores `cert` directly, skipping the bootstrap connection.
    pub async fn prime(&self, cert: PinnedCertificate) {
        *self.slot.lock().await = Some(cert);
    }

    /// Clears the cached certificate so the next call bootstraps again.
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }
}

impl Default for TrustStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Opens a throwaway connection that accepts any certificate, records what
/// the peer presented, and tears the socket down.
async fn fetch_peer_certificate(
    host: &str,
    port: u16,
    config: &TransportConfig,
) -> Result<PinnedCertificate, TransportError> {
    let tcp = crate::tls::dial(host, port, config.connect_timeout).await?;

    let tls_config = rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(BootstrapVerifier))
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(tls_config));
    let name = ServerName::try_from(host.to_string())
        .map_err(|_| TransportError::InvalidServerName(host.to_string()))?;

    let stream = connector.connect(name, tcp).await.map_err(|e| {
        TransportError::Handshake {
            host: host.to_string(),
            source: e,
        }
    })?;

    let (_, session) = stream.get_ref();
    let der = session
        .peer_certificates()
        .and_then(|chain| chain.first())
        .cloned()
        .ok_or_else(|| TransportError::NoPeerCertificate {
            host: host.to_string(),
        })?
        .into_owned();

    // The bootstrap socket never carries traffic.
    drop(stream);

    tracing::debug!(%host, port, "fetched peer certificate for pinning");
    PinnedCertificate::from_der(der)
}

/// Verifier for the bootstrap connection only: accepts whatever the peer
/// presents so its certificate can be captured. Never used after the
/// trust store is filled.
#[derive(Debug)]
struct BootstrapVerifier;

impl rustls::client::danger::ServerCertVerifier for BootstrapVerifier {
    fn verify_server_cert(
        &self,
        _: &CertificateDer<'_>,
        _: &[CertificateDer<'_>],
        _: &ServerName<'_>,
        _: &[u8],
        _: UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error>
    {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _: &[u8],
        _: &CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<
        rustls::client::danger::HandshakeSignatureValid,
        rustls::Error,
    > {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _: &[u8],
        _: &CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<
        rustls::client::danger::HandshakeSignatureValid,
        rustls::Error,
    > {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::ED25519,
        ]
    }
}
