//! Pinned TLS connections to the gateway and game servers.
//!
//! Every handshake after the bootstrap runs [`PinnedVerifier`]: the peer
//! must present the exact bytes captured by the trust store, and the
//! current time must fall inside that certificate's validity window.
//! Chain building and CA validation never happen. The pin is the trust
//! decision; only the handshake signature is still checked, which proves
//! the peer holds the pinned certificate's private key.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::{
    self,
    crypto::WebPkiSupportedAlgorithms,
    pki_types::{CertificateDer, ServerName, UnixTime},
};

use crate::trust::PinnedCertificate;
use crate::{TransportConfig, TransportError, correlate};

/// Opens a TCP connection bounded by `timeout`.
pub(crate) async fn dial(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<TcpStream, TransportError> {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port)))
        .await
    {
        Err(_) => Err(TransportError::ConnectTimeout {
            host: host.to_string(),
            port,
        }),
        Ok(Err(e)) => Err(TransportError::ConnectFailed {
            host: host.to_string(),
            port,
            source: e,
        }),
        Ok(Ok(stream)) => Ok(stream),
    }
}

/// Certificate verifier that trusts exactly one certificate.
///
/// The identity check runs on every handshake: byte-compare the presented
/// end-entity certificate against the pinned one, then check the validity
/// window. Handshake signatures are verified with the default provider's
/// algorithms.
#[derive(Debug)]
pub struct PinnedVerifier {
    pinned: PinnedCertificate,
    host: String,
    algorithms: WebPkiSupportedAlgorithms,
}

impl PinnedVerifier {
    /// Creates a verifier pinning connections to `host` against `pinned`.
    pub fn new(pinned: PinnedCertificate, host: &str) -> Self {
        Self {
            pinned,
            host: host.to_string(),
            algorithms: rustls::crypto::aws_lc_rs::default_provider()
                .signature_verification_algorithms,
        }
    }

    /// The identity check: pin comparison, then validity window.
    ///
    /// Split out from the rustls trait so it can be exercised directly.
    pub fn check_identity(
        &self,
        peer: &CertificateDer<'_>,
        now: UnixTime,
    ) -> Result<(), TransportError> {
        if peer.as_ref() != self.pinned.der().as_ref() {
            return Err(TransportError::UntrustedCertificate {
                host: self.host.clone(),
            });
        }
        if !self.pinned.covers(now) {
            return Err(TransportError::ExpiredCertificate {
                host: self.host.clone(),
            });
        }
        Ok(())
    }
}

impl rustls::client::danger::ServerCertVerifier for PinnedVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error>
    {
        match self.check_identity(end_entity, now) {
            Ok(()) => {
                Ok(rustls::client::danger::ServerCertVerified::assertion())
            }
            Err(e) => {
                tracing::warn!(host = %self.host, error = %e, "pin check rejected peer certificate");
                Err(rustls::Error::General(e.to_string()))
            }
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<
        rustls::client::danger::HandshakeSignatureValid,
        rustls::Error,
    > {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<
        rustls::client::danger::HandshakeSignatureValid,
        rustls::Error,
    > {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

/// Client config whose only trust anchor is the pinned certificate.
pub fn pinned_client_config(
    pinned: &PinnedCertificate,
    host: &str,
) -> Arc<rustls::ClientConfig> {
    Arc::new(
        rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(
                PinnedVerifier::new(pinned.clone(), host),
            ))
            .with_no_client_auth(),
    )
}

/// An encrypted connection pinned to the trusted certificate.
///
/// Wraps the TLS stream with the request/response correlator and the
/// configured timeouts. The login driver talks through [`exchange`]
/// (Self::exchange); the session layer takes the raw stream over with
/// [`into_stream`](Self::into_stream).
pub struct SecureTransport {
    stream: TlsStream<TcpStream>,
    host: String,
    config: TransportConfig,
}

impl SecureTransport {
    /// Connects to `host:port` and completes a pinned TLS handshake.
    pub async fn connect(
        host: &str,
        port: u16,
        pinned: &PinnedCertificate,
        config: TransportConfig,
    ) -> Result<Self, TransportError> {
        let tcp = dial(host, port, config.connect_timeout).await?;

        let connector =
            TlsConnector::from(pinned_client_config(pinned, host));
        let name = ServerName::try_from(host.to_string()).map_err(|_| {
            TransportError::InvalidServerName(host.to_string())
        })?;

        let stream = connector.connect(name, tcp).await.map_err(|e| {
            TransportError::Handshake {
                host: host.to_string(),
                source: e,
            }
        })?;

        tracing::debug!(%host, port, "pinned TLS session established");
        Ok(Self {
            stream,
            host: host.to_string(),
            config,
        })
    }

    /// Writes `payload` and resolves with the next inbound chunk.
    ///
    /// `request_timeout` overrides the configured per-request timeout for
    /// this call only; the socket idle timeout applies either way.
    pub async fn exchange(
        &mut self,
        payload: &[u8],
        request_timeout: Option<Duration>,
    ) -> Result<Vec<u8>, TransportError> {
        let limit =
            request_timeout.unwrap_or(self.config.request_timeout);
        correlate::exchange(
            &mut self.stream,
            payload,
            self.config.idle_timeout,
            Some(limit),
        )
        .await
    }

    /// Sends a TLS close-notify and shuts the write side down.
    pub async fn shutdown(&mut self) -> Result<(), TransportError> {
        self.stream.shutdown().await.map_err(TransportError::Socket)
    }

    /// The host this transport is connected to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Hands the underlying stream to a caller that owns it from here on.
    pub fn into_stream(self) -> TlsStream<TcpStream> {
        self.stream
    }
}
