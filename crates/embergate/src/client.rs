//! `GatewayClient` builder and the end-to-end login flow.
//!
//! This is the entry point for using Embergate. It ties together all the
//! layers: trust bootstrap → pinned transport → login driver → session.

use embergate_sge::{Account, GameCredentials, LoginDriver};
use embergate_session::{GameSession, SessionConfig};
use embergate_transport::{SecureTransport, TransportConfig, TrustStore};

use crate::EmbergateError;

/// Default gateway host.
pub const DEFAULT_GATEWAY_HOST: &str = "eaccess.play.net";

/// Default gateway port.
pub const DEFAULT_GATEWAY_PORT: u16 = 7900;

/// Builder for configuring a [`GatewayClient`].
///
/// # Example
///
/// ```rust,no_run
/// use embergate::GatewayClient;
///
/// let client = GatewayClient::builder()
///     .gateway("eaccess.play.net", 7900)
///     .build();
/// ```
pub struct GatewayClientBuilder {
    host: String,
    port: u16,
    transport_config: TransportConfig,
    session_config: SessionConfig,
}

impl GatewayClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            host: DEFAULT_GATEWAY_HOST.to_string(),
            port: DEFAULT_GATEWAY_PORT,
            transport_config: TransportConfig::default(),
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the gateway endpoint.
    pub fn gateway(mut self, host: &str, port: u16) -> Self {
        self.host = host.to_string();
        self.port = port;
        self
    }

    /// Sets the transport timeouts.
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = config;
        self
    }

    /// Sets the game-session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Builds the client with an empty trust store; the first login
    /// bootstraps and pins the gateway certificate.
    pub fn build(self) -> GatewayClient {
        GatewayClient {
            host: self.host,
            port: self.port,
            transport_config: self.transport_config,
            session_config: self.session_config,
            trust: TrustStore::new(),
        }
    }
}

impl Default for GatewayClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured gateway client.
///
/// Owns the process-lifetime [`TrustStore`]; every connection this client
/// opens, the login socket and later game sockets alike, is pinned
/// against the same bootstrapped certificate.
pub struct GatewayClient {
    host: String,
    port: u16,
    transport_config: TransportConfig,
    session_config: SessionConfig,
    trust: TrustStore,
}

impl GatewayClient {
    /// Creates a new builder.
    pub fn builder() -> GatewayClientBuilder {
        GatewayClientBuilder::new()
    }

    /// Runs the full login sequence and returns game credentials.
    ///
    /// Bootstraps trust on the first call, then connects a pinned
    /// transport and drives the protocol. The gateway socket is closed
    /// when the driver finishes, success or failure.
    pub async fn login(
        &self,
        account: &Account,
    ) -> Result<GameCredentials, EmbergateError> {
        let pinned = self
            .trust
            .trusted_certificate(&self.host, self.port, &self.transport_config)
            .await?;

        let transport = SecureTransport::connect(
            &self.host,
            self.port,
            &pinned,
            self.transport_config.clone(),
        )
        .await?;
        tracing::info!(
            host = %self.host,
            port = self.port,
            username = %account.username,
            "gateway connected, starting login"
        );

        let driver =
            LoginDriver::with_config(transport.into_stream(), &self.transport_config);
        let credentials = driver.login(account).await?;
        tracing::info!(
            game_host = %credentials.host,
            game_port = credentials.port,
            "login complete"
        );
        Ok(credentials)
    }

    /// Builds a game session for credentials produced by
    /// [`login`](Self::login), pinned against the same certificate.
    pub async fn session(
        &self,
        credentials: GameCredentials,
    ) -> Result<GameSession, EmbergateError> {
        let pinned = self
            .trust
            .trusted_certificate(&self.host, self.port, &self.transport_config)
            .await?;
        Ok(GameSession::new(
            credentials,
            pinned,
            self.session_config.clone(),
        ))
    }

    /// The trust store backing this client's certificate pinning.
    ///
    /// Exposed for embedders that prime a known certificate or need the
    /// manual invalidation hook.
    pub fn trust_store(&self) -> &TrustStore {
        &self.trust
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_public_gateway() {
        let client = GatewayClient::builder().build();
        assert_eq!(client.host, DEFAULT_GATEWAY_HOST);
        assert_eq!(client.port, DEFAULT_GATEWAY_PORT);
    }

    #[test]
    fn test_builder_gateway_overrides_endpoint() {
        let client = GatewayClient::builder()
            .gateway("gateway.test", 7910)
            .build();
        assert_eq!(client.host, "gateway.test");
        assert_eq!(client.port, 7910);
    }
}
