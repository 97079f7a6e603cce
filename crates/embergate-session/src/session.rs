//! One game session: credentials plus the single live connection.

use embergate_sge::GameCredentials;
use embergate_transport::{PinnedCertificate, SecureTransport, TransportConfig};

use crate::{
    ConnectionConfig, EventStream, GameConnection, GameEventParser,
    SessionError,
};

/// Configuration for a game session: how to dial, and how the live
/// connection behaves.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub transport: TransportConfig,
    pub connection: ConnectionConfig,
}

/// Owns the credentials for one character and at most one live game
/// connection at a time.
///
/// `connect` is single-flight: a prior connection is fully disconnected
/// before the new dial begins, so two connect sequences never overlap.
pub struct GameSession {
    credentials: GameCredentials,
    pinned: PinnedCertificate,
    config: SessionConfig,
    link: Option<GameConnection>,
}

impl GameSession {
    /// Builds a session around login credentials and the certificate the
    /// game connection will be pinned against.
    pub fn new(
        credentials: GameCredentials,
        pinned: PinnedCertificate,
        config: SessionConfig,
    ) -> Self {
        Self {
            credentials,
            pinned,
            config,
            link: None,
        }
    }

    /// Test hook: a session wrapped around an already-open connection.
    #[cfg(test)]
    pub(crate) fn with_link(
        credentials: GameCredentials,
        pinned: PinnedCertificate,
        config: SessionConfig,
        link: GameConnection,
    ) -> Self {
        Self {
            credentials,
            pinned,
            config,
            link: Some(link),
        }
    }

    /// Connects to the game server and returns the live event stream.
    ///
    /// Any existing connection is disconnected first. A disconnect
    /// timeout on the old link is logged and does not block the new
    /// connect; the stale socket lingers until its reader observes EOF.
    /// Once the pinned handshake completes, the access token is handed
    /// over as the first line; everything after that belongs to `parser`.
    pub async fn connect<P>(
        &mut self,
        parser: P,
    ) -> Result<EventStream<P::Event>, SessionError>
    where
        P: GameEventParser,
    {
        if let Err(e) = self.disconnect().await {
            tracing::warn!(error = %e, "previous game connection did not close cleanly");
        }

        let transport = SecureTransport::connect(
            &self.credentials.host,
            self.credentials.port,
            &self.pinned,
            self.config.transport.clone(),
        )
        .await?;

        let (link, events) = GameConnection::open(
            transport.into_stream(),
            parser,
            self.config.connection.clone(),
        );
        link.send(&self.credentials.access_token).await?;

        tracing::info!(
            host = %self.credentials.host,
            port = self.credentials.port,
            "game connection established"
        );
        self.link = Some(link);
        Ok(events)
    }

    /// Disconnects the live connection, if any.
    ///
    /// No-op when nothing is connected. The link is released either way;
    /// on timeout the socket may outlive it (see [`SessionError::DisconnectTimeout`]).
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        let Some(mut link) = self.link.take() else {
            return Ok(());
        };
        link.disconnect().await
    }

    /// Forwards one command to the game server; silently does nothing
    /// when no connection is up.
    pub async fn send(&self, command: &str) -> Result<(), SessionError> {
        match &self.link {
            Some(link) => link.send(command).await,
            None => Ok(()),
        }
    }

    /// Whether a live connection is currently up.
    pub fn is_connected(&self) -> bool {
        self.link.as_ref().is_some_and(GameConnection::is_connected)
    }

    /// The credentials this session plays under.
    pub fn credentials(&self) -> &GameCredentials {
        &self.credentials
    }
}
