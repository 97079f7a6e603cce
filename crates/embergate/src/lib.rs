//! # Embergate
//!
//! Client for a legacy game-access gateway: trust-on-first-use
//! certificate pinning, the tab-delimited SGE login protocol, and
//! supervision of the single live game-server connection.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use embergate::{Account, GatewayClient, RawChunks};
//!
//! # async fn run() -> Result<(), embergate::EmbergateError> {
//! let client = GatewayClient::builder().build();
//!
//! let account = Account {
//!     username: "katherine".into(),
//!     password: "...".into(),
//!     game_code: "DR".into(),
//!     character: "Kath".into(),
//! };
//!
//! let credentials = client.login(&account).await?;
//! let mut session = client.session(credentials).await?;
//! let mut events = session.connect(RawChunks).await?;
//!
//! while let Some(chunk) = events.next_event().await {
//!     // feed your game-text parser here
//!     let _ = chunk;
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{
    DEFAULT_GATEWAY_HOST, DEFAULT_GATEWAY_PORT, GatewayClient,
    GatewayClientBuilder,
};
pub use error::EmbergateError;

pub use embergate_session::{
    ConnectionConfig, EventStream, GameConnection, GameEventParser,
    GameSession, RawChunks, SessionConfig, SessionError, SessionRegistry,
};
pub use embergate_sge::{
    Account, CharacterDescriptor, Game, GameCredentials, SgeError,
    Subscription,
};
pub use embergate_transport::{
    PinnedCertificate, SecureTransport, TransportConfig, TransportError,
    TrustStore,
};
