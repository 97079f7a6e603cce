//! Game connection lifecycle management for Embergate.
//!
//! Once the login driver has produced credentials, this crate owns what
//! happens next:
//!
//! 1. **Connection** ([`GameConnection`]) — one live game-server socket,
//!    its lifecycle flags, and the reader task feeding the text→event
//!    transform
//! 2. **Session** ([`GameSession`]) — credentials plus single-flight
//!    connect/disconnect over that connection
//! 3. **Registry** ([`SessionRegistry`]) — the application-wide
//!    single-session invariant: replacing the active session fully
//!    disconnects its predecessor first
//!
//! The game-text parser is out of scope here; callers supply a
//! [`GameEventParser`] and consume the resulting [`EventStream`].

mod connection;
mod error;
mod parser;
mod registry;
mod session;

pub use connection::{ConnectionConfig, GameConnection};
pub use error::SessionError;
pub use parser::{EventStream, GameEventParser, RawChunks};
pub use registry::SessionRegistry;
pub use session::{GameSession, SessionConfig};
