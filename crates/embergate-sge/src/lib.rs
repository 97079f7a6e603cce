//! The SGE login protocol for Embergate.
//!
//! SGE is the legacy gateway protocol spoken before a game connection
//! exists: tab-delimited requests and responses over a pinned TLS socket,
//! one response per request. This crate covers the whole pre-game story:
//!
//! - **Obfuscation** ([`obfuscate`]) — the byte-level password transform
//!   and its one-time salt
//! - **Wire helpers** ([`wire`]) — tab tokenizer and named-field lookup
//! - **Driver** ([`LoginDriver`]) — the authenticate → validate →
//!   confirm → resolve → exchange sequence
//! - **Types** ([`Account`], [`GameCredentials`], ...) — what crosses
//!   this layer's boundary
//!
//! The transport underneath is provided by `embergate-transport`; this
//! crate never opens sockets of its own, which also keeps the protocol
//! testable against in-memory streams.

mod error;
mod login;
pub mod obfuscate;
mod types;
pub mod wire;

pub use error::SgeError;
pub use login::LoginDriver;
pub use types::{
    Account, CharacterDescriptor, Game, GameCredentials, Subscription,
};
