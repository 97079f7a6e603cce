//! Data types that cross the login protocol's boundary.
//!
//! Secret-bearing types redact their sensitive fields in `Debug` so a
//! stray log line can never leak a password or access token.

use std::fmt;

use serde::Deserialize;

/// Inputs for one login attempt: who, with what, into which game, as whom.
///
/// Supplied by the caller (typically read from on-disk preferences); this
/// layer never writes any of it back.
#[derive(Clone, Deserialize)]
pub struct Account {
    /// Account name; uppercased on the wire during authentication.
    pub username: String,
    /// Account password; obfuscated with a one-time salt before it is
    /// ever written to a socket.
    pub password: String,
    /// Which game/instance to log into (e.g. `DR`).
    pub game_code: String,
    /// Display name of the character to play.
    pub character: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("game_code", &self.game_code)
            .field("character", &self.character)
            .finish()
    }
}

/// A game the gateway reports the account may play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// Short identifier used on the wire (e.g. `DR`).
    pub code: String,
    /// Human-readable name.
    pub name: String,
}

/// Subscription standing for one game, as confirmed by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub game: Game,
    /// Raw status token from the gateway (e.g. `NORMAL`).
    pub status: String,
}

/// Server-assigned character identifier paired with the player-chosen
/// display name. The identifier is required for credential exchange but
/// otherwise invisible to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDescriptor {
    pub id: String,
    pub name: String,
}

/// Where to reach the game server, and the token that admits us.
///
/// Produced by a successful login, handed to the session layer, never
/// persisted. The token is sensitive: it is redacted from `Debug` and
/// must never be logged verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct GameCredentials {
    pub host: String,
    pub port: u16,
    pub access_token: String,
}

impl fmt::Debug for GameCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
