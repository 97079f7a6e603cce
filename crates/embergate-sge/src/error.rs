//! Error types for the login protocol layer.

use embergate_transport::TransportError;

/// Errors that can occur while driving the gateway login sequence.
///
/// Every variant is terminal for the current login attempt: there is no
/// automatic retry inside this layer, and the driver tears its transport
/// down before any of these propagate. Reasons and statuses come from the
/// gateway verbatim; passwords and access tokens never appear here.
#[derive(Debug, thiserror::Error)]
pub enum SgeError {
    /// The gateway rejected the credentials. `reason` is the last field
    /// of the rejection response (e.g. `NORECORD`).
    #[error("authentication rejected: {reason}")]
    Authentication { reason: String },

    /// The requested game code is absent from the account's game list.
    #[error("game {code} is not in the account's game list")]
    GameNotFound { code: String },

    /// The gateway flagged a subscription problem for the named game
    /// code or credential-exchange status.
    #[error("subscription problem: {0}")]
    Subscription(String),

    /// No character in the account's list matches the requested name.
    #[error("character {name} not found in the account's character list")]
    CharacterNotFound { name: String },

    /// The credential-exchange response was accepted but one of the
    /// expected fields could not be extracted.
    #[error("could not extract game credentials for {character}")]
    CredentialParse { character: String },

    /// A transport-level failure underneath the protocol.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
