//! The session registry: at most one live game session per application.
//!
//! This is an explicitly owned handle, not process-wide state: the
//! application constructs one registry and threads it through its
//! context. Replacing the active session is sequential by contract: the
//! predecessor is fully disconnected before its successor is built.

use crate::{GameSession, SessionError};

/// Single-slot owner of the active [`GameSession`].
pub struct SessionRegistry {
    current: Option<GameSession>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Installs a new session, fully disconnecting the previous one
    /// first. `build` runs only after the predecessor is torn down.
    ///
    /// A disconnect timeout on the predecessor is logged and does not
    /// abort the replacement; the stale socket may linger until its
    /// reader task observes EOF.
    pub async fn replace<F>(&mut self, build: F) -> &mut GameSession
    where
        F: FnOnce() -> GameSession,
    {
        if let Some(mut old) = self.current.take() {
            match old.disconnect().await {
                Ok(()) => {
                    tracing::info!("previous session disconnected");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "previous session did not close cleanly");
                }
            }
        }

        self.current = Some(build());
        self.current.as_mut().expect("just stored")
    }

    /// The active session, if any. Never panics.
    pub fn current(&self) -> Option<&GameSession> {
        self.current.as_ref()
    }

    /// Mutable access to the active session, if any.
    pub fn current_mut(&mut self) -> Option<&mut GameSession> {
        self.current.as_mut()
    }

    /// Disconnects and drops the active session.
    pub async fn shutdown(&mut self) -> Result<(), SessionError> {
        match self.current.take() {
            Some(mut session) => session.disconnect().await,
            None => Ok(()),
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
