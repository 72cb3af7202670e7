//! Gateway session identity.
//!
//! The bot only learns its own user ID (and so its mention string) once the
//! gateway reports it ready. Both the identity and the operator are written
//! exactly once and only read afterwards, so concurrent dispatches never race
//! with the ready handler.

use std::sync::OnceLock;

use log::{debug, info};

/// The bot's own identity on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Bot user ID
    pub user_id: u64,
    /// Mention string accepted as an invocation prefix, e.g. `<@1234>`
    pub mention: String,
}

impl Identity {
    pub fn new(user_id: u64) -> Self {
        Identity {
            user_id,
            mention: format!("<@{user_id}>"),
        }
    }
}

/// Write-once session state shared by every dispatch.
#[derive(Debug, Default)]
pub struct Session {
    /// Bot identity, set on the first ready event
    identity: OnceLock<Identity>,
    /// User allowed to run maintenance commands
    operator: OnceLock<u64>,
}

impl Session {
    /// Creates a session with an operator known upfront (from configuration).
    pub fn with_operator(operator: Option<u64>) -> Self {
        let session = Session::default();
        if let Some(operator) = operator {
            let _ = session.operator.set(operator);
        }
        session
    }

    /// Records the bot identity. Later calls (gateway reconnections) are ignored.
    pub fn init_identity(&self, identity: Identity) {
        match self.identity.set(identity) {
            Ok(()) => info!("session identity initialized"),
            Err(identity) => debug!("session identity already set, ignoring {:?}", identity),
        }
    }

    /// Records the operator unless one is already known.
    pub fn init_operator(&self, operator: u64) {
        if self.operator.set(operator).is_ok() {
            info!("maintenance operator set to {}", operator);
        }
    }

    /// Returns the bot identity, `None` before the gateway is ready.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.get()
    }

    pub fn operator(&self) -> Option<u64> {
        self.operator.get().copied()
    }

    /// Whether the operator is known to be set.
    pub fn has_operator(&self) -> bool {
        self.operator.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mention() {
        assert_eq!(Identity::new(42).mention, "<@42>");
    }

    #[test]
    fn test_identity_is_write_once() {
        let session = Session::default();
        assert!(session.identity().is_none());

        session.init_identity(Identity::new(1));
        session.init_identity(Identity::new(2));

        assert_eq!(session.identity(), Some(&Identity::new(1)));
    }

    #[test]
    fn test_configured_operator_wins() {
        let session = Session::with_operator(Some(7));
        session.init_operator(8);
        assert_eq!(session.operator(), Some(7));
    }

    #[test]
    fn test_operator_from_ready() {
        let session = Session::with_operator(None);
        assert!(!session.has_operator());
        session.init_operator(8);
        assert_eq!(session.operator(), Some(8));
    }
}
