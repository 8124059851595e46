use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{BudgetError, Result};

/// Opaque identifier for a signed-in user, as issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Proof of a signed-in user.
///
/// Every operation that touches stored documents takes a `&Session`, so the
/// type system rules out unauthenticated writes. A session can only be built
/// from a [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: UserId,
}

impl Session {
    pub fn new(user: UserId) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }
}

/// Current authentication state as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedIn(Session),
    SignedOut,
}

impl AuthState {
    pub fn signed_in(user: impl Into<String>) -> Self {
        AuthState::SignedIn(Session::new(UserId::new(user)))
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn(_))
    }

    /// The active session, or [`BudgetError::NotSignedIn`] if there is none.
    pub fn session(&self) -> Result<&Session> {
        match self {
            AuthState::SignedIn(session) => Ok(session),
            AuthState::SignedOut => {
                tracing::warn!("ledger operation attempted without a signed-in user");
                Err(BudgetError::NotSignedIn)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_in_state_yields_a_session() {
        let auth = AuthState::signed_in("user-1");
        let session = auth.session().expect("session for signed-in user");
        assert_eq!(session.user().as_str(), "user-1");
    }

    #[test]
    fn signed_out_state_refuses_a_session() {
        let auth = AuthState::SignedOut;
        assert!(matches!(auth.session(), Err(BudgetError::NotSignedIn)));
    }

    #[test]
    fn is_signed_in_tracks_the_variant() {
        assert!(AuthState::signed_in("user-1").is_signed_in());
        assert!(!AuthState::SignedOut.is_signed_in());
    }

    #[test]
    fn user_id_round_trips_as_a_bare_string() {
        let id = UserId::new("abc123");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"abc123\"");
        let back: UserId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
