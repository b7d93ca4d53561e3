//! Who is signed in.
//!
//! Authentication itself (passwords, OAuth popups) happens in an external
//! identity provider. This module only holds its outcome: an observable auth
//! state that decides which per-user collections are addressable.
//!
//! # Auth States
//!
//! 1. **Loading** - the provider has not reported yet
//! 2. **SignedOut** - nobody is signed in; record operations are no-ops
//! 3. **SignedIn** - a user is signed in; `users/{uid}/...` is addressable

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::watch;

/// Errors for malformed user ids.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserIdError {
    #[error("user id must not be empty")]
    Empty,

    #[error("invalid user id '{0}': must not contain path separators or start with '.'")]
    InvalidCharacters(String),
}

/// A user id that is safe to use as a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, UserIdError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(UserIdError::Empty);
        }
        if id.contains('/') || id.contains('\\') || id.contains("..") || id.starts_with('.') {
            return Err(UserIdError::InvalidCharacters(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserId::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// A signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl User {
    pub fn new(uid: UserId) -> Self {
        Self {
            uid,
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    SignedOut,
    SignedIn(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }
}

/// Shared, observable auth state. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct Session {
    state: std::sync::Arc<watch::Sender<AuthState>>,
}

impl Session {
    /// A session waiting for the identity provider.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(AuthState::Loading);
        Self {
            state: std::sync::Arc::new(sender),
        }
    }

    /// A session already signed in as `user`.
    pub fn signed_in(user: User) -> Self {
        let session = Self::new();
        session.sign_in(user);
        session
    }

    pub fn sign_in(&self, user: User) {
        tracing::debug!("Signed in as {}", user.uid);
        self.state.send_replace(AuthState::SignedIn(user));
    }

    pub fn sign_out(&self) {
        tracing::debug!("Signed out");
        self.state.send_replace(AuthState::SignedOut);
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// Id of the signed-in user, or `None` while loading or signed out.
    pub fn user_id(&self) -> Option<UserId> {
        self.state.borrow().user().map(|user| user.uid.clone())
    }

    /// Receives every auth state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User::new(UserId::new("alice").unwrap()).with_email("alice@example.com")
    }

    #[test]
    fn test_user_id_rejects_path_traversal() {
        assert!(UserId::new("abc123").is_ok());
        assert_eq!(UserId::new(""), Err(UserIdError::Empty));
        assert!(UserId::new("../etc").is_err());
        assert!(UserId::new("a/b").is_err());
        assert!(UserId::new("a\\b").is_err());
        assert!(UserId::new(".hidden").is_err());
    }

    #[test]
    fn test_user_id_serde() {
        let id = UserId::new("uid-42").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"uid-42\"");

        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<UserId>("\"../x\"").is_err());
    }

    #[test]
    fn test_new_session_is_loading() {
        let session = Session::new();
        assert!(session.state().is_loading());
        assert!(session.user_id().is_none());
    }

    #[test]
    fn test_sign_in_and_out() {
        let session = Session::new();
        session.sign_in(alice());
        assert_eq!(session.user_id().unwrap().as_str(), "alice");
        assert_eq!(
            session.current_user().unwrap().email.as_deref(),
            Some("alice@example.com")
        );

        session.sign_out();
        assert_eq!(session.state(), AuthState::SignedOut);
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::new();
        let other = session.clone();
        session.sign_in(alice());
        assert!(other.user_id().is_some());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let session = Session::new();
        let mut rx = session.subscribe();

        session.sign_in(alice());
        rx.changed().await.unwrap();
        assert!(rx.borrow().user().is_some());

        session.sign_out();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), AuthState::SignedOut);
    }
}
