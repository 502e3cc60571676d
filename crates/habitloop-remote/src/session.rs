//! Signed-in session shared between the auth client, the document store and
//! the repositories.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Credentials returned by the identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
}

/// Clonable handle to the current session; every clone sees the same value
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<AuthSession>>>,
}

impl SessionHandle {
    #[must_use]
    pub fn new(session: Option<AuthSession>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<AuthSession> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The signed-in user's id, used as the owner path in the document store
    #[must_use]
    pub fn uid(&self) -> Option<String> {
        self.current().map(|session| session.uid)
    }

    pub fn set(&self, session: AuthSession) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let handle = SessionHandle::default();
        let other = handle.clone();
        assert!(other.uid().is_none());

        handle.set(AuthSession {
            uid: "u1".to_string(),
            email: "a@b.c".to_string(),
            id_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
        });
        assert_eq!(other.uid().as_deref(), Some("u1"));

        other.clear();
        assert!(handle.current().is_none());
    }
}
