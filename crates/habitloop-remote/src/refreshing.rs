//! Document store decorator that renews an expired ID token and retries once.

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::error::{RemoteError, RemoteResult};
use crate::session::{AuthSession, SessionHandle};
use crate::traits::{AuthService, DocumentStore};

/// Called with the renewed session so it can be persisted
pub type RefreshHook = Box<dyn Fn(&AuthSession) + Send + Sync>;

pub struct RefreshingStore {
    inner: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthService>,
    session: SessionHandle,
    on_refresh: Option<RefreshHook>,
}

impl RefreshingStore {
    #[must_use]
    pub fn new(
        inner: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthService>,
        session: SessionHandle,
    ) -> Self {
        Self {
            inner,
            auth,
            session,
            on_refresh: None,
        }
    }

    #[must_use]
    pub fn on_refresh(mut self, hook: impl Fn(&AuthSession) + Send + Sync + 'static) -> Self {
        self.on_refresh = Some(Box::new(hook));
        self
    }

    /// Swap in a fresh ID token; `false` when there is nothing to refresh
    /// or the token service refused
    async fn renew(&self) -> bool {
        let Some(current) = self.session.current() else {
            return false;
        };
        match self.auth.refresh_session(&current).await {
            Ok(fresh) => {
                self.session.set(fresh.clone());
                if let Some(hook) = &self.on_refresh {
                    hook(&fresh);
                }
                true
            }
            Err(e) => {
                log::warn!("Session refresh failed, sign in again: {e}");
                false
            }
        }
    }

    async fn with_refresh<T, F, Fut>(&self, op: F) -> RemoteResult<T>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = RemoteResult<T>> + Send,
        T: Send,
    {
        let result = op().await;
        if matches!(result, Err(RemoteError::Unauthorized)) && self.renew().await {
            return op().await;
        }
        result
    }
}

#[async_trait]
impl DocumentStore for RefreshingStore {
    async fn get_document(&self, path: &str) -> RemoteResult<Option<Value>> {
        self.with_refresh(|| self.inner.get_document(path)).await
    }

    async fn set_document(&self, path: &str, fields: &Value) -> RemoteResult<()> {
        self.with_refresh(|| self.inner.set_document(path, fields)).await
    }

    async fn delete_document(&self, path: &str) -> RemoteResult<()> {
        self.with_refresh(|| self.inner.delete_document(path)).await
    }

    async fn list_documents(&self, collection: &str) -> RemoteResult<Vec<(String, Value)>> {
        self.with_refresh(|| self.inner.list_documents(collection)).await
    }
}
