//! In-memory stand-ins for the remote seams.
#![allow(dead_code)]

use async_trait::async_trait;
use habitloop_remote::{
    AuthError, AuthService, AuthSession, DocumentStore, ObjectStorage, QuoteSource, RemoteError,
    RemoteResult, SessionHandle,
};
use habitloop_storage::{Database, Quote};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, Value>>,
    offline: AtomicBool,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn insert(&self, path: &str, value: Value) {
        self.docs.lock().unwrap().insert(path.to_string(), value);
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.docs.lock().unwrap().get(path).cloned()
    }

    pub fn doc_count(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    fn check(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RemoteError::NoInternet)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, path: &str) -> RemoteResult<Option<Value>> {
        self.check()?;
        Ok(self.get(path))
    }

    async fn set_document(&self, path: &str, fields: &Value) -> RemoteResult<()> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert(path, fields.clone());
        Ok(())
    }

    async fn delete_document(&self, path: &str) -> RemoteResult<()> {
        self.check()?;
        self.docs.lock().unwrap().remove(path);
        Ok(())
    }

    async fn list_documents(&self, collection: &str) -> RemoteResult<Vec<(String, Value)>> {
        self.check()?;
        let prefix = format!("{collection}/");
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(path, value)| {
                let id = path.strip_prefix(&prefix)?;
                (!id.contains('/')).then(|| (id.to_string(), value.clone()))
            })
            .collect())
    }
}

pub struct FakeAuth {
    pub password: String,
}

impl FakeAuth {
    pub fn session(email: &str) -> AuthSession {
        AuthSession {
            uid: format!("uid-{email}"),
            email: email.to_string(),
            id_token: "id-token".to_string(),
            refresh_token: "refresh-token".to_string(),
        }
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        if email.starts_with("nobody") {
            return Err(AuthError::UserNotFound);
        }
        if password != self.password {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Self::session(email))
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<AuthSession, AuthError> {
        if email.contains(' ') {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Self::session(email))
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        if email.starts_with("nobody") {
            Err(AuthError::UserNotFound)
        } else {
            Ok(())
        }
    }
    async fn refresh_session(&self, session: &AuthSession) -> Result<AuthSession, AuthError> {
        Ok(AuthSession {
            id_token: "refreshed-token".to_string(),
            ..session.clone()
        })
    }
}

pub struct FakeQuotes {
    pub quote: Option<Quote>,
}

#[async_trait]
impl QuoteSource for FakeQuotes {
    async fn random_quote(&self) -> RemoteResult<Quote> {
        self.quote.clone().ok_or(RemoteError::ServerError)
    }
}

#[derive(Default)]
pub struct FakeObjects {
    pub uploaded: Mutex<Vec<(String, usize, String)>>,
    pub fail: bool,
}

#[async_trait]
impl ObjectStorage for FakeObjects {
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> RemoteResult<()> {
        if self.fail {
            return Err(RemoteError::Forbidden);
        }
        self.uploaded
            .lock()
            .unwrap()
            .push((name.to_string(), bytes.len(), content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, name: &str) -> String {
        format!("https://objects.test/public/{name}")
    }
}

/// Everything a repository or store test needs, wired against fakes
pub struct Fixture {
    pub db: Arc<Database>,
    pub store: Arc<MemoryStore>,
    pub session: SessionHandle,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            db: Arc::new(Database::in_memory().unwrap()),
            store: Arc::new(MemoryStore::default()),
            session: SessionHandle::default(),
        }
    }

    pub fn signed_in(email: &str) -> Self {
        let fixture = Self::new();
        fixture.session.set(FakeAuth::session(email));
        fixture
    }
}
