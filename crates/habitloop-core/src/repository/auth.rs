use chrono::Utc;
use habitloop_remote::{AuthService, DocumentStore, SessionHandle};
use habitloop_storage::{Database, User};
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

use super::paths::user_document;
use super::HabitRepository;
use crate::config::SessionFile;
use crate::error::Result;

/// Account lifecycle and the signed-in user's profile
pub struct AuthRepository {
    auth: Arc<dyn AuthService>,
    store: Arc<dyn DocumentStore>,
    db: Arc<Database>,
    session: SessionHandle,
    session_file: Option<SessionFile>,
    habits: Arc<HabitRepository>,
    user: watch::Sender<Option<User>>,
}

impl AuthRepository {
    /// # Errors
    ///
    /// Returns an error if the cached user cannot be read
    pub fn new(
        auth: Arc<dyn AuthService>,
        store: Arc<dyn DocumentStore>,
        db: Arc<Database>,
        session: SessionHandle,
        habits: Arc<HabitRepository>,
    ) -> Result<Self> {
        let cached = match session.uid() {
            Some(uid) => db.get_user(&uid)?,
            None => None,
        };
        let (user, _) = watch::channel(cached);
        Ok(Self {
            auth,
            store,
            db,
            session,
            session_file: None,
            habits,
            user,
        })
    }

    /// Persist the session to `file` on sign-in and remove it on log-out
    #[must_use]
    pub fn with_session_file(mut self, file: SessionFile) -> Self {
        self.session_file = Some(file);
        self
    }

    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.session.uid().is_some()
    }

    fn remember_session(&self) {
        let (Some(file), Some(session)) = (&self.session_file, self.session.current()) else {
            return;
        };
        if let Err(e) = file.save(&session) {
            warn!("Failed to save session: {}", e);
        }
    }

    /// # Errors
    ///
    /// Returns the identity service's `AuthError` kind
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let session = self.auth.sign_in(email, password).await?;
        info!("Signed in as {}", session.email);
        self.session.set(session);
        self.remember_session();

        self.refresh_current_user().await;
        if let Err(e) = self.habits.sync_with_remote().await {
            warn!("Initial habit sync failed: {}", e);
        }
        Ok(())
    }

    /// Create an account and its `users/<uid>` profile document.
    ///
    /// # Errors
    ///
    /// Returns the identity service's `AuthError` kind, or the remote failure
    /// if the profile document cannot be written
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let session = self.auth.sign_up(email, password).await?;
        let user = User::new(session.uid.clone(), name.to_string(), email.to_string());
        self.session.set(session);
        self.remember_session();

        let mut profile = serde_json::to_value(&user)?;
        if let Value::Object(fields) = &mut profile {
            fields.insert("createdAt".to_string(), Value::from(Utc::now().timestamp_millis()));
        }
        self.store.set_document(&user_document(&user.uid), &profile).await?;

        self.db.upsert_user(&user)?;
        info!("Created account {}", user.email);
        self.user.send_replace(Some(user));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the identity service's `AuthError` kind
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        self.auth.send_password_reset(email).await?;
        info!("Password reset email sent to {}", email);
        Ok(())
    }

    /// Forget the session and drop the signed-in user's cached data
    ///
    /// # Errors
    ///
    /// Returns an error if the local cache cannot be cleared
    pub fn log_out(&self) -> Result<()> {
        self.session.clear();
        if let Some(file) = &self.session_file {
            if let Err(e) = file.remove() {
                warn!("Failed to remove saved session: {}", e);
            }
        }
        self.db.clear_users()?;
        self.habits.clear_local()?;
        self.user.send_replace(None);
        info!("Logged out");
        Ok(())
    }

    /// Stream of the cached profile of the signed-in user
    #[must_use]
    pub fn current_user(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    /// Fetch the remote profile once and cache it; failures keep the cached copy
    pub async fn refresh_current_user(&self) {
        let Some(uid) = self.session.uid() else {
            return;
        };

        match self.store.get_document(&user_document(&uid)).await {
            Ok(Some(value)) => match serde_json::from_value::<User>(value) {
                Ok(mut user) => {
                    if user.uid.is_empty() {
                        user.uid.clone_from(&uid);
                    }
                    if let Err(e) = self.db.upsert_user(&user) {
                        warn!("Failed to cache user {}: {}", uid, e);
                    }
                }
                Err(e) => warn!("Failed to decode user {}: {}", uid, e),
            },
            Ok(None) => debug!("No remote profile for {}", uid),
            Err(e) => warn!("Failed to fetch user {}: {}", uid, e),
        }

        match self.db.get_user(&uid) {
            Ok(user) => {
                self.user.send_replace(user);
            }
            Err(e) => warn!("Failed to read cached user {}: {}", uid, e),
        }
    }

    /// Write preferences locally, then to the remote profile document.
    ///
    /// # Errors
    ///
    /// Returns an error if the local write fails, or the remote failure
    pub async fn update_user(&self, user: &User) -> Result<()> {
        self.db.upsert_user(user)?;
        self.user.send_replace(Some(user.clone()));

        if self.session.uid().is_none() {
            debug!("Not signed in, user {} kept local only", user.uid);
            return Ok(());
        }
        let value = serde_json::to_value(user)?;
        self.store.set_document(&user_document(&user.uid), &value).await?;
        Ok(())
    }
}
