//! Wiring of the cache, the remote backends and the repositories.

use anyhow::{Context, Result};
use habitloop_remote::{
    AuthService, AuthSession, DocumentStore, FirebaseAuthClient, FirestoreClient, ObjectStorage,
    QuoteSource, RefreshingStore, SessionHandle, SupabaseStorage, ZenQuotesClient,
};
use habitloop_storage::Database;
use log::{debug, warn};
use std::sync::Arc;

use crate::config::{get_data_dir, AppConfig, SessionFile};
use crate::notifications::{LogNotifier, NotificationScheduler, Notifier};
use crate::repository::{AuthRepository, HabitRepository, ProfilePictureRepository, QuoteRepository};

/// Remote seams the repositories talk to
pub struct Services {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthService>,
    pub objects: Arc<dyn ObjectStorage>,
    pub quotes: Arc<dyn QuoteSource>,
}

impl Services {
    /// Production backends configured from `config`. Expired ID tokens are
    /// renewed on the first rejected request and written to `session_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created
    pub fn from_config(
        config: &AppConfig,
        session: &SessionHandle,
        session_file: Option<SessionFile>,
    ) -> Result<Self> {
        if config.firebase.project_id.is_empty() {
            warn!("firebase.project_id is not set; remote sync will fail");
        }
        let auth: Arc<dyn AuthService> =
            Arc::new(FirebaseAuthClient::new(config.firebase.api_key.clone())?);
        let firestore = Arc::new(FirestoreClient::new(
            &config.firebase.project_id,
            session.clone(),
        )?);
        let mut store = RefreshingStore::new(firestore, auth.clone(), session.clone());
        if let Some(file) = session_file {
            store = store.on_refresh(persist_session(file));
        }

        Ok(Self {
            store: Arc::new(store),
            auth,
            objects: Arc::new(SupabaseStorage::new(
                &config.supabase.url,
                config.supabase.api_key.clone(),
                config.supabase.bucket.clone(),
            )?),
            quotes: Arc::new(ZenQuotesClient::new(&config.quotes.url)?),
        })
    }
}

fn persist_session(file: SessionFile) -> impl Fn(&AuthSession) + Send + Sync + 'static {
    move |session| {
        if let Err(e) = file.save(session) {
            warn!("Failed to save refreshed session: {}", e);
        }
    }
}

pub struct AppContainer {
    pub db: Arc<Database>,
    pub session: SessionHandle,
    pub habits: Arc<HabitRepository>,
    pub auth: Arc<AuthRepository>,
    pub quotes: Arc<QuoteRepository>,
    pub pictures: Arc<ProfilePictureRepository>,
    pub scheduler: Arc<NotificationScheduler>,
}

impl AppContainer {
    /// Open the default data directory: config, saved session and cache
    ///
    /// # Errors
    ///
    /// Returns an error if the config is malformed or the cache cannot be opened
    pub fn load() -> Result<Self> {
        let config = AppConfig::load()?;
        let session_file = SessionFile::in_data_dir()?;
        let saved = session_file.load().unwrap_or_else(|e| {
            warn!("Ignoring unreadable saved session: {}", e);
            None
        });
        debug!("Data directory: {}", get_data_dir()?.display());

        let session = SessionHandle::new(saved);
        let db = Arc::new(Database::new(None).context("Failed to open habit cache")?);
        let services = Services::from_config(&config, &session, Some(session_file.clone()))?;
        Self::with_services(db, session, Some(session_file), services, Arc::new(LogNotifier))
    }

    /// # Errors
    ///
    /// Returns an error if the cache cannot be read
    pub fn with_services(
        db: Arc<Database>,
        session: SessionHandle,
        session_file: Option<SessionFile>,
        services: Services,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let habits = Arc::new(HabitRepository::new(
            db.clone(),
            services.store.clone(),
            session.clone(),
        )?);
        let mut auth = AuthRepository::new(
            services.auth,
            services.store,
            db.clone(),
            session.clone(),
            habits.clone(),
        )?;
        if let Some(file) = session_file {
            auth = auth.with_session_file(file);
        }
        let quotes = Arc::new(QuoteRepository::new(db.clone(), services.quotes)?);

        Ok(Self {
            db,
            session,
            habits,
            auth: Arc::new(auth),
            quotes,
            pictures: Arc::new(ProfilePictureRepository::new(services.objects)),
            scheduler: Arc::new(NotificationScheduler::new(notifier)),
        })
    }
}
