use habitloop_remote::QuoteSource;
use habitloop_storage::{Database, Quote};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::Result;

/// Latest cached quote, refreshed from the quotation service
pub struct QuoteRepository {
    db: Arc<Database>,
    source: Arc<dyn QuoteSource>,
    latest: watch::Sender<Option<Quote>>,
}

impl QuoteRepository {
    /// # Errors
    ///
    /// Returns an error if the cached quote cannot be read
    pub fn new(db: Arc<Database>, source: Arc<dyn QuoteSource>) -> Result<Self> {
        let (latest, _) = watch::channel(db.latest_quote()?);
        Ok(Self { db, source, latest })
    }

    #[must_use]
    pub fn latest(&self) -> watch::Receiver<Option<Quote>> {
        self.latest.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> Option<Quote> {
        self.latest.borrow().clone()
    }

    /// Fetch a new quote and cache it. Returns `false` when the service could
    /// not be reached, in which case the previous quote stays current.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetched quote cannot be cached
    pub async fn refresh_quote(&self) -> Result<bool> {
        match self.source.random_quote().await {
            Ok(quote) => {
                self.db.insert_quote(&quote)?;
                info!("Fetched quote by {}", quote.author);
                self.latest.send_replace(Some(quote));
                Ok(true)
            }
            Err(e) => {
                warn!("Failed to fetch quote: {}", e);
                Ok(false)
            }
        }
    }
}
