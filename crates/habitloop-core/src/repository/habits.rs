use chrono::{DateTime, TimeZone};
use habitloop_remote::{DocumentStore, SessionHandle};
use habitloop_storage::{Database, Habit};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::watch;

use super::paths::{habit_document, habits_collection};
use crate::error::{Error, Result};
use crate::streak::{compute_stats, HabitStats};

/// Habit cache plus its per-user remote collection
pub struct HabitRepository {
    db: Arc<Database>,
    store: Arc<dyn DocumentStore>,
    session: SessionHandle,
    habits: watch::Sender<Vec<Habit>>,
}

impl HabitRepository {
    /// # Errors
    ///
    /// Returns an error if the cached habits cannot be read
    pub fn new(db: Arc<Database>, store: Arc<dyn DocumentStore>, session: SessionHandle) -> Result<Self> {
        let (habits, _) = watch::channel(db.get_habits()?);
        Ok(Self {
            db,
            store,
            session,
            habits,
        })
    }

    /// Stream of every cached habit; updated after each local write
    #[must_use]
    pub fn habits(&self) -> watch::Receiver<Vec<Habit>> {
        self.habits.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Habit> {
        self.habits.borrow().clone()
    }

    /// # Errors
    ///
    /// Returns an error if the cache query fails
    pub fn habit(&self, id: &str) -> Result<Option<Habit>> {
        Ok(self.db.get_habit(id)?)
    }

    fn publish(&self) -> Result<()> {
        self.habits.send_replace(self.db.get_habits()?);
        Ok(())
    }

    /// Store a new habit locally, then push it to the remote collection.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local write fails; remote failures are logged
    pub async fn insert_habit(&self, habit: &Habit) -> Result<()> {
        self.db.upsert_habit(habit)?;
        self.publish()?;
        info!("Added habit '{}' ({})", habit.name, habit.id);
        self.push_remote(habit).await;
        Ok(())
    }

    /// Replace an existing habit locally, then push it to the remote collection.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local write fails; remote failures are logged
    pub async fn update_habit(&self, habit: &Habit) -> Result<()> {
        self.db.upsert_habit(habit)?;
        self.publish()?;
        debug!("Updated habit {}", habit.id);
        self.push_remote(habit).await;
        Ok(())
    }

    async fn push_remote(&self, habit: &Habit) {
        let Some(uid) = self.session.uid() else {
            debug!("Not signed in, habit {} kept local only", habit.id);
            return;
        };
        let value = match serde_json::to_value(habit) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to encode habit {}: {}", habit.id, e);
                return;
            }
        };
        if let Err(e) = self.store.set_document(&habit_document(&uid, &habit.id), &value).await {
            warn!("Failed to sync habit {} to remote: {}", habit.id, e);
        }
    }

    /// Pull the whole remote collection and upsert it into the cache by id.
    ///
    /// Returns the number of habits written; 0 when signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote listing or the cache write fails
    pub async fn sync_with_remote(&self) -> Result<usize> {
        let Some(uid) = self.session.uid() else {
            debug!("Not signed in, skipping habit sync");
            return Ok(0);
        };

        let documents = self.store.list_documents(&habits_collection(&uid)).await?;
        let mut habits = Vec::with_capacity(documents.len());
        for (id, value) in documents {
            match serde_json::from_value::<Habit>(value) {
                Ok(mut habit) => {
                    if habit.id.is_empty() {
                        habit.id = id;
                    }
                    habits.push(habit);
                }
                Err(e) => warn!("Skipping undecodable remote habit {}: {}", id, e),
            }
        }

        let count = self.db.upsert_habits(&habits)?;
        self.publish()?;
        info!("Synced {} habits from remote", count);
        Ok(count)
    }

    #[must_use]
    pub fn stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> HabitStats {
        compute_stats(&self.snapshot(), now)
    }

    /// Push every cached habit to the remote collection.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without a session, or the first remote failure
    pub async fn backup(&self) -> Result<usize> {
        let uid = self.session.uid().ok_or(Error::NotSignedIn)?;
        let habits = self.db.get_habits()?;
        for habit in &habits {
            let value = serde_json::to_value(habit)?;
            self.store
                .set_document(&habit_document(&uid, &habit.id), &value)
                .await?;
        }
        info!("Backed up {} habits", habits.len());
        Ok(habits.len())
    }

    /// Overwrite cached habits with the remote collection.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without a session, or the remote failure
    pub async fn restore(&self) -> Result<usize> {
        if self.session.uid().is_none() {
            return Err(Error::NotSignedIn);
        }
        self.sync_with_remote().await
    }

    /// Delete every cached habit, then every remote habit document.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be cleared or a remote delete fails
    pub async fn clear(&self) -> Result<usize> {
        let cleared = self.clear_local()?;
        if let Some(uid) = self.session.uid() {
            let collection = habits_collection(&uid);
            for (id, _) in self.store.list_documents(&collection).await? {
                self.store.delete_document(&habit_document(&uid, &id)).await?;
            }
        }
        info!("Cleared {} cached habits", cleared);
        Ok(cleared)
    }

    /// Drop cached habits without touching the remote store
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be cleared
    pub fn clear_local(&self) -> Result<usize> {
        let cleared = self.db.clear_habits()?;
        self.publish()?;
        Ok(cleared)
    }
}
