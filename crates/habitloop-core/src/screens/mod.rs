//! UI-agnostic state stores, one per screen.
//!
//! A store owns a `watch` state value, turns actions into new states, and
//! reports one-shot outcomes (navigation, toasts) over an unbounded channel
//! whose single receiver is handed out by the constructor. Background work is
//! spawned into a [`TaskScope`] so it dies with the store.

mod add_habit;
mod auth;
mod dashboard;
mod profile;
mod settings;

pub use add_habit::{AddHabitAction, AddHabitState, AddHabitStore, CATEGORIES};
pub use auth::{
    AuthEvent, CreateAccountAction, CreateAccountState, CreateAccountStore, ForgotPasswordAction,
    ForgotPasswordState, ForgotPasswordStore, LoginAction, LoginState, LoginStore,
};
pub use dashboard::{DashboardAction, DashboardState, DashboardStore, HabitItem};
pub use profile::{ProfileAction, ProfileState, ProfileStore};
pub use settings::{SettingsAction, SettingsEvent, SettingsState, SettingsStore};

use log::{debug, warn};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    NavigateBack,
    NavigateToEditHabit(String),
    NavigateToLogin,
}

/// Tasks bound to a store's lifetime; dropping the scope aborts them
#[derive(Default)]
pub struct TaskScope {
    tasks: JoinSet<()>,
}

impl TaskScope {
    pub fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(fut);
    }

    /// Wait for every spawned task to finish
    pub async fn settle(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    warn!("Background task panicked: {}", e);
                }
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Deliver a one-shot event; a dropped receiver just means nobody is listening
pub(crate) fn emit<E: std::fmt::Debug>(events: &mpsc::UnboundedSender<E>, event: E) {
    if let Err(e) = events.send(event) {
        debug!("Event dropped, no receiver: {:?}", e.0);
    }
}
