use habitloop_storage::User;
use log::warn;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use super::emit;
use crate::notifications::{NotificationScheduler, QUOTE_TAG};
use crate::repository::{AuthRepository, HabitRepository, QuoteRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsState {
    pub notification_sound: bool,
    pub notification_vibration: bool,
    pub notification_frequency: String,
    pub daily_quote_notifications: bool,
}

impl SettingsState {
    fn from_user(user: &User) -> Self {
        Self {
            notification_sound: user.notification_sound,
            notification_vibration: user.notification_vibration,
            notification_frequency: user.notification_frequency.clone(),
            daily_quote_notifications: user.daily_quote_notifications,
        }
    }

    fn apply_to(&self, user: &User) -> User {
        User {
            notification_sound: self.notification_sound,
            notification_vibration: self.notification_vibration,
            notification_frequency: self.notification_frequency.clone(),
            daily_quote_notifications: self.daily_quote_notifications,
            ..user.clone()
        }
    }
}

impl Default for SettingsState {
    fn default() -> Self {
        Self::from_user(&User::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    SoundToggled(bool),
    VibrationToggled(bool),
    FrequencyChanged(String),
    DailyQuoteToggled(bool),
    Backup,
    Restore,
    ClearCache,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    Toast(String),
}

pub struct SettingsStore {
    state: watch::Sender<SettingsState>,
    events: mpsc::UnboundedSender<SettingsEvent>,
    auth: Arc<AuthRepository>,
    habits: Arc<HabitRepository>,
    quotes: Arc<QuoteRepository>,
    scheduler: Arc<NotificationScheduler>,
}

impl SettingsStore {
    #[must_use]
    pub fn new(
        auth: Arc<AuthRepository>,
        habits: Arc<HabitRepository>,
        quotes: Arc<QuoteRepository>,
        scheduler: Arc<NotificationScheduler>,
    ) -> (Self, mpsc::UnboundedReceiver<SettingsEvent>) {
        let initial = auth
            .user()
            .map(|user| SettingsState::from_user(&user))
            .unwrap_or_default();
        let (events, receiver) = mpsc::unbounded_channel();
        let store = Self {
            state: watch::channel(initial).0,
            events,
            auth,
            habits,
            quotes,
            scheduler,
        };
        (store, receiver)
    }

    #[must_use]
    pub fn state(&self) -> watch::Receiver<SettingsState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> SettingsState {
        self.state.borrow().clone()
    }

    fn toast(&self, message: &str) {
        emit(&self.events, SettingsEvent::Toast(message.to_string()));
    }

    pub async fn on_action(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::SoundToggled(on) => {
                self.state.send_modify(|s| s.notification_sound = on);
            }
            SettingsAction::VibrationToggled(on) => {
                self.state.send_modify(|s| s.notification_vibration = on);
            }
            SettingsAction::FrequencyChanged(frequency) => {
                self.state.send_modify(|s| s.notification_frequency = frequency);
            }
            SettingsAction::DailyQuoteToggled(on) => {
                self.state.send_modify(|s| s.daily_quote_notifications = on);
                if on {
                    self.scheduler.schedule_daily_quote(self.quotes.clone());
                } else {
                    self.scheduler.cancel_tag(QUOTE_TAG);
                }
            }
            SettingsAction::Backup => match self.habits.backup().await {
                Ok(_) => self.toast("Backup successful"),
                Err(e) => {
                    warn!("Backup failed: {}", e);
                    self.toast("Backup failed");
                }
            },
            SettingsAction::Restore => match self.habits.restore().await {
                Ok(_) => self.toast("Restore successful"),
                Err(e) => {
                    warn!("Restore failed: {}", e);
                    self.toast("Restore failed");
                }
            },
            SettingsAction::ClearCache => match self.habits.clear().await {
                Ok(_) => self.toast("Cache cleared"),
                Err(e) => {
                    warn!("Clearing habits failed: {}", e);
                    self.toast("Failed to clear cache");
                }
            },
        }
        self.save_preferences().await;
    }

    async fn save_preferences(&self) {
        let Some(user) = self.auth.user() else {
            return;
        };
        let updated = self.current().apply_to(&user);
        if let Err(e) = self.auth.update_user(&updated).await {
            warn!("Failed to save preferences: {}", e);
        }
    }
}
