use chrono::Local;
use habitloop_storage::{Habit, User};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use super::{emit, NavigationEvent, TaskScope};
use crate::repository::{AuthRepository, HabitRepository, ProfilePictureRepository, QuoteRepository};
use crate::streak::{compute_stats, weekly_progress, WeeklyProgress};

#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ProfileState {
    pub uid: String,
    pub user_name: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub total_habits: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub completion_rate: u32,
    pub weekly_progress: Vec<WeeklyProgress>,
    pub is_motivation_mode_on: bool,
    pub is_dark_mode_on: bool,
    pub is_notifications_enabled: bool,
    pub is_uploading_photo: bool,
    pub motivational_quote: String,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            uid: String::new(),
            user_name: String::new(),
            email: String::new(),
            profile_image_url: None,
            total_habits: 0,
            current_streak: 0,
            longest_streak: 0,
            completion_rate: 0,
            weekly_progress: Vec::new(),
            is_motivation_mode_on: true,
            is_dark_mode_on: true,
            is_notifications_enabled: true,
            is_uploading_photo: false,
            motivational_quote: String::new(),
        }
    }
}

impl ProfileState {
    fn set_user(&mut self, user: Option<&User>) {
        let Some(user) = user else {
            return;
        };
        self.uid.clone_from(&user.uid);
        self.user_name.clone_from(&user.name);
        self.email.clone_from(&user.email);
        self.profile_image_url.clone_from(&user.profile_image_url);
        self.is_motivation_mode_on = user.motivation_mode;
    }

    fn set_habits(&mut self, habits: &[Habit]) {
        let now = Local::now();
        let stats = compute_stats(habits, &now);
        self.total_habits = stats.total_habits;
        self.current_streak = stats.current_streak;
        self.longest_streak = stats.longest_streak;
        self.completion_rate = stats.completion_rate;
        self.weekly_progress = weekly_progress(habits, &now);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileAction {
    ToggleMotivationMode(bool),
    ToggleDarkMode(bool),
    ToggleNotifications(bool),
    ProfileImageSelected { bytes: Vec<u8>, content_type: String },
    Logout,
}

pub struct ProfileStore {
    state: Arc<watch::Sender<ProfileState>>,
    events: mpsc::UnboundedSender<NavigationEvent>,
    auth: Arc<AuthRepository>,
    pictures: Arc<ProfilePictureRepository>,
    watchers: TaskScope,
}

impl ProfileStore {
    /// Build the store and keep its statistics in step with the habit cache.
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn new(
        auth: Arc<AuthRepository>,
        habits: &HabitRepository,
        quotes: &QuoteRepository,
        pictures: Arc<ProfilePictureRepository>,
    ) -> (Self, mpsc::UnboundedReceiver<NavigationEvent>) {
        let mut initial = ProfileState::default();
        initial.set_user(auth.user().as_ref());
        initial.set_habits(&habits.snapshot());
        if let Some(quote) = quotes.current() {
            initial.motivational_quote = quote.text;
        }
        let state = Arc::new(watch::channel(initial).0);

        let mut watchers = TaskScope::default();
        let mut habit_rx = habits.habits();
        let habit_state = state.clone();
        watchers.spawn(async move {
            while habit_rx.changed().await.is_ok() {
                let habits = habit_rx.borrow_and_update().clone();
                habit_state.send_modify(|s| s.set_habits(&habits));
            }
        });
        let mut user_rx = auth.current_user();
        let user_state = state.clone();
        watchers.spawn(async move {
            while user_rx.changed().await.is_ok() {
                let user = user_rx.borrow_and_update().clone();
                user_state.send_modify(|s| s.set_user(user.as_ref()));
            }
        });

        let (events, receiver) = mpsc::unbounded_channel();
        let store = Self {
            state,
            events,
            auth,
            pictures,
            watchers,
        };
        (store, receiver)
    }

    #[must_use]
    pub fn state(&self) -> watch::Receiver<ProfileState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> ProfileState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    pub async fn on_action(&mut self, action: ProfileAction) {
        match action {
            ProfileAction::ToggleMotivationMode(on) => {
                self.state.send_modify(|s| s.is_motivation_mode_on = on);
                if let Some(user) = self.auth.user() {
                    let updated = User {
                        motivation_mode: on,
                        ..user
                    };
                    if let Err(e) = self.auth.update_user(&updated).await {
                        warn!("Failed to save motivation mode: {}", e);
                    }
                }
            }
            ProfileAction::ToggleDarkMode(on) => {
                self.state.send_modify(|s| s.is_dark_mode_on = on);
            }
            ProfileAction::ToggleNotifications(on) => {
                self.state.send_modify(|s| s.is_notifications_enabled = on);
            }
            ProfileAction::ProfileImageSelected {
                bytes,
                content_type,
            } => {
                self.state.send_modify(|s| s.is_uploading_photo = true);
                self.upload_photo(bytes, &content_type).await;
                self.state.send_modify(|s| s.is_uploading_photo = false);
            }
            ProfileAction::Logout => {
                if let Err(e) = self.auth.log_out() {
                    warn!("Failed to clear local data on logout: {}", e);
                }
                emit(&self.events, NavigationEvent::NavigateToLogin);
            }
        }
    }

    async fn upload_photo(&self, bytes: Vec<u8>, content_type: &str) {
        let url = match self.pictures.upload_profile_picture(bytes, content_type).await {
            Ok(url) => url,
            Err(e) => {
                warn!("Failed to upload profile picture: {}", e);
                return;
            }
        };
        let Some(user) = self.auth.user() else {
            return;
        };
        let updated = User {
            profile_image_url: Some(url),
            ..user
        };
        match self.auth.update_user(&updated).await {
            Ok(()) => info!("Profile picture updated"),
            Err(e) => warn!("Failed to save profile picture: {}", e),
        }
        self.state.send_modify(|s| s.set_user(Some(&updated)));
    }
}
