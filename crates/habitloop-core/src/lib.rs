pub mod app;
pub mod config;
pub mod error;
pub mod notifications;
pub mod repository;
pub mod screens;
pub mod streak;

#[cfg(test)]
pub(crate) mod testing;

pub use app::AppContainer;
pub use error::{Error, Result};
pub use notifications::{LogNotifier, NotificationScheduler, Notifier};
pub use repository::{AuthRepository, HabitRepository, ProfilePictureRepository, QuoteRepository};
pub use streak::{HabitStats, WeeklyProgress};
