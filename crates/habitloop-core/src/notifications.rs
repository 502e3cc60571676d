//! Deferred reminder and daily-quote notifications.
//!
//! Each scheduled job is a tokio task tagged by what it is for; cancelling a
//! tag or dropping the scheduler aborts the matching tasks.

use chrono::{DateTime, TimeZone, Utc};
use habitloop_storage::Habit;
use log::{debug, info};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::repository::QuoteRepository;

pub const QUOTE_TAG: &str = "quote";
pub const QUOTE_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Sink that shows a notification to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!("[notification] {}: {}", title, body);
    }
}

/// Tag of a habit's pending reminder; keyed by id since names need not be unique
#[must_use]
pub fn reminder_tag(habit_id: &str) -> String {
    format!("reminder:{habit_id}")
}

struct ScheduledTask {
    tag: String,
    handle: JoinHandle<()>,
}

pub struct NotificationScheduler {
    notifier: Arc<dyn Notifier>,
    tasks: Mutex<Vec<ScheduledTask>>,
}

impl NotificationScheduler {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            tasks: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, tag: String, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.handle.is_finished());
        tasks.push(ScheduledTask { tag, handle });
    }

    /// One-shot reminder for a habit at `at`. Returns `false` and schedules
    /// nothing when `at` is not in the future.
    pub fn schedule_reminder<Tz: TimeZone>(&self, habit: &Habit, at: &DateTime<Tz>) -> bool {
        let delay_ms = at.timestamp_millis() - Utc::now().timestamp_millis();
        let Ok(delay_ms) = u64::try_from(delay_ms) else {
            debug!("Reminder for '{}' is in the past, skipped", habit.name);
            return false;
        };
        if delay_ms == 0 {
            return false;
        }
        self.schedule_reminder_in(habit, Duration::from_millis(delay_ms));
        true
    }

    pub fn schedule_reminder_in(&self, habit: &Habit, delay: Duration) {
        let notifier = self.notifier.clone();
        let body = format!("Time for your habit: {}", habit.name);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            notifier.notify("Habit reminder", &body);
        });
        info!("Scheduled reminder for '{}' in {}s", habit.name, delay.as_secs());
        self.push(reminder_tag(&habit.id), handle);
    }

    /// Recurring quote notification every 24 hours, replacing any previous one
    pub fn schedule_daily_quote(&self, quotes: Arc<QuoteRepository>) {
        self.schedule_quote_every(quotes, QUOTE_PERIOD);
    }

    /// Recurring quote notification; the first one fires after `period`
    pub fn schedule_quote_every(&self, quotes: Arc<QuoteRepository>, period: Duration) {
        self.cancel_tag(QUOTE_TAG);
        let notifier = self.notifier.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if let Err(e) = quotes.refresh_quote().await {
                    debug!("Could not cache quote: {}", e);
                }
                if let Some(quote) = quotes.current() {
                    notifier.notify("Quote of the day", &format!("\"{}\" - {}", quote.text, quote.author));
                }
            }
        });
        self.push(QUOTE_TAG.to_string(), handle);
    }

    /// Abort every task scheduled under `tag`; returns how many were cancelled
    pub fn cancel_tag(&self, tag: &str) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let before = tasks.len();
        tasks.retain(|task| {
            if task.tag == tag {
                task.handle.abort();
                false
            } else {
                true
            }
        });
        before - tasks.len()
    }

    pub fn cancel_all(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.handle.abort();
        }
    }

    /// Number of scheduled tasks that have not fired or been cancelled
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|task| !task.handle.is_finished())
            .count()
    }
}

impl Drop for NotificationScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeQuotes, Fixture};
    use habitloop_storage::Quote;

    fn habit(name: &str) -> Habit {
        Habit::new(name.to_string(), "Health".to_string(), Default::default())
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for Recorder {
        fn notify(&self, title: &str, body: &str) {
            self.seen
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
        }
    }

    #[tokio::test]
    async fn test_reminder_fires_once() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = NotificationScheduler::new(recorder.clone());

        scheduler.schedule_reminder_in(&habit("Walk"), Duration::from_millis(10));
        assert_eq!(scheduler.active_count(), 1);
        tokio::time::sleep(Duration::from_millis(150)).await;

        let seen = recorder.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![("Habit reminder".to_string(), "Time for your habit: Walk".to_string())]);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[tokio::test]
    async fn test_past_reminder_is_ignored() {
        let scheduler = NotificationScheduler::new(Arc::new(LogNotifier));
        let past = Utc::now() - chrono::Duration::minutes(5);
        let walk = habit("Walk");
        assert!(!scheduler.schedule_reminder(&walk, &past));
        assert_eq!(scheduler.active_count(), 0);

        let future = Utc::now() + chrono::Duration::hours(1);
        assert!(scheduler.schedule_reminder(&walk, &future));
        assert_eq!(scheduler.active_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_tag_stops_reminder() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = NotificationScheduler::new(recorder.clone());

        let walk = habit("Walk");
        let other_walk = habit("Walk");
        scheduler.schedule_reminder_in(&walk, Duration::from_millis(50));
        scheduler.schedule_reminder_in(&other_walk, Duration::from_secs(60));
        assert_eq!(scheduler.cancel_tag(&reminder_tag(&walk.id)), 1);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(recorder.seen.lock().unwrap().is_empty());
        assert_eq!(scheduler.active_count(), 1);
        scheduler.cancel_all();
        assert_eq!(scheduler.active_count(), 0);
    }

    #[tokio::test]
    async fn test_quote_job_repeats_and_replaces() {
        let fixture = Fixture::new();
        let quotes = Arc::new(
            QuoteRepository::new(
                fixture.db.clone(),
                Arc::new(FakeQuotes {
                    quote: Some(Quote {
                        text: "Keep going".to_string(),
                        author: "Anon".to_string(),
                    }),
                }),
            )
            .unwrap(),
        );
        let recorder = Arc::new(Recorder::default());
        let scheduler = NotificationScheduler::new(recorder.clone());

        scheduler.schedule_daily_quote(quotes.clone());
        scheduler.schedule_quote_every(quotes, Duration::from_millis(20));
        assert_eq!(scheduler.active_count(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(scheduler.cancel_tag(QUOTE_TAG), 1);

        let seen = recorder.seen.lock().unwrap().clone();
        assert!(seen.len() >= 2);
        assert_eq!(seen[0].1, "\"Keep going\" - Anon");
    }
}
