use chrono::{DateTime, Local, TimeZone};
use habitloop_storage::Habit;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use super::{emit, NavigationEvent, TaskScope};
use crate::repository::{AuthRepository, HabitRepository, QuoteRepository};
use crate::streak::{is_completed_today, normalize_to_millis, toggle_completion};

/// A habit row as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitItem {
    pub habit: Habit,
    pub completed_today: bool,
}

impl HabitItem {
    fn new<Tz: TimeZone>(mut habit: Habit, now: &DateTime<Tz>) -> Self {
        habit.last_completed = normalize_to_millis(habit.last_completed);
        let completed_today = is_completed_today(habit.last_completed, now);
        Self {
            habit,
            completed_today,
        }
    }
}

fn to_items(habits: &[Habit]) -> Vec<HabitItem> {
    let now = Local::now();
    habits
        .iter()
        .cloned()
        .map(|habit| HabitItem::new(habit, &now))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub user_name: String,
    pub habits: Vec<HabitItem>,
    pub is_grid_view: bool,
    pub is_refreshing: bool,
    pub quote: String,
    pub quote_author: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    ToggleView(bool),
    HabitClicked(String),
    EditClicked(String),
    Refresh,
}

pub struct DashboardStore {
    state: Arc<watch::Sender<DashboardState>>,
    events: mpsc::UnboundedSender<NavigationEvent>,
    habits: Arc<HabitRepository>,
    quotes: Arc<QuoteRepository>,
    watchers: TaskScope,
    jobs: TaskScope,
}

impl DashboardStore {
    /// Build the store and start following the habit, user and quote streams.
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn new(
        habits: Arc<HabitRepository>,
        auth: &AuthRepository,
        quotes: Arc<QuoteRepository>,
    ) -> (Self, mpsc::UnboundedReceiver<NavigationEvent>) {
        let quote = quotes.current();
        let initial = DashboardState {
            user_name: auth.user().map(|user| user.name).unwrap_or_default(),
            habits: to_items(&habits.snapshot()),
            quote: quote.as_ref().map(|q| q.text.clone()).unwrap_or_default(),
            quote_author: quote.map(|q| q.author).unwrap_or_default(),
            ..DashboardState::default()
        };
        let state = Arc::new(watch::channel(initial).0);
        let (events, receiver) = mpsc::unbounded_channel();

        let mut watchers = TaskScope::default();
        let mut habit_rx = habits.habits();
        let habit_state = state.clone();
        watchers.spawn(async move {
            while habit_rx.changed().await.is_ok() {
                let items = to_items(&habit_rx.borrow_and_update());
                habit_state.send_modify(|s| s.habits = items);
            }
        });

        let mut user_rx = auth.current_user();
        let user_state = state.clone();
        watchers.spawn(async move {
            while user_rx.changed().await.is_ok() {
                let name = user_rx
                    .borrow_and_update()
                    .as_ref()
                    .map(|user| user.name.clone())
                    .unwrap_or_default();
                user_state.send_modify(|s| s.user_name = name);
            }
        });

        let mut quote_rx = quotes.latest();
        let quote_state = state.clone();
        watchers.spawn(async move {
            while quote_rx.changed().await.is_ok() {
                let quote = quote_rx.borrow_and_update().clone();
                if let Some(quote) = quote {
                    quote_state.send_modify(|s| {
                        s.quote = quote.text;
                        s.quote_author = quote.author;
                    });
                }
            }
        });

        let store = Self {
            state,
            events,
            habits,
            quotes,
            watchers,
            jobs: TaskScope::default(),
        };
        (store, receiver)
    }

    #[must_use]
    pub fn state(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub async fn on_action(&mut self, action: DashboardAction) {
        match action {
            DashboardAction::ToggleView(grid) => {
                self.state.send_modify(|s| s.is_grid_view = grid);
            }
            DashboardAction::HabitClicked(id) => self.toggle(&id),
            DashboardAction::EditClicked(id) => {
                emit(&self.events, NavigationEvent::NavigateToEditHabit(id));
            }
            DashboardAction::Refresh => self.refresh().await,
        }
    }

    /// Flip completion in the visible state right away, persist in the background
    fn toggle(&mut self, id: &str) {
        let now = Local::now();
        let clicked = self
            .state
            .borrow()
            .habits
            .iter()
            .find(|item| item.habit.id == id)
            .map(|item| item.habit.clone());
        let Some(habit) = clicked else {
            warn!("Clicked unknown habit {}", id);
            return;
        };

        let toggled = toggle_completion(&habit, &now);
        let item = HabitItem::new(toggled.clone(), &now);
        self.state.send_modify(|s| {
            if let Some(slot) = s.habits.iter_mut().find(|i| i.habit.id == item.habit.id) {
                *slot = item;
            }
        });

        let habits = self.habits.clone();
        self.jobs.spawn(async move {
            if let Err(e) = habits.update_habit(&toggled).await {
                warn!("Failed to save completion of {}: {}", toggled.id, e);
            }
        });
    }

    async fn refresh(&mut self) {
        self.state.send_modify(|s| s.is_refreshing = true);

        if let Err(e) = self.habits.sync_with_remote().await {
            warn!("Habit sync failed, showing cached data: {}", e);
        }
        let items = to_items(&self.habits.snapshot());
        self.state.send_modify(|s| s.habits = items);

        match self.quotes.refresh_quote().await {
            Ok(fresh) => debug!("Quote refreshed: {}", fresh),
            Err(e) => warn!("Failed to cache quote: {}", e),
        }
        if let Some(quote) = self.quotes.current() {
            self.state.send_modify(|s| {
                s.quote = quote.text;
                s.quote_author = quote.author;
            });
        }

        self.state.send_modify(|s| s.is_refreshing = false);
    }

    /// Wait for background saves started by earlier actions
    pub async fn settle(&mut self) {
        self.jobs.settle().await;
    }

    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }
}
