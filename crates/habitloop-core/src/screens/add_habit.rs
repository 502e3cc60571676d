use chrono::{Local, Weekday};
use habitloop_storage::{Frequency, Habit};
use log::info;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use super::{emit, NavigationEvent};
use crate::error::Result;
use crate::notifications::{reminder_tag, NotificationScheduler};
use crate::repository::HabitRepository;
use crate::streak::next_reminder_time;

pub const CATEGORIES: [&str; 4] = ["Health", "Study", "Fitness", "Creative"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddHabitState {
    /// Set when editing an existing habit
    pub editing_id: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub frequency: Frequency,
    pub custom_days: Vec<Weekday>,
    pub reminder_enabled: bool,
    pub reminder_hour: Option<u32>,
    pub reminder_minute: Option<u32>,
    pub is_custom_frequency_dialog_visible: bool,
    pub is_time_picker_visible: bool,
    pub error: Option<String>,
}

impl Default for AddHabitState {
    fn default() -> Self {
        Self {
            editing_id: None,
            title: String::new(),
            description: String::new(),
            category: CATEGORIES[0].to_string(),
            frequency: Frequency::Daily,
            custom_days: Vec::new(),
            reminder_enabled: false,
            reminder_hour: None,
            reminder_minute: None,
            is_custom_frequency_dialog_visible: false,
            is_time_picker_visible: false,
            error: None,
        }
    }
}

impl AddHabitState {
    fn from_habit(habit: &Habit) -> Self {
        Self {
            editing_id: Some(habit.id.clone()),
            title: habit.name.clone(),
            description: habit.description.clone(),
            category: habit.category.clone(),
            frequency: habit.frequency,
            custom_days: habit.custom_days.clone(),
            reminder_enabled: habit.reminder,
            reminder_hour: habit.reminder_hour,
            reminder_minute: habit.reminder_minute,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddHabitAction {
    TitleChanged(String),
    DescriptionChanged(String),
    CategoryChanged(String),
    FrequencyChanged(Frequency),
    ReminderToggled(bool),
    CustomFrequencyClicked,
    CustomFrequencyDismissed,
    CustomDayToggled(Weekday),
    TimePickerClicked,
    TimePickerDismissed,
    TimeSelected { hour: u32, minute: u32 },
    Save,
}

pub struct AddHabitStore {
    state: watch::Sender<AddHabitState>,
    events: mpsc::UnboundedSender<NavigationEvent>,
    habits: Arc<HabitRepository>,
    scheduler: Arc<NotificationScheduler>,
    original: Option<Habit>,
}

impl AddHabitStore {
    /// Open the form, pre-filled from the cache when `editing` names a habit
    ///
    /// # Errors
    ///
    /// Returns an error if the cached habit cannot be read
    pub fn new(
        habits: Arc<HabitRepository>,
        scheduler: Arc<NotificationScheduler>,
        editing: Option<&str>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<NavigationEvent>)> {
        let original = match editing {
            Some(id) => habits.habit(id)?,
            None => None,
        };
        let initial = match (&original, editing) {
            (Some(habit), _) => AddHabitState::from_habit(habit),
            (None, id) => AddHabitState {
                editing_id: id.map(str::to_string),
                ..AddHabitState::default()
            },
        };
        let (events, receiver) = mpsc::unbounded_channel();
        let store = Self {
            state: watch::channel(initial).0,
            events,
            habits,
            scheduler,
            original,
        };
        Ok((store, receiver))
    }

    #[must_use]
    pub fn state(&self) -> watch::Receiver<AddHabitState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> AddHabitState {
        self.state.borrow().clone()
    }

    /// # Errors
    ///
    /// Returns an error if saving fails to write the local cache
    pub async fn on_action(&mut self, action: AddHabitAction) -> Result<()> {
        match action {
            AddHabitAction::TitleChanged(title) => self.state.send_modify(|s| {
                s.title = title;
                s.error = None;
            }),
            AddHabitAction::DescriptionChanged(text) => {
                self.state.send_modify(|s| s.description = text);
            }
            AddHabitAction::CategoryChanged(category) => {
                self.state.send_modify(|s| s.category = category);
            }
            AddHabitAction::FrequencyChanged(frequency) => {
                self.state.send_modify(|s| s.frequency = frequency);
            }
            AddHabitAction::ReminderToggled(on) => {
                self.state.send_modify(|s| s.reminder_enabled = on);
            }
            AddHabitAction::CustomFrequencyClicked => {
                self.state.send_modify(|s| s.is_custom_frequency_dialog_visible = true);
            }
            AddHabitAction::CustomFrequencyDismissed => {
                self.state.send_modify(|s| s.is_custom_frequency_dialog_visible = false);
            }
            AddHabitAction::CustomDayToggled(day) => self.state.send_modify(|s| {
                if let Some(pos) = s.custom_days.iter().position(|d| *d == day) {
                    s.custom_days.remove(pos);
                } else {
                    s.custom_days.push(day);
                }
            }),
            AddHabitAction::TimePickerClicked => {
                self.state.send_modify(|s| s.is_time_picker_visible = true);
            }
            AddHabitAction::TimePickerDismissed => {
                self.state.send_modify(|s| s.is_time_picker_visible = false);
            }
            AddHabitAction::TimeSelected { hour, minute } => self.state.send_modify(|s| {
                s.reminder_hour = Some(hour);
                s.reminder_minute = Some(minute);
                s.is_time_picker_visible = false;
            }),
            AddHabitAction::Save => self.save().await?,
        }
        Ok(())
    }

    fn build_habit(&self, form: &AddHabitState) -> Habit {
        let mut habit = self.original.clone().unwrap_or_else(|| Habit {
            next_occurrence: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            ..Habit::default()
        });
        habit.id = form
            .editing_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        habit.name = form.title.trim().to_string();
        habit.description = form.description.trim().to_string();
        habit.category.clone_from(&form.category);
        habit.frequency = form.frequency;
        habit.custom_days = if form.frequency == Frequency::Custom {
            form.custom_days.clone()
        } else {
            Vec::new()
        };
        habit.reminder = form.reminder_enabled;
        habit.reminder_hour = form.reminder_hour;
        habit.reminder_minute = form.reminder_minute;
        habit
    }

    async fn save(&mut self) -> Result<()> {
        let form = self.current();
        if form.title.trim().is_empty() {
            self.state
                .send_modify(|s| s.error = Some("Habit title cannot be empty".to_string()));
            return Ok(());
        }

        let habit = self.build_habit(&form);
        if self.original.is_some() {
            self.habits.update_habit(&habit).await?;
        } else {
            self.habits.insert_habit(&habit).await?;
        }

        if let Some(previous) = &self.original {
            self.scheduler.cancel_tag(&reminder_tag(&previous.id));
        }
        if let Some((hour, minute)) = habit.reminder_time() {
            if let Some(at) = next_reminder_time(hour, minute, &Local::now()) {
                self.scheduler.schedule_reminder(&habit, &at);
                info!("Reminder for '{}' set for {}", habit.name, at.format("%Y-%m-%d %H:%M"));
            }
        }

        let id = habit.id.clone();
        self.state.send_modify(|s| s.editing_id = Some(id));
        self.original = Some(habit);
        emit(&self.events, NavigationEvent::NavigateBack);
        Ok(())
    }
}
