/// Habit management command handlers
use anyhow::Result;
use clap::Subcommand;
use habitloop_core::screens::{
    AddHabitAction, AddHabitStore, DashboardAction, DashboardStore, HabitItem, NavigationEvent,
};
use habitloop_core::AppContainer;
use habitloop_storage::{Frequency, Habit};
use tabled::{Table, Tabled};

use super::helpers::{parse_time, parse_weekdays, resolve_habit, truncate_str};

#[derive(Subcommand, Debug)]
pub enum HabitAction {
    /// Add a new habit
    Add {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "Health")]
        category: String,
        /// Daily, Weekly or Custom
        #[arg(short, long, default_value = "Daily")]
        frequency: String,
        /// Weekdays for a Custom frequency, e.g. mon,wed,fri
        #[arg(long)]
        days: Option<String>,
        /// Daily reminder time (HH:MM)
        #[arg(short, long)]
        remind: Option<String>,
    },
    /// Edit an existing habit (id or unique id prefix)
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        frequency: Option<String>,
        #[arg(long)]
        days: Option<String>,
        /// Reminder time (HH:MM)
        #[arg(short, long)]
        remind: Option<String>,
        /// Turn the reminder off
        #[arg(long, conflicts_with = "remind")]
        no_remind: bool,
    },
    /// List habits and today's completion
    List {
        /// Show habits as compact cards
        #[arg(short, long)]
        grid: bool,
    },
    /// Mark a habit done for today, or undo today's completion
    Toggle { id: String },
}

#[derive(Tabled)]
struct HabitRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Habit")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Frequency")]
    frequency: String,
    #[tabled(rename = "Reminder")]
    reminder: String,
    #[tabled(rename = "Streak")]
    streak: u32,
    #[tabled(rename = "Today")]
    today: &'static str,
}

impl From<&HabitItem> for HabitRow {
    fn from(item: &HabitItem) -> Self {
        let habit = &item.habit;
        let frequency = if habit.frequency == Frequency::Custom {
            let days: Vec<String> = habit.custom_days.iter().map(ToString::to_string).collect();
            format!("Custom ({})", days.join(","))
        } else {
            habit.frequency.to_string()
        };
        Self {
            id: habit.id.chars().take(8).collect(),
            name: truncate_str(&habit.name, 30),
            category: habit.category.clone(),
            frequency,
            reminder: habit
                .reminder_time()
                .map(|(h, m)| format!("{h:02}:{m:02}"))
                .unwrap_or_default(),
            streak: habit.streak,
            today: if item.completed_today { "done" } else { "-" },
        }
    }
}

pub async fn handle_habit_command(app: &AppContainer, action: HabitAction) -> Result<()> {
    match action {
        HabitAction::Add {
            name,
            description,
            category,
            frequency,
            days,
            remind,
        } => {
            let mut actions = vec![
                AddHabitAction::TitleChanged(name),
                AddHabitAction::DescriptionChanged(description),
                AddHabitAction::CategoryChanged(category),
                AddHabitAction::FrequencyChanged(Frequency::parse_lenient(&frequency)),
            ];
            push_schedule_actions(&mut actions, days.as_deref(), remind.as_deref(), false)?;
            save_form(app, None, actions).await
        }
        HabitAction::Edit {
            id,
            name,
            description,
            category,
            frequency,
            days,
            remind,
            no_remind,
        } => {
            let id = resolve_habit(&app.habits.snapshot(), &id)?.id.clone();
            let mut actions = Vec::new();
            if let Some(name) = name {
                actions.push(AddHabitAction::TitleChanged(name));
            }
            if let Some(description) = description {
                actions.push(AddHabitAction::DescriptionChanged(description));
            }
            if let Some(category) = category {
                actions.push(AddHabitAction::CategoryChanged(category));
            }
            if let Some(frequency) = frequency {
                actions.push(AddHabitAction::FrequencyChanged(Frequency::parse_lenient(
                    &frequency,
                )));
            }
            push_schedule_actions(&mut actions, days.as_deref(), remind.as_deref(), no_remind)?;
            save_form(app, Some(&id), actions).await
        }
        HabitAction::List { grid } => {
            let (mut store, _events) =
                DashboardStore::new(app.habits.clone(), &app.auth, app.quotes.clone());
            store.on_action(DashboardAction::ToggleView(grid)).await;
            print_dashboard(&store);
            Ok(())
        }
        HabitAction::Toggle { id } => {
            let habit = resolve_habit(&app.habits.snapshot(), &id)?.clone();
            let (mut store, _events) =
                DashboardStore::new(app.habits.clone(), &app.auth, app.quotes.clone());
            store
                .on_action(DashboardAction::HabitClicked(habit.id.clone()))
                .await;
            store.settle().await;
            report_toggle(&habit, &store);
            Ok(())
        }
    }
}

fn push_schedule_actions(
    actions: &mut Vec<AddHabitAction>,
    days: Option<&str>,
    remind: Option<&str>,
    no_remind: bool,
) -> Result<()> {
    if let Some(days) = days {
        for day in parse_weekdays(days)? {
            actions.push(AddHabitAction::CustomDayToggled(day));
        }
    }
    if let Some(time) = remind {
        let (hour, minute) = parse_time(time)?;
        actions.push(AddHabitAction::ReminderToggled(true));
        actions.push(AddHabitAction::TimeSelected { hour, minute });
    }
    if no_remind {
        actions.push(AddHabitAction::ReminderToggled(false));
    }
    Ok(())
}

async fn save_form(app: &AppContainer, editing: Option<&str>, actions: Vec<AddHabitAction>) -> Result<()> {
    let (mut store, mut events) = AddHabitStore::new(app.habits.clone(), app.scheduler.clone(), editing)?;
    // --days replaces the current selection instead of toggling it
    if actions
        .iter()
        .any(|a| matches!(a, AddHabitAction::CustomDayToggled(_)))
    {
        for day in store.current().custom_days {
            store.on_action(AddHabitAction::CustomDayToggled(day)).await?;
        }
    }
    for action in actions {
        store.on_action(action).await?;
    }
    store.on_action(AddHabitAction::Save).await?;

    if let Some(error) = store.current().error {
        anyhow::bail!(error);
    }
    if matches!(events.try_recv(), Ok(NavigationEvent::NavigateBack)) {
        let form = store.current();
        let verb = if editing.is_some() { "Updated" } else { "Added" };
        println!("{verb} habit '{}'", form.title.trim());
        if form.reminder_enabled {
            println!("Reminders only fire while `habitloop remind` is running");
        }
    }
    Ok(())
}

fn print_dashboard(store: &DashboardStore) {
    let state = store.current();
    if !state.user_name.is_empty() {
        println!("Hello, {}", state.user_name);
    }
    if !state.quote.is_empty() {
        println!("\"{}\" - {}", state.quote, state.quote_author);
    }
    if state.habits.is_empty() {
        println!("No habits yet. Add one with `habitloop habit add <name>`");
        return;
    }

    if state.is_grid_view {
        for item in &state.habits {
            let mark = if item.completed_today { "[x]" } else { "[ ]" };
            println!("{mark} {} ({} day streak)", item.habit.name, item.habit.streak);
        }
    } else {
        let rows: Vec<HabitRow> = state.habits.iter().map(HabitRow::from).collect();
        println!("\n{}", Table::new(rows));
    }
    let done = state.habits.iter().filter(|i| i.completed_today).count();
    println!("\n{done}/{} done today", state.habits.len());
}

fn report_toggle(before: &Habit, store: &DashboardStore) {
    let state = store.current();
    let Some(item) = state.habits.iter().find(|i| i.habit.id == before.id) else {
        return;
    };
    if item.completed_today {
        println!("Completed '{}' - streak {}", item.habit.name, item.habit.streak);
    } else {
        println!("Undid today's '{}' - streak {}", item.habit.name, item.habit.streak);
    }
}
