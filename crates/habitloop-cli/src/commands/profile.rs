/// Profile, statistics and logout command handlers
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use habitloop_core::screens::{NavigationEvent, ProfileAction, ProfileState, ProfileStore};
use habitloop_core::AppContainer;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use super::helpers::{content_type_for, parse_switch, switch_label};

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show the signed-in profile
    Show,
    /// Turn motivation mode on or off
    Motivation { state: String },
    /// Upload a new profile picture
    Photo { path: PathBuf },
}

#[derive(Tabled)]
struct WeekRow {
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "Done today")]
    completion: String,
}

fn open_store(app: &AppContainer) -> (ProfileStore, tokio::sync::mpsc::UnboundedReceiver<NavigationEvent>) {
    ProfileStore::new(app.auth.clone(), &app.habits, &app.quotes, app.pictures.clone())
}

pub async fn handle_profile_command(app: &AppContainer, command: ProfileCommand) -> Result<()> {
    if !app.auth.is_signed_in() {
        bail!("Not signed in. Run `habitloop login` first");
    }
    app.auth.refresh_current_user().await;
    let (mut store, _events) = open_store(app);

    match command {
        ProfileCommand::Show => print_profile(&store.current()),
        ProfileCommand::Motivation { state } => {
            let on = parse_switch(&state)?;
            store.on_action(ProfileAction::ToggleMotivationMode(on)).await;
            println!("Motivation mode {}", switch_label(on));
        }
        ProfileCommand::Photo { path } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let before = store.current().profile_image_url;
            store
                .on_action(ProfileAction::ProfileImageSelected {
                    bytes,
                    content_type: content_type_for(&path).to_string(),
                })
                .await;
            let after = store.current().profile_image_url;
            match after {
                Some(url) if Some(&url) != before.as_ref() => println!("Profile picture: {url}"),
                _ => bail!("Profile picture upload failed"),
            }
        }
    }
    Ok(())
}

pub fn handle_stats_command(app: &AppContainer) {
    let (store, _events) = open_store(app);
    let state = store.current();

    println!("Habit statistics");
    println!("================");
    println!("Total habits:    {}", state.total_habits);
    println!("Current streak:  {} days", state.current_streak);
    println!("Longest streak:  {} days", state.longest_streak);
    println!("Completion rate: {}%", state.completion_rate);

    if !state.weekly_progress.is_empty() {
        let rows: Vec<WeekRow> = state
            .weekly_progress
            .iter()
            .map(|week| WeekRow {
                week: week.week_label.clone(),
                completion: format!("{:.0}%", week.completion * 100.0),
            })
            .collect();
        println!("\n{}", Table::new(rows));
    }
}

fn print_profile(state: &ProfileState) {
    println!("{} <{}>", state.user_name, state.email);
    if let Some(url) = &state.profile_image_url {
        println!("Picture:         {url}");
    }
    println!("Motivation mode: {}", switch_label(state.is_motivation_mode_on));
    println!(
        "Habits:          {} (streak {}, best {}, {}% started)",
        state.total_habits, state.current_streak, state.longest_streak, state.completion_rate
    );
    if state.is_motivation_mode_on && !state.motivational_quote.is_empty() {
        println!("\n\"{}\"", state.motivational_quote);
    }
}

pub async fn handle_logout(app: &AppContainer) {
    if !app.auth.is_signed_in() {
        println!("Not signed in");
        return;
    }
    let (mut store, mut events) = open_store(app);
    store.on_action(ProfileAction::Logout).await;
    if matches!(events.try_recv(), Ok(NavigationEvent::NavigateToLogin)) {
        println!("Signed out; local cache cleared");
    }
}
