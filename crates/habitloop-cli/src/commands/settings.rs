/// Notification preference command handlers
use anyhow::{bail, Result};
use clap::Subcommand;
use habitloop_core::screens::{SettingsAction, SettingsStore};
use habitloop_core::AppContainer;

use super::helpers::{parse_switch, switch_label};

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show notification preferences
    Show,
    /// Change a preference: sound, vibration, frequency or daily-quote
    Set { key: String, value: String },
}

pub async fn handle_settings_command(app: &AppContainer, command: SettingsCommand) -> Result<()> {
    let (mut store, _events) = SettingsStore::new(
        app.auth.clone(),
        app.habits.clone(),
        app.quotes.clone(),
        app.scheduler.clone(),
    );

    match command {
        SettingsCommand::Show => {
            let state = store.current();
            println!("Notification sound:     {}", switch_label(state.notification_sound));
            println!("Notification vibration: {}", switch_label(state.notification_vibration));
            println!("Notification frequency: {}", state.notification_frequency);
            println!("Daily quote:            {}", switch_label(state.daily_quote_notifications));
            if app.auth.user().is_none() {
                println!("\n(defaults shown; sign in to load your preferences)");
            }
        }
        SettingsCommand::Set { key, value } => {
            if app.auth.user().is_none() {
                bail!("Not signed in. Run `habitloop login` first");
            }
            let action = match key.as_str() {
                "sound" => SettingsAction::SoundToggled(parse_switch(&value)?),
                "vibration" => SettingsAction::VibrationToggled(parse_switch(&value)?),
                "frequency" => SettingsAction::FrequencyChanged(value.clone()),
                "daily-quote" => SettingsAction::DailyQuoteToggled(parse_switch(&value)?),
                other => bail!("Unknown setting: {other}. Use sound, vibration, frequency or daily-quote"),
            };
            store.on_action(action).await;
            println!("Set {key} = {value}");
        }
    }
    Ok(())
}
