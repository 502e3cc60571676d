mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use habitloop_core::screens::SettingsAction;
use habitloop_core::AppContainer;

use commands::config::ConfigAction;
use commands::habit::HabitAction;
use commands::profile::ProfileCommand;
use commands::settings::SettingsCommand;

#[derive(Parser)]
#[command(name = "habitloop")]
#[command(about = "Habit tracker with streaks, reminders and cloud sync", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with email and password
    Login {
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        name: String,
        email: String,
        #[arg(short, long)]
        password: String,
        /// Repeat the password
        #[arg(short, long)]
        confirm: String,
    },
    /// Send a password reset email
    ForgotPassword { email: String },
    /// Sign out and clear the local cache
    Logout,
    /// Manage habits
    Habit {
        #[command(subcommand)]
        action: HabitAction,
    },
    /// Show streaks and completion statistics
    Stats,
    /// Pull habits from the cloud into the local cache
    Sync,
    /// Push every cached habit to the cloud
    Backup,
    /// Replace cached habits with the cloud copy
    Restore,
    /// Delete all habits locally and in the cloud
    ClearCache,
    /// Show the quote of the day
    Quote {
        /// Fetch a new quote
        #[arg(short, long)]
        refresh: bool,
    },
    /// Profile management
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    /// Notification preferences
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Run habit reminders and the daily quote until interrupted
    Remind,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let command = match cli.command {
        Commands::Config { action } => return commands::config::handle_config_command(action),
        other => other,
    };

    let app = AppContainer::load()?;

    match command {
        Commands::Login { email, password } => {
            commands::account::handle_login(&app, email, password).await
        }
        Commands::Signup {
            name,
            email,
            password,
            confirm,
        } => commands::account::handle_signup(&app, name, email, password, confirm).await,
        Commands::ForgotPassword { email } => {
            commands::account::handle_forgot_password(&app, email).await
        }
        Commands::Logout => {
            commands::profile::handle_logout(&app).await;
            Ok(())
        }
        Commands::Habit { action } => commands::habit::handle_habit_command(&app, action).await,
        Commands::Stats => {
            commands::profile::handle_stats_command(&app);
            Ok(())
        }
        Commands::Sync => commands::data::handle_sync(&app).await,
        Commands::Backup => {
            commands::data::handle_data_action(&app, SettingsAction::Backup).await;
            Ok(())
        }
        Commands::Restore => {
            commands::data::handle_data_action(&app, SettingsAction::Restore).await;
            Ok(())
        }
        Commands::ClearCache => {
            commands::data::handle_data_action(&app, SettingsAction::ClearCache).await;
            Ok(())
        }
        Commands::Quote { refresh } => commands::data::handle_quote(&app, refresh).await,
        Commands::Profile { action } => {
            commands::profile::handle_profile_command(&app, action).await
        }
        Commands::Settings { action } => {
            commands::settings::handle_settings_command(&app, action).await
        }
        Commands::Remind => commands::remind::handle_remind(&app).await,
        Commands::Config { .. } => Ok(()),
    }
}
