/// Configuration management command handlers
use anyhow::{bail, Result};
use clap::Subcommand;
use habitloop_core::config::{get_data_dir, AppConfig, CONFIG_FILE};

use super::helpers::mask_secret;

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value (e.g. firebase.project_id)
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
}

fn is_secret(key: &str) -> bool {
    key.ends_with("api_key")
}

pub fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = AppConfig::load()?;
            match config.get(&key) {
                Some(value) if value.is_empty() => println!("{key} is not set"),
                Some(value) => println!("{key} = {value}"),
                None => bail!("Unknown config key: {key}"),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = AppConfig::load()?;
            config.set(&key, &value)?;
            config.save()?;
            let shown = if is_secret(&key) { mask_secret(&value) } else { value };
            println!("Set {key} = {shown}");
        }
        ConfigAction::List => {
            let config = AppConfig::load()?;
            println!("Configuration ({})", get_data_dir()?.join(CONFIG_FILE).display());
            println!("==============");
            let mut section = "";
            for key in AppConfig::KEYS {
                let (name, field) = key.split_once('.').unwrap_or(("", key));
                if name != section {
                    println!("\n[{name}]");
                    section = name;
                }
                let value = config.get(key).unwrap_or_default();
                let shown = if is_secret(key) {
                    mask_secret(value)
                } else {
                    value.to_string()
                };
                println!("  {field} = {shown}");
            }
        }
    }
    Ok(())
}
