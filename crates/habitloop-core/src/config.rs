use anyhow::{bail, Context, Result};
use habitloop_remote::{AuthSession, DEFAULT_QUOTE_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";
pub const SESSION_FILE: &str = "session.json";
pub const DEFAULT_BUCKET: &str = "profile-pictures";

/// Get the local data directory for habitloop.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let mut path =
        dirs::data_local_dir().ok_or_else(|| anyhow::anyhow!("Failed to get local data dir"))?;
    path.push("habitloop");
    Ok(path)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub api_key: String,
    pub bucket: String,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotesConfig {
    pub url: String,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_QUOTE_URL.to_string(),
        }
    }
}

/// Backend endpoints and credentials, stored as `config.toml` in the data dir
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub firebase: FirebaseConfig,
    pub supabase: SupabaseConfig,
    pub quotes: QuotesConfig,
}

impl AppConfig {
    /// Every settable key, in display order
    pub const KEYS: [&'static str; 6] = [
        "firebase.api_key",
        "firebase.project_id",
        "supabase.url",
        "supabase.api_key",
        "supabase.bucket",
        "quotes.url",
    ];

    /// Load from the default location, falling back to defaults if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load() -> Result<Self> {
        Self::load_from(&get_data_dir()?.join(CONFIG_FILE))
    }

    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_data_dir()?.join(CONFIG_FILE))
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Read a value addressed as `section.key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "firebase.api_key" => &self.firebase.api_key,
            "firebase.project_id" => &self.firebase.project_id,
            "supabase.url" => &self.supabase.url,
            "supabase.api_key" => &self.supabase.api_key,
            "supabase.bucket" => &self.supabase.bucket,
            "quotes.url" => &self.quotes.url,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Set a value addressed as `section.key`
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let slot = match key {
            "firebase.api_key" => &mut self.firebase.api_key,
            "firebase.project_id" => &mut self.firebase.project_id,
            "supabase.url" => &mut self.supabase.url,
            "supabase.api_key" => &mut self.supabase.api_key,
            "supabase.bucket" => &mut self.supabase.bucket,
            "quotes.url" => &mut self.quotes.url,
            _ => bail!("Unknown config key: {key}"),
        };
        *slot = value.to_string();
        Ok(())
    }
}

/// Signed-in session persisted between CLI runs
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined
    pub fn in_data_dir() -> Result<Self> {
        Ok(Self::new(get_data_dir()?.join(SESSION_FILE)))
    }

    /// # Errors
    ///
    /// Returns an error if the file exists but is unreadable or malformed
    pub fn load(&self) -> Result<Option<AuthSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let session = serde_json::from_str(&content).context("Failed to parse saved session")?;
        Ok(Some(session))
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save(&self, session: &AuthSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed
    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}
