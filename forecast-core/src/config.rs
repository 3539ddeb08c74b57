use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    error::SetupError,
    provider::{ProviderId, provider_for},
};

/// Monitored location, in whichever form the provider expects.
///
/// AccuWeather resolves a pre-looked-up location key; Pirate Weather takes
/// raw coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Key(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Key(key) => f.write_str(key),
            Location::Coordinates { latitude, longitude } => {
                write!(f, "{latitude:.4},{longitude:.4}")
            }
        }
    }
}

/// Validated, immutable record identifying one monitored location and its
/// credentials. Created once by the setup flow and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryConfig {
    pub provider: ProviderId,
    pub api_key: String,
    pub location: Location,
}

impl EntryConfig {
    pub fn new(provider: ProviderId, api_key: impl Into<String>, location: Location) -> Self {
        Self { provider, api_key: api_key.into(), location }
    }

    /// Stable unique identifier: the location key, or a rounded lat/lon
    /// composite. Duplicate configurations are rejected on this value.
    pub fn unique_id(&self) -> String {
        self.location.to_string()
    }

    /// Display title, e.g. "AccuWeather 326257".
    pub fn title(&self) -> String {
        format!("{} {}", self.provider.display_name(), self.location)
    }
}

/// Run the setup probe for a prospective configuration.
///
/// Performs exactly one request against the provider and classifies the
/// outcome; no retries. Returns the derived unique id on success.
pub async fn validate_entry(entry: &EntryConfig) -> Result<String, SetupError> {
    let provider = provider_for(entry.provider);
    provider.probe(entry).await?;
    Ok(entry.unique_id())
}

/// Entry store persisted on disk by the CLI host.
///
/// Example TOML:
/// ```toml
/// [[entries]]
/// provider = "accuweather"
/// api_key = "..."
/// location = "326257"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigStore {
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

impl ConfigStore {
    /// Register an entry, rejecting duplicates by unique id.
    pub fn add_entry(&mut self, entry: EntryConfig) -> Result<(), SetupError> {
        let unique_id = entry.unique_id();
        if self.entries.iter().any(|e| e.unique_id() == unique_id) {
            return Err(SetupError::AlreadyConfigured(unique_id));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Remove the entry with the given unique id. Returns whether one existed.
    pub fn remove_entry(&mut self, unique_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.unique_id() != unique_id);
        self.entries.len() != before
    }

    pub fn get(&self, unique_id: &str) -> Option<&EntryConfig> {
        self.entries.iter().find(|e| e.unique_id() == unique_id)
    }

    /// Read the persisted entries; an absent file means no locations yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let store: ConfigStore = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(store)
    }

    /// Write the entries back, creating the config directory on first save.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Platform-specific location of the entry store.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "daily-forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
