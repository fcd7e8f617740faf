use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::history::History;
use crate::state::SpeechSettings;

const APP_DIR: &str = "ReadToMe";
const SETTINGS_FILE: &str = "settings.json";
const HISTORY_FILE: &str = "history.json";

/// Where settings and history are kept
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub settings: PathBuf,
    pub history: PathBuf,
}

impl StorePaths {
    /// Paths under the platform config directory
    pub fn default_location() -> Result<Self> {
        let config = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find config directory"))?;
        Ok(Self::in_dir(config.join(APP_DIR)))
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            settings: dir.join(SETTINGS_FILE),
            history: dir.join(HISTORY_FILE),
        }
    }
}

pub fn load_settings(path: &Path) -> SpeechSettings {
    load_or_default(path, "settings")
}

pub fn save_settings(path: &Path, settings: &SpeechSettings) -> Result<()> {
    save(path, settings).inspect_err(|e| tracing::error!("Failed to save settings: {:#}", e))
}

pub fn load_history(path: &Path) -> History {
    History::from_entries(load_or_default(path, "history"))
}

pub fn save_history(path: &Path, history: &History) -> Result<()> {
    save(path, history).inspect_err(|e| tracing::error!("Failed to save history: {:#}", e))
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    if !path.exists() {
        tracing::info!("No stored {} found. Using defaults.", what);
        return T::default();
    }

    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Failed to read stored {}: {}. Using defaults.", what, e);
            return T::default();
        }
    };

    match serde_json::from_str(&data) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Failed to deserialize stored {}: {}. Using defaults.", what, e);
            T::default()
        }
    }
}

fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(value)?;
    std::fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
