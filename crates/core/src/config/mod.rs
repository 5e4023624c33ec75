use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{playback::DEFAULT_SCALE, Easing, Hotkeys, Result};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub easing: Easing,
    /// Device units per map unit. Depends on the in-game sensitivity.
    pub scale: f64,
    pub hotkeys: Hotkeys,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            easing: Easing::default(),
            scale: DEFAULT_SCALE,
            hotkeys: Hotkeys::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Loads the config, falling back to defaults when the file is missing or
    /// cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!(?path, "no config file, using defaults");
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(?path, %err, "config file invalid, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!(?path, "config saved");
        Ok(())
    }
}
