use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "quizpad";
const CONFIG_FILE: &str = "config.toml";

/// Application settings, read from `<config dir>/quizpad/config.toml`
///
/// Keys missing from the file keep their default.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    /// Sent with every answer
    pub player_id: String,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// Open the input gate right after start-up
    pub gamepad_on_start: bool,
    pub fullscreen: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5200".to_string(),
            player_id: "p0".to_string(),
            request_timeout_secs: 10,
            poll_interval_ms: 16,
            gamepad_on_start: false,
            fullscreen: false,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn default_path() -> Result<PathBuf> {
        let mut path =
            dirs::config_dir().ok_or_else(|| eyre!("Could not determine config directory"))?;
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        Ok(path)
    }

    /// Loads the user config, writing the defaults first if none exists yet.
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path()?;
        Self::ensure_default_config(&path)?;
        Self::load_from(&path)
    }

    pub fn ensure_default_config(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }

        info!("Creating default configuration at {}", path.display());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
        Self::default().save_to(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| eyre!("Failed to parse config file: {}", e))?;

        if config.poll_interval_ms == 0 {
            warn!("poll_interval_ms must be positive, using the default");
            return Ok(Self {
                poll_interval_ms: Self::default().poll_interval_ms,
                ..config
            });
        }
        debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| eyre!("Failed to serialize config: {}", e))?;
        fs::write(path, content).map_err(|e| eyre!("Failed to write config file: {}", e))?;
        Ok(())
    }
}
