//! Journee configuration.
//!
//! Loaded from `~/.journee/config.toml`. Every key is optional; a missing
//! file means all defaults.
//!
//! ```toml
//! database = "/home/me/trips.sqlite"
//! debounce-ms = 2000
//! periodic-save-secs = 300
//! history-limit = 200
//! ```

use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::autosave::AutoSaveSettings;

/// Longest accepted debounce: one day.
const MAX_DEBOUNCE_MS: u64 = 86_400_000;

/// Longest accepted periodic save interval: one day.
const MAX_PERIODIC_SAVE_SECS: u64 = 86_400;

/// Journee configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// SQLite database path. Defaults to `~/.journee/journee.sqlite`.
    pub database: Option<PathBuf>,

    /// Quiet period after an edit before it is saved.
    pub debounce_ms: u64,

    /// Interval of the backstop save that runs regardless of edits.
    pub periodic_save_secs: u64,

    /// Maximum number of undo steps kept per session. Unbounded when unset.
    pub history_limit: Option<NonZeroUsize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            debounce_ms: 2000,
            periodic_save_secs: 300,
            history_limit: None,
        }
    }
}

impl Config {
    /// Load config from `~/.journee/config.toml`, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        Self::from_toml(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// Parse and validate config text.
    pub fn from_toml(contents: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;

        if config.debounce_ms == 0 {
            return Err("debounce-ms must be greater than zero".to_string());
        }
        if config.periodic_save_secs == 0 {
            return Err("periodic-save-secs must be greater than zero".to_string());
        }
        if config.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(format!("debounce-ms must be at most {MAX_DEBOUNCE_MS}"));
        }
        if config.periodic_save_secs > MAX_PERIODIC_SAVE_SECS {
            return Err(format!("periodic-save-secs must be at most {MAX_PERIODIC_SAVE_SECS}"));
        }

        Ok(config)
    }

    /// The config file path: `~/.journee/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".journee").join("config.toml"))
    }

    /// Autosave timers derived from this config.
    pub fn autosave(&self) -> AutoSaveSettings {
        AutoSaveSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            periodic: Duration::from_secs(self.periodic_save_secs),
        }
    }
}
