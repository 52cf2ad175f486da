// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::model::appointment::TIME_FORMAT;
use crate::storage::LocalStorage;
use crate::store::NotifiedOnEdit;
use anyhow::{Error, Result};
use chrono::NaiveTime;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;
use std::time::Duration;

fn default_true() -> bool {
    true
}

fn default_reminder_interval() -> u64 {
    60
}

fn default_delete_transition() -> u64 {
    1000
}

fn default_time() -> String {
    "09:00".to_string()
}

fn default_reminder_minutes() -> u32 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Seconds between reminder scans.
    #[serde(default = "default_reminder_interval")]
    pub reminder_interval_secs: u64,

    /// How long a deleted row stays dimmed before it disappears.
    #[serde(default = "default_delete_transition")]
    pub delete_transition_ms: u64,

    #[serde(default = "default_time")]
    pub default_time: String, // Format "HH:MM"
    #[serde(default = "default_reminder_minutes")]
    pub default_reminder_minutes: u32,

    #[serde(default = "default_true")]
    pub desktop_notifications: bool,

    #[serde(default)]
    pub notified_on_edit: NotifiedOnEdit,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reminder_interval_secs: 60,
            delete_transition_ms: 1000,
            default_time: "09:00".to_string(),
            default_reminder_minutes: 15,
            desktop_notifications: true,
            notified_on_edit: NotifiedOnEdit::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Defaults when the file is absent. A file that exists but can't be read
    /// is still an error.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(cfg) => Ok(cfg),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Detects whether an error means the config file was missing, either via
    /// our explicit message or an IO NotFound anywhere in the chain.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        err.chain().any(|cause| {
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
        })
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    pub fn get_path_string(ctx: &dyn AppContext) -> Result<String> {
        let path = ctx.get_config_file_path()?;
        Ok(path.to_string_lossy().to_string())
    }

    // --- Typed accessors ---

    /// Never shorter than one second.
    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs.max(1))
    }

    pub fn delete_transition(&self) -> Duration {
        Duration::from_millis(self.delete_transition_ms)
    }

    pub fn default_time(&self) -> NaiveTime {
        NaiveTime::parse_from_str(self.default_time.trim(), TIME_FORMAT).unwrap_or_else(|_| {
            log::warn!(
                "Ignoring invalid default_time '{}', using 09:00",
                self.default_time
            );
            NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
        })
    }

    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(self.log_level.trim()).unwrap_or(LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn test_missing_file_is_detected() {
        let ctx = TestContext::new();
        let err = Config::load(&ctx).unwrap_err();
        assert!(Config::is_missing_config_error(&err));
        assert_eq!(Config::load_or_default(&ctx).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_uses_serde_defaults() {
        let ctx = TestContext::new();
        let path = ctx.get_config_file_path().unwrap();
        fs::write(&path, "reminder_interval_secs = 5\nnotified_on_edit = \"rearm\"\n").unwrap();

        let cfg = Config::load(&ctx).unwrap();
        assert_eq!(cfg.reminder_interval(), Duration::from_secs(5));
        assert_eq!(cfg.notified_on_edit, NotifiedOnEdit::Rearm);
        assert_eq!(cfg.delete_transition_ms, 1000);
        assert_eq!(cfg.default_reminder_minutes, 15);
        assert!(cfg.desktop_notifications);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let ctx = TestContext::new();
        fs::write(ctx.get_config_file_path().unwrap(), "reminder_interval_secs = [").unwrap();
        let err = Config::load_or_default(&ctx).unwrap_err();
        assert!(!Config::is_missing_config_error(&err));
    }

    #[test]
    fn test_save_then_load() {
        let ctx = TestContext::new();
        let cfg = Config {
            default_time: "14:30".to_string(),
            desktop_notifications: false,
            ..Config::default()
        };
        cfg.save(&ctx).unwrap();
        assert_eq!(Config::load(&ctx).unwrap(), cfg);

        let shown = Config::get_path_string(&ctx).unwrap();
        assert!(shown.ends_with("config.toml"), "{}", shown);
        assert!(std::path::Path::new(&shown).exists());
    }

    #[test]
    fn test_accessors_sanitize() {
        let cfg = Config {
            reminder_interval_secs: 0,
            default_time: "25:99".to_string(),
            log_level: "nonsense".to_string(),
            ..Config::default()
        };
        assert_eq!(cfg.reminder_interval(), Duration::from_secs(1));
        assert_eq!(cfg.default_time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(cfg.log_level(), LevelFilter::Info);

        let cfg = Config {
            log_level: "debug".to_string(),
            ..Config::default()
        };
        assert_eq!(cfg.log_level(), LevelFilter::Debug);
    }
}
