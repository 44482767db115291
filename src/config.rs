//! Settings from `<data_dir>/config.json` and the command line.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::EditorSettings;
use crate::logging::default_log_level;

pub const CONFIG_FILE: &str = "config.json";
const DATA_DIR_NAME: &str = ".daily-outline";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed config {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history_capacity: usize,
    pub save_debounce_ms: u64,
    pub prune_grace_ms: u64,
    pub restore_attempts: u32,
    /// Fixed wrap column; the terminal width when unset.
    pub wrap_width: Option<usize>,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let editor = EditorSettings::default();
        Self {
            history_capacity: editor.history_capacity,
            save_debounce_ms: editor.save_debounce.as_millis() as u64,
            prune_grace_ms: editor.prune_grace.as_millis() as u64,
            restore_attempts: editor.restore_attempts,
            wrap_width: None,
            log_level: None,
        }
    }
}

impl Config {
    /// Reads `<dir>/config.json`; a missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        let config: Config = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Format { path, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "history_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.restore_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "restore_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.wrap_width == Some(0) {
            return Err(ConfigError::Invalid {
                key: "wrap_width",
                reason: "must be positive when set".to_string(),
            });
        }
        Ok(())
    }

    /// Command line flags win over the file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(level) = &cli.log_level {
            self.log_level = Some(level.clone());
        }
        if let Some(width) = cli.wrap_width {
            self.wrap_width = Some(width);
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            history_capacity: self.history_capacity,
            prune_grace: Duration::from_millis(self.prune_grace_ms),
            save_debounce: Duration::from_millis(self.save_debounce_ms),
            restore_attempts: self.restore_attempts,
        }
    }
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "daily-outline", version, about = "Daily notes as a keyboard-driven outline")]
pub struct Cli {
    /// Directory holding one JSON file per day, `template.json` and `config.json`
    #[arg(long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Day to open (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_day)]
    pub date: Option<NaiveDate>,

    /// trace, debug, info, warn or error
    #[arg(long = "log-level")]
    pub log_level: Option<String>,

    /// Directory for rotating log files; defaults to `<data-dir>/logs`
    #[arg(long = "log-dir")]
    pub log_dir: Option<PathBuf>,

    #[arg(long = "wrap-width")]
    pub wrap_width: Option<usize>,
}

impl Cli {
    /// `--data-dir`, else `$HOME/.daily-outline`, else `./.daily-outline`.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(DATA_DIR_NAME),
            None => PathBuf::from(DATA_DIR_NAME),
        }
    }

    pub fn log_dir(&self, data_dir: &Path) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("logs"))
    }
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}
