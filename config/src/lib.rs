//! Configuration loading and persistence for Tally.
//!
//! The config file lives at `~/.tally/config.toml`:
//!
//! ```toml
//! [console]
//! ctrl_w_closes = true
//! ctrl_c_behavior = "prev_result"
//! save_back_count = 20
//! global_inputs = """
//! rate = 0.21
//! """
//!
//! [evaluator]
//! evaluate_timeout_ms = 500
//! preview_timeout_ms = 100
//!
//! [files]
//! session_dir = "~/calc-sessions"
//! ```
//!
//! A missing file is not an error; every section falls back to defaults.

mod store;
mod watch;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tally_types::{EvalBudget, Settings, SettingsError};
use thiserror::Error;

pub use store::{FileSettingsStore, SettingsStore};
pub use watch::SettingsWatcher;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the home directory")]
    NoHome,
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to edit {}: {source}", path.display())]
    Edit {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Setting(#[from] SettingsError),
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Edit { path, .. }
            | Self::Write { path, .. } => Some(path),
            Self::NoHome | Self::Setting(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory for saved sessions. `~` expands to the home directory.
    pub session_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    pub console: Settings,
    pub evaluator: EvalBudget,
    pub files: FilesConfig,
}

impl TallyConfig {
    /// Load the config at `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        toml::from_str(&content).map_err(|err| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, err);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            }
        })
    }

    /// Resolved session directory: the configured one, else `~/.tally/sessions`.
    #[must_use]
    pub fn session_dir(&self) -> Option<PathBuf> {
        match self.files.session_dir.as_deref() {
            Some(raw) => Some(expand_home(raw)),
            None => config_dir().map(|dir| dir.join("sessions")),
        }
    }
}

/// `~/.tally`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tally"))
}

/// `~/.tally/config.toml`
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw));
    }
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}
