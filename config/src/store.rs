//! Settings store backed by the TOML config file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tally_types::{SettingKey, SettingValue, Settings};
use tally_utils::{AtomicWriteOptions, atomic_write};

use crate::{ConfigError, TallyConfig, config_path};

/// Read/write access to persisted settings.
///
/// The console never writes settings itself; it is handed fresh snapshots
/// after the store changes.
pub trait SettingsStore {
    fn load_settings(&self) -> Result<Settings, ConfigError>;
    fn set_setting(&self, key: SettingKey, value: SettingValue) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.tally/config.toml`.
    pub fn at_default_location() -> Result<Self, ConfigError> {
        config_path().map(Self::new).ok_or(ConfigError::NoHome)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<TallyConfig, ConfigError> {
        TallyConfig::load_from(&self.path)
    }

    /// Modification time of the backing file, if it exists.
    #[must_use]
    pub fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load_settings(&self) -> Result<Settings, ConfigError> {
        self.load().map(|config| config.console)
    }

    /// Persist one setting under `[console]`.
    ///
    /// The value is type-checked against the current settings first, then
    /// written with `toml_edit` so comments and formatting survive.
    fn set_setting(&self, key: SettingKey, value: SettingValue) -> Result<(), ConfigError> {
        let mut settings = self.load_settings()?;
        settings.apply(key, value.clone())?;

        let content = if self.path.exists() {
            fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
                path: self.path.clone(),
                source,
            })?
        } else {
            String::new()
        };

        let mut doc = content
            .parse::<toml_edit::DocumentMut>()
            .map_err(|source| ConfigError::Edit {
                path: self.path.clone(),
                source,
            })?;

        if !doc.contains_key("console") {
            doc["console"] = toml_edit::Item::Table(toml_edit::Table::new());
        }

        doc["console"][key.as_str()] = match value {
            SettingValue::Bool(b) => toml_edit::value(b),
            SettingValue::Integer(n) => toml_edit::value(n),
            SettingValue::Text(s) => toml_edit::value(s),
        };

        atomic_write(
            &self.path,
            doc.to_string().as_bytes(),
            AtomicWriteOptions::default(),
        )
        .map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(key = %key, path = %self.path.display(), "Setting persisted");
        Ok(())
    }
}
