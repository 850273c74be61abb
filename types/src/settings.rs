//! User settings consumed by the console.
//!
//! Settings are a statically declared structure with documented defaults.
//! The console only ever reads them; writes go through the settings store,
//! which validates raw key/value pairs with [`Settings::apply`].

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    #[error("invalid value `{value}` for `{key}`: expected {expected}")]
    InvalidValue {
        key: SettingKey,
        value: String,
        expected: &'static str,
    },
}

/// What the copy chord places on the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopySource {
    /// Result of the most recent transcript entry.
    PrevResult,
    /// Current live hint text.
    Hint,
    /// Raw input buffer.
    #[default]
    Buffer,
}

impl CopySource {
    pub const ALL: [Self; 3] = [Self::PrevResult, Self::Hint, Self::Buffer];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrevResult => "prev_result",
            Self::Hint => "hint",
            Self::Buffer => "buffer",
        }
    }
}

impl FromStr for CopySource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or(())
    }
}

/// Console settings.
///
/// Unknown keys in the backing file are ignored; missing keys take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `Ctrl+W` quits the console. Default: true.
    pub ctrl_w_closes: bool,
    /// `Ctrl+D` quits the console. Default: false.
    pub ctrl_d_closes: bool,
    /// Source for the `Ctrl+C` copy chord. Default: buffer.
    pub ctrl_c_behavior: CopySource,
    /// How many trailing history entries `Ctrl+S` saves. Negative saves all.
    pub save_back_count: i64,
    /// Newline separated expressions evaluated once at startup.
    pub global_inputs: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ctrl_w_closes: true,
            ctrl_d_closes: false,
            ctrl_c_behavior: CopySource::default(),
            save_back_count: -1,
            global_inputs: String::new(),
        }
    }
}

impl Settings {
    /// Whether `Ctrl+<c>` is configured to quit.
    #[must_use]
    pub fn closes_on(&self, c: char) -> bool {
        match c {
            'w' => self.ctrl_w_closes,
            'd' => self.ctrl_d_closes,
            _ => false,
        }
    }

    /// Trailing slice of `history` selected by `save_back_count`.
    #[must_use]
    pub fn save_slice<'a>(&self, history: &'a [String]) -> &'a [String] {
        match usize::try_from(self.save_back_count) {
            Ok(count) => &history[history.len().saturating_sub(count)..],
            Err(_) => history,
        }
    }

    /// Non-blank startup expressions, in file order.
    pub fn global_input_lines(&self) -> impl Iterator<Item = &str> {
        self.global_inputs
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }

    #[must_use]
    pub fn get(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::CtrlWCloses => SettingValue::Bool(self.ctrl_w_closes),
            SettingKey::CtrlDCloses => SettingValue::Bool(self.ctrl_d_closes),
            SettingKey::CtrlCBehavior => {
                SettingValue::Text(self.ctrl_c_behavior.as_str().to_string())
            }
            SettingKey::SaveBackCount => SettingValue::Integer(self.save_back_count),
            SettingKey::GlobalInputs => SettingValue::Text(self.global_inputs.clone()),
        }
    }

    /// Set one field, checking that the value has the field's type.
    pub fn apply(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingsError> {
        let invalid = |value: &SettingValue| SettingsError::InvalidValue {
            key,
            value: value.to_string(),
            expected: key.expected(),
        };

        match (key, &value) {
            (SettingKey::CtrlWCloses, SettingValue::Bool(b)) => self.ctrl_w_closes = *b,
            (SettingKey::CtrlDCloses, SettingValue::Bool(b)) => self.ctrl_d_closes = *b,
            (SettingKey::CtrlCBehavior, SettingValue::Text(s)) => {
                self.ctrl_c_behavior = s.parse().map_err(|()| invalid(&value))?;
            }
            (SettingKey::SaveBackCount, SettingValue::Integer(n)) => self.save_back_count = *n,
            (SettingKey::GlobalInputs, SettingValue::Text(s)) => self.global_inputs = s.clone(),
            _ => return Err(invalid(&value)),
        }
        Ok(())
    }
}

/// Names of the recognized settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    CtrlWCloses,
    CtrlDCloses,
    CtrlCBehavior,
    SaveBackCount,
    GlobalInputs,
}

impl SettingKey {
    pub const ALL: [Self; 5] = [
        Self::CtrlWCloses,
        Self::CtrlDCloses,
        Self::CtrlCBehavior,
        Self::SaveBackCount,
        Self::GlobalInputs,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CtrlWCloses => "ctrl_w_closes",
            Self::CtrlDCloses => "ctrl_d_closes",
            Self::CtrlCBehavior => "ctrl_c_behavior",
            Self::SaveBackCount => "save_back_count",
            Self::GlobalInputs => "global_inputs",
        }
    }

    const fn expected(self) -> &'static str {
        match self {
            Self::CtrlWCloses | Self::CtrlDCloses => "true or false",
            Self::CtrlCBehavior => "one of prev_result, hint, buffer",
            Self::SaveBackCount => "an integer",
            Self::GlobalInputs => "text",
        }
    }

    /// Parse a raw command-line value into this key's value type.
    pub fn parse_value(self, raw: &str) -> Result<SettingValue, SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            key: self,
            value: raw.to_string(),
            expected: self.expected(),
        };

        match self {
            Self::CtrlWCloses | Self::CtrlDCloses => raw
                .trim()
                .parse::<bool>()
                .map(SettingValue::Bool)
                .map_err(|_| invalid()),
            Self::SaveBackCount => raw
                .trim()
                .parse::<i64>()
                .map(SettingValue::Integer)
                .map_err(|_| invalid()),
            Self::CtrlCBehavior => {
                let raw = raw.trim();
                raw.parse::<CopySource>().map_err(|()| invalid())?;
                Ok(SettingValue::Text(raw.to_string()))
            }
            // `\n` escapes let a shell argument carry several expressions.
            Self::GlobalInputs => Ok(SettingValue::Text(raw.replace("\\n", "\n"))),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// A typed setting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}
