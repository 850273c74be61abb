//! Core domain types for Tally.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod budget;
mod keys;
mod settings;

pub use budget::EvalBudget;
pub use keys::{KeyCode, KeyEvent, Modifiers, SelectionState};
pub use settings::{CopySource, SettingKey, SettingValue, Settings, SettingsError};
