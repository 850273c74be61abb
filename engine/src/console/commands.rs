//! Ctrl chords: quit, copy, save, load and clear.
//!
//! Collaborator work runs on spawned tasks; each one reports back a
//! [`CommandReport`] that becomes a toast.

use std::sync::Arc;
use std::time::Instant;

use tally_types::{CopySource, KeyEvent, SelectionState};

use crate::effects::{LoadOutcome, SaveOutcome};
use crate::toast::ToastSeverity;
use crate::transcript::TranscriptEntry;

use super::{Console, ConsoleEvent, Handled};

#[derive(Debug)]
pub(super) enum CommandReport {
    Quit,
    QuitFailed(String),
    Copied,
    CopyFailed(String),
    Saved { count: usize },
    SaveCancelled,
    SaveFailed(String),
    Loaded { count: usize },
    LoadedNothing,
    LoadCancelled,
    LoadFailed(String),
}

impl CommandReport {
    fn toast(&self) -> Option<(String, ToastSeverity)> {
        let toast = match self {
            Self::Quit | Self::LoadedNothing => return None,
            Self::QuitFailed(err) => (format!("Failed to quit: {err}"), ToastSeverity::Error),
            Self::Copied => ("Copied to clipboard".to_string(), ToastSeverity::Success),
            Self::CopyFailed(err) => (format!("Failed to copy: {err}"), ToastSeverity::Error),
            Self::Saved { count } => (
                format!("Saved {count} {}", lines(*count)),
                ToastSeverity::Success,
            ),
            Self::SaveCancelled => ("Save cancelled".to_string(), ToastSeverity::Note),
            Self::SaveFailed(err) => (format!("Failed to save: {err}"), ToastSeverity::Error),
            Self::Loaded { count } => (
                format!("Loaded {count} {}", lines(*count)),
                ToastSeverity::Success,
            ),
            Self::LoadCancelled => ("Load cancelled".to_string(), ToastSeverity::Note),
            Self::LoadFailed(err) => (format!("Failed to load: {err}"), ToastSeverity::Error),
        };
        Some(toast)
    }
}

fn lines(count: usize) -> &'static str {
    if count == 1 { "line" } else { "lines" }
}

impl Console {
    pub(super) fn command_key(&mut self, key: &KeyEvent) -> Handled {
        let Some(c) = key.ctrl_char() else {
            return Handled::Passed;
        };
        match c {
            'w' | 'd' if self.settings.closes_on(c) => self.quit(),
            // With an active selection the host's own copy wins.
            'c' if key.selection == SelectionState::Collapsed => self.copy(),
            's' => self.save(),
            'o' => self.load(),
            'l' => self.clear_console(),
            _ => return Handled::Passed,
        }
        Handled::Claimed
    }

    pub fn quit(&mut self) {
        let effects = Arc::clone(&self.effects);
        self.spawn(async move {
            let report = match effects.quit().await {
                Ok(()) => CommandReport::Quit,
                Err(err) => CommandReport::QuitFailed(err.to_string()),
            };
            ConsoleEvent::Command(report)
        });
    }

    /// Copy the text selected by `ctrl_c_behavior`.
    pub fn copy(&mut self) {
        let text = match self.settings.ctrl_c_behavior {
            CopySource::PrevResult => match self.transcript.last_result() {
                Some(result) => result.to_owned(),
                None => {
                    self.toast
                        .raise("Nothing to copy", ToastSeverity::Note, Instant::now());
                    return;
                }
            },
            CopySource::Hint => self.hint.text.clone(),
            CopySource::Buffer => self.buffer.text().to_owned(),
        };

        let effects = Arc::clone(&self.effects);
        self.spawn(async move {
            let report = match effects.copy_to_clipboard(text).await {
                Ok(()) => CommandReport::Copied,
                Err(err) => CommandReport::CopyFailed(err.to_string()),
            };
            ConsoleEvent::Command(report)
        });
    }

    /// Save the trailing `save_back_count` history entries.
    pub fn save(&mut self) {
        let lines = self.settings.save_slice(self.history.entries()).to_vec();
        let count = lines.len();
        let effects = Arc::clone(&self.effects);
        self.spawn(async move {
            let report = match effects.save_to_file(lines).await {
                Ok(SaveOutcome::Saved) => CommandReport::Saved { count },
                Ok(SaveOutcome::Cancelled) => CommandReport::SaveCancelled,
                Err(err) => CommandReport::SaveFailed(err.to_string()),
            };
            ConsoleEvent::Command(report)
        });
    }

    /// Load lines from a file and evaluate them one at a time, in order.
    ///
    /// Each result is appended to the transcript as it arrives. Loaded lines
    /// are not added to history.
    pub fn load(&mut self) {
        let effects = Arc::clone(&self.effects);
        let gateway = Arc::clone(&self.gateway);
        let timeout = self.budget.evaluate();
        let startup = self.startup_barrier();
        self.spawn_streaming(move |tx| async move {
            let lines = match effects.load_from_file().await {
                Ok(LoadOutcome::Lines(lines)) => lines,
                Ok(LoadOutcome::Cancelled) => {
                    return ConsoleEvent::Command(CommandReport::LoadCancelled);
                }
                Err(err) => {
                    return ConsoleEvent::Command(CommandReport::LoadFailed(err.to_string()));
                }
            };

            let lines: Vec<String> = lines
                .into_iter()
                .filter(|line| !line.trim().is_empty())
                .collect();
            if lines.is_empty() {
                return ConsoleEvent::Command(CommandReport::LoadedNothing);
            }

            startup.await;
            let mut count = 0;
            for request in lines {
                let result = match gateway.evaluate(request.clone(), timeout).await {
                    Ok(text) | Err(text) => text,
                };
                count += 1;
                if tx.send(ConsoleEvent::LoadedLine { request, result }).is_err() {
                    break;
                }
            }
            ConsoleEvent::Command(CommandReport::Loaded { count })
        });
    }

    pub(super) fn record_loaded_line(&mut self, request: String, result: String) {
        self.transcript.push(TranscriptEntry { request, result });
    }

    pub(super) fn report_command(&mut self, report: CommandReport, now: Instant) {
        match &report {
            CommandReport::QuitFailed(err)
            | CommandReport::CopyFailed(err)
            | CommandReport::SaveFailed(err)
            | CommandReport::LoadFailed(err) => tracing::warn!("Command failed: {err}"),
            CommandReport::Quit => tracing::info!("Quit requested"),
            _ => tracing::debug!(?report, "Command finished"),
        }
        if let Some((text, severity)) = report.toast() {
            self.toast.raise(text, severity, now);
        }
    }
}
