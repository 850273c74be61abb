//! Terminal side effects: quit flag, clipboard and session files.
//!
//! Sessions are plain text files, one expression per line, named
//! `session-YYYYMMDD-HHMMSS.txt` inside the session directory. Saving always
//! creates a new file; loading picks the most recently modified one.
//!
//! An expression spanning several lines is written with every line after the
//! first indented by a tab, and read back as a single expression.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tally_engine::{EffectError, EffectFut, LoadOutcome, SaveOutcome, SystemEffects};
use tally_utils::{AtomicWriteOptions, Placement, atomic_write};

const SESSION_PREFIX: &str = "session-";
const SESSION_SUFFIX: &str = ".txt";
const CONTINUATION: char = '\t';

#[derive(Debug, Clone)]
pub struct TerminalEffects {
    quit: Arc<AtomicBool>,
    session_dir: PathBuf,
}

impl TerminalEffects {
    #[must_use]
    pub fn new(session_dir: impl Into<PathBuf>) -> Self {
        Self {
            quit: Arc::new(AtomicBool::new(false)),
            session_dir: session_dir.into(),
        }
    }

    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }
}

/// Saves within the same second get a `-N` suffix.
const MAX_NAME_ATTEMPTS: u32 = 100;

fn session_file_name(now: chrono::DateTime<chrono::Local>, attempt: u32) -> String {
    let stamp = now.format("%Y%m%d-%H%M%S");
    if attempt == 0 {
        format!("{SESSION_PREFIX}{stamp}{SESSION_SUFFIX}")
    } else {
        format!("{SESSION_PREFIX}{stamp}-{attempt}{SESSION_SUFFIX}")
    }
}

fn is_session_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(SESSION_PREFIX) && name.ends_with(SESSION_SUFFIX))
}

/// Most recently modified session file in `dir`, if any.
fn latest_session_file(dir: &Path) -> io::Result<Option<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };

    let mut latest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || !is_session_file(&path) {
            continue;
        }
        let modified = fs::metadata(&path)?.modified()?;
        // Names embed the timestamp, so they break mtime ties.
        let newer = latest
            .as_ref()
            .is_none_or(|(best, best_path)| (modified, &path) > (*best, best_path));
        if newer {
            latest = Some((modified, path));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

fn encode_session(entries: &[String]) -> String {
    let mut content = String::new();
    for entry in entries {
        for (i, line) in entry.split('\n').enumerate() {
            if i == 0 {
                // A leading tab would read back as a continuation.
                content.push_str(line.trim_start_matches(CONTINUATION));
            } else {
                content.push(CONTINUATION);
                content.push_str(line);
            }
            content.push('\n');
        }
    }
    content
}

fn decode_session(content: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    for line in content.lines() {
        match (line.strip_prefix(CONTINUATION), entries.last_mut()) {
            (Some(rest), Some(entry)) => {
                entry.push('\n');
                entry.push_str(rest);
            }
            (Some(rest), None) => entries.push(rest.to_string()),
            (None, _) => entries.push(line.to_string()),
        }
    }
    entries
}

fn save_session(dir: &Path, lines: &[String]) -> io::Result<PathBuf> {
    let content = encode_session(lines);
    let options = AtomicWriteOptions {
        placement: Placement::CreateNew,
        ..AtomicWriteOptions::default()
    };

    let now = chrono::Local::now();
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(session_file_name(now, attempt));
        match atomic_write(&path, content.as_bytes(), options) {
            Ok(()) => return Ok(path),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free session file name in {}", dir.display()),
    ))
}

fn load_session(dir: &Path) -> io::Result<Option<Vec<String>>> {
    let Some(path) = latest_session_file(dir)? else {
        return Ok(None);
    };
    let content = fs::read_to_string(&path)?;
    tracing::info!(path = %path.display(), "Loading session");
    Ok(Some(decode_session(&content)))
}

async fn blocking<T, F>(task: F) -> Result<T, EffectError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EffectError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| EffectError::Other(err.to_string()))?
}

impl SystemEffects for TerminalEffects {
    fn quit(&self) -> EffectFut<()> {
        self.quit.store(true, Ordering::Release);
        Box::pin(async { Ok(()) })
    }

    fn copy_to_clipboard(&self, text: String) -> EffectFut<()> {
        Box::pin(blocking(move || {
            arboard::Clipboard::new()
                .and_then(|mut clipboard| clipboard.set_text(text))
                .map_err(|err| EffectError::Clipboard(err.to_string()))
        }))
    }

    fn save_to_file(&self, lines: Vec<String>) -> EffectFut<SaveOutcome> {
        let dir = self.session_dir.clone();
        Box::pin(blocking(move || {
            if lines.is_empty() {
                return Ok(SaveOutcome::Cancelled);
            }
            let path = save_session(&dir, &lines)?;
            tracing::info!(path = %path.display(), lines = lines.len(), "Session saved");
            Ok(SaveOutcome::Saved)
        }))
    }

    fn load_from_file(&self) -> EffectFut<LoadOutcome> {
        let dir = self.session_dir.clone();
        Box::pin(blocking(move || {
            Ok(match load_session(&dir)? {
                Some(lines) => LoadOutcome::Lines(lines),
                None => LoadOutcome::Cancelled,
            })
        }))
    }
}
