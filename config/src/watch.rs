//! Reload settings when the config file changes on disk.

use std::time::{Duration, Instant, SystemTime};

use tally_types::Settings;

use crate::{ConfigError, FileSettingsStore, SettingsStore};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls the config file's modification time from the frame loop.
#[derive(Debug)]
pub struct SettingsWatcher {
    store: FileSettingsStore,
    seen: Option<SystemTime>,
    interval: Duration,
    last_poll: Option<Instant>,
}

impl SettingsWatcher {
    /// Start watching; the file's current state counts as already seen.
    #[must_use]
    pub fn new(store: FileSettingsStore) -> Self {
        let seen = store.modified();
        Self {
            store,
            seen,
            interval: DEFAULT_POLL_INTERVAL,
            last_poll: None,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn store(&self) -> &FileSettingsStore {
        &self.store
    }

    /// Fresh settings if the file changed since the last poll.
    ///
    /// Checks at most once per interval. A failed reload is returned once;
    /// the next change triggers another attempt.
    pub fn poll(&mut self, now: Instant) -> Option<Result<Settings, ConfigError>> {
        if let Some(last) = self.last_poll
            && now.saturating_duration_since(last) < self.interval
        {
            return None;
        }
        self.last_poll = Some(now);

        let modified = self.store.modified();
        if modified == self.seen {
            return None;
        }
        self.seen = modified;
        tracing::debug!(path = %self.store.path().display(), "Config file changed");
        Some(self.store.load_settings())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(path: &std::path::Path, content: &str, offset_secs: u64) {
        fs::write(path, content).unwrap();
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + offset_secs))
            .unwrap();
    }

    #[test]
    fn unchanged_file_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        touch(&path, "[console]\nctrl_d_closes = true\n", 0);

        let mut watcher = SettingsWatcher::new(FileSettingsStore::new(&path));
        assert!(watcher.poll(Instant::now()).is_none());
    }

    #[test]
    fn change_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        touch(&path, "", 0);
        let mut watcher =
            SettingsWatcher::new(FileSettingsStore::new(&path)).with_interval(Duration::ZERO);

        touch(&path, "[console]\nctrl_d_closes = true\n", 10);
        let settings = watcher.poll(Instant::now()).unwrap().unwrap();
        assert!(settings.ctrl_d_closes);
        assert!(watcher.poll(Instant::now()).is_none());
    }

    #[test]
    fn polls_are_rate_limited() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut watcher = SettingsWatcher::new(FileSettingsStore::new(&path))
            .with_interval(Duration::from_secs(60));

        let start = Instant::now();
        assert!(watcher.poll(start).is_none());
        touch(&path, "", 0);
        assert!(watcher.poll(start + Duration::from_secs(1)).is_none());
        assert!(watcher.poll(start + Duration::from_secs(61)).is_some());
    }

    #[test]
    fn invalid_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut watcher =
            SettingsWatcher::new(FileSettingsStore::new(&path)).with_interval(Duration::ZERO);

        touch(&path, "[console]\nctrl_d_closes = \"maybe\"\n", 5);
        assert!(matches!(
            watcher.poll(Instant::now()),
            Some(Err(ConfigError::Parse { .. }))
        ));
    }
}
