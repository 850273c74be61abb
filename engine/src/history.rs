//! Submitted-input history and the navigation cursor over it.
//!
//! The log is append-only for the session. The cursor counts backward from
//! the newest entry: `0` is live editing, `1` the most recent entry, `k` the
//! k-th most recent.
//!
//! ```text
//! LIVE --Up (buffer empty, log non-empty)--> HISTORY(1)
//! HISTORY(k) --Up-->   HISTORY(min(k+1, N))
//! HISTORY(k) --Down--> HISTORY(k-1)        for k > 1
//! HISTORY(1) --Down--> LIVE (buffer cleared)
//! ```

/// Ordered log of submitted inputs, oldest first.
///
/// Duplicates are kept: the log records every submission verbatim, including
/// ones that evaluated to an error.
#[derive(Debug, Default, Clone)]
pub struct HistoryLog {
    entries: Vec<String>,
}

impl HistoryLog {
    /// Append a submission. Empty text is not recorded.
    pub fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.entries.push(text.to_owned());
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry shown at cursor position `k` (1 = most recent).
    #[must_use]
    pub fn recall(&self, k: usize) -> Option<&str> {
        if k == 0 {
            return None;
        }
        let index = self.entries.len().checked_sub(k)?;
        self.entries.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Up: towards older entries.
    Older,
    /// Down: towards newer entries and finally live editing.
    Newer,
}

/// What a navigation key did to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStep {
    /// Show the entry at this cursor position.
    Show(usize),
    /// Left history; the buffer is cleared for live typing.
    ResumeLive,
    /// Nothing to do; the key belongs to the host.
    Unchanged,
}

/// Offset into history currently displayed in the buffer, or 0 when live.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NavigationCursor(usize);

impl NavigationCursor {
    pub const LIVE: Self = Self(0);

    #[must_use]
    pub const fn position(self) -> usize {
        self.0
    }

    #[must_use]
    pub const fn is_live(self) -> bool {
        self.0 == 0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Apply one Up/Down press.
    ///
    /// `history_len` bounds the cursor; `buffer_empty` gates entering history
    /// from live editing so in-progress text is never overwritten.
    pub fn step(
        &mut self,
        direction: Direction,
        history_len: usize,
        buffer_empty: bool,
    ) -> NavigationStep {
        if self.0 > 0 {
            match direction {
                Direction::Older => {
                    self.0 = (self.0 + 1).min(history_len);
                }
                Direction::Newer => {
                    self.0 -= 1;
                    if self.0 < 1 {
                        self.reset();
                        return NavigationStep::ResumeLive;
                    }
                }
            }
            return NavigationStep::Show(self.0);
        }

        if direction == Direction::Older && buffer_empty && history_len > 0 {
            self.0 = 1;
            return NavigationStep::Show(1);
        }

        NavigationStep::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(items: &[&str]) -> HistoryLog {
        let mut log = HistoryLog::default();
        for item in items {
            log.push(item);
        }
        log
    }

    #[test]
    fn push_ignores_empty_keeps_duplicates() {
        let log = log(&["1+1", "", "1+1"]);
        assert_eq!(log.entries(), &["1+1", "1+1"]);
    }

    #[test]
    fn recall_counts_from_the_end() {
        let log = log(&["a", "b", "c"]);
        assert_eq!(log.recall(1), Some("c"));
        assert_eq!(log.recall(3), Some("a"));
        assert_eq!(log.recall(0), None);
        assert_eq!(log.recall(4), None);
    }

    #[test]
    fn enter_history_only_from_empty_buffer() {
        let mut cursor = NavigationCursor::LIVE;
        assert_eq!(
            cursor.step(Direction::Older, 2, false),
            NavigationStep::Unchanged
        );
        assert!(cursor.is_live());
        assert_eq!(
            cursor.step(Direction::Older, 2, true),
            NavigationStep::Show(1)
        );
    }

    #[test]
    fn empty_history_is_noop() {
        let mut cursor = NavigationCursor::LIVE;
        assert_eq!(
            cursor.step(Direction::Older, 0, true),
            NavigationStep::Unchanged
        );
    }

    #[test]
    fn down_while_live_is_noop() {
        let mut cursor = NavigationCursor::LIVE;
        assert_eq!(
            cursor.step(Direction::Newer, 3, true),
            NavigationStep::Unchanged
        );
        assert!(cursor.is_live());
    }

    #[test]
    fn up_clamps_at_oldest() {
        let mut cursor = NavigationCursor::LIVE;
        cursor.step(Direction::Older, 2, true);
        cursor.step(Direction::Older, 2, false);
        assert_eq!(
            cursor.step(Direction::Older, 2, false),
            NavigationStep::Show(2)
        );
    }

    #[test]
    fn down_past_newest_resumes_live() {
        let mut cursor = NavigationCursor::LIVE;
        cursor.step(Direction::Older, 3, true);
        cursor.step(Direction::Older, 3, false);
        assert_eq!(
            cursor.step(Direction::Newer, 3, false),
            NavigationStep::Show(1)
        );
        assert_eq!(
            cursor.step(Direction::Newer, 3, false),
            NavigationStep::ResumeLive
        );
        assert!(cursor.is_live());
    }
}
