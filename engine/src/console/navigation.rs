//! Up/Down history navigation.

use tally_types::{KeyCode, KeyEvent};

use crate::history::{Direction, NavigationStep};

use super::{Console, Handled};

impl Console {
    /// Step the navigation cursor and show the selected entry.
    ///
    /// Unclaimed presses (live mode with text in the buffer, or Down while
    /// live) still re-sync the live views before falling through.
    pub(super) fn history_key(&mut self, key: &KeyEvent) -> Handled {
        let direction = match key.code {
            KeyCode::Up => Direction::Older,
            _ => Direction::Newer,
        };

        let step = self
            .cursor
            .step(direction, self.history.len(), self.buffer.is_empty());

        let (text, handled) = match step {
            NavigationStep::Show(k) => match self.history.recall(k) {
                Some(entry) => (entry.to_owned(), Handled::Claimed),
                None => {
                    // History only grows, so a valid cursor always recalls.
                    tracing::warn!(position = k, "Navigation cursor out of range");
                    self.cursor.reset();
                    (String::new(), Handled::Claimed)
                }
            },
            NavigationStep::ResumeLive => (String::new(), Handled::Claimed),
            NavigationStep::Unchanged => (self.buffer.text().to_owned(), Handled::Passed),
        };

        if text == self.buffer.text() {
            self.sync_live_views();
        } else {
            self.set_buffer(text);
        }
        handled
    }
}
