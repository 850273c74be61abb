//! Tab completion.

use std::sync::Arc;

use tally_types::KeyEvent;

use crate::freshness::{RequestKind, RequestToken};

use super::{Console, ConsoleEvent, Handled};

impl Console {
    /// Tab is always claimed so focus never leaves the input, even when
    /// there turns out to be nothing to complete.
    pub(super) fn autocomplete_key(&mut self, _key: &KeyEvent) -> Handled {
        let token = self.ledger.issue(RequestKind::Completion);
        let input = self.buffer.text().to_owned();
        let gateway = Arc::clone(&self.gateway);
        self.spawn(async move {
            let suggestion = gateway.complete(input).await;
            ConsoleEvent::Completion { token, suggestion }
        });
        Handled::Claimed
    }

    /// Append a completion suffix if the buffer has not changed since Tab.
    pub(super) fn apply_completion(&mut self, token: RequestToken, suggestion: Option<String>) {
        if !self.ledger.is_current(token) {
            tracing::debug!("Discarding stale completion");
            return;
        }
        let Some(suffix) = suggestion.filter(|s| !s.is_empty()) else {
            return;
        };
        let text = format!("{}{suffix}", self.buffer.text());
        self.set_buffer(text);
    }
}
