//! Live hint and highlight overlay.
//!
//! Both views track the buffer: every buffer write issues one preview and one
//! overlay suggestion request. Results that arrive after the buffer moved on,
//! or after a newer request of the same kind, are dropped.

use std::sync::Arc;

use crate::freshness::{RequestKind, RequestToken};
use crate::gateway::EvalOutcome;
use crate::surface::{Hint, Overlay};

use super::{Console, ConsoleEvent};

impl Console {
    /// Re-synchronize hint and overlay with the current buffer.
    pub(super) fn sync_live_views(&mut self) {
        self.refresh_hint();
        self.refresh_overlay();
    }

    /// Request a preview evaluation of the buffer for the hint line.
    pub fn refresh_hint(&mut self) {
        let token = self.ledger.issue(RequestKind::Preview);
        let input = self.buffer.text().to_owned();
        let gateway = Arc::clone(&self.gateway);
        let timeout = self.budget.preview();
        self.spawn(async move {
            let outcome = gateway.preview(input, timeout).await;
            ConsoleEvent::Preview { token, outcome }
        });
    }

    /// Redraw the overlay from the buffer and request a fresh suggestion.
    ///
    /// The overlay drops any old suggestion immediately, so repeated calls
    /// without a buffer change converge on the same single suggestion.
    pub fn refresh_overlay(&mut self) {
        self.overlay = Overlay::plain(self.buffer.text());
        let token = self.ledger.issue(RequestKind::Overlay);
        let input = self.buffer.text().to_owned();
        let gateway = Arc::clone(&self.gateway);
        self.spawn(async move {
            let suggestion = gateway.complete(input).await;
            ConsoleEvent::Overlay { token, suggestion }
        });
    }

    pub(super) fn apply_preview(&mut self, token: RequestToken, outcome: EvalOutcome) {
        if !self.ledger.is_current(token) {
            tracing::debug!("Discarding stale preview");
            return;
        }
        self.hint = Hint::from_outcome(outcome);
    }

    pub(super) fn apply_overlay(&mut self, token: RequestToken, suggestion: Option<String>) {
        if !self.ledger.is_current(token) {
            tracing::debug!("Discarding stale overlay suggestion");
            return;
        }
        self.overlay = Overlay {
            typed: self.buffer.text().to_owned(),
            suggestion: suggestion.unwrap_or_default(),
        };
    }
}
