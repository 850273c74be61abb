//! Transient status notifications.

use std::time::{Duration, Instant};

/// How long a toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastSeverity {
    Success,
    /// Informational, e.g. a cancelled dialog.
    Note,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    pub severity: ToastSeverity,
    raised_at: Instant,
}

impl Toast {
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= TOAST_DURATION
    }
}

/// Holds at most one toast; raising a new one replaces the current one.
#[derive(Debug, Default)]
pub struct ToastSlot {
    current: Option<Toast>,
}

impl ToastSlot {
    pub fn raise(&mut self, text: impl Into<String>, severity: ToastSeverity, now: Instant) {
        self.current = Some(Toast {
            text: text.into(),
            severity,
            raised_at: now,
        });
    }

    #[must_use]
    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    /// Drop the toast once its display time is over.
    pub fn expire(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|toast| toast.is_expired(now)) {
            self.current = None;
        }
    }
}
