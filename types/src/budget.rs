use std::time::Duration;

use serde::Deserialize;

const DEFAULT_EVALUATE_TIMEOUT_MS: u64 = 500;
const DEFAULT_PREVIEW_TIMEOUT_MS: u64 = 100;

/// Timeout budgets handed to the evaluation gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvalBudget {
    /// Budget for a submitted expression.
    pub evaluate_timeout_ms: u64,
    /// Budget for a live hint preview.
    pub preview_timeout_ms: u64,
}

impl Default for EvalBudget {
    fn default() -> Self {
        Self {
            evaluate_timeout_ms: DEFAULT_EVALUATE_TIMEOUT_MS,
            preview_timeout_ms: DEFAULT_PREVIEW_TIMEOUT_MS,
        }
    }
}

impl EvalBudget {
    #[must_use]
    pub const fn evaluate(&self) -> Duration {
        Duration::from_millis(self.evaluate_timeout_ms)
    }

    #[must_use]
    pub const fn preview(&self) -> Duration {
        Duration::from_millis(self.preview_timeout_ms)
    }
}
