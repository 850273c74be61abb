//! Evaluation gateway: the console's view of the expression evaluator.
//!
//! Implementations must always resolve. A failed evaluation is a value
//! (`Err(message)`), not a panic or a dropped future.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Displayable success or error text for one input.
pub type EvalOutcome = Result<String, String>;

pub type EvalFut = Pin<Box<dyn Future<Output = EvalOutcome> + Send + 'static>>;

pub type CompletionFut = Pin<Box<dyn Future<Output = Option<String>> + Send + 'static>>;

pub trait EvaluationGateway: Send + Sync {
    /// Full evaluation. May have side effects in the evaluator (bindings).
    fn evaluate(&self, input: String, timeout: Duration) -> EvalFut;

    /// Hint-only evaluation. Must not have side effects.
    fn preview(&self, input: String, timeout: Duration) -> EvalFut;

    /// Text to append to `input`, or `None` when there is no suggestion.
    fn complete(&self, input: String) -> CompletionFut;
}
