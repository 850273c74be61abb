//! Core engine for Tally: the console state machine.
//!
//! This crate has no terminal dependencies. The evaluator and the platform
//! side effects are reached through the [`EvaluationGateway`] and
//! [`SystemEffects`] traits; the host supplies implementations and drives
//! [`Console`] from its frame loop.

mod buffer;
mod console;
mod effects;
mod freshness;
mod gateway;
mod history;
mod surface;
mod toast;
mod transcript;

pub use buffer::InputBuffer;
pub use console::{CLEAR_COMMAND, Console, KeyDisposition};
pub use effects::{EffectError, EffectFut, LoadOutcome, SaveOutcome, SystemEffects};
pub use freshness::{RequestKind, RequestLedger, RequestToken};
pub use gateway::{CompletionFut, EvalFut, EvalOutcome, EvaluationGateway};
pub use history::{Direction, HistoryLog, NavigationCursor, NavigationStep};
pub use surface::{Hint, HintClass, Overlay};
pub use toast::{TOAST_DURATION, Toast, ToastSeverity, ToastSlot};
pub use transcript::{SubmitTicket, Transcript, TranscriptEntry};

pub use tally_types::{
    CopySource, EvalBudget, KeyCode, KeyEvent, Modifiers, SelectionState, SettingKey,
    SettingValue, Settings,
};
