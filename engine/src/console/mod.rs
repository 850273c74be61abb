//! The console controller.
//!
//! [`Console`] owns every piece of input state: the buffer, history and
//! navigation cursor, hint, overlay, transcript and toast. Key presses are
//! offered to an ordered chain of handlers; anything no handler claims falls
//! through to plain text editing.
//!
//! Asynchronous work (evaluation, previews, completions, clipboard and file
//! collaborators) runs on spawned tokio tasks that report back over an mpsc
//! channel. The host drains that channel with [`Console::process_events`]
//! once per frame, so all state transitions happen on the caller's thread.
//!
//! # Buffer writes
//!
//! Every change to the buffer text goes through [`Console::set_buffer`] (or
//! the private `commit`, which it wraps). That call stales all outstanding
//! preview/overlay/completion requests and issues fresh ones, so the hint and
//! overlay can never show results for text that is no longer displayed.

mod autocomplete;
mod commands;
mod hint;
mod navigation;
mod submit;


use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tally_types::{EvalBudget, KeyCode, KeyEvent, Settings};
use tokio::sync::{mpsc, watch};

use crate::buffer::InputBuffer;
use crate::effects::SystemEffects;
use crate::freshness::{RequestLedger, RequestToken};
use crate::gateway::{EvalOutcome, EvaluationGateway};
use crate::history::{HistoryLog, NavigationCursor};
use crate::surface::{Hint, Overlay};
use crate::toast::{Toast, ToastSeverity, ToastSlot};
use crate::transcript::{SubmitTicket, Transcript};

use commands::CommandReport;
pub use submit::CLEAR_COMMAND;

/// Upper bound on events applied per `process_events` call; never starve rendering.
const MAX_EVENTS_PER_FRAME: usize = 256;

/// What the console did with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// A handler consumed the key; the host must suppress its default action.
    Claimed,
    /// Default editing changed the buffer text.
    Edited,
    /// Default editing moved the caret.
    Moved,
    /// Nothing happened.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handled {
    Claimed,
    Passed,
}

/// One entry in the key handler chain.
struct KeyBinding {
    name: &'static str,
    applies: fn(&KeyEvent) -> bool,
    run: fn(&mut Console, &KeyEvent) -> Handled,
}

/// Handler chain, in priority order. Predicates are disjoint; the first
/// handler that claims a key stops the walk.
const KEY_BINDINGS: [KeyBinding; 4] = [
    KeyBinding {
        name: "autocomplete",
        applies: |key| key.code == KeyCode::Tab && key.is_unmodified(),
        run: Console::autocomplete_key,
    },
    KeyBinding {
        name: "history",
        applies: |key| matches!(key.code, KeyCode::Up | KeyCode::Down) && key.is_unmodified(),
        run: Console::history_key,
    },
    KeyBinding {
        name: "submit",
        applies: |key| key.code == KeyCode::Enter && key.is_unmodified(),
        run: Console::submit_key,
    },
    KeyBinding {
        name: "commands",
        applies: |key| key.ctrl_char().is_some(),
        run: Console::command_key,
    },
];

/// Results flowing back from spawned tasks.
#[derive(Debug)]
enum ConsoleEvent {
    Preview {
        token: RequestToken,
        outcome: EvalOutcome,
    },
    Overlay {
        token: RequestToken,
        suggestion: Option<String>,
    },
    Completion {
        token: RequestToken,
        suggestion: Option<String>,
    },
    Evaluated {
        ticket: SubmitTicket,
        request: String,
        result: String,
    },
    /// One line of a file load; more events follow from the same task.
    LoadedLine { request: String, result: String },
    Command(CommandReport),
    StartupDone { evaluated: usize, failed: usize },
}

impl ConsoleEvent {
    /// Whether this is the last event its task sends.
    fn is_terminal(&self) -> bool {
        !matches!(self, Self::LoadedLine { .. })
    }
}

pub struct Console {
    buffer: InputBuffer,
    history: HistoryLog,
    cursor: NavigationCursor,
    hint: Hint,
    overlay: Overlay,
    transcript: Transcript,
    toast: ToastSlot,
    ledger: RequestLedger,
    settings: Arc<Settings>,
    budget: EvalBudget,
    gateway: Arc<dyn EvaluationGateway>,
    effects: Arc<dyn SystemEffects>,
    events_tx: mpsc::UnboundedSender<ConsoleEvent>,
    events_rx: mpsc::UnboundedReceiver<ConsoleEvent>,
    in_flight: usize,
    /// Flips to true once startup inputs have been evaluated.
    startup_ready: watch::Receiver<bool>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("buffer", &self.buffer)
            .field("cursor", &self.cursor)
            .field("history_len", &self.history.len())
            .field("hint", &self.hint)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl Console {
    pub fn new(
        settings: Settings,
        budget: EvalBudget,
        gateway: Arc<dyn EvaluationGateway>,
        effects: Arc<dyn SystemEffects>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (_, startup_ready) = watch::channel(true);
        Self {
            buffer: InputBuffer::default(),
            history: HistoryLog::default(),
            cursor: NavigationCursor::LIVE,
            hint: Hint::default(),
            overlay: Overlay::default(),
            transcript: Transcript::default(),
            toast: ToastSlot::default(),
            ledger: RequestLedger::default(),
            settings: Arc::new(settings),
            budget,
            gateway,
            effects,
            events_tx,
            events_rx,
            in_flight: 0,
            startup_ready,
        }
    }

    // ------------------------------------------------------------------
    // Read access for the rendering layer
    // ------------------------------------------------------------------

    #[must_use]
    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn buffer_text(&self) -> &str {
        self.buffer.text()
    }

    #[must_use]
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    #[must_use]
    pub fn navigation(&self) -> NavigationCursor {
        self.cursor
    }

    #[must_use]
    pub fn hint(&self) -> &Hint {
        &self.hint
    }

    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// True once after new transcript entries; the renderer should scroll to them.
    pub fn take_scroll_request(&mut self) -> bool {
        self.transcript.take_scroll_request()
    }

    #[must_use]
    pub fn toast(&self) -> Option<&Toast> {
        self.toast.current()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Requests issued whose final result has not been applied yet.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.in_flight
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Replace the buffer text, placing the caret at the end.
    ///
    /// This is the single write path for buffer text: it stales outstanding
    /// requests and re-synchronizes the hint and overlay.
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.commit(InputBuffer::with_text(text));
    }

    fn commit(&mut self, buffer: InputBuffer) {
        self.buffer = buffer;
        self.ledger.advance();
        self.sync_live_views();
    }

    /// Swap in a fresh settings snapshot.
    pub fn refresh_settings(&mut self, settings: Settings) {
        tracing::debug!("Settings refreshed");
        self.settings = Arc::new(settings);
    }

    /// Show a host-originated notification.
    pub fn raise_toast(&mut self, text: impl Into<String>, severity: ToastSeverity) {
        self.toast.raise(text, severity, Instant::now());
    }

    /// Advance time-based state.
    pub fn tick(&mut self, now: Instant) {
        self.toast.expire(now);
    }

    /// Offer a key press to the handler chain, then to default editing.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyDisposition {
        for binding in &KEY_BINDINGS {
            if !(binding.applies)(&key) {
                continue;
            }
            if (binding.run)(self, &key) == Handled::Claimed {
                tracing::trace!(handler = binding.name, "Key claimed");
                return KeyDisposition::Claimed;
            }
        }
        self.default_edit(&key)
    }

    /// Insert text at the caret as typed input (paste).
    pub fn insert_text(&mut self, text: &str) -> KeyDisposition {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut draft = self.buffer.clone();
        draft.insert_text(&normalized);
        self.commit_edit(draft)
    }

    fn default_edit(&mut self, key: &KeyEvent) -> KeyDisposition {
        let mut draft = self.buffer.clone();
        match key.code {
            KeyCode::Char(c) if !key.modifiers.ctrl && !key.modifiers.meta => draft.insert_char(c),
            // Only reached with a reserved modifier; plain Enter submits.
            KeyCode::Enter => draft.insert_char('\n'),
            KeyCode::Backspace => draft.backspace(),
            KeyCode::Delete => draft.delete_forward(),
            KeyCode::Left | KeyCode::Right | KeyCode::Home | KeyCode::End => {
                match key.code {
                    KeyCode::Left => self.buffer.move_left(),
                    KeyCode::Right => self.buffer.move_right(),
                    KeyCode::Home => self.buffer.move_home(),
                    _ => self.buffer.move_end(),
                }
                return KeyDisposition::Moved;
            }
            // Reached when history navigation declined the key.
            KeyCode::Up | KeyCode::Down => {
                let moved = if key.code == KeyCode::Up {
                    self.buffer.move_up()
                } else {
                    self.buffer.move_down()
                };
                return if moved {
                    KeyDisposition::Moved
                } else {
                    KeyDisposition::Ignored
                };
            }
            _ => return KeyDisposition::Ignored,
        }
        self.commit_edit(draft)
    }

    /// Commit a direct user edit. Editing always returns to live mode.
    fn commit_edit(&mut self, draft: InputBuffer) -> KeyDisposition {
        if draft.text() == self.buffer.text() {
            self.buffer = draft;
            return KeyDisposition::Ignored;
        }
        self.cursor.reset();
        self.commit(draft);
        KeyDisposition::Edited
    }

    // ------------------------------------------------------------------
    // Settlement
    // ------------------------------------------------------------------

    /// Apply every result that is ready, without waiting.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while applied < MAX_EVENTS_PER_FRAME {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    self.apply(event);
                    applied += 1;
                }
                Err(_) => break,
            }
        }
        applied
    }

    /// Wait for the next result and apply it.
    ///
    /// Returns `false` without waiting when nothing is outstanding.
    pub async fn settle_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, event: ConsoleEvent) {
        if event.is_terminal() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        match event {
            ConsoleEvent::Preview { token, outcome } => self.apply_preview(token, outcome),
            ConsoleEvent::Overlay { token, suggestion } => self.apply_overlay(token, suggestion),
            ConsoleEvent::Completion { token, suggestion } => {
                self.apply_completion(token, suggestion);
            }
            ConsoleEvent::Evaluated {
                ticket,
                request,
                result,
            } => self.finish_submission(ticket, request, result),
            ConsoleEvent::LoadedLine { request, result } => {
                self.record_loaded_line(request, result);
            }
            ConsoleEvent::Command(report) => self.report_command(report, Instant::now()),
            ConsoleEvent::StartupDone { evaluated, failed } => {
                tracing::info!(evaluated, failed, "Startup inputs evaluated");
            }
        }
    }

    /// Run `task` on the runtime and deliver its single result event.
    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ConsoleEvent> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let event = task.await;
            // Receiver lives as long as the console; a send error means it is gone.
            let _ = tx.send(event);
        });
    }

    /// Like `spawn`, but the task may send intermediate events before its result.
    fn spawn_streaming<F, Fut>(&mut self, task: F)
    where
        F: FnOnce(mpsc::UnboundedSender<ConsoleEvent>) -> Fut,
        Fut: Future<Output = ConsoleEvent> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.events_tx.clone();
        let fut = task(tx.clone());
        tokio::spawn(async move {
            let event = fut.await;
            let _ = tx.send(event);
        });
    }

    /// Evaluate `global_inputs` in order, discarding their output.
    ///
    /// Submissions and file loads made before this finishes wait for it, so
    /// they always see the startup bindings.
    pub fn run_startup_inputs(&mut self) {
        let lines: Vec<String> = self
            .settings
            .global_input_lines()
            .map(str::to_owned)
            .collect();
        if lines.is_empty() {
            return;
        }

        let (ready_tx, ready_rx) = watch::channel(false);
        self.startup_ready = ready_rx;
        let gateway = Arc::clone(&self.gateway);
        let timeout = self.budget.evaluate();
        self.spawn(async move {
            let mut failed = 0;
            let evaluated = lines.len();
            for line in lines {
                if let Err(err) = gateway.evaluate(line.clone(), timeout).await {
                    tracing::warn!(input = %line, "Startup input failed: {err}");
                    failed += 1;
                }
            }
            ready_tx.send_replace(true);
            ConsoleEvent::StartupDone { evaluated, failed }
        });
    }

    /// Resolves once startup inputs are done (immediately if there were none).
    fn startup_barrier(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut ready = self.startup_ready.clone();
        async move {
            // A dropped sender means the startup task is gone; do not wait.
            let _ = ready.wait_for(|done| *done).await;
        }
    }
}
