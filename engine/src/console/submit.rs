//! Enter: evaluate the buffer and record the result.

use std::sync::Arc;

use tally_types::KeyEvent;

use crate::surface::Hint;
use crate::transcript::{SubmitTicket, TranscriptEntry};

use super::{Console, ConsoleEvent, Handled};

/// Buffer text that clears the console instead of being evaluated.
pub const CLEAR_COMMAND: &str = "clear";

impl Console {
    pub(super) fn submit_key(&mut self, _key: &KeyEvent) -> Handled {
        self.submit();
        Handled::Claimed
    }

    /// Submit the buffer.
    ///
    /// The transcript slot is reserved now, so results land in submission
    /// order even when evaluations finish out of order.
    pub fn submit(&mut self) {
        let request = self.buffer.text().to_owned();
        if request == CLEAR_COMMAND {
            self.clear_console();
            return;
        }

        self.history.push(&request);
        self.cursor.reset();

        let ticket = self.transcript.reserve();
        let gateway = Arc::clone(&self.gateway);
        let timeout = self.budget.evaluate();
        let startup = self.startup_barrier();
        tracing::debug!(input = %request, "Submitting");
        self.spawn(async move {
            startup.await;
            let result = match gateway.evaluate(request.clone(), timeout).await {
                Ok(text) | Err(text) => text,
            };
            ConsoleEvent::Evaluated {
                ticket,
                request,
                result,
            }
        });
    }

    pub(super) fn finish_submission(
        &mut self,
        ticket: SubmitTicket,
        request: String,
        result: String,
    ) {
        self.transcript
            .settle(ticket, TranscriptEntry { request, result });
        self.cursor.reset();
        self.set_buffer(String::new());
        self.hint = Hint::default();
    }

    /// Empty the transcript and buffer without evaluating anything.
    pub fn clear_console(&mut self) {
        self.transcript.clear();
        self.cursor.reset();
        self.set_buffer(String::new());
        self.hint = Hint::default();
    }
}
