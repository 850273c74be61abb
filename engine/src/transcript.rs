//! Output transcript of submitted requests and their results.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub request: String,
    pub result: String,
}

/// Position reserved for a submission at the moment Enter is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubmitTicket(u64);

/// Entries in submission order.
///
/// Evaluations can settle out of order; a settlement is held back until
/// every earlier ticket has settled, then released in ticket order.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_ticket: u64,
    next_release: u64,
    held: BTreeMap<u64, TranscriptEntry>,
    scroll_pending: bool,
}

impl Transcript {
    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    #[must_use]
    pub fn last_result(&self) -> Option<&str> {
        self.entries.last().map(|entry| entry.result.as_str())
    }

    pub fn reserve(&mut self) -> SubmitTicket {
        let ticket = SubmitTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// Record the outcome for `ticket`. Returns how many entries were released.
    pub fn settle(&mut self, ticket: SubmitTicket, entry: TranscriptEntry) -> usize {
        self.held.insert(ticket.0, entry);
        let mut released = 0;
        while let Some(entry) = self.held.remove(&self.next_release) {
            self.push(entry);
            self.next_release += 1;
            released += 1;
        }
        released
    }

    /// Append an entry that was not ticketed (loaded lines).
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
        self.scroll_pending = true;
    }

    /// Drop every visible entry. Outstanding tickets still settle afterwards.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.scroll_pending = false;
    }

    /// True once after entries were added; the renderer scrolls to the end.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(request: &str, result: &str) -> TranscriptEntry {
        TranscriptEntry {
            request: request.to_string(),
            result: result.to_string(),
        }
    }

    #[test]
    fn out_of_order_settlement_is_released_in_order() {
        let mut transcript = Transcript::default();
        let first = transcript.reserve();
        let second = transcript.reserve();

        assert_eq!(transcript.settle(second, entry("2+2", "4")), 0);
        assert!(transcript.entries().is_empty());

        assert_eq!(transcript.settle(first, entry("1+1", "2")), 2);
        let requests: Vec<_> = transcript
            .entries()
            .iter()
            .map(|e| e.request.as_str())
            .collect();
        assert_eq!(requests, vec!["1+1", "2+2"]);
    }

    #[test]
    fn scroll_request_is_taken_once() {
        let mut transcript = Transcript::default();
        assert!(!transcript.take_scroll_request());
        transcript.push(entry("a", "b"));
        assert!(transcript.take_scroll_request());
        assert!(!transcript.take_scroll_request());
    }

    #[test]
    fn clear_keeps_ticket_order() {
        let mut transcript = Transcript::default();
        let first = transcript.reserve();
        transcript.push(entry("x", "1"));
        transcript.clear();
        transcript.settle(first, entry("1+1", "2"));
        assert_eq!(transcript.last_result(), Some("2"));
        assert_eq!(transcript.entries().len(), 1);
    }
}
