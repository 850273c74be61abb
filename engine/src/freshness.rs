//! Freshness tokens for asynchronous requests.
//!
//! Every request that can change what is on screen is stamped with the buffer
//! generation it was issued against and a sequence number. A response is
//! applied only when the buffer is still in that generation *and* no newer
//! request of the same kind has been issued since. Anything else is stale and
//! dropped without touching visible state.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Short-budget evaluation feeding the hint line.
    Preview,
    /// Suggestion feeding the highlight overlay.
    Overlay,
    /// Suggestion requested by the completion key.
    Completion,
}

impl RequestKind {
    const fn slot(self) -> usize {
        match self {
            Self::Preview => 0,
            Self::Overlay => 1,
            Self::Completion => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    kind: RequestKind,
    generation: u64,
    seq: u64,
}

impl RequestToken {
    #[must_use]
    pub const fn kind(self) -> RequestKind {
        self.kind
    }
}

#[derive(Debug, Default)]
pub struct RequestLedger {
    generation: u64,
    next_seq: u64,
    latest: [u64; 3],
}

impl RequestLedger {
    /// The buffer changed; everything issued so far is now stale.
    pub fn advance(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stamp a new request, superseding earlier requests of the same kind.
    pub fn issue(&mut self, kind: RequestKind) -> RequestToken {
        self.next_seq += 1;
        self.latest[kind.slot()] = self.next_seq;
        RequestToken {
            kind,
            generation: self.generation,
            seq: self.next_seq,
        }
    }

    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.generation == self.generation && self.latest[token.kind.slot()] == token.seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_current() {
        let mut ledger = RequestLedger::default();
        let token = ledger.issue(RequestKind::Preview);
        assert!(ledger.is_current(token));
    }

    #[test]
    fn advancing_generation_stales_everything() {
        let mut ledger = RequestLedger::default();
        let preview = ledger.issue(RequestKind::Preview);
        let completion = ledger.issue(RequestKind::Completion);
        ledger.advance();
        assert!(!ledger.is_current(preview));
        assert!(!ledger.is_current(completion));
    }

    #[test]
    fn newer_request_of_same_kind_supersedes() {
        let mut ledger = RequestLedger::default();
        let first = ledger.issue(RequestKind::Preview);
        let second = ledger.issue(RequestKind::Preview);
        assert!(!ledger.is_current(first));
        assert!(ledger.is_current(second));
    }

    #[test]
    fn kinds_are_independent() {
        let mut ledger = RequestLedger::default();
        let preview = ledger.issue(RequestKind::Preview);
        let overlay = ledger.issue(RequestKind::Overlay);
        assert!(ledger.is_current(preview));
        assert!(ledger.is_current(overlay));
    }
}
