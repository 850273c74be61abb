//! Live hint and highlight overlay shown beside the input.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HintClass {
    /// Nothing to show (cleared after submit, or never resolved).
    #[default]
    Empty,
    Valid,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hint {
    pub text: String,
    pub class: HintClass,
}

impl Hint {
    #[must_use]
    pub fn from_outcome(outcome: Result<String, String>) -> Self {
        match outcome {
            Ok(text) => Self {
                text,
                class: HintClass::Valid,
            },
            Err(text) => Self {
                text,
                class: HintClass::Error,
            },
        }
    }
}

/// Two-segment rendering of the buffer: literal text followed by a greyed
/// suggestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub typed: String,
    pub suggestion: String,
}

impl Overlay {
    /// Overlay for `typed` with no suggestion yet.
    #[must_use]
    pub fn plain(typed: &str) -> Self {
        Self {
            typed: typed.to_owned(),
            suggestion: String::new(),
        }
    }
}
