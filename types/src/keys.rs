//! Host-independent key events.
//!
//! The terminal layer translates its native events into these values so the
//! engine never depends on a particular input backend.

/// A key as seen by the console, independent of keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Backspace,
    Delete,
    Esc,
}

/// Modifier keys held while a key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// True when shift, ctrl or meta is held.
    ///
    /// These are the modifiers the console reserves for multi-line editing
    /// and command chords. Alt is left to the host.
    #[must_use]
    pub const fn any_reserved(self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Whether the user currently has a non-empty text selection on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionState {
    #[default]
    Collapsed,
    Active,
}

/// An immutable key press offered to the console's handler chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub selection: SelectionState,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            code,
            modifiers,
            selection: SelectionState::Collapsed,
        }
    }

    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    #[must_use]
    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::CTRL)
    }

    #[must_use]
    pub const fn with_selection(mut self, selection: SelectionState) -> Self {
        self.selection = selection;
        self
    }

    /// The key was pressed with none of the reserved modifiers.
    #[must_use]
    pub const fn is_unmodified(&self) -> bool {
        !self.modifiers.any_reserved()
    }

    /// Returns the character of a Ctrl chord, lowercased.
    #[must_use]
    pub fn ctrl_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if self.modifiers.ctrl => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }
}
