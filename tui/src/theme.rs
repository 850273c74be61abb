//! Colors for Tally TUI.
//!
//! Kanagawa Wave, trimmed to what the console draws.

use ratatui::style::{Color, Modifier, Style};

use tally_engine::{HintClass, ToastSeverity};

mod colors {
    use super::Color;

    pub const BG_DARK: Color = Color::Rgb(22, 22, 29); // sumiInk0
    pub const BG_BORDER: Color = Color::Rgb(84, 84, 109); // sumiInk6

    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 215, 186); // fujiWhite
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105); // fujiGray
    pub const TEXT_GHOST: Color = Color::Rgb(84, 84, 109); // sumiInk6

    pub const PRIMARY: Color = Color::Rgb(149, 127, 184); // oniViolet
    pub const GREEN: Color = Color::Rgb(152, 187, 108); // springGreen
    pub const YELLOW: Color = Color::Rgb(230, 195, 132); // carpYellow
    pub const RED: Color = Color::Rgb(255, 93, 98); // peachRed
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub border: Color,
    pub text: Color,
    pub muted: Color,
    pub ghost: Color,
    pub prompt: Color,
    pub success: Color,
    pub note: Color,
    pub error: Color,
}

impl Palette {
    #[must_use]
    pub const fn kanagawa() -> Self {
        Self {
            bg: colors::BG_DARK,
            border: colors::BG_BORDER,
            text: colors::TEXT_PRIMARY,
            muted: colors::TEXT_MUTED,
            ghost: colors::TEXT_GHOST,
            prompt: colors::PRIMARY,
            success: colors::GREEN,
            note: colors::YELLOW,
            error: colors::RED,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::kanagawa()
    }
}

pub mod styles {
    use super::{HintClass, Modifier, Palette, Style, ToastSeverity};

    #[must_use]
    pub fn request(palette: &Palette) -> Style {
        Style::default().fg(palette.prompt).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn result(palette: &Palette) -> Style {
        Style::default().fg(palette.text)
    }

    #[must_use]
    pub fn suggestion(palette: &Palette) -> Style {
        Style::default().fg(palette.ghost)
    }

    #[must_use]
    pub fn hint(palette: &Palette, class: HintClass) -> Style {
        match class {
            HintClass::Valid => Style::default().fg(palette.success),
            HintClass::Error => Style::default().fg(palette.error),
            HintClass::Empty => Style::default().fg(palette.muted),
        }
    }

    #[must_use]
    pub fn toast(palette: &Palette, severity: ToastSeverity) -> Style {
        let fg = match severity {
            ToastSeverity::Success => palette.success,
            ToastSeverity::Note => palette.note,
            ToastSeverity::Error => palette.error,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_classes_are_distinct() {
        let palette = Palette::default();
        assert_ne!(
            styles::hint(&palette, HintClass::Valid),
            styles::hint(&palette, HintClass::Error)
        );
    }

    #[test]
    fn note_toast_is_not_error_colored() {
        let palette = Palette::default();
        assert_ne!(
            styles::toast(&palette, ToastSeverity::Note).fg,
            Some(palette.error)
        );
    }
}
