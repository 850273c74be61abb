//! TUI rendering for Tally using ratatui.

mod effects;
mod input;
mod theme;

pub use effects::TerminalEffects;
pub use input::{InputPump, handle_events, translate_key};
pub use theme::{Palette, styles};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use tally_engine::{Console, Overlay};

/// Most input rows shown before the input pane scrolls.
const MAX_INPUT_ROWS: u16 = 6;
const REQUEST_PREFIX: &str = "> ";
const CONTINUATION_PREFIX: &str = "  ";

/// Scroll position of the transcript pane, counted up from the bottom.
#[derive(Debug, Default, Clone)]
pub struct TranscriptView {
    offset_from_bottom: u16,
    max_scroll: u16,
    page: u16,
}

impl TranscriptView {
    pub fn page_up(&mut self) {
        self.offset_from_bottom = self
            .offset_from_bottom
            .saturating_add(self.page.max(1))
            .min(self.max_scroll);
    }

    pub fn page_down(&mut self) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_sub(self.page.max(1));
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset_from_bottom = 0;
    }

    #[must_use]
    pub fn offset_from_bottom(&self) -> u16 {
        self.offset_from_bottom
    }

    fn update_bounds(&mut self, max_scroll: u16, page: u16) {
        self.max_scroll = max_scroll;
        self.page = page;
        self.offset_from_bottom = self.offset_from_bottom.min(max_scroll);
    }

    fn offset_from_top(&self) -> u16 {
        self.max_scroll.saturating_sub(self.offset_from_bottom)
    }
}

/// Main draw function
pub fn draw(frame: &mut Frame, console: &mut Console, view: &mut TranscriptView) {
    let palette = Palette::default();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg)),
        frame.area(),
    );

    if console.take_scroll_request() {
        view.scroll_to_bottom();
    }

    let input_rows = (console.buffer_text().split('\n').count() as u16).clamp(1, MAX_INPUT_ROWS);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),                 // Transcript
            Constraint::Length(input_rows + 2), // Input
            Constraint::Length(1),              // Hint
            Constraint::Length(1),              // Toast
        ])
        .split(frame.area());

    draw_transcript(frame, console, view, chunks[0], &palette);
    draw_input(frame, console, chunks[1], &palette);
    draw_hint(frame, console, chunks[2], &palette);
    draw_toast(frame, console, chunks[3], &palette);
}

fn draw_transcript(
    frame: &mut Frame,
    console: &Console,
    view: &mut TranscriptView,
    area: Rect,
    palette: &Palette,
) {
    let mut lines: Vec<Line> = Vec::new();
    for entry in console.transcript().entries() {
        for (i, request_line) in entry.request.split('\n').enumerate() {
            let prefix = if i == 0 {
                REQUEST_PREFIX
            } else {
                CONTINUATION_PREFIX
            };
            lines.push(Line::from(Span::styled(
                format!("{prefix}{request_line}"),
                styles::request(palette),
            )));
        }
        if !entry.result.is_empty() {
            for result_line in entry.result.split('\n') {
                lines.push(Line::from(Span::styled(
                    result_line.to_string(),
                    styles::result(palette),
                )));
            }
        }
    }

    let total_lines = wrapped_line_count(&lines, area.width);
    view.update_bounds(total_lines.saturating_sub(area.height), area.height);

    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((view.offset_from_top(), 0));
    frame.render_widget(transcript, area);
}

/// Typed text followed by the greyed suggestion, split into display lines.
fn overlay_lines<'a>(overlay: &'a Overlay, palette: &Palette) -> Vec<Line<'a>> {
    let mut lines: Vec<Line> = overlay
        .typed
        .split('\n')
        .map(|segment| Line::from(Span::styled(segment, styles::result(palette))))
        .collect();
    if !overlay.suggestion.is_empty()
        && let Some(last) = lines.last_mut()
    {
        last.spans
            .push(Span::styled(overlay.suggestion.as_str(), styles::suggestion(palette)));
    }
    lines
}

fn draw_input(frame: &mut Frame, console: &Console, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border));
    let inner = block.inner(area);

    let plain;
    let overlay = if console.overlay().typed == console.buffer_text() {
        console.overlay()
    } else {
        plain = Overlay::plain(console.buffer_text());
        &plain
    };

    let text = console.buffer_text();
    let before_caret = &text[..console.buffer().byte_index()];
    let caret_row = before_caret.matches('\n').count() as u16;
    let caret_col = before_caret.rsplit('\n').next().unwrap_or("").width() as u16;

    let visible = inner.height.max(1);
    let first_row = (caret_row + 1).saturating_sub(visible);

    let paragraph = Paragraph::new(overlay_lines(overlay, palette))
        .block(block)
        .scroll((first_row, 0));
    frame.render_widget(paragraph, area);

    let x = inner
        .x
        .saturating_add(caret_col)
        .min(inner.right().saturating_sub(1));
    let y = inner.y.saturating_add(caret_row - first_row);
    frame.set_cursor_position((x, y));
}

fn draw_hint(frame: &mut Frame, console: &Console, area: Rect, palette: &Palette) {
    let hint = console.hint();
    if hint.text.is_empty() {
        return;
    }
    let first_line = hint.text.lines().next().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Span::styled(first_line, styles::hint(palette, hint.class))),
        area,
    );
}

fn draw_toast(frame: &mut Frame, console: &Console, area: Rect, palette: &Palette) {
    let Some(toast) = console.toast() else {
        return;
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            toast.text.as_str(),
            styles::toast(palette, toast.severity),
        )),
        area,
    );
}

fn wrapped_line_count(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    let mut total: u16 = 0;

    for line in lines {
        let line_width = line.width();
        let rows = if line_width == 0 {
            1
        } else {
            ((line_width - 1) / width) + 1
        };
        total = total.saturating_add(rows as u16);
    }

    total
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use ratatui::{Terminal, backend::TestBackend};
    use tally_engine::{
        CompletionFut, EvalBudget, EvalFut, EvaluationGateway, KeyCode, KeyEvent, Settings,
        SystemEffects,
    };

    use super::*;

    struct Labelled;

    impl EvaluationGateway for Labelled {
        fn evaluate(&self, input: String, _timeout: Duration) -> EvalFut {
            Box::pin(async move { Ok(format!("out:{input}")) })
        }

        fn preview(&self, input: String, _timeout: Duration) -> EvalFut {
            Box::pin(async move {
                if input.starts_with('!') {
                    Err("bad input".to_string())
                } else if input.is_empty() {
                    Ok(String::new())
                } else {
                    Ok(format!("hint:{input}"))
                }
            })
        }

        fn complete(&self, input: String) -> CompletionFut {
            Box::pin(async move { (input == "sq").then(|| "rt".to_string()) })
        }
    }

    fn console(dir: &tempfile::TempDir) -> Console {
        Console::new(
            Settings::default(),
            EvalBudget::default(),
            Arc::new(Labelled) as Arc<dyn EvaluationGateway>,
            Arc::new(TerminalEffects::new(dir.path())) as Arc<dyn SystemEffects>,
        )
    }

    async fn settle(console: &mut Console) {
        while console.settle_next().await {}
    }

    fn render(console: &mut Console, view: &mut TranscriptView) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal.draw(|frame| draw(frame, console, view)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn contains(rows: &[String], needle: &str) -> bool {
        rows.iter().any(|row| row.contains(needle))
    }

    #[tokio::test]
    async fn transcript_shows_request_then_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console(&dir);
        console.set_buffer("1+1");
        console.handle_key(KeyEvent::plain(KeyCode::Enter));
        settle(&mut console).await;

        let rows = render(&mut console, &mut TranscriptView::default());
        let request = rows.iter().position(|r| r.contains("> 1+1")).unwrap();
        assert!(rows[request + 1].contains("out:1+1"));
    }

    #[tokio::test]
    async fn hint_follows_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console(&dir);
        console.set_buffer("2*3");
        settle(&mut console).await;

        let rows = render(&mut console, &mut TranscriptView::default());
        assert!(contains(&rows, "hint:2*3"));
    }

    #[tokio::test]
    async fn error_hint_uses_error_color() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console(&dir);
        console.set_buffer("!x");
        settle(&mut console).await;

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let mut view = TranscriptView::default();
        terminal
            .draw(|frame| draw(frame, &mut console, &mut view))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let hint_row = buffer.area.height - 2;
        assert_eq!(buffer[(0, hint_row)].symbol(), "b");
        assert_eq!(buffer[(0, hint_row)].fg, Palette::default().error);
    }

    #[tokio::test]
    async fn suggestion_follows_typed_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console(&dir);
        console.set_buffer("sq");
        settle(&mut console).await;

        let rows = render(&mut console, &mut TranscriptView::default());
        assert!(contains(&rows, "sqrt"));
    }

    #[tokio::test]
    async fn toast_is_drawn_on_last_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console(&dir);
        console.handle_key(KeyEvent::ctrl('o'));
        settle(&mut console).await;

        let rows = render(&mut console, &mut TranscriptView::default());
        assert!(rows.last().unwrap().contains("Load cancelled"));
    }

    #[test]
    fn page_up_is_clamped_to_content() {
        let mut view = TranscriptView::default();
        view.update_bounds(5, 3);
        view.page_up();
        view.page_up();
        assert_eq!(view.offset_from_bottom(), 5);
        view.page_down();
        assert_eq!(view.offset_from_bottom(), 2);
        view.scroll_to_bottom();
        assert_eq!(view.offset_from_top(), 5);
    }

    #[test]
    fn wrapped_lines_count_rows() {
        let lines = vec![Line::from("abcdef"), Line::from("")];
        assert_eq!(wrapped_line_count(&lines, 4), 3);
    }
}
