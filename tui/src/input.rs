//! Input handling for Tally TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;

use tally_engine::{Console, KeyCode, KeyEvent, Modifiers};

use crate::TranscriptView;

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close first so a reader blocked on a full channel wakes up.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    // Backpressure instead of dropping: large pastes stay intact.
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Translate a crossterm key into the console's key model.
///
/// Keys the console has no use for (function keys, PageUp and friends)
/// map to `None`.
#[must_use]
pub fn translate_key(key: &event::KeyEvent) -> Option<KeyEvent> {
    let code = match key.code {
        event::KeyCode::Char(c) => KeyCode::Char(c),
        event::KeyCode::Enter => KeyCode::Enter,
        event::KeyCode::Tab => KeyCode::Tab,
        event::KeyCode::Up => KeyCode::Up,
        event::KeyCode::Down => KeyCode::Down,
        event::KeyCode::Left => KeyCode::Left,
        event::KeyCode::Right => KeyCode::Right,
        event::KeyCode::Home => KeyCode::Home,
        event::KeyCode::End => KeyCode::End,
        event::KeyCode::Backspace => KeyCode::Backspace,
        event::KeyCode::Delete => KeyCode::Delete,
        event::KeyCode::Esc => KeyCode::Esc,
        _ => return None,
    };
    let modifiers = Modifiers {
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        meta: key
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META),
    };
    // A terminal has no selection of its own inside the input pane.
    Some(KeyEvent::new(code, modifiers))
}

/// Drain queued terminal input into the console.
pub fn handle_events(
    console: &mut Console,
    view: &mut TranscriptView,
    input: &mut InputPump,
) -> Result<()> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };
        apply_event(console, view, ev);
        processed += 1;
    }
    Ok(())
}

fn apply_event(console: &mut Console, view: &mut TranscriptView, event: Event) {
    match event {
        Event::Key(key) => {
            if matches!(key.kind, KeyEventKind::Release) {
                return;
            }
            match key.code {
                event::KeyCode::PageUp => view.page_up(),
                event::KeyCode::PageDown => view.page_down(),
                _ => {
                    if let Some(key) = translate_key(&key) {
                        console.handle_key(key);
                    }
                }
            }
        }
        Event::Paste(text) => {
            console.insert_text(&text);
        }
        _ => {}
    }
}
