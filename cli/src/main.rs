//! Tally CLI - binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI wires [`tally_engine::Console`] to the fend-backed gateway
//! ([`tally_eval`]) and the terminal collaborators and renderer
//! ([`tally_tui`]), providing RAII terminal management with guaranteed
//! cleanup.
//!
//! ```text
//! main() -> TerminalSession::new() -> run_app() -> Console + TUI
//! ```
//!
//! # Event Loop
//!
//! A fixed ~60 FPS render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`tally_tui::InputPump`])
//! 3. Apply settled evaluator and collaborator results
//! 4. Expire toasts and pick up config file changes
//! 5. Render frame, or stop if quit was requested
//!
//! Exchange rates load in the background at startup; currency units start
//! working once they arrive.

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, Write, stdout},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tally_config::{FileSettingsStore, SettingsStore, SettingsWatcher, TallyConfig, config_dir};
use tally_engine::{Console, EvaluationGateway, SettingKey, SystemEffects, ToastSeverity};
use tally_eval::{FendGateway, exchange};
use tally_tui::{InputPump, TerminalEffects, TranscriptView, draw, handle_events};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "A terminal calculator console", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print every effective setting, or just KEY
    Get { key: Option<String> },
    /// Persist one setting
    Set { key: String, value: String },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: prefer no logs over corrupting the TUI via stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.tally/logs/tally.log
    if let Some(dir) = config_dir() {
        candidates.push(dir.join("logs").join("tally.log"));
    }

    // Fallback: ./.tally/logs/tally.log
    candidates.push(PathBuf::from(".tally").join("logs").join("tally.log"));

    candidates
}

fn settings_store() -> FileSettingsStore {
    FileSettingsStore::at_default_location().unwrap_or_else(|err| {
        tracing::warn!("{err}; falling back to ./.tally/config.toml");
        FileSettingsStore::new(PathBuf::from(".tally").join("config.toml"))
    })
}

fn run_config(store: &FileSettingsStore, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key: Some(raw) } => {
            let key: SettingKey = raw.parse()?;
            println!("{}", store.load_settings()?.get(key));
        }
        ConfigAction::Get { key: None } => {
            let settings = store.load_settings()?;
            for key in SettingKey::ALL {
                println!("{key} = {}", settings.get(key));
            }
        }
        ConfigAction::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let value = key.parse_value(&value)?;
            store.set_setting(key, value)?;
            println!("{key} = {}", store.load_settings()?.get(key));
        }
    }
    Ok(())
}

/// Manages terminal state with RAII cleanup.
///
/// Enables raw mode, bracketed paste and the alternate screen. On drop, all
/// terminal state is restored, so the terminal stays usable after panics or
/// early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnableBracketedPaste, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
            return Err(err.into());
        }

        match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen, DisableBracketedPaste);
                Err(err.into())
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let store = settings_store();
    match cli.command {
        Some(Commands::Config { action }) => run_config(&store, action),
        None => run_console(store).await,
    }
}

async fn run_console(store: FileSettingsStore) -> Result<()> {
    let config = store.load().unwrap_or_else(|err| {
        tracing::warn!("Using default config: {err}");
        TallyConfig::default()
    });
    let session_dir = config
        .session_dir()
        .unwrap_or_else(|| PathBuf::from(".tally").join("sessions"));

    let effects = Arc::new(TerminalEffects::new(session_dir));
    let gateway = Arc::new(FendGateway::new());
    let rates_gateway = Arc::clone(&gateway);
    tokio::spawn(async move {
        if !rates_gateway
            .setup_exchange_rates(exchange::default_cache_dir())
            .await
        {
            tracing::warn!("Currency conversion is unavailable");
        }
    });

    let mut console = Console::new(
        config.console,
        config.evaluator,
        gateway as Arc<dyn EvaluationGateway>,
        Arc::clone(&effects) as Arc<dyn SystemEffects>,
    );
    console.run_startup_inputs();

    let mut watcher = SettingsWatcher::new(store);
    let mut session = TerminalSession::new()?;
    let result = run_app(&mut session.terminal, &mut console, &effects, &mut watcher).await;
    // Restore the terminal before any error reaches stderr.
    drop(session);
    result
}

const FRAME_DURATION: Duration = Duration::from_millis(16);

async fn run_app<B>(
    terminal: &mut Terminal<B>,
    console: &mut Console,
    effects: &TerminalEffects,
    watcher: &mut SettingsWatcher,
) -> Result<()>
where
    B: Backend + Write,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut view = TranscriptView::default();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        if let Err(e) = handle_events(console, &mut view, &mut input) {
            break Err(e);
        }

        console.process_events();

        let now = Instant::now();
        console.tick(now);
        match watcher.poll(now) {
            Some(Ok(settings)) => console.refresh_settings(settings),
            Some(Err(err)) => {
                tracing::warn!("Settings reload failed: {err}");
                console.raise_toast(
                    format!("Failed to reload settings: {err}"),
                    ToastSeverity::Error,
                );
            }
            None => {}
        }

        if effects.quit_requested() {
            break Ok(());
        }

        if let Err(e) = terminal.draw(|frame| draw(frame, console, &mut view)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
