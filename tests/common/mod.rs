//! Shared test utilities and fixtures
//!
//! Builds a console wired to the real fend gateway and terminal effects,
//! with session files kept in a temp directory.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tally_engine::{
    Console, EvalBudget, EvaluationGateway, KeyCode, KeyEvent, Settings, SystemEffects,
};
use tally_eval::FendGateway;
use tally_tui::TerminalEffects;
use tempfile::TempDir;

pub struct Rig {
    pub console: Console,
    pub effects: Arc<TerminalEffects>,
    pub dir: TempDir,
}

/// Generous budgets: tests run on loaded CI machines.
pub fn budget() -> EvalBudget {
    EvalBudget {
        evaluate_timeout_ms: 5_000,
        preview_timeout_ms: 5_000,
    }
}

pub fn rig_with(settings: Settings) -> Rig {
    let dir = tempfile::tempdir().expect("temp session dir");
    rig_in(dir, settings)
}

pub fn rig() -> Rig {
    rig_with(Settings::default())
}

/// A fresh console (and fresh calculator context) sharing `dir`.
pub fn rig_in(dir: TempDir, settings: Settings) -> Rig {
    let effects = Arc::new(TerminalEffects::new(dir.path().join("sessions")));
    let console = Console::new(
        settings,
        budget(),
        Arc::new(FendGateway::new()) as Arc<dyn EvaluationGateway>,
        Arc::clone(&effects) as Arc<dyn SystemEffects>,
    );
    Rig {
        console,
        effects,
        dir,
    }
}

pub async fn settle(console: &mut Console) {
    tokio::time::timeout(Duration::from_secs(30), async {
        while console.settle_next().await {}
    })
    .await
    .expect("console did not settle");
}

pub async fn submit(console: &mut Console, text: &str) {
    console.set_buffer(text);
    console.handle_key(KeyEvent::plain(KeyCode::Enter));
    settle(console).await;
}

pub async fn chord(console: &mut Console, c: char) {
    console.handle_key(KeyEvent::ctrl(c));
    settle(console).await;
}

pub fn results(console: &Console) -> Vec<String> {
    console
        .transcript()
        .entries()
        .iter()
        .map(|entry| entry.result.clone())
        .collect()
}
