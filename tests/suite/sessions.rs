//! Save and load through session files on disk.

use std::fs;

use tally_engine::Settings;

use crate::common::{chord, results, rig, rig_in, rig_with, submit};

#[tokio::test]
async fn saved_session_replays_in_fresh_console() {
    let mut first = rig();
    submit(&mut first.console, "width = 3").await;
    submit(&mut first.console, "width * 5").await;
    chord(&mut first.console, 's').await;
    assert_eq!(
        first.console.toast().map(|t| t.text.as_str()),
        Some("Saved 2 lines")
    );

    let mut second = rig_in(first.dir, Settings::default());
    chord(&mut second.console, 'o').await;

    assert_eq!(results(&second.console), ["3", "15"]);
    assert!(second.console.history().is_empty());
    assert_eq!(
        second.console.toast().map(|t| t.text.as_str()),
        Some("Loaded 2 lines")
    );
}

#[tokio::test]
async fn save_back_count_limits_written_lines() {
    let mut rig = rig_with(Settings {
        save_back_count: 1,
        ..Settings::default()
    });
    submit(&mut rig.console, "1 + 1").await;
    submit(&mut rig.console, "2 + 2").await;
    chord(&mut rig.console, 's').await;

    let dir = rig.effects.session_dir().to_path_buf();
    let files: Vec<_> = fs::read_dir(&dir).unwrap().collect();
    assert_eq!(files.len(), 1);
    let content = fs::read_to_string(files[0].as_ref().unwrap().path()).unwrap();
    assert_eq!(content, "2 + 2\n");
}

#[tokio::test]
async fn loading_without_sessions_is_cancelled() {
    let mut rig = rig();
    chord(&mut rig.console, 'o').await;

    assert!(rig.console.transcript().entries().is_empty());
    assert_eq!(
        rig.console.toast().map(|t| t.text.as_str()),
        Some("Load cancelled")
    );
}

#[tokio::test]
async fn saving_empty_history_is_cancelled() {
    let mut rig = rig();
    chord(&mut rig.console, 's').await;

    assert_eq!(
        rig.console.toast().map(|t| t.text.as_str()),
        Some("Save cancelled")
    );
    assert!(!rig.effects.session_dir().exists());
}
