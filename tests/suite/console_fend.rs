//! Console driven end to end by the fend calculator.

use tally_engine::{HintClass, KeyCode, KeyEvent, Settings};

use crate::common::{chord, results, rig, rig_with, settle, submit};

#[tokio::test]
async fn arithmetic_lands_in_transcript() {
    let mut rig = rig();
    submit(&mut rig.console, "2 + 3").await;

    let entries = rig.console.transcript().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].request, "2 + 3");
    assert_eq!(entries[0].result, "5");
    assert_eq!(rig.console.buffer_text(), "");
}

#[tokio::test]
async fn assignments_carry_between_submissions() {
    let mut rig = rig();
    submit(&mut rig.console, "apples = 4").await;
    submit(&mut rig.console, "apples * 2").await;

    assert_eq!(results(&rig.console).last().map(String::as_str), Some("8"));
    assert_eq!(rig.console.history().entries(), ["apples = 4", "apples * 2"]);
}

#[tokio::test]
async fn preview_never_binds_names() {
    let mut rig = rig();
    rig.console.set_buffer("pears = 7");
    settle(&mut rig.console).await;
    assert_eq!(rig.console.hint().class, HintClass::Valid);

    submit(&mut rig.console, "pears + 1").await;
    assert_ne!(results(&rig.console)[0], "8");
}

#[tokio::test]
async fn unknown_name_shows_error_hint() {
    let mut rig = rig();
    rig.console.set_buffer("qwzx + 1");
    settle(&mut rig.console).await;

    assert_eq!(rig.console.hint().class, HintClass::Error);
    assert!(!rig.console.hint().text.is_empty());
}

#[tokio::test]
async fn tab_completes_learned_variable() {
    let mut rig = rig();
    submit(&mut rig.console, "subtotal = 12").await;

    rig.console.set_buffer("subt");
    settle(&mut rig.console).await;
    assert_eq!(rig.console.overlay().suggestion, "otal");

    rig.console.handle_key(KeyEvent::plain(KeyCode::Tab));
    settle(&mut rig.console).await;
    assert_eq!(rig.console.buffer_text(), "subtotal");
    assert_eq!(rig.console.hint().text, "12");
}

#[tokio::test]
async fn history_recall_reevaluates_hint() {
    let mut rig = rig();
    submit(&mut rig.console, "6 * 7").await;

    rig.console.handle_key(KeyEvent::plain(KeyCode::Up));
    settle(&mut rig.console).await;
    assert_eq!(rig.console.buffer_text(), "6 * 7");
    assert_eq!(rig.console.hint().text, "42");
}

#[tokio::test]
async fn startup_inputs_define_names() {
    let mut rig = rig_with(Settings {
        global_inputs: "markup = 3\n\nbase = 10\n".to_string(),
        ..Settings::default()
    });
    rig.console.run_startup_inputs();
    settle(&mut rig.console).await;
    assert!(rig.console.transcript().entries().is_empty());
    assert!(rig.console.history().is_empty());

    submit(&mut rig.console, "base * markup").await;
    assert_eq!(results(&rig.console), ["30"]);
}

#[tokio::test]
async fn ctrl_l_clears_transcript_only() {
    let mut rig = rig();
    submit(&mut rig.console, "1 + 1").await;
    chord(&mut rig.console, 'l').await;

    assert!(rig.console.transcript().entries().is_empty());
    assert_eq!(rig.console.history().len(), 1);
}
