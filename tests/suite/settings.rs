//! Persisted settings reaching a running console.

use std::fs;
use std::time::{Duration, Instant, SystemTime};

use tally_config::{FileSettingsStore, SettingsStore, SettingsWatcher, TallyConfig};
use tally_engine::{KeyDisposition, KeyEvent, SettingKey, SettingValue};

use crate::common::{rig, settle};

fn bump_mtime(path: &std::path::Path, secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_800_000_000 + secs))
        .unwrap();
}

#[tokio::test]
async fn watcher_enables_ctrl_d_quit() {
    let mut rig = rig();
    let path = rig.dir.path().join("config.toml");
    fs::write(&path, "[console]\nctrl_w_closes = true\n").unwrap();
    bump_mtime(&path, 0);

    let store = FileSettingsStore::new(&path);
    let mut watcher = SettingsWatcher::new(store.clone()).with_interval(Duration::ZERO);

    assert_eq!(
        rig.console.handle_key(KeyEvent::ctrl('d')),
        KeyDisposition::Ignored
    );

    store
        .set_setting(SettingKey::CtrlDCloses, SettingValue::Bool(true))
        .unwrap();
    bump_mtime(&path, 5);

    let settings = watcher.poll(Instant::now()).unwrap().unwrap();
    rig.console.refresh_settings(settings);

    assert_eq!(
        rig.console.handle_key(KeyEvent::ctrl('d')),
        KeyDisposition::Claimed
    );
    settle(&mut rig.console).await;
    assert!(rig.effects.quit_requested());
}

#[test]
fn set_setting_keeps_other_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "# mine\n[evaluator]\npreview_timeout_ms = 40\n\n[files]\nsession_dir = \"/tmp/s\"\n",
    )
    .unwrap();

    let store = FileSettingsStore::new(&path);
    store
        .set_setting(SettingKey::SaveBackCount, SettingValue::Integer(3))
        .unwrap();

    let config = TallyConfig::load_from(&path).unwrap();
    assert_eq!(config.console.save_back_count, 3);
    assert_eq!(config.evaluator.preview_timeout_ms, 40);
    assert!(fs::read_to_string(&path).unwrap().starts_with("# mine"));
}
