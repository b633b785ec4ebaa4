//! Persisted editor configuration on disk.

use microdude::config::CONFIG_FILE;
use microdude::{ConfigStore, EditorConfig};
use std::fs;

#[test]
fn test_load_missing_file_gives_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join(".microdude"));
    assert_eq!(store.load(), EditorConfig::default());
}

#[test]
fn test_ensure_exists_writes_default_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join(".microdude"));

    store.ensure_exists().unwrap();
    assert_eq!(fs::read_to_string(store.path()).unwrap(), r#"{"device":""}"#);

    store.save(&EditorConfig::with_device("MicroBrute")).unwrap();
    store.ensure_exists().unwrap();
    assert_eq!(store.load().device, "MicroBrute");
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("nested").join(".microdude"));
    let config = EditorConfig::with_device("MicroBrute MIDI 1");

    store.save(&config).unwrap();

    assert!(store.dir().join(CONFIG_FILE).exists());
    assert_eq!(store.load(), config);
}

#[test]
fn test_malformed_file_gives_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    fs::write(store.path(), "{ not json").unwrap();

    assert_eq!(store.load(), EditorConfig::default());
}
