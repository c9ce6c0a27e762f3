use std::fs;

use snapshot_engine::{ensure_output_dir, write_atomic, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("site").join("data.js");

    let first = write_atomic(&target, "const API = {};").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "const API = {};");

    let second = write_atomic(&target, "const API = {\"x\": 1};").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "const API = {\"x\": 1};");
    assert_eq!(fs::read_dir(target.parent().unwrap()).unwrap().count(), 1);
}

#[test]
fn no_partial_file_when_parent_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let result = write_atomic(&file_path.join("data.js"), "data");
    assert!(matches!(result, Err(PersistError::OutputDir(_))));
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}

#[test]
fn failed_replace_keeps_previous_content() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("people.json");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep.json"), "{\"ab123\":{}}").unwrap();

    let result = write_atomic(&target, "{}");
    assert!(matches!(result, Err(PersistError::Io(_))));
    assert_eq!(fs::read_to_string(target.join("keep.json")).unwrap(), "{\"ab123\":{}}");

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("people.json")]);
}
