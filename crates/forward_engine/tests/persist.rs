use std::fs;

use forward_engine::{ensure_output_dir, write_atomically, PersistError};
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
    let path = temp.path().join("run.json");

    write_atomically(&path, "{\"phase\":\"failed\"}").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"phase\":\"failed\"}");

    write_atomically(&path, "{\"phase\":\"done\"}").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"phase\":\"done\"}");

    // No temp files left behind.
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn file_in_place_of_directory_is_rejected() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let err = write_atomically(&blocker.join("run.json"), "data").unwrap_err();
    assert!(matches!(err, PersistError::OutputDir(_)));
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}
