//! Corruption recovery tests for the setlog binary.
//!
//! Malformed persisted records must never be fatal: the app degrades to
//! safe defaults and keeps working.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("setlog"));
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

#[test]
fn test_corrupt_history_degrades_to_empty() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    fs::write(dir.join("workout_history.json"), "{ not valid json ]").unwrap();

    cli(dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total workouts:   0"));

    cli(dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts yet"));
}

#[test]
fn test_corrupt_current_session_degrades_to_none() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    fs::write(dir.join("current_session.json"), "garbage").unwrap();

    cli(dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No Active Workout"));
}

#[test]
fn test_corrupt_settings_degrade_to_defaults() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    fs::write(dir.join("user_settings.json"), "\u{0}\u{0}\u{0}").unwrap();

    cli(dir)
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("rest timer:      60s"))
        .stdout(predicate::str::contains("exercise timer:  30s"));
}

#[test]
fn test_corrupt_snapshot_does_not_block_new_workout() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    fs::write(dir.join("app_state.json"), "[1, 2,").unwrap();

    cli(dir)
        .args(["start", "day1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout ready"));

    // A fresh, valid snapshot replaced the corrupt one
    let raw = fs::read_to_string(dir.join("app_state.json")).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(snapshot["currentRoutine"]["id"], "day1");
}

#[test]
fn test_corruption_is_recovered_by_next_write() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    fs::write(dir.join("workout_history.json"), "corrupt").unwrap();

    // Completing a workout rewrites the history record from scratch
    cli(dir).args(["start", "day1"]).assert().success();
    cli(dir).arg("finish").assert().success();

    cli(dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total workouts:   1"));

    let raw = fs::read_to_string(dir.join("workout_history.json")).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());
}
