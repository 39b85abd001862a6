//! Corruption recovery tests for the workout binary.
//!
//! These tests verify the system can handle:
//! - Corrupted cache entries
//! - Corrupted history lines
//! - A corrupted last-plan file

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn setup_test_dir() -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    let config = format!(
        "[data]\ndata_dir = {:?}\n\n[generation]\nenabled = false\n",
        temp_dir.path().join("data")
    );
    fs::write(&config_path, config).expect("Failed to write config");
    (temp_dir, config_path)
}

fn cli(config_path: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("workout"));
    cmd.arg("--config").arg(config_path);
    cmd
}

fn compose(config_path: &Path) -> Value {
    let output = cli(config_path)
        .args(["compose", "--offline", "--json", "--seed", "21"])
        .output()
        .expect("Failed to run compose");
    assert!(output.status.success(), "compose failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_corrupted_cache_entry_is_recomposed() {
    let (temp_dir, config_path) = setup_test_dir();

    let first = compose(&config_path);
    let key = first["cache_key"].as_str().unwrap();
    let entry_path = temp_dir
        .path()
        .join("data/cache")
        .join(format!("{}.json", key));
    fs::write(&entry_path, "{ invalid json }}}}").unwrap();

    let second = compose(&config_path);
    assert_eq!(second["source"], "fallback");
    assert_eq!(first["plan"], second["plan"]);

    // Rewritten with a valid entry
    let third = compose(&config_path);
    assert_eq!(third["source"], "cached");
}

#[test]
fn test_purge_removes_unreadable_entries() {
    let (temp_dir, config_path) = setup_test_dir();
    let cache_dir = temp_dir.path().join("data/cache");
    fs::create_dir_all(&cache_dir).unwrap();
    fs::write(cache_dir.join("garbage.json"), "not an envelope").unwrap();

    cli(&config_path)
        .args(["cache", "purge"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Purged 1 expired cache entries"));

    assert!(!cache_dir.join("garbage.json").exists());
}

#[test]
fn test_corrupted_history_line_does_not_block_complete() {
    let (temp_dir, config_path) = setup_test_dir();
    let history_path = temp_dir.path().join("data/history.jsonl");
    fs::create_dir_all(history_path.parent().unwrap()).unwrap();
    {
        let mut file = fs::File::create(&history_path).unwrap();
        writeln!(file, "{{\"id\": truncated").unwrap();
    }

    compose(&config_path);
    cli(&config_path).arg("complete").assert().success();

    let contents = fs::read_to_string(&history_path).unwrap();
    assert_eq!(contents.lines().count(), 2);
    let last: Value = serde_json::from_str(contents.lines().last().unwrap()).unwrap();
    assert!(last["plan"]["phases"].is_array());
}

#[test]
fn test_corrupted_last_plan_fails_cleanly() {
    let (temp_dir, config_path) = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("last_plan.json"), "{ half a plan").unwrap();

    cli(&config_path).arg("complete").assert().failure();

    assert!(!data_dir.join("history.jsonl").exists());
}
