//! CLI-level tests driving the compiled binary.

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::{seeded_upstream, write_config_yaml};

fn repomgr() -> Command {
    Command::cargo_bin("repomgr").unwrap()
}

#[test]
fn test_no_flags_prints_help() {
    repomgr()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_missing_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    repomgr()
        .arg("--config")
        .arg(temp_dir.path().join("absent.yaml"))
        .arg("--status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_force_clone_alone_clones() {
    let temp_dir = TempDir::new().unwrap();
    let upstream = seeded_upstream(temp_dir.path());
    let target = temp_dir.path().join("work");
    let config = temp_dir.path().join("config.yaml");
    write_config_yaml(&config, &upstream, &target);
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("stray.txt"), "leftover\n").unwrap();

    repomgr()
        .arg("--config")
        .arg(&config)
        .arg("--force-clone")
        .arg("--no-progress")
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository ready"));

    assert!(target.join("README.md").exists());
    assert!(!target.join("stray.txt").exists());
}

#[test]
fn test_status_before_clone_suggests_cloning() {
    let temp_dir = TempDir::new().unwrap();
    let upstream = seeded_upstream(temp_dir.path());
    let config = temp_dir.path().join("config.yaml");
    write_config_yaml(&config, &upstream, &temp_dir.path().join("work"));

    repomgr()
        .arg("--config")
        .arg(&config)
        .arg("--status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--clone"));
}

#[test]
fn test_clone_commit_status_flow() {
    let temp_dir = TempDir::new().unwrap();
    let upstream = seeded_upstream(temp_dir.path());
    let target = temp_dir.path().join("work");
    let config = temp_dir.path().join("config.yaml");
    write_config_yaml(&config, &upstream, &target);

    repomgr()
        .arg("--config")
        .arg(&config)
        .arg("--clone")
        .arg("--no-progress")
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository ready"));

    fs::write(target.join("note.txt"), "hello\n").unwrap();

    repomgr()
        .arg("--config")
        .arg(&config)
        .arg("--commit")
        .arg("add note")
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("Committed"));

    repomgr()
        .arg("--config")
        .arg(&config)
        .arg("--status")
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("working tree clean"));
}

#[test]
fn test_commit_on_clean_tree_reports_no_changes() {
    let temp_dir = TempDir::new().unwrap();
    let upstream = seeded_upstream(temp_dir.path());
    let target = temp_dir.path().join("work");
    let config = temp_dir.path().join("config.yaml");
    write_config_yaml(&config, &upstream, &target);

    repomgr()
        .arg("--config")
        .arg(&config)
        .arg("--clone")
        .arg("--no-progress")
        .assert()
        .success();

    repomgr()
        .arg("--config")
        .arg(&config)
        .arg("--commit")
        .arg("empty")
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to commit"));
}

#[test]
fn test_push_after_commit_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let upstream = seeded_upstream(temp_dir.path());
    let target = temp_dir.path().join("work");
    let config = temp_dir.path().join("config.yaml");
    write_config_yaml(&config, &upstream, &target);

    repomgr()
        .arg("--config")
        .arg(&config)
        .arg("--clone")
        .arg("--no-progress")
        .assert()
        .success();

    fs::write(target.join("feature.txt"), "feature\n").unwrap();

    repomgr()
        .arg("--config")
        .arg(&config)
        .arg("--commit")
        .arg("add feature")
        .arg("--push")
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("Push complete"));

    assert_eq!(common::main_tip(&upstream), common::main_tip(&target));
}
