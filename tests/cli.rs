//! End-to-end tests for the taskrun binary

mod common;

use assert_cmd::Command;
use common::create_project;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const TASKS: &str = r#"{
    "version": "2.0.0",
    "tasks": [
        { "label": "hello", "command": "echo hello-from-task" },
        { "label": "fail", "command": "exit 7" },
        { "label": "internal", "command": "echo internal", "hide": true },
    ]
}"#;

fn taskrun(dir: &Path, cache: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("taskrun").unwrap();
    cmd.current_dir(dir).env("TASKRUN_CACHE_DIR", cache.path());
    cmd
}

#[test]
fn test_list_excludes_hidden_tasks() {
    let (temp_dir, _tasks_path) = create_project(TASKS);
    let cache = TempDir::new().unwrap();

    taskrun(temp_dir.path(), &cache)
        .arg("--list")
        .assert()
        .success()
        .stdout("hello\nfail\n");
}

#[test]
fn test_choice_only_prints_label() {
    let (temp_dir, _tasks_path) = create_project(TASKS);
    let cache = TempDir::new().unwrap();

    taskrun(temp_dir.path(), &cache)
        .args(["--label", "internal", "--choice-only"])
        .assert()
        .success()
        .stdout("internal\n");
}

#[test]
fn test_run_by_label() {
    let (temp_dir, _tasks_path) = create_project(TASKS);
    let cache = TempDir::new().unwrap();

    taskrun(temp_dir.path(), &cache)
        .args(["--label", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello-from-task"))
        .stderr(predicate::str::contains("Running task:"));
}

#[test]
fn test_exit_status_of_task_is_propagated() {
    let (temp_dir, _tasks_path) = create_project(TASKS);
    let cache = TempDir::new().unwrap();

    taskrun(temp_dir.path(), &cache)
        .args(["--label", "fail", "--quiet"])
        .assert()
        .code(7);
}

#[test]
fn test_unknown_label_exits_cleanly() {
    let (temp_dir, _tasks_path) = create_project(TASKS);
    let cache = TempDir::new().unwrap();

    taskrun(temp_dir.path(), &cache)
        .args(["--label", "nope"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("No task found with label: nope"));
}

#[test]
fn test_missing_tasks_file() {
    let temp_dir = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();

    taskrun(temp_dir.path(), &cache)
        .arg("--list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("tasks.json not found"));
}

#[test]
fn test_explicit_file_and_history_order() {
    let (_temp_dir, tasks_path) = create_project(TASKS);
    let cache = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();

    taskrun(elsewhere.path(), &cache)
        .arg("--file")
        .arg(&tasks_path)
        .args(["--label", "fail", "--silent"])
        .assert()
        .code(7);

    taskrun(elsewhere.path(), &cache)
        .arg("-f")
        .arg(&tasks_path)
        .arg("--list")
        .assert()
        .success()
        .stdout("fail\nhello\n");
}

#[test]
fn test_invalid_file_is_an_error() {
    let (temp_dir, _tasks_path) = create_project("{ tasks: [ ");
    let cache = TempDir::new().unwrap();

    taskrun(temp_dir.path(), &cache)
        .arg("--list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn test_completions() {
    let cache = TempDir::new().unwrap();
    let temp_dir = TempDir::new().unwrap();

    taskrun(temp_dir.path(), &cache)
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("taskrun"));
}

#[test]
fn test_missing_explicit_file_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();

    taskrun(temp_dir.path(), &cache)
        .args(["--file", "nope/tasks.json", "--list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nope/tasks.json"));
}

#[cfg(unix)]
#[test]
fn test_child_inherits_non_unicode_environment() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let (temp_dir, _tasks_path) = create_project(
        r#"{ "tasks": [{ "label": "check", "command": "test -n \"$TASKRUN_RAW_BYTES\"" }] }"#,
    );
    let cache = TempDir::new().unwrap();

    taskrun(temp_dir.path(), &cache)
        .env("TASKRUN_RAW_BYTES", OsStr::from_bytes(b"caf\xe9"))
        .args(["--label", "check", "--silent"])
        .assert()
        .success();
}
