//! Common test utilities
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary project with a .vscode/tasks.json file
pub fn create_project(tasks_json: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let vscode_dir = temp_dir.path().join(".vscode");
    fs::create_dir(&vscode_dir).unwrap();

    let tasks_path = vscode_dir.join("tasks.json");
    fs::write(&tasks_path, tasks_json).unwrap();
    (temp_dir, tasks_path)
}

/// Create a test project with a nested subdirectory
pub fn create_project_with_subdir(tasks_json: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, tasks_path) = create_project(tasks_json);
    let sub_dir = temp_dir.path().join("src").join("nested");
    fs::create_dir_all(&sub_dir).unwrap();
    (temp_dir, tasks_path, sub_dir)
}

/// Canonical project root, as the parser reports it
pub fn root_dir(temp_dir: &TempDir) -> String {
    fs::canonicalize(temp_dir.path()).unwrap().display().to_string()
}
