//! taskrun - run VS Code tasks from the terminal
//!
//! Finds the nearest `.vscode/tasks.json`, lets you pick a task, and runs it
//! together with its `dependsOn` chain. Recently used tasks float to the top
//! of the menu.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod runner;
pub mod ui;

// Re-export commonly used types
pub use error::{Result, TaskrunError};

/// Current version of taskrun
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
