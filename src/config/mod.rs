//! Task file discovery and parsing
//!
//! This module locates `.vscode/tasks.json`, reads its relaxed JSON, and
//! turns each entry into a runtime [`crate::runner::Task`].

pub mod parse;
pub mod types;

// Re-export main types
pub use parse::*;
pub use types::*;
