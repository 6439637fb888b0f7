//! CLI interface and argument parsing
//!
//! This module handles command-line parsing, task selection, and shell
//! completion output.

pub mod app;

pub use app::*;
