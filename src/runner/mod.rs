//! Task execution engine
//!
//! This module handles variable expansion, input prompts, dependency
//! resolution, and running commands.

pub mod command;
pub mod context;
pub mod expand;
pub mod inputs;
pub mod orchestrator;
pub mod task;

// Re-export main types
pub use command::*;
pub use context::*;
pub use expand::*;
pub use inputs::*;
pub use orchestrator::*;
pub use task::*;
