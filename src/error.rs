//! Error types for taskrun

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for taskrun operations
pub type Result<T> = std::result::Result<T, TaskrunError>;

/// Main error type for taskrun
#[derive(Error, Debug)]
pub enum TaskrunError {
    /// Task definition discovery and parsing errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TaskrunError {
    /// Process exit code for this error.
    ///
    /// A missing task definition file gets its own code so scripts can tell it
    /// apart from an empty selection (which exits 0) and from other failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            TaskrunError::Config(ConfigError::NotFound(_)) => 2,
            _ => 1,
        }
    }
}

/// Task definition discovery and parsing errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("tasks.json not found in any .vscode directory (searched: {0})")]
    NotFound(String),

    #[error("Failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Task execution errors
///
/// Non-zero exit codes are not errors; they are returned as plain statuses.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Failed to start '{command}': {source}")]
    Spawn { command: String, source: io::Error },

    #[error("Failed to read input '{id}': {source}")]
    Prompt { id: String, source: io::Error },

    #[error("Failed to launch editor: {0}")]
    Editor(String),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
