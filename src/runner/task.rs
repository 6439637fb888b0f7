//! Task execution types
//!
//! This module contains the runtime representation of tasks, built by the
//! parser from a [`crate::config::TaskDefinition`].

use crate::runner::Template;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How a task's command line is handed to the operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskType {
    /// One command line interpreted by the platform shell
    #[default]
    Shell,
    /// Program plus argument vector, no shell involved
    Process,
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shell" => Ok(TaskType::Shell),
            "process" => Ok(TaskType::Process),
            other => Err(format!("unknown task type '{}'", other)),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::Shell => f.write_str("shell"),
            TaskType::Process => f.write_str("process"),
        }
    }
}

/// How failures of `dependsOn` tasks are treated
///
/// Dependencies always run one after another. `Parallel` only means a failed
/// dependency does not stop the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependsOrder {
    #[default]
    Parallel,
    Sequence,
}

impl FromStr for DependsOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parallel" => Ok(DependsOrder::Parallel),
            "sequence" => Ok(DependsOrder::Sequence),
            other => Err(format!("unknown dependsOrder '{}'", other)),
        }
    }
}

impl fmt::Display for DependsOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependsOrder::Parallel => f.write_str("parallel"),
            DependsOrder::Sequence => f.write_str("sequence"),
        }
    }
}

/// Runtime task representation
///
/// Everything except `command` and `args` is fully expanded; those two may
/// still hold `${input:ID}` placeholders until the task runs.
#[derive(Debug, Clone)]
pub struct Task {
    /// Task label
    pub label: String,

    /// Command, possibly with deferred inputs
    pub command: Template,

    /// Arguments, possibly with deferred inputs
    pub args: Vec<Template>,

    /// Working directory
    pub cwd: String,

    /// Complete environment for the child process
    pub env: HashMap<String, String>,

    pub task_type: TaskType,

    /// Labels of tasks to run first
    pub depends_on: Vec<String>,

    pub depends_order: DependsOrder,

    /// Whether this task is left out of menus and listings
    pub hide: bool,

    /// Project root the task was parsed against
    pub root_dir: String,
}

impl Task {
    /// Create a shell task with defaults for everything but label and command
    pub fn new(label: impl Into<String>, command: impl Into<Template>) -> Self {
        Task {
            label: label.into(),
            command: command.into(),
            args: Vec::new(),
            cwd: String::new(),
            env: HashMap::new(),
            task_type: TaskType::Shell,
            depends_on: Vec::new(),
            depends_order: DependsOrder::Parallel,
            hide: false,
            root_dir: String::new(),
        }
    }

    /// Set the arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Template>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the task type
    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    /// Set the dependencies and their order
    pub fn with_dependencies<I, S>(mut self, labels: I, order: DependsOrder) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = labels.into_iter().map(Into::into).collect();
        self.depends_order = order;
        self
    }

    /// Set the working directory
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Mark the task hidden
    pub fn hidden(mut self) -> Self {
        self.hide = true;
        self
    }

    /// Input IDs referenced by the command and arguments
    pub fn pending_inputs(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .command
            .input_ids()
            .chain(self.args.iter().flat_map(Template::input_ids))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_defaults() {
        let task = Task::new("lint", "ruff check .");
        assert_eq!(task.label, "lint");
        assert_eq!(task.command.as_str(), "ruff check .");
        assert_eq!(task.task_type, TaskType::Shell);
        assert!(task.depends_on.is_empty());
        assert_eq!(task.depends_order, DependsOrder::Parallel);
        assert!(!task.hide);
    }

    #[test]
    fn test_task_builder() {
        let task = Task::new("build", "make")
            .with_args(["-j4", "all"])
            .with_type(TaskType::Process)
            .with_dependencies(["clean"], DependsOrder::Sequence)
            .with_cwd("/project")
            .hidden();

        let args: Vec<&str> = task.args.iter().map(Template::as_str).collect();
        assert_eq!(args, vec!["-j4", "all"]);
        assert_eq!(task.task_type, TaskType::Process);
        assert_eq!(task.depends_on, vec!["clean"]);
        assert_eq!(task.depends_order, DependsOrder::Sequence);
        assert_eq!(task.cwd, "/project");
        assert!(task.hide);
    }

    #[test]
    fn test_pending_inputs() {
        let task = Task::new("deploy", "deploy ${input:env}")
            .with_args(["--region", "${input:region}", "${input:env}"]);
        assert_eq!(task.pending_inputs(), vec!["env", "region"]);

        assert!(Task::new("plain", "echo hi").pending_inputs().is_empty());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("shell".parse::<TaskType>(), Ok(TaskType::Shell));
        assert_eq!("process".parse::<TaskType>(), Ok(TaskType::Process));
        assert!("npm".parse::<TaskType>().is_err());

        assert_eq!("sequence".parse::<DependsOrder>(), Ok(DependsOrder::Sequence));
        assert_eq!("parallel".parse::<DependsOrder>(), Ok(DependsOrder::Parallel));
        assert!("random".parse::<DependsOrder>().is_err());
    }
}
