//! Task file discovery and parsing

use crate::config::types::{Scalar, TaskDefinition, TaskFields, TaskOptions, TasksFile};
use crate::error::{ConfigError, ConfigResult};
use crate::runner::{Ambient, DependsOrder, Expander, InputDefinition, Task, TaskType};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding the task file, relative to the project root
const VSCODE_DIR: &str = ".vscode";

/// Task file name inside [`VSCODE_DIR`]
const TASKS_FILE_NAME: &str = "tasks.json";

/// Everything parsed from a task file
#[derive(Debug, Clone)]
pub struct TaskSet {
    /// All tasks, hidden ones included, in file order
    pub tasks: Vec<Task>,
    pub inputs: Vec<InputDefinition>,
}

/// Find `.vscode/tasks.json` by searching the start directory and its parents
///
/// The search stops before `stop_at` (normally the home directory) or at the
/// filesystem root.
pub fn find_tasks_file_from(start_dir: &Path, stop_at: Option<&Path>) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir.to_path_buf();
    let mut searched_paths = Vec::new();

    loop {
        if stop_at.is_some_and(|stop| stop == current_dir) {
            break;
        }

        let tasks_path = current_dir.join(VSCODE_DIR).join(TASKS_FILE_NAME);
        searched_paths.push(tasks_path.display().to_string());
        if tasks_path.is_file() {
            return Ok(tasks_path);
        }

        // Try parent directory
        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => break,
        }
    }

    Err(ConfigError::NotFound(searched_paths.join(", ")))
}

/// Find the task file starting from the ambient working directory
pub fn find_tasks_file(ambient: &Ambient) -> ConfigResult<PathBuf> {
    let stop_at = (!ambient.home_dir.as_os_str().is_empty()).then_some(ambient.home_dir.as_path());
    find_tasks_file_from(&ambient.cwd, stop_at)
}

/// Project root for a task file
///
/// The parent of `.vscode`, or the file's own directory when it lives
/// somewhere else. Symlinks are resolved when possible.
pub fn project_root(tasks_path: &Path) -> PathBuf {
    let resolved = fs::canonicalize(tasks_path).unwrap_or_else(|_| tasks_path.to_path_buf());
    let dir = resolved.parent().unwrap_or_else(|| Path::new("."));

    if dir.file_name().is_some_and(|name| name == VSCODE_DIR) {
        dir.parent().unwrap_or(dir).to_path_buf()
    } else {
        dir.to_path_buf()
    }
}

/// Parse a task file from a path
pub fn parse_tasks_file(path: &Path, root_dir: &str, ambient: &Ambient) -> ConfigResult<TaskSet> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let file = parse_document(&contents).map_err(|e| match e {
        ConfigError::Invalid(message) => ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })?;

    Ok(build_task_set(file, root_dir, ambient))
}

/// Parse the relaxed JSON of a task file (comments and trailing commas allowed)
pub fn parse_document(contents: &str) -> ConfigResult<TasksFile> {
    json5::from_str(contents).map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Parse task file text into runtime tasks
pub fn parse_tasks(contents: &str, root_dir: &str, ambient: &Ambient) -> ConfigResult<TaskSet> {
    Ok(build_task_set(parse_document(contents)?, root_dir, ambient))
}

fn build_task_set(file: TasksFile, root_dir: &str, ambient: &Ambient) -> TaskSet {
    let tasks = file
        .tasks
        .iter()
        .map(|definition| build_task(definition, root_dir, ambient))
        .collect();
    let inputs = file.inputs.iter().map(InputDefinition::from_config).collect();

    TaskSet { tasks, inputs }
}

/// Build a runtime task, applying the override block for the ambient platform
pub fn build_task(definition: &TaskDefinition, root_dir: &str, ambient: &Ambient) -> Task {
    let empty = TaskFields::default();
    let overrides = ambient
        .platform
        .override_key()
        .and_then(|key| definition.overrides_for(key))
        .unwrap_or(&empty);
    let base = &definition.fields;
    let expander = Expander::new(root_dir, ambient);

    let task_type = match overrides.task_type.as_ref().or(base.task_type.as_ref()) {
        Some(value) => value.parse().unwrap_or_else(|e| {
            tracing::warn!(task = %definition.label, "{}, treating as shell", e);
            TaskType::Shell
        }),
        None => TaskType::Shell,
    };

    let depends_order = match overrides.depends_order.as_ref().or(base.depends_order.as_ref()) {
        Some(value) => value.parse().unwrap_or_else(|e| {
            tracing::warn!(task = %definition.label, "{}, treating as parallel", e);
            DependsOrder::Parallel
        }),
        None => DependsOrder::Parallel,
    };

    let command = overrides
        .command
        .as_ref()
        .or(base.command.as_ref())
        .map(ToString::to_string)
        .unwrap_or_default();

    let args = overrides
        .args
        .as_ref()
        .or(base.args.as_ref())
        .map(|args| args.iter().map(|a| expander.template(&a.to_string())).collect())
        .unwrap_or_default();

    let depends_on = overrides
        .depends_on
        .clone()
        .or_else(|| base.depends_on.clone())
        .map(|d| d.into_labels())
        .unwrap_or_default();

    let hide = overrides
        .hide
        .as_ref()
        .or(base.hide.as_ref())
        .is_some_and(Scalar::is_truthy);

    let options = TaskOptions::merged(base.options.as_ref(), overrides.options.as_ref());
    let cwd = match &options.cwd {
        Some(cwd) => expander.expand(cwd),
        None => root_dir.to_string(),
    };

    let mut env = ambient.vars.clone();
    for (key, value) in options.env.iter().flatten() {
        env.insert(key.clone(), expander.expand(&value.to_string()));
    }

    Task {
        label: definition.label.clone(),
        command: expander.template(&command),
        args,
        cwd,
        env,
        task_type,
        depends_on,
        depends_order,
        hide,
        root_dir: root_dir.to_string(),
    }
}

/// Find a task by exact label; the first match wins
pub fn find_task<'t>(tasks: &'t [Task], label: &str) -> Option<&'t Task> {
    tasks.iter().find(|task| task.label == label)
}

/// Tasks shown in menus and listings
pub fn visible_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|task| !task.hide).collect()
}

/// Labels of the non-hidden tasks, in the given order
pub fn visible_labels<'t, I>(tasks: I) -> Vec<&'t str>
where
    I: IntoIterator<Item = &'t Task>,
{
    tasks
        .into_iter()
        .filter(|task| !task.hide)
        .map(|task| task.label.as_str())
        .collect()
}
