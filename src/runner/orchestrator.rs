//! Dependency-aware task execution
//!
//! A task run goes through: resolve dependencies, resolve inputs, execute.
//! Dependencies are run one at a time in declaration order. The cycle guard is
//! the chain of labels leading to the current task; each dependency gets its
//! own copy, so a task shared by two branches runs once per branch.

use crate::config::find_task;
use crate::error::ExecutionResult;
use crate::runner::{
    resolve_inputs, DependsOrder, InputDefinition, Invocation, Launch, Launcher, Task, TaskType,
};
use crate::ui::{Prompter, Reporter};
use std::collections::HashMap;

/// Labels on the way from the top-level task to the current one
#[derive(Debug, Clone, Default)]
pub struct RunPath(Vec<String>);

impl RunPath {
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    /// A new path with `label` appended
    pub fn with(&self, label: &str) -> RunPath {
        let mut labels = self.0.clone();
        labels.push(label.to_string());
        RunPath(labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }
}

/// Runs tasks and their dependencies
pub struct Runner<'a> {
    tasks: &'a [Task],
    inputs: &'a [InputDefinition],
    launcher: &'a mut dyn Launcher,
    prompter: &'a mut dyn Prompter,
    reporter: Reporter,
}

impl<'a> Runner<'a> {
    pub fn new(
        tasks: &'a [Task],
        inputs: &'a [InputDefinition],
        launcher: &'a mut dyn Launcher,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Runner {
            tasks,
            inputs,
            launcher,
            prompter,
            reporter: Reporter::default(),
        }
    }

    /// Set the reporter used for progress output
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run `task` after its dependencies and return the final exit status
    pub fn run(&mut self, task: &Task) -> ExecutionResult<i32> {
        self.run_on_path(task, &RunPath::default())
    }

    fn run_on_path(&mut self, task: &Task, path: &RunPath) -> ExecutionResult<i32> {
        if path.contains(&task.label) {
            tracing::warn!(
                task = %task.label,
                path = %path.labels().join(" -> "),
                "circular dependency detected, skipping"
            );
            return Ok(0);
        }
        let path = path.with(&task.label);

        for dep_label in &task.depends_on {
            let Some(dep) = find_task(self.tasks, dep_label) else {
                tracing::warn!(task = %task.label, dependency = %dep_label, "dependency not found");
                continue;
            };

            let status = self.run_on_path(dep, &path)?;
            if status != 0 {
                match task.depends_order {
                    DependsOrder::Sequence => {
                        self.reporter.error(&format!(
                            "Dependency '{}' failed (exit {}), aborting.",
                            dep_label, status
                        ));
                        return Ok(status);
                    }
                    DependsOrder::Parallel => {
                        tracing::debug!(
                            task = %task.label,
                            dependency = %dep_label,
                            status,
                            "dependency failed, continuing"
                        );
                    }
                }
            }
        }

        let resolved = self.resolve_task_inputs(task)?;
        let launch = build_launch(task, &resolved);

        self.reporter.task_start(&task.label);
        self.reporter.command(&launch.invocation.display());

        let status = self.launcher.launch(&launch)?;
        tracing::debug!(task = %task.label, status, "task finished");
        Ok(status)
    }

    fn resolve_task_inputs(&mut self, task: &Task) -> ExecutionResult<HashMap<String, String>> {
        let ids = task.pending_inputs();
        if ids.is_empty() || self.inputs.is_empty() {
            return Ok(HashMap::new());
        }
        resolve_inputs(&ids, self.inputs, &mut *self.prompter)
    }
}

/// Fill in inputs and decide how the task is handed to the OS
pub fn build_launch(task: &Task, inputs: &HashMap<String, String>) -> Launch {
    let command = task.command.resolve(inputs);
    let args: Vec<String> = task.args.iter().map(|a| a.resolve(inputs)).collect();

    let invocation = match task.task_type {
        TaskType::Process => Invocation::Process {
            program: command,
            args,
        },
        TaskType::Shell => Invocation::shell(&command, &args),
    };

    Launch {
        label: task.label.clone(),
        invocation,
        cwd: task.cwd.clone(),
        env: task.env.clone(),
    }
}
