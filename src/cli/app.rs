//! Main CLI application

use crate::config::{
    find_task, find_tasks_file, parse_tasks_file, project_root, visible_labels, visible_tasks,
    TaskSet,
};
use crate::error::{ConfigError, ExecutionError, Result};
use crate::history::{sort_by_history, HistoryStore};
use crate::runner::{Ambient, Launcher, Runner, SystemLauncher, Task};
use crate::ui::{self, Prompter, Reporter, TerminalPrompter, Verbosity};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

/// Editor used by `--edit` when `$EDITOR` is unset
const DEFAULT_EDITOR: &str = "vim";

/// Parsed command line
#[derive(Debug, Clone)]
pub struct Options {
    /// Run the task with this label instead of showing a menu
    pub label: Option<String>,
    pub list: bool,
    pub edit: bool,
    /// Print the chosen label instead of running it
    pub choice_only: bool,
    /// Explicit task file, skipping discovery
    pub file: Option<PathBuf>,
    pub verbosity: Verbosity,
    pub completions: Option<Shell>,
}

impl Options {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Options {
            label: matches.get_one::<String>("label").cloned(),
            list: matches.get_flag("list"),
            edit: matches.get_flag("edit"),
            choice_only: matches.get_flag("choice-only"),
            file: matches.get_one::<PathBuf>("file").cloned(),
            verbosity: get_verbosity(matches),
            completions: matches.get_one::<Shell>("completions").copied(),
        }
    }
}

/// CLI application for one task file
pub struct App {
    /// Project root the tasks were parsed against
    root_dir: String,
    /// Parsed tasks and inputs
    set: TaskSet,
    history: HistoryStore,
    reporter: Reporter,
}

impl App {
    /// Parse a task file and prepare to run it
    pub fn load(tasks_path: &Path, ambient: &Ambient, reporter: Reporter) -> Result<Self> {
        let root_dir = project_root(tasks_path).display().to_string();
        let set = parse_tasks_file(tasks_path, &root_dir, ambient)?;
        tracing::debug!(
            root = %root_dir,
            tasks = set.tasks.len(),
            inputs = set.inputs.len(),
            "parsed task file"
        );

        Ok(App {
            root_dir,
            set,
            history: HistoryStore::default_location(),
            reporter,
        })
    }

    /// Use a specific history store
    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = history;
        self
    }

    pub fn root_dir(&self) -> &str {
        &self.root_dir
    }

    pub fn tasks(&self) -> &[Task] {
        &self.set.tasks
    }

    /// Visible labels, most recently used first
    pub fn ordered_labels(&self) -> Vec<&str> {
        let cache = self.history.load(&self.root_dir);
        visible_labels(sort_by_history(&visible_tasks(&self.set.tasks), &cache))
    }

    /// Decide which task to run
    ///
    /// `Ok(None)` means there is nothing to run: unknown label, no visible
    /// tasks, or a cancelled menu.
    pub fn select(
        &self,
        label: Option<&str>,
        prompter: &mut dyn Prompter,
    ) -> io::Result<Option<&Task>> {
        if let Some(label) = label {
            let task = find_task(&self.set.tasks, label);
            if task.is_none() {
                self.reporter.info(&format!("No task found with label: {}", label));
            }
            return Ok(task);
        }

        if let [only] = self.set.tasks.as_slice() {
            return Ok(Some(only));
        }

        let cache = self.history.load(&self.root_dir);
        let visible = sort_by_history(&visible_tasks(&self.set.tasks), &cache);
        if visible.is_empty() {
            self.reporter.info("No tasks available.");
            return Ok(None);
        }

        let labels: Vec<String> = visible.iter().map(|t| t.label.clone()).collect();
        let choice = prompter.select("", &labels, 0)?;
        Ok(choice.and_then(|i| visible.get(i).copied()))
    }

    /// Run the application and return the process exit code
    pub fn run(
        &self,
        options: &Options,
        prompter: &mut dyn Prompter,
        launcher: &mut dyn Launcher,
    ) -> Result<i32> {
        if options.list {
            for label in self.ordered_labels() {
                println!("{}", label);
            }
            return Ok(0);
        }

        let Some(task) = self.select(options.label.as_deref(), prompter)? else {
            self.reporter.info("No task to run.");
            return Ok(0);
        };

        if options.choice_only {
            println!("{}", task.label);
            return Ok(0);
        }

        self.history.record_run(&self.root_dir, &task.label);

        let status = Runner::new(&self.set.tasks, &self.set.inputs, launcher, prompter)
            .with_reporter(self.reporter)
            .run(task)?;
        Ok(status)
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("taskrun")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run or list VS Code tasks from tasks.json")
        .arg(
            Arg::new("label")
                .short('l')
                .long("label")
                .value_name("LABEL")
                .help("Label of the task to run"),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("List all task labels")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("edit")
                .long("edit")
                .help("Edit tasks.json file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("choice-only")
                .long("choice-only")
                .help("Print chosen task label without running it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to tasks.json (skips searching parent directories)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(value_parser!(Shell))
                .help("Print a shell completion script"),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Locate the task file: `--file` if given, otherwise search upwards
fn locate_tasks_file(options: &Options, ambient: &Ambient, reporter: &Reporter) -> Result<PathBuf> {
    match &options.file {
        Some(path) if path.is_file() => Ok(path.clone()),
        Some(path) => Err(ConfigError::NotFound(path.display().to_string()).into()),
        None => {
            let path = find_tasks_file(ambient)?;
            reporter.info(&format!("Found: {}", path.display()));
            Ok(path)
        }
    }
}

/// Open the task file in `$EDITOR`
fn edit_file(path: &Path, editor: Option<String>) -> Result<()> {
    let editor = editor
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
    let mut words = shell_words::split(&editor).map_err(|e| ExecutionError::Editor(e.to_string()))?;
    if words.is_empty() {
        words.push(DEFAULT_EDITOR.to_string());
    }

    StdCommand::new(&words[0])
        .args(&words[1..])
        .arg(path)
        .status()
        .map_err(|e| ExecutionError::Editor(format!("{}: {}", words[0], e)))?;
    Ok(())
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<i32> {
    let matches = build_command().get_matches();
    let options = Options::from_matches(&matches);

    if let Some(shell) = options.completions {
        clap_complete::generate(shell, &mut build_command(), "taskrun", &mut io::stdout());
        return Ok(0);
    }

    ui::init_logging(options.verbosity);
    let reporter = Reporter::new(options.verbosity);
    let ambient = Ambient::capture();

    let tasks_path = locate_tasks_file(&options, &ambient, &reporter)?;

    if options.edit {
        edit_file(&tasks_path, ambient.var("EDITOR").map(str::to_string))?;
        return Ok(0);
    }

    let app = App::load(&tasks_path, &ambient, reporter)?;
    app.run(&options, &mut TerminalPrompter::new(), &mut SystemLauncher::new())
}
