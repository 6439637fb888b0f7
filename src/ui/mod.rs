//! Terminal interaction
//!
//! Progress output, logging setup, and the prompts used to pick a task or
//! fill in an input.

pub mod menu;

pub use menu::TerminalPrompter;

use colored::Colorize;
use std::collections::VecDeque;
use std::io;
use tracing_subscriber::EnvFilter;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Verbosity {
    /// Default log filter for this level, used when RUST_LOG is unset
    pub fn log_filter(self) -> &'static str {
        match self {
            Verbosity::Silent => "off",
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Install the global tracing subscriber writing to stderr
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(verbosity.log_filter()))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Prints progress messages to stderr according to the verbosity level
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    pub verbosity: Verbosity,
}

impl Reporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Reporter { verbosity }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", message);
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "error:".red().bold(), message);
        }
    }

    /// Print task start message
    pub fn task_start(&self, label: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "Running task:".green().bold(), label);
        }
    }

    /// Print the command line about to run
    pub fn command(&self, line: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "Command:".cyan(), line.dimmed());
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Reporter::new(Verbosity::Normal)
    }
}

/// Interactive prompts used while selecting and running tasks
pub trait Prompter {
    /// Show `message` and read one line of text
    fn read_line(&mut self, message: &str) -> io::Result<String>;

    /// Let the user pick one of `items`, starting at `cursor`
    ///
    /// `Ok(None)` means the user cancelled.
    fn select(&mut self, title: &str, items: &[String], cursor: usize) -> io::Result<Option<usize>>;
}

/// Prompter that replays canned answers and records what it was asked
///
/// Running out of answers reads as an empty line or a cancelled selection.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    lines: VecDeque<String>,
    selections: VecDeque<Option<usize>>,
    /// Messages passed to `read_line`
    pub messages: Vec<String>,
    /// Titles passed to `select`
    pub titles: Vec<String>,
    /// Initial cursors passed to `select`
    pub cursors: Vec<usize>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn with_selections<I>(mut self, selections: I) -> Self
    where
        I: IntoIterator<Item = Option<usize>>,
    {
        self.selections.extend(selections);
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, message: &str) -> io::Result<String> {
        self.messages.push(message.to_string());
        Ok(self.lines.pop_front().unwrap_or_default())
    }

    fn select(&mut self, title: &str, _items: &[String], cursor: usize) -> io::Result<Option<usize>> {
        self.titles.push(title.to_string());
        self.cursors.push(cursor);
        Ok(self.selections.pop_front().flatten())
    }
}
