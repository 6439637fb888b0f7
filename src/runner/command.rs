//! Command execution
//!
//! This module turns a task into something the operating system can run and
//! hands it to a [`Launcher`].

use crate::error::{ExecutionError, ExecutionResult};
use std::borrow::Cow;
use std::collections::HashMap;
use std::process::{Command as StdCommand, ExitStatus, Stdio};

/// What to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// One line for the platform shell
    Shell(String),
    /// Program and argument vector, no shell interpretation
    Process { program: String, args: Vec<String> },
}

impl Invocation {
    /// Build a shell line: the command followed by each argument quoted
    ///
    /// The command itself is passed through as written so it can use pipes and
    /// other shell syntax; arguments cannot. Arguments get POSIX quoting for
    /// `sh`, or double quotes for `cmd` on Windows.
    pub fn shell(command: &str, args: &[String]) -> Self {
        let mut line = command.to_string();
        for arg in args {
            line.push(' ');
            if cfg!(windows) {
                line.push_str(&cmd_quote(arg));
            } else {
                line.push_str(&shell_words::quote(arg));
            }
        }
        Invocation::Shell(line)
    }

    /// Human readable form for logging
    pub fn display(&self) -> String {
        match self {
            Invocation::Shell(line) => line.clone(),
            Invocation::Process { program, args } => std::iter::once(program.as_str())
                .chain(args.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Quote one argument for `cmd /C`
///
/// Words without spaces or `cmd` metacharacters pass through. Everything else
/// is wrapped in double quotes with embedded quotes backslash-escaped.
pub fn cmd_quote(arg: &str) -> Cow<'_, str> {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '&' | '|' | '<' | '>' | '^' | '(' | ')' | '%' | '!'));
    if needs_quotes {
        Cow::Owned(format!("\"{}\"", arg.replace('"', "\\\"")))
    } else {
        Cow::Borrowed(arg)
    }
}

/// A fully resolved request to run one task
#[derive(Debug, Clone)]
pub struct Launch {
    /// Label of the task being run
    pub label: String,
    pub invocation: Invocation,
    /// Working directory; empty means inherit
    pub cwd: String,
    /// Variables set on top of the inherited environment
    pub env: HashMap<String, String>,
}

/// Runs a [`Launch`] to completion and reports its exit status
pub trait Launcher {
    fn launch(&mut self, launch: &Launch) -> ExecutionResult<i32>;
}

/// Launcher backed by `std::process`
pub struct SystemLauncher {
    /// Shell program for shell tasks
    shell: &'static str,
    /// Flag telling the shell to run the next argument
    shell_flag: &'static str,
}

impl SystemLauncher {
    pub fn new() -> Self {
        let (shell, shell_flag) = if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") };
        SystemLauncher { shell, shell_flag }
    }

    fn build(&self, launch: &Launch) -> StdCommand {
        let mut command = match &launch.invocation {
            Invocation::Shell(line) => {
                let mut command = StdCommand::new(self.shell);
                command.arg(self.shell_flag).arg(line);
                command
            }
            Invocation::Process { program, args } => {
                let mut command = StdCommand::new(program);
                command.args(args);
                command
            }
        };

        if !launch.cwd.is_empty() {
            command.current_dir(&launch.cwd);
        }

        // Layered over the inherited environment, which also carries
        // variables that are not valid unicode.
        command.envs(&launch.env);

        command.stdin(Stdio::inherit());
        command.stdout(Stdio::inherit());
        command.stderr(Stdio::inherit());
        command
    }
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher for SystemLauncher {
    fn launch(&mut self, launch: &Launch) -> ExecutionResult<i32> {
        let status = self
            .build(launch)
            .status()
            .map_err(|source| ExecutionError::Spawn {
                command: launch.invocation.display(),
                source,
            })?;

        Ok(exit_code(status))
    }
}

/// Exit code of a finished child; on Unix a signal death maps to 128 + signal
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Launcher that records launches instead of running them
///
/// Statuses are looked up by task label and default to 0.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    pub statuses: HashMap<String, i32>,
    pub launched: Vec<Launch>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the task with this label exit with `status`
    pub fn with_status(mut self, label: impl Into<String>, status: i32) -> Self {
        self.statuses.insert(label.into(), status);
        self
    }

    /// Labels in launch order
    pub fn labels(&self) -> Vec<&str> {
        self.launched.iter().map(|l| l.label.as_str()).collect()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&mut self, launch: &Launch) -> ExecutionResult<i32> {
        self.launched.push(launch.clone());
        Ok(self.statuses.get(&launch.label).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn launch(invocation: Invocation) -> Launch {
        Launch {
            label: "test".to_string(),
            invocation,
            cwd: String::new(),
            env: env::vars().collect(),
        }
    }

    #[cfg(not(windows))]
    #[test]
    fn test_shell_line_quotes_arguments() {
        let args = vec!["plain".to_string(), "two words".to_string(), "$HOME;rm".to_string()];
        let invocation = Invocation::shell("echo", &args);
        assert_eq!(
            invocation,
            Invocation::Shell("echo plain 'two words' '$HOME;rm'".to_string())
        );
    }

    #[test]
    fn test_cmd_quote() {
        assert_eq!(cmd_quote("plain"), "plain");
        assert_eq!(cmd_quote("two words"), "\"two words\"");
        assert_eq!(cmd_quote("a&b"), "\"a&b\"");
        assert_eq!(cmd_quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(cmd_quote(""), "\"\"");
    }

    #[test]
    fn test_shell_line_without_arguments() {
        assert_eq!(
            Invocation::shell("make all | tee log", &[]),
            Invocation::Shell("make all | tee log".to_string())
        );
    }

    #[test]
    fn test_process_display() {
        let invocation = Invocation::Process {
            program: "cargo".to_string(),
            args: vec!["build".to_string(), "--release".to_string()],
        };
        assert_eq!(invocation.display(), "cargo build --release");
    }

    #[test]
    fn test_recording_launcher() {
        let mut launcher = RecordingLauncher::new().with_status("test", 3);
        let status = launcher.launch(&launch(Invocation::Shell("true".to_string()))).unwrap();
        assert_eq!(status, 3);
        assert_eq!(launcher.labels(), vec!["test"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_launcher_reports_exit_codes() {
        let mut launcher = SystemLauncher::new();
        assert_eq!(launcher.launch(&launch(Invocation::Shell("true".to_string()))).unwrap(), 0);
        assert_eq!(launcher.launch(&launch(Invocation::Shell("exit 7".to_string()))).unwrap(), 7);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_launcher_uses_cwd_and_env() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut request = launch(Invocation::Shell(
            "test \"$TASKRUN_PROBE\" = yes && test -f marker".to_string(),
        ));
        request.cwd = temp_dir.path().display().to_string();
        request.env.insert("TASKRUN_PROBE".to_string(), "yes".to_string());
        std::fs::write(temp_dir.path().join("marker"), "").unwrap();

        assert_eq!(SystemLauncher::new().launch(&request).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_launcher_keeps_inherited_environment() {
        let mut request = launch(Invocation::Shell("test -n \"$PATH\"".to_string()));
        request.env.clear();
        request.env.insert("EXTRA".to_string(), "1".to_string());

        assert_eq!(SystemLauncher::new().launch(&request).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_launcher_process_type() {
        let mut launcher = SystemLauncher::new();
        let status = launcher
            .launch(&launch(Invocation::Process {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), "exit 4".to_string()],
            }))
            .unwrap();
        assert_eq!(status, 4);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let mut launcher = SystemLauncher::new();
        let result = launcher.launch(&launch(Invocation::Process {
            program: "taskrun-no-such-program-xyz".to_string(),
            args: vec![],
        }));
        assert!(matches!(result, Err(ExecutionError::Spawn { .. })));
    }
}
