use std::{
    ffi::OsString,
    fmt::{self, Display},
    path::{Path, PathBuf},
    process::Command,
    thread,
    time::Duration,
};

use crate::error::CommandError;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// A single external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.current_dir {
            write!(f, "cd {} && ", dir.display())?;
        }

        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }

        Ok(())
    }
}

/// Runs external processes on behalf of a pipeline.
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion, returning its captured output.
    fn execute(&self, command: &CommandSpec) -> Result<String, CommandError>;

    /// Whether `program` can be found on the `PATH`.
    fn is_available(&self, program: &str) -> bool;
}

/// Runs commands as local child processes, blocking the calling thread.
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    settle_delay: Duration,
    search_path: Option<OsString>,
}

impl ShellCommandRunner {
    /// `settle_delay` is slept before every invocation so that the machines
    /// touched by the previous command have time to converge.
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            settle_delay,
            search_path: None,
        }
    }

    /// Look programs up in these `PATH`-style directories instead of the
    /// process `PATH`.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

impl CommandRunner for ShellCommandRunner {
    fn execute(&self, command: &CommandSpec) -> Result<String, CommandError> {
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }

        tracing::info!("Running `{}`", command);

        let mut process = Command::new(&command.program);
        process.args(&command.args);
        if let Some(dir) = &command.current_dir {
            process.current_dir(dir);
        }

        let output = process.output().map_err(|e| CommandError {
            command: command.to_string(),
            exit_detail: format!("failed to spawn: {e}"),
            output: String::new(),
        })?;

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(CommandError {
                command: command.to_string(),
                exit_detail: output.status.to_string(),
                output: captured,
            });
        }

        tracing::debug!("`{}` output: {}", command, captured);

        Ok(captured)
    }

    fn is_available(&self, program: &str) -> bool {
        let found = match &self.search_path {
            Some(search_path) => which::which_in(program, Some(search_path), "."),
            None => which::which(program),
        };

        match found {
            Ok(path) => {
                tracing::debug!("Found {} at {}", program, path.display());
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use std::{collections::HashSet, sync::Mutex};

    use super::*;

    /// Records every command it is asked to run instead of running it.
    ///
    /// A command fails if any of its arguments, or its program, matches one
    /// of the configured failure triggers.
    #[derive(Debug, Default)]
    pub struct FakeCommandRunner {
        executed: Mutex<Vec<CommandSpec>>,
        fail_on: HashSet<String>,
        available: HashSet<String>,
    }

    impl FakeCommandRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(mut self, trigger: impl Into<String>) -> Self {
            self.fail_on.insert(trigger.into());
            self
        }

        pub fn with_available(mut self, program: impl Into<String>) -> Self {
            self.available.insert(program.into());
            self
        }

        pub fn executed(&self) -> Vec<CommandSpec> {
            self.executed
                .lock()
                .map(|executed| executed.clone())
                .unwrap_or_default()
        }

        pub fn executed_lines(&self) -> Vec<String> {
            self.executed().iter().map(ToString::to_string).collect()
        }
    }

    impl CommandRunner for FakeCommandRunner {
        fn execute(&self, command: &CommandSpec) -> Result<String, CommandError> {
            if let Ok(mut executed) = self.executed.lock() {
                executed.push(command.clone());
            }

            let triggered = std::iter::once(&command.program)
                .chain(command.args.iter())
                .any(|part| self.fail_on.contains(part));

            if triggered {
                return Err(CommandError {
                    command: command.to_string(),
                    exit_detail: "exit status: 2".into(),
                    output: "fatal: simulated failure".into(),
                });
            }

            Ok(String::new())
        }

        fn is_available(&self, program: &str) -> bool {
            self.available.contains(program)
        }
    }
}
