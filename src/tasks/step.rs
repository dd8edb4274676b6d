// src/tasks/step.rs

use std::path::PathBuf;

use crate::exec::CommandLine;

/// One command inside a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub command: CommandLine,
    /// Working directory for this step only.
    pub cwd: Option<PathBuf>,
    /// A system tool: never wrapped in the environment manager's `run`.
    pub external: bool,
    /// A failure is reported but does not abort the task.
    pub tolerate_failure: bool,
    /// Mirror output to the console while it runs.
    pub stream: bool,
}

impl Step {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_line(CommandLine::program(program, args))
    }

    pub fn shell(script: impl Into<String>) -> Self {
        Self::from_line(CommandLine::shell(script))
    }

    fn from_line(command: CommandLine) -> Self {
        Self {
            command,
            cwd: None,
            external: false,
            tolerate_failure: false,
            stream: true,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    pub fn tolerate_failure(mut self) -> Self {
        self.tolerate_failure = true;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.stream = false;
        self
    }

    /// Append arguments to a program step (no-op for shell steps).
    pub fn with_args<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let CommandLine::Program { args, .. } = &mut self.command {
            args.extend(extra.into_iter().map(Into::into));
        }
        self
    }
}
