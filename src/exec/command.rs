// src/exec/command.rs

//! Command descriptions and execution results.

use std::fmt;
use std::path::PathBuf;

/// What to launch: a shell string or a program with arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// Interpreted by `sh -c` (or `cmd /C` on Windows).
    Shell(String),
    Program { program: String, args: Vec<String> },
}

impl CommandLine {
    pub fn shell(script: impl Into<String>) -> Self {
        CommandLine::Shell(script.into())
    }

    pub fn program<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine::Program {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Arguments passed to the program (empty for shell strings).
    pub fn args(&self) -> &[String] {
        match self {
            CommandLine::Shell(_) => &[],
            CommandLine::Program { args, .. } => args,
        }
    }

    /// Run this command through a launcher such as `mvenv run lint`.
    ///
    /// Shell strings are passed to the launcher as `sh -c <script>` so they
    /// keep their shell semantics inside the environment.
    pub fn prefixed(self, launcher: &str, launcher_args: &[String]) -> Self {
        let mut args = launcher_args.to_vec();
        match self {
            CommandLine::Shell(script) => {
                args.extend(["sh".to_string(), "-c".to_string(), script]);
            }
            CommandLine::Program {
                program,
                args: inner,
            } => {
                args.push(program);
                args.extend(inner);
            }
        }
        CommandLine::Program {
            program: launcher.to_string(),
            args,
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandLine::Shell(script) => f.write_str(script),
            CommandLine::Program { program, args } => {
                f.write_str(program)?;
                for arg in args {
                    if arg.is_empty() || arg.contains(char::is_whitespace) {
                        write!(f, " '{}'", arg.replace('\'', "'\\''"))?;
                    } else {
                        write!(f, " {arg}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Which of the child's streams end up in [`ExecutionResult::output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    /// stdout and stderr interleaved on one pipe, in write order.
    #[default]
    Merged,
    /// stdout only. stderr is collected on the side and appended to the
    /// output of a failed command.
    StdoutOnly,
}

/// A single invocation: command line plus an optional working directory
/// scoped to this call only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub line: CommandLine,
    pub cwd: Option<PathBuf>,
    pub capture: Capture,
}

impl CommandSpec {
    pub fn new(line: CommandLine) -> Self {
        Self {
            line,
            cwd: None,
            capture: Capture::Merged,
        }
    }

    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// For commands whose stdout is machine-readable.
    pub fn stdout_only(mut self) -> Self {
        self.capture = Capture::StdoutOnly;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cwd {
            Some(dir) => write!(f, "(cd {}) {}", dir.display(), self.line),
            None => write!(f, "{}", self.line),
        }
    }
}

/// Outcome of one command: exit code and captured bytes (see [`Capture`]).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    /// `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub output: Vec<u8>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}
