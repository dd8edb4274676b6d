// src/cli.rs

//! CLI argument parsing using `clap`.

use std::io::IsTerminal;

use clap::{Parser, ValueEnum};

use crate::errors::{Result, VenvtaskError};
use crate::types::{Mode, TaskName};

/// Command-line arguments for `venvtask`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "venvtask",
    version,
    about = "Run format, lint, test and docs tasks against managed environments.",
    long_about = None
)]
pub struct CliArgs {
    /// Tasks to run, in order. Runs the default suite when omitted.
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Arguments after `--` are forwarded to the test runner.
    #[arg(last = true, value_name = "EXTRA")]
    pub extra: Vec<String>,

    /// Path a task should operate on (repeatable). Defaults to `.`.
    #[arg(short = 'p', long = "path", value_name = "PATH")]
    pub targets: Vec<String>,

    /// Verify only; never modify files.
    #[arg(long, conflicts_with = "fix")]
    pub check: bool,

    /// Rewrite files in place and run interactive helpers.
    #[arg(long)]
    pub fix: bool,

    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "venvtask.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `VENVTASK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the steps each task would run, without running anything.
    #[arg(long)]
    pub list: bool,

    /// Print the environments the manager knows about and their
    /// requirements paths.
    #[arg(long, conflicts_with = "list")]
    pub envs: bool,
}

impl CliArgs {
    /// `--check`/`--fix` win; otherwise detect from `CI` and the terminal.
    pub fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.fix {
            Mode::Fix
        } else {
            let ci = std::env::var("CI").ok();
            Mode::detect(ci.as_deref(), std::io::stdin().is_terminal())
        }
    }

    pub fn task_names(&self) -> Result<Vec<TaskName>> {
        self.tasks
            .iter()
            .map(|t| t.parse::<TaskName>().map_err(|_| VenvtaskError::UnknownTask(t.clone())))
            .collect()
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
