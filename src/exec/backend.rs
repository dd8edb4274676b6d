// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! The scheduler and the environment registry talk to a `CommandRunner`
//! instead of spawning processes themselves. Production code uses
//! [`ProcessRunner`]; tests provide a fake that records commands and returns
//! scripted results without touching the OS.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::watch;

use crate::errors::Result;

use super::command::{CommandSpec, ExecutionResult};
use super::runner::run_command;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait abstracting how a single command is executed.
pub trait CommandRunner: Send + Sync {
    /// Run `spec`, mirroring its output to the console when `stream` is set.
    ///
    /// Implementations return `VenvtaskError::CommandFailed` for a non-zero
    /// exit and must not return before the child has been reaped.
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        stream: bool,
    ) -> BoxFuture<'a, Result<ExecutionResult>>;
}

/// Real runner used in production: spawns OS processes and streams to the
/// invoking process's stdout.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    shutdown: watch::Receiver<bool>,
}

impl ProcessRunner {
    /// Create a runner that kills its current child once `shutdown` flips
    /// to `true`.
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self { shutdown }
    }

    /// Runner with no way to be interrupted.
    pub fn uninterruptible() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { shutdown: rx }
    }
}

impl CommandRunner for ProcessRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        stream: bool,
    ) -> BoxFuture<'a, Result<ExecutionResult>> {
        // Each call gets its own receiver so the runner can stay `&self`.
        let mut shutdown = self.shutdown.clone();

        Box::pin(async move {
            if stream {
                let mut stdout = tokio::io::stdout();
                run_command(spec, Some(&mut stdout), &mut shutdown).await
            } else {
                run_command::<tokio::io::Stdout>(spec, None, &mut shutdown).await
            }
        })
    }
}
