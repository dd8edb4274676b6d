// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] describes what to run (`CommandLine`, `CommandSpec`) and
//!   what came back (`ExecutionResult`).
//! - [`runner`] owns the streaming read loop around one child process.
//! - [`backend`] provides the `CommandRunner` trait and the production
//!   `ProcessRunner`, which tests replace with a fake implementation.

pub mod backend;
pub mod command;
pub mod runner;

pub use backend::{BoxFuture, CommandRunner, ProcessRunner};
pub use command::{Capture, CommandLine, CommandSpec, ExecutionResult};
pub use runner::run_command;
