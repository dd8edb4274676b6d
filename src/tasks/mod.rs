// src/tasks/mod.rs

//! Task definitions.
//!
//! - [`step`] is a single command with its execution flags.
//! - [`excludes`] compiles the paths `strip` must never touch.
//! - [`graph`] maps each task name to its ordered steps for a given mode.

pub mod excludes;
pub mod graph;
pub mod step;

pub use excludes::ExcludeSet;
pub use graph::{Invocation, Task, TaskGraph};
pub use step::Step;
