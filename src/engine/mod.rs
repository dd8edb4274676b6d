// src/engine/mod.rs

//! Orchestration engine for venvtask.
//!
//! - [`scheduler`] runs tasks and their steps strictly in order, ensuring
//!   environments are ready first and stopping at the first failure.
//! - [`report`] records what ran and derives the process exit code.

pub mod report;
pub mod scheduler;

pub use report::{Failure, RunReport, StepReport, TaskReport};
pub use scheduler::Scheduler;
