#![allow(dead_code)]

pub use venvtask_test_utils::{init_tracing, with_timeout};

use std::sync::Arc;

use venvtask::config::ConfigFile;
use venvtask::engine::Scheduler;
use venvtask::types::Mode;
use venvtask_test_utils::fake_runner::FakeRunner;

/// Scheduler over a fake runner with default config, operating on `.`.
pub fn fake_scheduler(runner: &FakeRunner, mode: Mode) -> Scheduler<FakeRunner> {
    Scheduler::new(&ConfigFile::default(), Arc::new(runner.clone()), mode, Vec::new())
        .expect("default config builds a scheduler")
}
