use std::sync::{Arc, Mutex};

use venvtask::errors::{Result, VenvtaskError};
use venvtask::exec::{BoxFuture, CommandRunner, CommandSpec, ExecutionResult};

/// One command the fake runner was asked to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub spec: CommandSpec,
    pub stream: bool,
}

impl RecordedCommand {
    pub fn display(&self) -> String {
        self.spec.to_string()
    }
}

#[derive(Debug, Clone)]
struct Script {
    prefix: String,
    exit_code: i32,
    output: Vec<u8>,
}

/// A fake runner that:
/// - records every command it is given, in order
/// - answers from scripted responses matched by command-line prefix
///   (first match wins), or succeeds with empty output otherwise.
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    scripts: Arc<Mutex<Vec<Script>>>,
    executed: Arc<Mutex<Vec<RecordedCommand>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands whose display form starts with `prefix` exit with
    /// `exit_code` and print `output`.
    pub fn respond(self, prefix: &str, exit_code: i32, output: &str) -> Self {
        self.scripts.lock().unwrap().push(Script {
            prefix: prefix.to_string(),
            exit_code,
            output: output.as_bytes().to_vec(),
        });
        self
    }

    pub fn executed(&self) -> Vec<RecordedCommand> {
        self.executed.lock().unwrap().clone()
    }

    pub fn executed_lines(&self) -> Vec<String> {
        self.executed().iter().map(RecordedCommand::display).collect()
    }

    /// How many recorded commands start with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.executed_lines()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        stream: bool,
    ) -> BoxFuture<'a, Result<ExecutionResult>> {
        let line = spec.to_string();
        self.executed.lock().unwrap().push(RecordedCommand {
            spec: spec.clone(),
            stream,
        });

        let script = self
            .scripts
            .lock()
            .unwrap()
            .iter()
            .find(|s| line.starts_with(&s.prefix))
            .cloned();

        Box::pin(async move {
            match script {
                Some(s) if s.exit_code != 0 => Err(VenvtaskError::CommandFailed {
                    command: line,
                    exit_code: s.exit_code,
                    output: s.output,
                }),
                Some(s) => Ok(ExecutionResult {
                    exit_code: 0,
                    output: s.output,
                }),
                None => Ok(ExecutionResult::default()),
            }
        })
    }
}
