// src/engine/report.rs

use std::fmt;

use crate::errors::VenvtaskError;
use crate::exec::ExecutionResult;
use crate::types::TaskName;

/// Result of one executed step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub command: String,
    pub result: ExecutionResult,
    /// The step failed but was allowed to.
    pub tolerated: bool,
}

/// Why a task stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Always non-zero.
    pub exit_code: i32,
    pub message: String,
    pub interrupted: bool,
}

impl From<&VenvtaskError> for Failure {
    fn from(err: &VenvtaskError) -> Self {
        Self {
            exit_code: err.exit_code(),
            message: err.to_string(),
            interrupted: matches!(err, VenvtaskError::Interrupted),
        }
    }
}

/// Steps a task executed, in order, plus its failure if any.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub task: TaskName,
    pub steps: Vec<StepReport>,
    pub failure: Option<Failure>,
}

impl TaskReport {
    pub fn new(task: TaskName) -> Self {
        Self {
            task,
            steps: Vec::new(),
            failure: None,
        }
    }

    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Everything one invocation ran, stopping at the first failing task.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub tasks: Vec<TaskReport>,
}

impl RunReport {
    pub fn first_failure(&self) -> Option<(&TaskReport, &Failure)> {
        self.tasks
            .iter()
            .find_map(|t| t.failure.as_ref().map(|f| (t, f)))
    }

    pub fn succeeded(&self) -> bool {
        self.first_failure().is_none()
    }

    /// 0 on success, otherwise the failing step's own exit code.
    pub fn exit_code(&self) -> i32 {
        self.first_failure().map_or(0, |(_, f)| f.exit_code)
    }

    /// Names of the tasks that started, in execution order.
    pub fn executed_tasks(&self) -> Vec<TaskName> {
        self.tasks.iter().map(|t| t.task).collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for task in &self.tasks {
            let status = match &task.failure {
                None => "ok".to_string(),
                Some(fail) if fail.interrupted => "interrupted".to_string(),
                Some(fail) => format!("failed (exit code {})", fail.exit_code),
            };
            writeln!(f, "{:<14} {status}", task.task.as_str())?;
            for step in task.steps.iter().filter(|s| s.tolerated) {
                writeln!(
                    f,
                    "  tolerated: {} (exit code {})",
                    step.command, step.result.exit_code
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_is_that_of_the_first_failure() {
        let mut ok = TaskReport::new(TaskName::Format);
        ok.steps.push(StepReport {
            command: "isort .".into(),
            result: ExecutionResult::default(),
            tolerated: false,
        });
        let mut bad = TaskReport::new(TaskName::Lint);
        bad.failure = Some(Failure {
            exit_code: 2,
            message: "mypy failed".into(),
            interrupted: false,
        });

        let report = RunReport {
            tasks: vec![ok, bad],
        };
        assert_eq!(report.exit_code(), 2);
        assert!(!report.succeeded());
        assert_eq!(report.executed_tasks(), [TaskName::Format, TaskName::Lint]);
        assert!(report.to_string().contains("failed (exit code 2)"));
    }

    #[test]
    fn empty_report_succeeds() {
        assert_eq!(RunReport::default().exit_code(), 0);
    }
}
