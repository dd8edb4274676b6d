// src/engine/scheduler.rs

//! Sequential task scheduler.
//!
//! Tasks run one after another and their steps run one after another. The
//! first failing step aborts its task, and the first failing task aborts the
//! rest of the batch.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::ConfigFile;
use crate::env::{EnvironmentRegistry, ManagerCommands};
use crate::errors::{Result, VenvtaskError};
use crate::exec::{Capture, CommandRunner, CommandSpec, ExecutionResult};
use crate::tasks::{Invocation, Step, Task, TaskGraph};
use crate::types::{Mode, TaskName};

use super::report::{Failure, RunReport, StepReport, TaskReport};

pub struct Scheduler<R: CommandRunner> {
    runner: Arc<R>,
    registry: EnvironmentRegistry<R>,
    graph: TaskGraph,
    default_tasks: Vec<TaskName>,
    mode: Mode,
    targets: Vec<String>,
}

impl<R: CommandRunner> Scheduler<R> {
    pub fn new(cfg: &ConfigFile, runner: Arc<R>, mode: Mode, targets: Vec<String>) -> Result<Self> {
        let manager = ManagerCommands::from_section(&cfg.manager);
        Ok(Self {
            registry: EnvironmentRegistry::new(Arc::clone(&runner), manager),
            runner,
            graph: TaskGraph::from_config(cfg)?,
            default_tasks: cfg.config.default_tasks.clone(),
            mode,
            targets,
        })
    }

    pub fn registry(&self) -> &EnvironmentRegistry<R> {
        &self.registry
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn default_tasks(&self) -> &[TaskName] {
        &self.default_tasks
    }

    pub fn invocation(&self, extra_args: &[String]) -> Invocation {
        Invocation::new(self.mode, self.targets.clone()).with_extra_args(extra_args.to_vec())
    }

    /// Run the configured default suite in order.
    pub async fn run_default_suite(&mut self) -> RunReport {
        let tasks = self.default_tasks.clone();
        self.run_named(&tasks, &[]).await
    }

    /// Run `names` in order, forwarding `extra_args` to the test runner.
    pub async fn run_named(&mut self, names: &[TaskName], extra_args: &[String]) -> RunReport {
        let inv = self.invocation(extra_args);
        let mut report = RunReport::default();

        for (idx, name) in names.iter().enumerate() {
            let task_report = self.run_task(*name, &inv).await;
            let failed = task_report.failed();
            report.tasks.push(task_report);

            if failed {
                let skipped: Vec<&str> = names[idx + 1..].iter().map(|t| t.as_str()).collect();
                if !skipped.is_empty() {
                    info!(task = %name, ?skipped, "task failed; skipping remaining tasks");
                }
                break;
            }
        }

        report
    }

    /// Prepare the environment for `name`, build its steps and run them.
    pub async fn run_task(&mut self, name: TaskName, inv: &Invocation) -> TaskReport {
        info!(task = %name, mode = %inv.mode, "starting task");

        let task = match self.prepare(name, inv).await {
            Ok(task) => task,
            Err(err) => {
                let mut report = TaskReport::new(name);
                emit_failure(name, &err, false);
                report.failure = Some(Failure::from(&err));
                return report;
            }
        };

        self.execute_task(&task).await
    }

    async fn prepare(&mut self, name: TaskName, inv: &Invocation) -> Result<Task> {
        let env = self.graph.environment_for(name).map(str::to_string);

        if let Some(env) = &env {
            self.registry.ensure_ready(env).await?;
        }

        let requirements = match (&env, self.graph.needs_requirements(name)) {
            (Some(env), true) => Some(self.requirements_for(env).await?),
            _ => None,
        };

        self.graph.build(name, inv, requirements.as_deref())
    }

    async fn requirements_for(&self, env: &str) -> Result<PathBuf> {
        let mut paths = self
            .registry
            .resolve_requirements_paths(&[env.to_string()])
            .await?;
        paths.remove(env).ok_or_else(|| {
            VenvtaskError::Other(anyhow::anyhow!(
                "environment manager reported no requirements path for '{env}'"
            ))
        })
    }

    /// Run an already built task's steps in order.
    pub async fn execute_task(&self, task: &Task) -> TaskReport {
        let mut report = TaskReport::new(task.name);

        if task.steps.is_empty() {
            info!(task = %task.name, "nothing to do");
            return report;
        }

        for step in &task.steps {
            let spec = self.command_for(task, step);
            let command = spec.to_string();
            info!(task = %task.name, %command, "running step");

            match self.runner.run(&spec, step.stream).await {
                Ok(result) => report.steps.push(StepReport {
                    command,
                    result,
                    tolerated: false,
                }),
                Err(VenvtaskError::CommandFailed {
                    exit_code, output, ..
                }) if step.tolerate_failure => {
                    warn!(task = %task.name, %command, exit_code, "step failed; tolerated");
                    report.steps.push(StepReport {
                        command,
                        result: ExecutionResult { exit_code, output },
                        tolerated: true,
                    });
                }
                Err(err) => {
                    emit_failure(task.name, &err, step.stream);
                    if let VenvtaskError::CommandFailed {
                        exit_code, output, ..
                    } = &err
                    {
                        report.steps.push(StepReport {
                            command,
                            result: ExecutionResult {
                                exit_code: *exit_code,
                                output: output.clone(),
                            },
                            tolerated: false,
                        });
                    }
                    report.failure = Some(Failure::from(&err));
                    return report;
                }
            }
        }

        info!(task = %task.name, "task succeeded");
        report
    }

    /// Resolve the concrete command for a step, wrapping it in the task's
    /// environment unless it is an external tool.
    pub fn command_for(&self, task: &Task, step: &Step) -> CommandSpec {
        let line = match (&task.environment, step.external) {
            (Some(env), false) => self.registry.manager().run_in(env, step.command.clone()),
            _ => step.command.clone(),
        };
        CommandSpec {
            line,
            cwd: step.cwd.clone(),
            capture: Capture::Merged,
        }
    }
}

/// Show a failure to the operator: captured output first (unless it was
/// already streamed), then the error with its exit code.
fn emit_failure(task: TaskName, err: &VenvtaskError, streamed: bool) {
    if let Some(output) = err.output() {
        if !streamed && !output.is_empty() {
            let mut stderr = std::io::stderr().lock();
            let _ = stderr.write_all(output);
            let _ = stderr.flush();
        }
    }

    match err {
        VenvtaskError::Interrupted => warn!(task = %task, "interrupted"),
        _ => error!(task = %task, exit_code = err.exit_code(), error = %err, "task failed"),
    }
}
