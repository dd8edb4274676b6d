// src/tasks/graph.rs

//! Built-in task definitions.
//!
//! Every task is fixed metadata; the only runtime inputs are the
//! [`Invocation`] (mode, targets, pass-through arguments) and, for the test
//! tasks, the requirements file the environment manager reports.

use std::path::Path;

use crate::config::{ConfigFile, TasksSection};
use crate::errors::{Result, VenvtaskError};
use crate::types::{Mode, TaskName};

use super::excludes::ExcludeSet;
use super::step::Step;

/// Per-invocation inputs shared by every task in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mode: Mode,
    /// Paths the task operates on; never empty (defaults to `.`).
    pub targets: Vec<String>,
    /// Forwarded verbatim to the test runner by `test`.
    pub extra_args: Vec<String>,
}

impl Invocation {
    pub fn new(mode: Mode, targets: Vec<String>) -> Self {
        let targets = if targets.is_empty() {
            vec![".".to_string()]
        } else {
            targets
        };
        Self {
            mode,
            targets,
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }
}

/// A fully built task: ordered steps plus the environment they run in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: TaskName,
    pub environment: Option<String>,
    pub steps: Vec<Step>,
}

/// Static registry of task definitions.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    settings: TasksSection,
    strip_exclude: ExcludeSet,
}

impl TaskGraph {
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let strip_exclude = ExcludeSet::new(&cfg.tasks.strip_exclude)?;
        Ok(Self {
            settings: cfg.tasks.clone(),
            strip_exclude,
        })
    }

    /// Environment a task's steps run in, if any.
    pub fn environment_for(&self, name: TaskName) -> Option<&str> {
        match name {
            TaskName::Lint => Some(&self.settings.lint_env),
            TaskName::Test | TaskName::TestCoverage => Some(&self.settings.test_env),
            TaskName::Format | TaskName::Strip | TaskName::Docs => None,
        }
    }

    /// Whether building the task needs a resolved requirements path.
    pub fn needs_requirements(&self, name: TaskName) -> bool {
        matches!(name, TaskName::Test | TaskName::TestCoverage)
    }

    /// Build the steps for `name`.
    ///
    /// `requirements` must be provided for tasks where
    /// [`needs_requirements`](Self::needs_requirements) is true.
    pub fn build(
        &self,
        name: TaskName,
        inv: &Invocation,
        requirements: Option<&Path>,
    ) -> Result<Task> {
        let steps = match name {
            TaskName::Format => self.format_steps(inv),
            TaskName::Strip => self.strip_steps(inv),
            TaskName::Lint => self.lint_steps(inv),
            TaskName::Test | TaskName::TestCoverage => {
                let reqs = requirements.ok_or_else(|| {
                    VenvtaskError::Other(anyhow::anyhow!(
                        "task '{name}' needs a resolved requirements path"
                    ))
                })?;
                self.test_steps(name, inv, reqs)
            }
            TaskName::Docs => self.docs_steps(inv),
        };

        Ok(Task {
            name,
            environment: self.environment_for(name).map(str::to_string),
            steps,
        })
    }

    fn format_steps(&self, inv: &Invocation) -> Vec<Step> {
        let (isort_flag, black_flag) = match inv.mode {
            Mode::Fix => (None, None),
            Mode::Check => (Some("--check-only"), Some("--check")),
        };

        vec![
            Step::new("isort", isort_flag)
                .with_args(inv.targets.iter().cloned())
                .external(),
            Step::new("black", black_flag)
                .with_args(inv.targets.iter().cloned())
                .external(),
        ]
    }

    fn strip_steps(&self, inv: &Invocation) -> Vec<Step> {
        let targets = self.strip_exclude.filter_targets(&inv.targets);
        if targets.is_empty() {
            return Vec::new();
        }

        let mode_flag = match inv.mode {
            Mode::Fix => "--in-place",
            Mode::Check => "--check",
        };

        let mut args = vec![
            "--recursive".to_string(),
            "--remove-all-unused-imports".to_string(),
        ];
        if !self.strip_exclude.patterns().is_empty() {
            args.push("--exclude".to_string());
            args.push(self.strip_exclude.joined());
        }
        args.push(mode_flag.to_string());
        args.extend(targets);

        vec![Step::new("autoflake", args).external()]
    }

    fn lint_steps(&self, inv: &Invocation) -> Vec<Step> {
        vec![
            Step::new(
                "flake8",
                [
                    "--count",
                    "--select=E9,F63,F7,F82",
                    "--show-source",
                    "--statistics",
                ],
            )
            .with_args(inv.targets.iter().cloned()),
            Step::new(
                "flake8",
                [
                    "--count",
                    "--exit-zero",
                    "--max-complexity=10",
                    "--max-line-length=127",
                    "--statistics",
                ],
            )
            .with_args(inv.targets.iter().cloned())
            .tolerate_failure(),
            Step::new("mypy", inv.targets.iter().cloned()),
        ]
    }

    fn test_steps(&self, name: TaskName, inv: &Invocation, requirements: &Path) -> Vec<Step> {
        let install_reqs = Step::new(
            "pip",
            [
                "install".to_string(),
                "-r".to_string(),
                requirements.display().to_string(),
                "--upgrade".to_string(),
                "--upgrade-strategy".to_string(),
                "eager".to_string(),
            ],
        );
        let install_project = Step::new("pip", ["install", "."]);

        let pytest = match name {
            TaskName::TestCoverage => Step::new("pytest", ["--cov=./", "--cov-report=xml"]),
            _ => Step::new("pytest", inv.extra_args.iter().cloned()),
        };

        vec![install_reqs, install_project, pytest]
    }

    fn docs_steps(&self, inv: &Invocation) -> Vec<Step> {
        let root = &self.settings.docs_root;
        let mut steps = vec![Step::new("make", ["github"]).in_dir(root).external()];

        if inv.mode.is_interactive() {
            steps.push(Step::new("ls", ["-l"]).in_dir(root).external());
            steps.push(Step::new("bash", ["./dev-server.sh"]).in_dir(root).external());
        }

        steps
    }
}
