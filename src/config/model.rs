// src/config/model.rs

use serde::Deserialize;

use crate::types::TaskName;

/// Configuration as read from `venvtask.toml`, before validation.
///
/// ```toml
/// [config]
/// default_tasks = ["format", "strip", "lint", "test"]
///
/// [manager]
/// program = "mvenv"
/// exists = ["info", "{name}", "--json"]
/// sync = ["sync", "{name}"]
/// info = ["info", "--json"]
/// run = ["run", "{name}"]
///
/// [tasks]
/// lint_env = "lint"
/// test_env = "test"
/// docs_root = "docsrc"
/// strip_exclude = ["tests/*", "venvs/*"]
/// ```
///
/// Every section is optional; a missing file is the same as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub manager: ManagerSection,

    #[serde(default)]
    pub tasks: TasksSection,
}

/// Validated configuration. Construct through `ConfigFile::try_from`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub manager: ManagerSection,
    pub tasks: TasksSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        manager: ManagerSection,
        tasks: TasksSection,
    ) -> Self {
        Self {
            config,
            manager,
            tasks,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.config, raw.manager, raw.tasks)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Tasks run, in order, when none are named on the command line.
    #[serde(default = "default_tasks")]
    pub default_tasks: Vec<TaskName>,
}

fn default_tasks() -> Vec<TaskName> {
    vec![
        TaskName::Format,
        TaskName::Strip,
        TaskName::Lint,
        TaskName::Test,
    ]
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            default_tasks: default_tasks(),
        }
    }
}

/// `[manager]` section: how to talk to the external environment manager.
///
/// Each argument list is a template; `{name}` is replaced by the
/// environment name.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerSection {
    #[serde(default = "default_program")]
    pub program: String,

    /// Existence query. Expected to print a JSON array whose first element
    /// carries a boolean `exists` field.
    #[serde(default = "default_exists")]
    pub exists: Vec<String>,

    /// Create or sync an environment.
    #[serde(default = "default_sync")]
    pub sync: Vec<String>,

    /// Metadata query; environment names are appended.
    #[serde(default = "default_info")]
    pub info: Vec<String>,

    /// Prefix used to run a step inside an environment.
    #[serde(default = "default_run")]
    pub run: Vec<String>,
}

fn default_program() -> String {
    "mvenv".to_string()
}

fn default_exists() -> Vec<String> {
    strings(&["info", "{name}", "--json"])
}

fn default_sync() -> Vec<String> {
    strings(&["sync", "{name}"])
}

fn default_info() -> Vec<String> {
    strings(&["info", "--json"])
}

fn default_run() -> Vec<String> {
    strings(&["run", "{name}"])
}

impl Default for ManagerSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            exists: default_exists(),
            sync: default_sync(),
            info: default_info(),
            run: default_run(),
        }
    }
}

/// `[tasks]` section: knobs for the built-in task definitions.
#[derive(Debug, Clone, Deserialize)]
pub struct TasksSection {
    /// Environment the lint tools run in.
    #[serde(default = "default_lint_env")]
    pub lint_env: String,

    /// Environment `test` and `test_coverage` install into and run in.
    #[serde(default = "default_test_env")]
    pub test_env: String,

    /// Working directory for the `docs` steps.
    #[serde(default = "default_docs_root")]
    pub docs_root: String,

    /// Paths `strip` must never touch.
    #[serde(default = "default_strip_exclude")]
    pub strip_exclude: Vec<String>,
}

fn default_lint_env() -> String {
    "lint".to_string()
}

fn default_test_env() -> String {
    "test".to_string()
}

fn default_docs_root() -> String {
    "docsrc".to_string()
}

fn default_strip_exclude() -> Vec<String> {
    strings(&[
        "tests/*",
        "venvs/*",
        "build/*",
        "dist/*",
        "*/__init__.py",
        "__init__.py",
    ])
}

impl Default for TasksSection {
    fn default() -> Self {
        Self {
            lint_env: default_lint_env(),
            test_env: default_test_env(),
            docs_root: default_docs_root(),
            strip_exclude: default_strip_exclude(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
