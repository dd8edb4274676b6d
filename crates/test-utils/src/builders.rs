#![allow(dead_code)]

use venvtask::config::{ConfigFile, RawConfigFile};
use venvtask::types::TaskName;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_default_tasks(mut self, tasks: &[TaskName]) -> Self {
        self.config.config.default_tasks = tasks.to_vec();
        self
    }

    pub fn with_manager_program(mut self, program: &str) -> Self {
        self.config.manager.program = program.to_string();
        self
    }

    pub fn with_lint_env(mut self, env: &str) -> Self {
        self.config.tasks.lint_env = env.to_string();
        self
    }

    pub fn with_test_env(mut self, env: &str) -> Self {
        self.config.tasks.test_env = env.to_string();
        self
    }

    pub fn with_docs_root(mut self, root: &str) -> Self {
        self.config.tasks.docs_root = root.to_string();
        self
    }

    pub fn with_strip_exclude(mut self, pattern: &str) -> Self {
        self.config.tasks.strip_exclude.push(pattern.to_string());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Existence query output as the manager prints it.
pub fn exists_payload(name: &str, exists: bool) -> String {
    format!(r#"[{{"name": "{name}", "exists": {exists}}}]"#)
}

/// Info query output for `(name, requirements path)` pairs.
pub fn info_payload(entries: &[(&str, &str)]) -> String {
    let items: Vec<String> = entries
        .iter()
        .map(|(name, path)| {
            format!(
                r#"{{"name": "{name}", "discovered_requirements": {{"out_path": "{path}"}}, "system": {{"file_extension": "linux-3.11"}}}}"#
            )
        })
        .collect();
    format!("[{}]", items.join(", "))
}
