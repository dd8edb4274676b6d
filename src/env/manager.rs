// src/env/manager.rs

//! Command templates for the external environment manager.

use crate::config::ManagerSection;
use crate::exec::{CommandLine, CommandSpec};

const NAME_PLACEHOLDER: &str = "{name}";

/// Builds the manager invocations from the `[manager]` templates.
#[derive(Debug, Clone)]
pub struct ManagerCommands {
    program: String,
    exists: Vec<String>,
    sync: Vec<String>,
    info: Vec<String>,
    run: Vec<String>,
}

impl ManagerCommands {
    pub fn from_section(section: &ManagerSection) -> Self {
        Self {
            program: section.program.clone(),
            exists: section.exists.clone(),
            sync: section.sync.clone(),
            info: section.info.clone(),
            run: section.run.clone(),
        }
    }

    /// Existence query. Only stdout is parsed, so manager warnings on
    /// stderr cannot corrupt the answer.
    pub fn exists_query(&self, env: &str) -> CommandSpec {
        CommandSpec::new(CommandLine::program(&self.program, expand(&self.exists, env)))
            .stdout_only()
    }

    pub fn sync(&self, env: &str) -> CommandSpec {
        CommandSpec::new(CommandLine::program(&self.program, expand(&self.sync, env)))
    }

    /// Info query; an empty `envs` asks for the manager's default set.
    pub fn info(&self, envs: &[String]) -> CommandSpec {
        let mut args = self.info.clone();
        args.extend(envs.iter().cloned());
        CommandSpec::new(CommandLine::program(&self.program, args)).stdout_only()
    }

    /// Wrap `line` so it executes inside environment `env`.
    pub fn run_in(&self, env: &str, line: CommandLine) -> CommandLine {
        line.prefixed(&self.program, &expand(&self.run, env))
    }
}

fn expand(template: &[String], env: &str) -> Vec<String> {
    template
        .iter()
        .map(|arg| arg.replace(NAME_PLACEHOLDER, env))
        .collect()
}
