// src/env/registry.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::{Result, VenvtaskError};
use crate::exec::CommandRunner;

use super::manager::ManagerCommands;
use super::query::{parse_existence, parse_info, EnvInfo, Existence};

/// Lifecycle of a named environment within one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvState {
    Unknown,
    CheckedMissing,
    CheckedPresent,
    Provisioning,
    Ready,
}

/// Checks, provisions and describes environments through the manager.
///
/// States are recorded for diagnostics only: every `ensure_ready` call
/// re-queries the manager, since earlier steps may have changed things on
/// disk.
pub struct EnvironmentRegistry<R: CommandRunner> {
    runner: Arc<R>,
    manager: ManagerCommands,
    states: BTreeMap<String, EnvState>,
}

impl<R: CommandRunner> EnvironmentRegistry<R> {
    pub fn new(runner: Arc<R>, manager: ManagerCommands) -> Self {
        Self {
            runner,
            manager,
            states: BTreeMap::new(),
        }
    }

    pub fn manager(&self) -> &ManagerCommands {
        &self.manager
    }

    /// Last observed state of `env` (`Unknown` if never touched).
    pub fn state(&self, env: &str) -> EnvState {
        self.states.get(env).copied().unwrap_or(EnvState::Unknown)
    }

    /// Run the existence query and classify its answer.
    ///
    /// A failing query is `Ambiguous`, not an error; only an interrupt
    /// propagates.
    pub async fn probe(&mut self, env: &str) -> Result<Existence> {
        let spec = self.manager.exists_query(env);
        let existence = match self.runner.run(&spec, false).await {
            Ok(result) => parse_existence(&result.output_lossy()),
            Err(VenvtaskError::Interrupted) => return Err(VenvtaskError::Interrupted),
            Err(err) => {
                warn!(env, error = %err, "existence query failed");
                Existence::Ambiguous
            }
        };

        let state = if existence.is_present() {
            EnvState::CheckedPresent
        } else {
            EnvState::CheckedMissing
        };
        self.states.insert(env.to_string(), state);
        debug!(env, ?existence, "probed environment");

        Ok(existence)
    }

    pub async fn exists(&mut self, env: &str) -> Result<bool> {
        Ok(self.probe(env).await?.is_present())
    }

    /// Make sure `env` exists, syncing it through the manager if it does not.
    ///
    /// A no-op when the environment is already present.
    pub async fn ensure_ready(&mut self, env: &str) -> Result<()> {
        match self.probe(env).await? {
            Existence::Present => {
                debug!(env, "environment already present");
            }
            existence => {
                if existence == Existence::Ambiguous {
                    warn!(env, "existence query was inconclusive; provisioning anyway");
                }
                self.provision(env).await?;
            }
        }

        self.states.insert(env.to_string(), EnvState::Ready);
        Ok(())
    }

    async fn provision(&mut self, env: &str) -> Result<()> {
        info!(env, "provisioning environment");
        self.states.insert(env.to_string(), EnvState::Provisioning);

        let spec = self.manager.sync(env);
        match self.runner.run(&spec, false).await {
            Ok(_) => {
                info!(env, "environment provisioned");
                Ok(())
            }
            Err(VenvtaskError::CommandFailed {
                exit_code, output, ..
            }) => {
                self.states.insert(env.to_string(), EnvState::CheckedMissing);
                Err(VenvtaskError::ProvisionFailed {
                    environment: env.to_string(),
                    exit_code,
                    output,
                })
            }
            Err(err) => {
                self.states.insert(env.to_string(), EnvState::CheckedMissing);
                Err(err)
            }
        }
    }

    /// Ask the manager for metadata. An empty `envs` means the default set.
    pub async fn info(&self, envs: &[String]) -> Result<Vec<EnvInfo>> {
        let spec = self.manager.info(envs);
        let result = self.runner.run(&spec, false).await?;
        parse_info(&result.output_lossy())
    }

    /// Requirements output path per environment.
    ///
    /// Read-only; safe to call before `ensure_ready`.
    pub async fn resolve_requirements_paths(
        &self,
        envs: &[String],
    ) -> Result<BTreeMap<String, PathBuf>> {
        let paths = self
            .info(envs)
            .await?
            .into_iter()
            .filter_map(|info| {
                info.discovered_requirements
                    .map(|reqs| (info.name, reqs.out_path))
            })
            .collect();
        Ok(paths)
    }

    /// Platform suffix the manager uses for requirement files.
    pub async fn resolve_file_extension(&self, envs: &[String]) -> Result<Option<String>> {
        Ok(self
            .info(envs)
            .await?
            .into_iter()
            .find_map(|info| info.system.map(|s| s.file_extension)))
    }

    /// Environment names the manager's project config defines.
    pub async fn defined_environments(&self) -> Result<Vec<String>> {
        Ok(self.info(&[]).await?.into_iter().map(|i| i.name).collect())
    }
}

/// Comma-separated summary of resolved paths, in map order.
pub fn join_paths(paths: &BTreeMap<String, PathBuf>) -> String {
    paths
        .values()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
