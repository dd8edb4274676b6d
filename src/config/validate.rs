// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, VenvtaskError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = VenvtaskError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.manager, raw.tasks))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_default_tasks(cfg)?;
    validate_manager(cfg)?;
    validate_task_settings(cfg)?;
    Ok(())
}

fn ensure_has_default_tasks(cfg: &RawConfigFile) -> Result<()> {
    // Names are already typed; unknown ones fail during deserialization.
    if cfg.config.default_tasks.is_empty() {
        return Err(VenvtaskError::ConfigError(
            "[config].default_tasks must name at least one task".to_string(),
        ));
    }
    Ok(())
}

fn validate_manager(cfg: &RawConfigFile) -> Result<()> {
    if cfg.manager.program.trim().is_empty() {
        return Err(VenvtaskError::ConfigError(
            "[manager].program must not be empty".to_string(),
        ));
    }

    for (field, template) in [
        ("exists", &cfg.manager.exists),
        ("sync", &cfg.manager.sync),
        ("run", &cfg.manager.run),
    ] {
        if !template.iter().any(|arg| arg.contains("{name}")) {
            return Err(VenvtaskError::ConfigError(format!(
                "[manager].{field} must reference the environment via {{name}}"
            )));
        }
    }

    Ok(())
}

fn validate_task_settings(cfg: &RawConfigFile) -> Result<()> {
    for (field, value) in [
        ("lint_env", &cfg.tasks.lint_env),
        ("test_env", &cfg.tasks.test_env),
        ("docs_root", &cfg.tasks.docs_root),
    ] {
        if value.trim().is_empty() {
            return Err(VenvtaskError::ConfigError(format!(
                "[tasks].{field} must not be empty"
            )));
        }
    }

    for pat in &cfg.tasks.strip_exclude {
        Glob::new(pat).map_err(|e| {
            VenvtaskError::ConfigError(format!(
                "[tasks].strip_exclude has invalid glob '{pat}': {e}"
            ))
        })?;
    }

    Ok(())
}
