// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VenvtaskError {
    /// A step's child process exited non-zero.
    #[error("command `{command}` failed with exit code {exit_code}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: Vec<u8>,
    },

    /// The environment manager could not sync an environment.
    #[error("provisioning environment '{environment}' failed with exit code {exit_code}")]
    ProvisionFailed {
        environment: String,
        exit_code: i32,
        output: Vec<u8>,
    },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("interrupted")]
    Interrupted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VenvtaskError {
    /// Exit code a failing run should surface for this error.
    ///
    /// Command and provisioning failures keep the child's own code so callers
    /// can tell failure classes apart; a zero or missing code becomes 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            VenvtaskError::CommandFailed { exit_code, .. }
            | VenvtaskError::ProvisionFailed { exit_code, .. } => nonzero(*exit_code),
            VenvtaskError::Interrupted => 130,
            _ => 1,
        }
    }

    /// Captured output attached to the failure, if any.
    pub fn output(&self) -> Option<&[u8]> {
        match self {
            VenvtaskError::CommandFailed { output, .. }
            | VenvtaskError::ProvisionFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}

fn nonzero(code: i32) -> i32 {
    if code == 0 || code == -1 { 1 } else { code }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, VenvtaskError>;
