// src/env/query.rs

//! Parsing of the environment manager's query output.

use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::Result;

/// What an existence query told us about an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    Present,
    Absent,
    /// Neither a clear `true` nor `false`: empty output, malformed JSON or a
    /// failing query. Treated as missing so provisioning is never skipped.
    Ambiguous,
}

impl Existence {
    pub fn is_present(self) -> bool {
        matches!(self, Existence::Present)
    }
}

/// Extract the existence token from a query's output.
///
/// A JSON array yields the textual form of its first element's `exists`
/// field; any other output is used verbatim. The result is trimmed.
pub fn existence_token(output: &str) -> String {
    match serde_json::from_str::<Value>(output) {
        Ok(Value::Array(items)) => match items.first().and_then(|item| item.get("exists")) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        _ => output.trim().to_string(),
    }
}

/// Classify query output. Only the exact token `true` means present.
pub fn parse_existence(output: &str) -> Existence {
    match existence_token(output).as_str() {
        "true" => Existence::Present,
        "false" => Existence::Absent,
        _ => Existence::Ambiguous,
    }
}

/// One entry of the manager's info query.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvInfo {
    pub name: String,
    #[serde(default)]
    pub exists: Option<bool>,
    #[serde(default)]
    pub discovered_requirements: Option<DiscoveredRequirements>,
    #[serde(default)]
    pub system: Option<SystemInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveredRequirements {
    pub out_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemInfo {
    pub file_extension: String,
}

/// Parse the info query's JSON array.
pub fn parse_info(output: &str) -> Result<Vec<EnvInfo>> {
    let infos = serde_json::from_str::<Vec<EnvInfo>>(output.trim())
        .context("parsing environment manager info output")?;
    Ok(infos)
}
