// src/tasks/excludes.rs

//! Paths the import stripper must leave alone.

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled exclusion globs plus their source text.
///
/// The source text is handed to the stripping tool itself; the compiled set
/// filters explicitly requested targets before the tool ever sees them.
#[derive(Clone)]
pub struct ExcludeSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for ExcludeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl ExcludeSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
            builder.add(glob);
        }
        Ok(Self {
            patterns: patterns.to_vec(),
            set: builder.build()?,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Comma-joined form accepted by `--exclude`.
    pub fn joined(&self) -> String {
        self.patterns.join(",")
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        let normalized = normalize(path);
        !normalized.is_empty() && self.set.is_match(normalized.as_str())
    }

    /// Keep only targets that are not excluded, preserving order.
    pub fn filter_targets(&self, targets: &[String]) -> Vec<String> {
        targets
            .iter()
            .filter(|t| !self.is_excluded(t))
            .cloned()
            .collect()
    }
}

/// `./src/a.py` and `src\a.py` both become `src/a.py`; `.` becomes empty.
fn normalize(path: &str) -> String {
    let forward = path.replace('\\', "/");
    let mut trimmed = forward.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    if trimmed == "." {
        return String::new();
    }
    trimmed.trim_end_matches('/').to_string()
}
