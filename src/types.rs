use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Whether tasks may rewrite files or must only verify them.
///
/// - `Fix`: interactive use; formatters and strippers edit files in place and
///   auxiliary steps (like the docs dev server) run.
/// - `Check`: automated use; every step is verification-only and nothing on
///   disk is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Fix,
    Check,
}

impl Mode {
    pub fn is_interactive(self) -> bool {
        matches!(self, Mode::Fix)
    }

    /// Pick a mode from the invoking terminal.
    ///
    /// A non-empty `CI` variable always means `Check`; otherwise an
    /// interactive stdin means `Fix`.
    pub fn detect(ci_var: Option<&str>, stdin_is_terminal: bool) -> Self {
        match ci_var {
            Some(v) if !v.trim().is_empty() => Mode::Check,
            _ if stdin_is_terminal => Mode::Fix,
            _ => Mode::Check,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Fix => f.write_str("fix"),
            Mode::Check => f.write_str("check"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fix" => Ok(Mode::Fix),
            "check" => Ok(Mode::Check),
            other => Err(format!("invalid mode: {other} (expected \"fix\" or \"check\")")),
        }
    }
}

/// Names of the tasks `venvtask` knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum TaskName {
    Format,
    Strip,
    Lint,
    Test,
    TestCoverage,
    Docs,
}

impl TaskName {
    pub const ALL: [TaskName; 6] = [
        TaskName::Format,
        TaskName::Strip,
        TaskName::Lint,
        TaskName::Test,
        TaskName::TestCoverage,
        TaskName::Docs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskName::Format => "format",
            TaskName::Strip => "strip",
            TaskName::Lint => "lint",
            TaskName::Test => "test",
            TaskName::TestCoverage => "test_coverage",
            TaskName::Docs => "docs",
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TaskName::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted || (wanted == "test-coverage" && *t == TaskName::TestCoverage))
            .ok_or_else(|| format!("unknown task: {wanted}"))
    }
}

impl TryFrom<String> for TaskName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ci_variable_forces_check_mode() {
        assert_eq!(Mode::detect(Some("true"), true), Mode::Check);
        assert_eq!(Mode::detect(Some(""), true), Mode::Fix);
        assert_eq!(Mode::detect(None, false), Mode::Check);
    }

    #[test]
    fn task_names_round_trip_through_strings() {
        for t in TaskName::ALL {
            assert_eq!(t.as_str().parse::<TaskName>(), Ok(t));
        }
        assert_eq!("test-coverage".parse::<TaskName>(), Ok(TaskName::TestCoverage));
        assert!("deploy".parse::<TaskName>().is_err());
    }
}
