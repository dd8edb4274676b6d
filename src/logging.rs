// src/logging.rs

//! Diagnostics for `venvtask`, via `tracing` + `tracing-subscriber`.
//!
//! Step output is mirrored byte-for-byte to stdout while a step runs, so
//! every log line goes to stderr and never interleaves with tool output
//! that a caller may be piping.
//!
//! The filter is `--log-level` when given. Otherwise `VENVTASK_LOG` is read
//! as an `EnvFilter` directive string (`debug`, `venvtask::env=trace`, ...).
//! The fallback is `info`.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "VENVTASK_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env_value.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(directive(level));
    }

    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => EnvFilter::try_new(value).unwrap_or_else(|e| {
            eprintln!("venvtask: ignoring invalid {LOG_ENV}={value:?}: {e}");
            EnvFilter::new(DEFAULT_DIRECTIVE)
        }),
        None => EnvFilter::new(DEFAULT_DIRECTIVE),
    }
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    fn max_level(filter: EnvFilter) -> Option<LevelFilter> {
        filter.max_level_hint()
    }

    #[test]
    fn cli_level_beats_environment() {
        let filter = build_filter(Some(LogLevel::Warn), Some("trace"));
        assert_eq!(max_level(filter), Some(LevelFilter::WARN));
    }

    #[test]
    fn environment_accepts_per_module_directives() {
        let filter = build_filter(None, Some("venvtask::env=debug"));
        assert_eq!(max_level(filter), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn blank_or_invalid_environment_falls_back_to_info() {
        assert_eq!(max_level(build_filter(None, Some("  "))), Some(LevelFilter::INFO));
        assert_eq!(max_level(build_filter(None, Some("venvtask=loud"))), Some(LevelFilter::INFO));
        assert_eq!(max_level(build_filter(None, None)), Some(LevelFilter::INFO));
    }
}
