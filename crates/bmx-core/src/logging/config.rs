//! Logging configuration for an embedding engine.
//!
//! Resolution order, later wins:
//! 1. Defaults (human format, `info`)
//! 2. `RUST_LOG` directives aimed at the `bmx_*` crates, or a bare level
//! 3. `BMX_LOG` / `BMX_LOG_FORMAT`
//! 4. Explicit overrides passed to [`LogConfig::from_env`]
//!
//! `BMX_LOG_FILTER` bypasses the level entirely with a full `EnvFilter`
//! directive string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;

pub const ENV_LOG: &str = "BMX_LOG";
pub const ENV_LOG_FORMAT: &str = "BMX_LOG_FORMAT";
pub const ENV_LOG_FILTER: &str = "BMX_LOG_FILTER";
const ENV_RUST_LOG: &str = "RUST_LOG";

/// Target prefix shared by every crate of the workspace.
const TARGET_PREFIX: &str = "bmx_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Console lines on stderr.
    #[default]
    Human,
    /// One JSON object per event, for batch sampling runs.
    Jsonl,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "pretty" | "text" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbosity. `Trace` includes one event per Metropolis step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const ALL: [LogLevel; 6] = [
        LogLevel::Off,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// `None` for `Off`.
    pub fn as_tracing(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let canonical = match name.as_str() {
            "warning" => "warn",
            "none" | "quiet" => "off",
            other => other,
        };
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == canonical)
            .ok_or_else(|| format!("unknown log level '{}'", name))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        LevelFilter::from(level.as_tracing())
    }
}

/// Level for the `bmx_*` targets from a `RUST_LOG` value.
///
/// A directive naming a `bmx_*` target wins over a bare level; directives
/// for other crates and unparsable levels are ignored.
fn level_from_rust_log(value: &str) -> Option<LogLevel> {
    let mut bare = None;
    let mut targeted = None;
    for directive in value.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        match directive.split_once('=') {
            Some((target, level)) if target.starts_with(TARGET_PREFIX) => {
                if let Ok(level) = level.parse() {
                    targeted = Some(level);
                }
            }
            Some(_) => {}
            None => {
                if let Ok(level) = directive.parse() {
                    bare = Some(level);
                }
            }
        }
    }
    targeted.or(bare)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Timestamps on human output.
    pub timestamps: bool,
    /// Full `EnvFilter` directives; replaces the level-based filter.
    pub directives: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
            directives: None,
        }
    }
}

impl LogConfig {
    /// Read the process environment, then apply the explicit overrides.
    pub fn from_env(level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), level, format)
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        level: Option<LogLevel>,
        format: Option<LogFormat>,
    ) -> Self {
        let env_level = lookup(ENV_LOG)
            .and_then(|v| v.parse().ok())
            .or_else(|| lookup(ENV_RUST_LOG).and_then(|v| level_from_rust_log(&v)));
        let env_format = lookup(ENV_LOG_FORMAT).and_then(|v| v.parse().ok());
        let defaults = LogConfig::default();

        LogConfig {
            format: format.or(env_format).unwrap_or(defaults.format),
            level: level.or(env_level).unwrap_or(defaults.level),
            timestamps: defaults.timestamps,
            directives: lookup(ENV_LOG_FILTER).filter(|d| !d.trim().is_empty()),
        }
    }

    /// Directive string for the subscriber's `EnvFilter`.
    pub fn filter_directives(&self) -> String {
        self.directives.clone().unwrap_or_else(|| {
            format!(
                "bmx_core={level},bmx_config={level}",
                level = self.level
            )
        })
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }
}
