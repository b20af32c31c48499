//! Structured logging for the model core.
//!
//! Library code only emits `tracing` events; the embedding engine decides
//! whether and how they are rendered by calling [`init_logging`] once.
//!
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for batch runs
//!
//! All output goes to stderr.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel, ENV_LOG, ENV_LOG_FILTER, ENV_LOG_FORMAT};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Stable event names carried in the `event` field.
pub mod event_names {
    pub const MODEL_BUILT: &str = "model.built";
    pub const MASS_UPDATED: &str = "mixing.mass_updated";
    pub const MASS_SUBSTITUTED: &str = "mixing.mass_substituted";
    pub const HYPERS_UPDATED: &str = "hierarchy.hypers_updated";
    pub const MH_STEP: &str = "mh.step";
}

/// Initialize the global subscriber.
///
/// Returns `false` when a subscriber was already installed (e.g. by the
/// engine or another test); that is not an error.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_new(config.filter_directives())
        .unwrap_or_else(|_| EnvFilter::new(LogConfig::default().filter_directives()));

    let result = match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    result.is_ok()
}

/// Initialize logging from the environment alone.
pub fn init_default_logging() -> bool {
    init_logging(&LogConfig::from_env(None, None))
}
