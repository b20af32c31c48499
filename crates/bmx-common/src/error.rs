//! Error types for the bayesmix model core.
//!
//! Every variant carries a stable numeric code, a category and a
//! recoverability hint for the sampling engine that drives the core.
//!
//! Degenerate clusters (cardinality zero) are not errors: hierarchies fall
//! back to prior behavior and never surface them.
//!
//! [`StructuredError`] is the JSON form handed to the engine:
//! ```json
//! {
//!   "code": 10,
//!   "category": "parameter",
//!   "message": "invalid parameter discount: must be in (0, 1), got 1.2",
//!   "recoverable": false,
//!   "context": { "field": "discount" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias for model-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Constructor-time parameter validation.
    Parameter,
    /// Configuration loading and parsing.
    Config,
    /// Sampling and numerical errors raised during a sweep.
    Inference,
    /// File I/O.
    Io,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Parameter => "parameter",
            ErrorCategory::Config => "config",
            ErrorCategory::Inference => "inference",
            ErrorCategory::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    // Parameter and configuration errors (10-19)
    #[error("invalid parameter {field}: {message}")]
    InvalidParameter { field: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    // Inference errors (30-39)
    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    #[error("{operation} is not supported by {model}")]
    Unsupported {
        model: &'static str,
        operation: &'static str,
    },

    #[error("datum {value} is not assigned to this cluster")]
    MissingDatum { value: f64 },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid_parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable code: 10s parameters and config, 30s sampling, 60s I/O.
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidParameter { .. } => 10,
            Error::Config(_) => 11,
            Error::NumericalInstability(_) => 30,
            Error::Unsupported { .. } => 31,
            Error::MissingDatum { .. } => 32,
            Error::Io(_) => 60,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidParameter { .. } => ErrorCategory::Parameter,
            Error::Config(_) => ErrorCategory::Config,
            Error::NumericalInstability(_) | Error::Unsupported { .. } | Error::MissingDatum { .. } => {
                ErrorCategory::Inference
            }
            Error::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether the engine may retry, e.g. with a fresh random stream or a
    /// corrected config file. The core itself never retries.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::NumericalInstability(_) | Error::Io(_)
        )
    }
}

/// Engine-facing JSON form of an [`Error`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub recoverable: bool,
    /// Offending field, model/operation pair or datum; keys sorted.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let pairs: Vec<(&str, serde_json::Value)> = match err {
            Error::InvalidParameter { field, .. } => vec![("field", field.as_str().into())],
            Error::Unsupported { model, operation } => vec![
                ("model", (*model).into()),
                ("operation", (*operation).into()),
            ],
            Error::MissingDatum { value } => vec![("value", serde_json::json!(value))],
            _ => Vec::new(),
        };
        let context = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Attach engine-side context such as the sweep index.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}
