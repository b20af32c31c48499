//! bayesmix model configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for every hierarchy and mixing family
//! - Config resolution (explicit path → env → XDG → defaults)
//! - Semantic validation with field-level error messages

pub mod model;
pub mod params;
pub mod resolve;
pub mod validate;

pub use model::{HierarchyConfig, MixingConfig, ModelConfig};
pub use params::{BetaParams, GammaParams, LapNigParams, NggHyperprior, NnigParams};
pub use resolve::{load_model_config, resolve_model_config, ConfigSource, ResolvedPath};
pub use validate::{ValidationError, ValidationResult};

/// Schema version for model configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
