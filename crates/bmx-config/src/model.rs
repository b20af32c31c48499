//! Model configuration: which hierarchy and which mixing process to build.
//!
//! Families are selected by a tag inside the config document rather than by
//! a process-wide name, e.g.
//!
//! ```json
//! {
//!   "schema_version": "1.0.0",
//!   "hierarchy": { "family": "normal_nig", "params": { "mean": 0.0, "var_scaling": 0.1, "shape": 2.0, "scale": 2.0 } },
//!   "mixing": { "process": "dirichlet", "total_mass": 1.0 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::params::{BetaParams, GammaParams, LapNigParams, NggHyperprior, NnigParams};
use crate::validate::ValidationError;

/// Complete model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    pub hierarchy: HierarchyConfig,

    pub mixing: MixingConfig,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

/// Hierarchy family and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum HierarchyConfig {
    /// Conjugate Normal likelihood with Normal-InverseGamma centering.
    ///
    /// Without `params` the starting hyperparameters are the defaults, or
    /// the hyperprior means when a hyperprior is present.
    NormalNig {
        #[serde(default)]
        params: Option<NnigParams>,
        #[serde(default)]
        hyperprior: Option<NggHyperprior>,
    },

    /// Non-conjugate Laplace likelihood with Normal / InverseGamma priors.
    LaplaceNig {
        #[serde(default)]
        params: Option<LapNigParams>,
    },
}

impl HierarchyConfig {
    /// Registry identifier of the family.
    pub fn identifier(&self) -> &'static str {
        match self {
            HierarchyConfig::NormalNig { .. } => "normal_nig",
            HierarchyConfig::LaplaceNig { .. } => "laplace_nig",
        }
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        HierarchyConfig::NormalNig {
            params: None,
            hyperprior: None,
        }
    }
}

/// Mixing process and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "process", rename_all = "snake_case")]
pub enum MixingConfig {
    /// Dirichlet process; exactly one of `total_mass` and
    /// `total_mass_prior` must be set.
    Dirichlet {
        #[serde(default)]
        total_mass: Option<f64>,
        #[serde(default)]
        total_mass_prior: Option<GammaParams>,
    },

    /// Pitman–Yor process with `strength > 0` and `discount ∈ (0, 1)`.
    PitmanYor { strength: f64, discount: f64 },

    /// Truncated stick-breaking with one Beta law per component. The last
    /// component takes the remaining stick.
    StickBreaking {
        sticks: Vec<BetaParams>,
        #[serde(default = "default_mc_iterations")]
        mc_iterations: usize,
        #[serde(default)]
        mc_seed: u64,
    },
}

fn default_mc_iterations() -> usize {
    10_000
}

impl MixingConfig {
    /// Registry identifier of the process.
    pub fn identifier(&self) -> &'static str {
        match self {
            MixingConfig::Dirichlet { .. } => "dirichlet",
            MixingConfig::PitmanYor { .. } => "pitman_yor",
            MixingConfig::StickBreaking { .. } => "stick_breaking",
        }
    }
}

impl Default for MixingConfig {
    fn default() -> Self {
        MixingConfig::Dirichlet {
            total_mass: Some(1.0),
            total_mass_prior: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            description: None,
            hierarchy: HierarchyConfig::default(),
            mixing: MixingConfig::default(),
        }
    }
}

impl ModelConfig {
    /// Load a model config from a JSON or TOML file (chosen by extension).
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Parse a model config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Parse a model config from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ValidationError> {
        toml::from_str(text)
            .map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ValidationError::ParseError(format!("Cannot serialize: {}", e)))
    }
}
