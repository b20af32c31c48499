//! Configuration validation errors and semantic validation.
//!
//! Validation fails fast and never clamps: an out-of-range value is
//! reported with its dotted field path.

use bmx_common::Error;
use thiserror::Error;

use crate::model::{HierarchyConfig, MixingConfig, ModelConfig};
use crate::params::{BetaParams, GammaParams, LapNigParams, NggHyperprior, NnigParams};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue { field, message } => {
                Error::InvalidParameter { field, message }
            }
            other => Error::Config(other.to_string()),
        }
    }
}

fn invalid(field: &str, message: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message,
    }
}

/// Value must be finite.
pub fn require_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(invalid(field, format!("Must be finite, got {}", value)));
    }
    Ok(())
}

/// Value must be finite and strictly positive.
pub fn require_positive(field: &str, value: f64) -> ValidationResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(field, format!("Must be > 0, got {}", value)));
    }
    Ok(())
}

/// Validate a complete model configuration.
pub fn validate_model(config: &ModelConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }
    validate_hierarchy(&config.hierarchy)?;
    validate_mixing(&config.mixing)
}

/// Validate a hierarchy configuration.
pub fn validate_hierarchy(config: &HierarchyConfig) -> ValidationResult<()> {
    match config {
        HierarchyConfig::NormalNig { params, hyperprior } => {
            if let Some(p) = params {
                validate_nnig_params("hierarchy.params", p)?;
            }
            if let Some(h) = hyperprior {
                validate_ngg_hyperprior("hierarchy.hyperprior", h)?;
            }
            Ok(())
        }
        HierarchyConfig::LaplaceNig { params } => match params {
            Some(p) => validate_lapnig_params("hierarchy.params", p),
            None => Ok(()),
        },
    }
}

/// Validate a mixing configuration.
pub fn validate_mixing(config: &MixingConfig) -> ValidationResult<()> {
    match config {
        MixingConfig::Dirichlet {
            total_mass,
            total_mass_prior,
        } => match (total_mass, total_mass_prior) {
            (Some(mass), None) => require_positive("mixing.total_mass", *mass),
            (None, Some(prior)) => validate_gamma_params("mixing.total_mass_prior", prior),
            _ => Err(invalid(
                "mixing.total_mass",
                "Exactly one of total_mass and total_mass_prior must be set".to_string(),
            )),
        },
        MixingConfig::PitmanYor { strength, discount } => {
            require_positive("mixing.strength", *strength)?;
            if !(*discount > 0.0 && *discount < 1.0) {
                return Err(invalid(
                    "mixing.discount",
                    format!("Must be in (0, 1), got {}", discount),
                ));
            }
            Ok(())
        }
        MixingConfig::StickBreaking {
            sticks,
            mc_iterations,
            ..
        } => {
            if sticks.is_empty() {
                return Err(invalid(
                    "mixing.sticks",
                    "At least one component is required".to_string(),
                ));
            }
            for (i, stick) in sticks.iter().enumerate() {
                validate_beta_params(&format!("mixing.sticks[{}]", i), stick)?;
            }
            if *mc_iterations == 0 {
                return Err(invalid(
                    "mixing.mc_iterations",
                    "Must be > 0".to_string(),
                ));
            }
            Ok(())
        }
    }
}

/// Validate Normal-InverseGamma parameters.
pub fn validate_nnig_params(name: &str, params: &NnigParams) -> ValidationResult<()> {
    require_finite(&format!("{}.mean", name), params.mean)?;
    require_positive(&format!("{}.var_scaling", name), params.var_scaling)?;
    require_positive(&format!("{}.shape", name), params.shape)?;
    require_positive(&format!("{}.scale", name), params.scale)
}

/// Validate a Normal-Gamma-Gamma hyperprior.
pub fn validate_ngg_hyperprior(name: &str, prior: &NggHyperprior) -> ValidationResult<()> {
    require_finite(&format!("{}.mean_mean", name), prior.mean_mean)?;
    require_positive(&format!("{}.mean_var", name), prior.mean_var)?;
    require_positive(&format!("{}.var_scaling_shape", name), prior.var_scaling_shape)?;
    require_positive(&format!("{}.var_scaling_rate", name), prior.var_scaling_rate)?;
    require_positive(&format!("{}.scale_shape", name), prior.scale_shape)?;
    require_positive(&format!("{}.scale_rate", name), prior.scale_rate)?;
    require_positive(&format!("{}.shape", name), prior.shape)
}

/// Validate Laplace-NIG parameters, including the proposal variances.
pub fn validate_lapnig_params(name: &str, params: &LapNigParams) -> ValidationResult<()> {
    require_finite(&format!("{}.mean", name), params.mean)?;
    require_positive(&format!("{}.var", name), params.var)?;
    require_positive(&format!("{}.shape", name), params.shape)?;
    require_positive(&format!("{}.scale", name), params.scale)?;
    require_positive(&format!("{}.mh_mean_var", name), params.mh_mean_var)?;
    require_positive(&format!("{}.mh_log_scale_var", name), params.mh_log_scale_var)
}

/// Validate Gamma(shape, rate) parameters.
pub fn validate_gamma_params(name: &str, params: &GammaParams) -> ValidationResult<()> {
    require_positive(&format!("{}.shape", name), params.shape)?;
    require_positive(&format!("{}.rate", name), params.rate)
}

/// Validate Beta(alpha, beta) parameters.
pub fn validate_beta_params(name: &str, params: &BetaParams) -> ValidationResult<()> {
    require_positive(&format!("{}.alpha", name), params.alpha)?;
    require_positive(&format!("{}.beta", name), params.beta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_valid() {
        validate_model(&ModelConfig::default()).unwrap();
    }

    #[test]
    fn dirichlet_requires_exactly_one_mass_source() {
        let both = MixingConfig::Dirichlet {
            total_mass: Some(1.0),
            total_mass_prior: Some(GammaParams {
                shape: 1.0,
                rate: 1.0,
            }),
        };
        assert!(validate_mixing(&both).is_err());

        let neither = MixingConfig::Dirichlet {
            total_mass: None,
            total_mass_prior: None,
        };
        assert!(validate_mixing(&neither).is_err());
    }

    #[test]
    fn pitman_yor_bounds() {
        let bad_discount = MixingConfig::PitmanYor {
            strength: 1.0,
            discount: 1.0,
        };
        match validate_mixing(&bad_discount) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "mixing.discount")
            }
            other => panic!("expected invalid discount, got {:?}", other),
        }
        let bad_strength = MixingConfig::PitmanYor {
            strength: 0.0,
            discount: 0.5,
        };
        assert!(validate_mixing(&bad_strength).is_err());
    }

    #[test]
    fn stick_breaking_checks_every_component() {
        let config = MixingConfig::StickBreaking {
            sticks: vec![
                BetaParams {
                    alpha: 1.0,
                    beta: 1.0,
                },
                BetaParams {
                    alpha: 1.0,
                    beta: -2.0,
                },
            ],
            mc_iterations: 10,
            mc_seed: 0,
        };
        match validate_mixing(&config) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "mixing.sticks[1].beta")
            }
            other => panic!("expected invalid stick, got {:?}", other),
        }
    }

    #[test]
    fn nan_is_rejected() {
        let params = NnigParams {
            shape: f64::NAN,
            ..NnigParams::default()
        };
        assert!(validate_nnig_params("p", &params).is_err());
    }

    #[test]
    fn version_mismatch() {
        let config = ModelConfig {
            schema_version: "0.9.0".into(),
            ..ModelConfig::default()
        };
        assert!(matches!(
            validate_model(&config),
            Err(ValidationError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn converts_into_common_error() {
        let err: Error = invalid("mixing.strength", "Must be > 0".into()).into();
        assert_eq!(err.code(), 10);
        let err: Error = ValidationError::ParseError("x".into()).into();
        assert_eq!(err.code(), 11);
    }
}
