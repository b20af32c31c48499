//! Per-family parameter structs.
//!
//! These are both the on-disk configuration shape and the hyperparameter
//! types the hierarchies operate on. Each converts to and from the ordered
//! tuple layout used by trace recorders (`to_vec` / `TryFrom<&[f64]>`).

use bmx_common::Error;
use serde::{Deserialize, Serialize};

fn check_len(family: &str, values: &[f64], expected: usize) -> Result<(), Error> {
    if values.len() != expected {
        return Err(Error::invalid_parameter(
            family,
            format!("expected {} values, got {}", expected, values.len()),
        ));
    }
    Ok(())
}

/// Normal-InverseGamma centering parameters `(μ0, λ0, α0, β0)`.
///
/// `(μ, σ²) ~ NIG(μ0, λ0, α0, β0)` means `σ² ~ IG(α0, β0)` and
/// `μ | σ² ~ N(μ0, σ²/λ0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NnigParams {
    pub mean: f64,
    pub var_scaling: f64,
    pub shape: f64,
    pub scale: f64,
}

impl NnigParams {
    pub const LEN: usize = 4;

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.mean, self.var_scaling, self.shape, self.scale]
    }

    /// Weakly informative defaults centred on the data (Fraley & Raftery,
    /// 2007): `μ0 = mean(y)`, `λ0 = 0.01`, `α0 = 3` and
    /// `β0 = var(y) / exp_num_clusters`, with the population variance.
    pub fn from_data(y: &[f64], exp_num_clusters: usize) -> Result<Self, Error> {
        if y.is_empty() {
            return Err(Error::invalid_parameter("y", "at least one value is required"));
        }
        if exp_num_clusters == 0 {
            return Err(Error::invalid_parameter("exp_num_clusters", "must be > 0"));
        }
        let n = y.len() as f64;
        let mean = y.iter().sum::<f64>() / n;
        let var = y.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        if !(var.is_finite() && var > 0.0) {
            return Err(Error::invalid_parameter(
                "y",
                format!("variance must be finite and > 0, got {}", var),
            ));
        }
        Ok(Self {
            mean,
            var_scaling: 0.01,
            shape: 3.0,
            scale: var / exp_num_clusters as f64,
        })
    }
}

impl Default for NnigParams {
    fn default() -> Self {
        Self {
            mean: 1.0,
            var_scaling: 1.0,
            shape: 1.0,
            scale: 1.0,
        }
    }
}

impl TryFrom<&[f64]> for NnigParams {
    type Error = Error;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        check_len("normal_nig", values, Self::LEN)?;
        Ok(Self {
            mean: values[0],
            var_scaling: values[1],
            shape: values[2],
            scale: values[3],
        })
    }
}

/// Normal-Gamma-Gamma hyperprior on `(μ0, λ0, β0)` with `α0` held fixed:
///
/// ```text
/// μ0 ~ N(mean_mean, mean_var)
/// λ0 ~ Gamma(var_scaling_shape, var_scaling_rate)
/// β0 ~ Gamma(scale_shape, scale_rate)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NggHyperprior {
    pub mean_mean: f64,
    pub mean_var: f64,
    pub var_scaling_shape: f64,
    pub var_scaling_rate: f64,
    pub scale_shape: f64,
    pub scale_rate: f64,
    /// Fixed α0.
    pub shape: f64,
}

impl NggHyperprior {
    /// Starting hyperparameters: the hyperprior means, with the fixed shape.
    pub fn initial_params(&self) -> NnigParams {
        NnigParams {
            mean: self.mean_mean,
            var_scaling: self.var_scaling_shape / self.var_scaling_rate,
            shape: self.shape,
            scale: self.scale_shape / self.scale_rate,
        }
    }
}

impl Default for NggHyperprior {
    fn default() -> Self {
        Self {
            mean_mean: 1.0,
            mean_var: 2.25,
            var_scaling_shape: 0.2,
            var_scaling_rate: 0.6,
            scale_shape: 4.0,
            scale_rate: 2.0,
            shape: 1.5,
        }
    }
}

/// Laplace likelihood with independent Normal / InverseGamma priors on
/// location and scale, plus the random-walk proposal variances used on
/// `(location, ln scale)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LapNigParams {
    pub mean: f64,
    pub var: f64,
    pub shape: f64,
    pub scale: f64,
    pub mh_mean_var: f64,
    pub mh_log_scale_var: f64,
}

impl LapNigParams {
    pub const LEN: usize = 6;

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.mean,
            self.var,
            self.shape,
            self.scale,
            self.mh_mean_var,
            self.mh_log_scale_var,
        ]
    }
}

impl Default for LapNigParams {
    fn default() -> Self {
        Self {
            mean: 0.0,
            var: 10.0,
            shape: 2.0,
            scale: 1.0,
            mh_mean_var: 10.0,
            mh_log_scale_var: 1.0,
        }
    }
}

impl TryFrom<&[f64]> for LapNigParams {
    type Error = Error;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        check_len("laplace_nig", values, Self::LEN)?;
        Ok(Self {
            mean: values[0],
            var: values[1],
            shape: values[2],
            scale: values[3],
            mh_mean_var: values[4],
            mh_log_scale_var: values[5],
        })
    }
}

/// Gamma distribution parameters: Gamma(shape, rate).
/// Note: uses RATE parameterization (rate = 1/scale).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaParams {
    pub shape: f64,
    pub rate: f64,
}

impl GammaParams {
    pub fn mean(&self) -> f64 {
        self.shape / self.rate
    }
}

/// Beta distribution parameters: Beta(alpha, beta).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaParams {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaParams {
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nnig_tuple_layout() {
        let p = NnigParams {
            mean: 0.5,
            var_scaling: 2.0,
            shape: 3.0,
            scale: 4.0,
        };
        assert_eq!(p.to_vec(), vec![0.5, 2.0, 3.0, 4.0]);
        assert_eq!(NnigParams::try_from(p.to_vec().as_slice()).unwrap(), p);
    }

    #[test]
    fn nnig_defaults_from_data() {
        let y = [1.0, 2.0, 3.0, 4.0, 5.0];
        let p = NnigParams::from_data(&y, 5).unwrap();
        assert_eq!(p.mean, 3.0);
        assert_eq!(p.var_scaling, 0.01);
        assert_eq!(p.shape, 3.0);
        // Population variance 2.0, spread over five clusters.
        assert!((p.scale - 0.4).abs() < 1e-12);
        assert!((NnigParams::from_data(&y, 1).unwrap().scale - 2.0).abs() < 1e-12);
    }

    #[test]
    fn nnig_defaults_from_data_reject_degenerate_input() {
        assert!(matches!(
            NnigParams::from_data(&[], 5),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            NnigParams::from_data(&[1.0, 2.0], 0),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(NnigParams::from_data(&[4.0, 4.0, 4.0], 5).is_err());
        assert!(NnigParams::from_data(&[1.0, f64::NAN], 5).is_err());
    }

    #[test]
    fn mismatched_length_is_rejected() {
        let err = NnigParams::try_from([1.0, 2.0, 3.0].as_slice()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
        assert!(LapNigParams::try_from([0.0; 4].as_slice()).is_err());
    }

    #[test]
    fn ngg_initial_params_are_hyperprior_means() {
        let init = NggHyperprior::default().initial_params();
        assert_eq!(init.mean, 1.0);
        assert!((init.var_scaling - 0.2 / 0.6).abs() < 1e-12);
        assert_eq!(init.shape, 1.5);
        assert_eq!(init.scale, 2.0);
    }

    #[test]
    fn lapnig_defaults() {
        assert_eq!(
            LapNigParams::default().to_vec(),
            vec![0.0, 10.0, 2.0, 1.0, 10.0, 1.0]
        );
    }
}
