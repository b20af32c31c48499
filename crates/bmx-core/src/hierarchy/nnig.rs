//! Normal likelihood with Normal-InverseGamma centering (conjugate).
//!
//! ```text
//! x | μ, σ²  ~ N(μ, σ²)
//! σ²         ~ IG(α0, β0)
//! μ | σ²     ~ N(μ0, σ²/λ0)
//! ```
//!
//! Optionally `(μ0, λ0, β0)` carry a Normal-Gamma-Gamma hyperprior with
//! `α0` fixed, resampled once per sweep from the pooled cluster states.

use bmx_common::{Error, Result};
use bmx_config::validate::{validate_ngg_hyperprior, validate_nnig_params};
use bmx_config::{NggHyperprior, NnigParams};
use bmx_math::{normal_log_pdf, sampling, student_t_log_pdf};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{conjugate_update, ClusterData, ConjugateHierarchy, Hierarchy};
use crate::logging::event_names;

/// Cluster parameters `(μ, σ²)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalState {
    pub mean: f64,
    pub var: f64,
}

impl NormalState {
    pub const LEN: usize = 2;

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.mean, self.var]
    }
}

impl TryFrom<&[f64]> for NormalState {
    type Error = Error;

    fn try_from(values: &[f64]) -> Result<Self> {
        match values {
            [mean, var] => Ok(Self {
                mean: *mean,
                var: *var,
            }),
            _ => Err(Error::invalid_parameter(
                "normal_state",
                format!("expected {} values, got {}", Self::LEN, values.len()),
            )),
        }
    }
}

/// Running sum and sum of squares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalStats {
    pub sum: f64,
    pub sum_squares: f64,
}

/// Normal / Normal-InverseGamma hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct NnigHierarchy {
    initial: NnigParams,
    hyperprior: Option<NggHyperprior>,
}

impl Default for NnigHierarchy {
    fn default() -> Self {
        Self {
            initial: NnigParams::default(),
            hyperprior: None,
        }
    }
}

impl NnigHierarchy {
    /// Fixed hyperparameters.
    pub fn new(params: NnigParams) -> Result<Self> {
        validate_nnig_params("normal_nig", &params)?;
        Ok(Self {
            initial: params,
            hyperprior: None,
        })
    }

    /// Random `(μ0, λ0, β0)` under a Normal-Gamma-Gamma hyperprior. The
    /// starting hyperparameters are the hyperprior means.
    pub fn with_hyperprior(prior: NggHyperprior) -> Result<Self> {
        validate_ngg_hyperprior("normal_nig.hyperprior", &prior)?;
        Ok(Self {
            initial: prior.initial_params(),
            hyperprior: Some(prior),
        })
    }

    /// Random hyperparameters with explicit starting values.
    pub fn with_hyperprior_from(params: NnigParams, prior: NggHyperprior) -> Result<Self> {
        validate_nnig_params("normal_nig", &params)?;
        validate_ngg_hyperprior("normal_nig.hyperprior", &prior)?;
        if params.shape != prior.shape {
            return Err(Error::invalid_parameter(
                "normal_nig.shape",
                format!(
                    "starting shape {} differs from the fixed hyperprior shape {}",
                    params.shape, prior.shape
                ),
            ));
        }
        Ok(Self {
            initial: params,
            hyperprior: Some(prior),
        })
    }

    pub fn hyperprior(&self) -> Option<&NggHyperprior> {
        self.hyperprior.as_ref()
    }
}

impl Hierarchy for NnigHierarchy {
    type State = NormalState;
    type Hypers = NnigParams;
    type Stats = NormalStats;

    fn name(&self) -> &'static str {
        "normal_nig"
    }

    fn is_conjugate(&self) -> bool {
        true
    }

    fn like_lpdf(&self, x: f64, state: &NormalState) -> f64 {
        normal_log_pdf(x, state.mean, state.var.sqrt())
    }

    /// Prior mean and the mode of the variance prior.
    fn initialize_state(&self, hypers: &NnigParams) -> NormalState {
        NormalState {
            mean: hypers.mean,
            var: hypers.scale / (hypers.shape + 1.0),
        }
    }

    fn initialize_hypers(&self) -> NnigParams {
        self.initial
    }

    fn draw<R: Rng + ?Sized>(&self, hypers: &NnigParams, rng: &mut R) -> Result<NormalState> {
        let var = sampling::inv_gamma(rng, hypers.shape, hypers.scale)?;
        let mean = sampling::normal(rng, hypers.mean, (var / hypers.var_scaling).sqrt())?;
        Ok(NormalState { mean, var })
    }

    fn update_summary_statistics(
        &self,
        x: f64,
        add: bool,
        stats: &mut NormalStats,
        _state: &NormalState,
        _data: &mut ClusterData,
    ) -> Result<()> {
        if add {
            stats.sum += x;
            stats.sum_squares += x * x;
        } else {
            stats.sum -= x;
            stats.sum_squares -= x * x;
        }
        Ok(())
    }

    fn update_hypers<R: Rng + ?Sized>(
        &self,
        states: &[NormalState],
        hypers: &mut NnigParams,
        rng: &mut R,
    ) -> Result<()> {
        let Some(prior) = &self.hyperprior else {
            return Ok(());
        };
        let k = states.len() as f64;

        let sum_prec: f64 = states.iter().map(|s| 1.0 / s.var).sum();
        let sum_mean_prec: f64 = states.iter().map(|s| s.mean / s.var).sum();

        let prec = hypers.var_scaling * sum_prec + 1.0 / prior.mean_var;
        let mean_n = (hypers.var_scaling * sum_mean_prec + prior.mean_mean / prior.mean_var) / prec;
        let mean = sampling::normal(rng, mean_n, (1.0 / prec).sqrt())?;

        let sq_dev: f64 = states
            .iter()
            .map(|s| (mean - s.mean).powi(2) / s.var)
            .sum();
        let var_scaling = sampling::gamma(
            rng,
            prior.var_scaling_shape + 0.5 * k,
            prior.var_scaling_rate + 0.5 * sq_dev,
        )?;

        let scale = sampling::gamma(
            rng,
            prior.scale_shape + k * prior.shape,
            prior.scale_rate + sum_prec,
        )?;

        *hypers = NnigParams {
            mean,
            var_scaling,
            shape: prior.shape,
            scale,
        };
        debug!(
            event = event_names::HYPERS_UPDATED,
            clusters = states.len(),
            mean,
            var_scaling,
            scale,
            "normal_nig hyperparameters resampled"
        );
        Ok(())
    }

    fn sample_given_data<R: Rng + ?Sized>(
        &self,
        state: &mut NormalState,
        stats: &mut NormalStats,
        _data: &ClusterData,
        cardinality: usize,
        hypers: &NnigParams,
        rng: &mut R,
    ) -> Result<bool> {
        conjugate_update(self, state, stats, cardinality, hypers, rng)
    }
}

impl ConjugateHierarchy for NnigHierarchy {
    /// Student-t predictive: `t_{2α0}(μ0, √(β0 (λ0 + 1) / (α0 λ0)))`.
    fn marg_lpdf(&self, x: f64, hypers: &NnigParams) -> f64 {
        let scale = (hypers.scale * (hypers.var_scaling + 1.0)
            / (hypers.shape * hypers.var_scaling))
            .sqrt();
        student_t_log_pdf(x, 2.0 * hypers.shape, hypers.mean, scale)
    }

    fn compute_posterior_hypers(
        &self,
        cardinality: usize,
        hypers: &NnigParams,
        stats: &NormalStats,
    ) -> NnigParams {
        if cardinality == 0 {
            return *hypers;
        }
        let n = cardinality as f64;
        let lambda0 = hypers.var_scaling;
        let sample_mean = stats.sum / n;
        let centered_ss = (stats.sum_squares - n * sample_mean * sample_mean).max(0.0);
        let shift = sample_mean - hypers.mean;

        NnigParams {
            mean: (lambda0 * hypers.mean + stats.sum) / (lambda0 + n),
            var_scaling: lambda0 + n,
            shape: hypers.shape + 0.5 * n,
            scale: hypers.scale
                + 0.5 * centered_ss
                + 0.5 * lambda0 * n / (n + lambda0) * shift * shift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stats_of(data: &[f64]) -> NormalStats {
        let h = NnigHierarchy::default();
        let state = h.initialize_state(&h.initialize_hypers());
        let mut stats = NormalStats::default();
        let mut unused = Vec::new();
        for x in data {
            h.update_summary_statistics(*x, true, &mut stats, &state, &mut unused)
                .unwrap();
        }
        stats
    }

    #[test]
    fn posterior_worked_example() {
        let h = NnigHierarchy::default();
        let prior = NnigParams {
            mean: 0.0,
            var_scaling: 1.0,
            shape: 1.0,
            scale: 1.0,
        };
        let post = h.compute_posterior_hypers(3, &prior, &stats_of(&[1.0, 2.0, 3.0]));
        assert!((post.mean - 1.5).abs() < 1e-12);
        assert!((post.var_scaling - 4.0).abs() < 1e-12);
        assert!((post.shape - 2.5).abs() < 1e-12);
        assert!((post.scale - 3.5).abs() < 1e-12);
    }

    #[test]
    fn empty_cluster_keeps_hypers() {
        let h = NnigHierarchy::default();
        let prior = h.initialize_hypers();
        let stats = NormalStats {
            sum: 12.0,
            sum_squares: 99.0,
        };
        assert_eq!(h.compute_posterior_hypers(0, &prior, &stats), prior);
    }

    #[test]
    fn initial_state_uses_variance_mode() {
        let h = NnigHierarchy::default();
        let state = h.initialize_state(&NnigParams::default());
        assert_eq!(state, NormalState { mean: 1.0, var: 0.5 });
    }

    #[test]
    fn marginal_is_student_t() {
        let h = NnigHierarchy::default();
        let hypers = NnigParams {
            mean: 0.0,
            var_scaling: 1.0,
            shape: 1.0,
            scale: 1.0,
        };
        // λ0 = α0 = β0 = 1: two degrees of freedom, scale √2.
        let expected = student_t_log_pdf(0.0, 2.0, 0.0, 2.0_f64.sqrt());
        assert!((h.marg_lpdf(0.0, &hypers) - expected).abs() < 1e-12);
        assert!(h.marg_lpdf(0.0, &hypers) > h.marg_lpdf(3.0, &hypers));
    }

    #[test]
    fn add_then_remove_restores_stats() {
        let h = NnigHierarchy::default();
        let state = h.initialize_state(&h.initialize_hypers());
        let mut stats = stats_of(&[0.3, -1.2, 4.5]);
        let before = stats;
        let mut data = Vec::new();
        h.update_summary_statistics(2.25, true, &mut stats, &state, &mut data)
            .unwrap();
        h.update_summary_statistics(2.25, false, &mut stats, &state, &mut data)
            .unwrap();
        assert!((stats.sum - before.sum).abs() < 1e-12);
        assert!((stats.sum_squares - before.sum_squares).abs() < 1e-12);
        assert!(data.is_empty());
    }

    #[test]
    fn state_tuple_conversion() {
        let state = NormalState::try_from([0.5, 2.0].as_slice()).unwrap();
        assert_eq!(state.to_vec(), vec![0.5, 2.0]);
        assert!(NormalState::try_from([0.5].as_slice()).is_err());
    }

    #[test]
    fn rejects_invalid_params() {
        let bad = NnigParams {
            var_scaling: -1.0,
            ..NnigParams::default()
        };
        assert!(matches!(
            NnigHierarchy::new(bad),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn fixed_hypers_are_not_resampled() {
        let h = NnigHierarchy::default();
        let mut hypers = h.initialize_hypers();
        let states = [NormalState { mean: 3.0, var: 1.0 }];
        let mut rng = StdRng::seed_from_u64(5);
        h.update_hypers(&states, &mut hypers, &mut rng).unwrap();
        assert_eq!(hypers, NnigParams::default());
    }

    #[test]
    fn hyperprior_update_keeps_shape_and_positivity() {
        let h = NnigHierarchy::with_hyperprior(NggHyperprior::default()).unwrap();
        let mut hypers = h.initialize_hypers();
        let states = [
            NormalState { mean: -2.0, var: 0.5 },
            NormalState { mean: 4.0, var: 1.5 },
        ];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            h.update_hypers(&states, &mut hypers, &mut rng).unwrap();
            assert_eq!(hypers.shape, 1.5);
            assert!(hypers.var_scaling > 0.0);
            assert!(hypers.scale > 0.0);
            assert!(hypers.mean.is_finite());
        }
    }

    #[test]
    fn conjugate_draw_concentrates_on_data() {
        let h = NnigHierarchy::default();
        let hypers = h.initialize_hypers();
        let data: Vec<f64> = (0..400).map(|i| 5.0 + ((i % 7) as f64 - 3.0) * 0.1).collect();
        let mut stats = stats_of(&data);
        let mut state = h.initialize_state(&hypers);
        let mut rng = StdRng::seed_from_u64(3);
        let moved = h
            .sample_given_data(&mut state, &mut stats, &Vec::new(), data.len(), &hypers, &mut rng)
            .unwrap();
        assert!(moved);
        assert!((state.mean - 5.0).abs() < 0.2, "mean {}", state.mean);
    }
}
