//! Laplace likelihood with independent Normal / InverseGamma priors
//! (non-conjugate).
//!
//! ```text
//! x | μ, b ~ Laplace(μ, b)
//! μ        ~ N(μ0, v0)
//! b        ~ IG(α0, β0)
//! ```
//!
//! Updated by random-walk Metropolis on `(μ, ln b)`. The likelihood only
//! needs `S(μ) = Σ|x_i − μ|`, so the statistics cache `S` at the current
//! location and at the last proposal; an accepted proposal's sum becomes
//! the current one without another pass over the data.

use bmx_common::{Error, Result};
use bmx_config::validate::validate_lapnig_params;
use bmx_config::LapNigParams;
use bmx_math::{inv_gamma_log_pdf, laplace_log_pdf, normal_log_pdf, sampling};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{non_conjugate_update, ClusterData, Hierarchy, NonConjugateHierarchy};
use crate::mh::RandomWalkMetropolis;

/// Cluster parameters `(μ, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaplaceState {
    pub mean: f64,
    pub scale: f64,
}

impl LaplaceState {
    pub const LEN: usize = 2;

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.mean, self.scale]
    }

    fn unconstrained(&self) -> [f64; 2] {
        [self.mean, self.scale.ln()]
    }
}

impl TryFrom<&[f64]> for LaplaceState {
    type Error = Error;

    fn try_from(values: &[f64]) -> Result<Self> {
        match values {
            [mean, scale] => Ok(Self {
                mean: *mean,
                scale: *scale,
            }),
            _ => Err(Error::invalid_parameter(
                "laplace_state",
                format!("expected {} values, got {}", Self::LEN, values.len()),
            )),
        }
    }
}

/// Sums of absolute deviations at the current and the proposed location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaplaceStats {
    pub current_sum_abs_dev: f64,
    pub proposed_sum_abs_dev: f64,
}

/// Laplace / Normal-InverseGamma hierarchy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LapNigHierarchy {
    initial: LapNigParams,
}

impl LapNigHierarchy {
    pub fn new(params: LapNigParams) -> Result<Self> {
        validate_lapnig_params("laplace_nig", &params)?;
        Ok(Self { initial: params })
    }

    /// Log full conditional of `(μ, ln b)` given `n` points with absolute
    /// deviation sum `sum_abs_dev`, including the Jacobian of `b = e^t`.
    pub fn log_target(
        &self,
        mean: f64,
        log_scale: f64,
        n: usize,
        sum_abs_dev: f64,
        hypers: &LapNigParams,
    ) -> f64 {
        let scale = log_scale.exp();
        let log_like = -(n as f64) * (2.0 * scale).ln() - sum_abs_dev / scale;
        let log_prior = normal_log_pdf(mean, hypers.mean, hypers.var.sqrt())
            + inv_gamma_log_pdf(scale, hypers.shape, hypers.scale);
        log_like + log_prior + log_scale
    }
}

fn sum_abs_dev(data: &[f64], mean: f64) -> f64 {
    data.iter().map(|x| (x - mean).abs()).sum()
}

impl Hierarchy for LapNigHierarchy {
    type State = LaplaceState;
    type Hypers = LapNigParams;
    type Stats = LaplaceStats;

    fn name(&self) -> &'static str {
        "laplace_nig"
    }

    fn is_conjugate(&self) -> bool {
        false
    }

    fn like_lpdf(&self, x: f64, state: &LaplaceState) -> f64 {
        laplace_log_pdf(x, state.mean, state.scale)
    }

    fn initialize_state(&self, hypers: &LapNigParams) -> LaplaceState {
        LaplaceState {
            mean: hypers.mean,
            scale: hypers.scale / (hypers.shape + 1.0),
        }
    }

    fn initialize_hypers(&self) -> LapNigParams {
        self.initial
    }

    fn draw<R: Rng + ?Sized>(&self, hypers: &LapNigParams, rng: &mut R) -> Result<LaplaceState> {
        let mean = sampling::normal(rng, hypers.mean, hypers.var.sqrt())?;
        let scale = sampling::inv_gamma(rng, hypers.shape, hypers.scale)?;
        Ok(LaplaceState { mean, scale })
    }

    fn update_summary_statistics(
        &self,
        x: f64,
        add: bool,
        stats: &mut LaplaceStats,
        state: &LaplaceState,
        data: &mut ClusterData,
    ) -> Result<()> {
        if add {
            stats.current_sum_abs_dev += (x - state.mean).abs();
            data.push(x);
            return Ok(());
        }

        let pos = data
            .iter()
            .position(|v| *v == x)
            .ok_or(Error::MissingDatum { value: x })?;
        data.swap_remove(pos);
        stats.current_sum_abs_dev = if data.is_empty() {
            0.0
        } else {
            (stats.current_sum_abs_dev - (x - state.mean).abs()).max(0.0)
        };
        Ok(())
    }

    fn sample_given_data<R: Rng + ?Sized>(
        &self,
        state: &mut LaplaceState,
        stats: &mut LaplaceStats,
        data: &ClusterData,
        _cardinality: usize,
        hypers: &LapNigParams,
        rng: &mut R,
    ) -> Result<bool> {
        non_conjugate_update(self, state, stats, data, hypers, rng)
    }
}

impl NonConjugateHierarchy for LapNigHierarchy {
    fn sample_full_conditional<R: Rng + ?Sized>(
        &self,
        state: &mut LaplaceState,
        stats: &mut LaplaceStats,
        data: &ClusterData,
        hypers: &LapNigParams,
        rng: &mut R,
    ) -> Result<bool> {
        let n = data.len();
        let sampler = RandomWalkMetropolis::new(&[hypers.mh_mean_var, hypers.mh_log_scale_var])?;
        let current = state.unconstrained();
        let current_log_target =
            self.log_target(current[0], current[1], n, stats.current_sum_abs_dev, hypers);

        let step = sampler.step(
            &current,
            current_log_target,
            |proposal| {
                let s = sum_abs_dev(data, proposal[0]);
                stats.proposed_sum_abs_dev = s;
                self.log_target(proposal[0], proposal[1], n, s, hypers)
            },
            rng,
        )?;

        if step.accepted {
            state.mean = step.point[0];
            state.scale = step.point[1].exp();
            stats.current_sum_abs_dev = stats.proposed_sum_abs_dev;
        }
        Ok(step.accepted)
    }
}
