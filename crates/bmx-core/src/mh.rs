//! Random-walk Metropolis on an unconstrained parameter vector.
//!
//! The proposal is componentwise `x'_i = x_i + N(0, v_i)`, which is
//! symmetric, so the acceptance log-ratio is just the difference of log
//! targets. The comparison is done in log space (`ln u < Δ`), so a very
//! negative Δ never underflows into a spurious rejection or acceptance.

use bmx_common::{Error, Result};
use bmx_math::sampling;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::logging::event_names;

/// Outcome of a single Metropolis step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MhStep {
    pub accepted: bool,
    /// The proposal if accepted, otherwise the current point.
    pub point: Vec<f64>,
    /// Log target at `point`.
    pub log_target: f64,
    /// `ln π(proposal) − ln π(current)`.
    pub log_ratio: f64,
}

/// Componentwise Normal random-walk proposal with fixed variances.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomWalkMetropolis {
    sds: Vec<f64>,
}

impl RandomWalkMetropolis {
    /// Build from per-coordinate proposal variances (each finite and > 0).
    pub fn new(variances: &[f64]) -> Result<Self> {
        if variances.is_empty() {
            return Err(Error::invalid_parameter(
                "proposal_variances",
                "at least one coordinate is required",
            ));
        }
        for (i, v) in variances.iter().enumerate() {
            if !(v.is_finite() && *v > 0.0) {
                return Err(Error::invalid_parameter(
                    format!("proposal_variances[{}]", i),
                    format!("must be > 0, got {}", v),
                ));
            }
        }
        Ok(Self {
            sds: variances.iter().map(|v| v.sqrt()).collect(),
        })
    }

    pub fn dim(&self) -> usize {
        self.sds.len()
    }

    /// Perturb `current` once.
    pub fn propose<R: Rng + ?Sized>(&self, current: &[f64], rng: &mut R) -> Result<Vec<f64>> {
        if current.len() != self.sds.len() {
            return Err(Error::invalid_parameter(
                "current",
                format!("expected {} coordinates, got {}", self.sds.len(), current.len()),
            ));
        }
        current
            .iter()
            .zip(&self.sds)
            .map(|(x, sd)| sampling::normal(rng, *x, *sd))
            .collect()
    }

    /// One Metropolis step.
    ///
    /// `current_log_target` is the caller's cached value at `current`;
    /// `log_target` is evaluated only at the proposal, so the caller can
    /// record proposal-side statistics inside it and promote them when the
    /// step is accepted.
    pub fn step<R, F>(
        &self,
        current: &[f64],
        current_log_target: f64,
        mut log_target: F,
        rng: &mut R,
    ) -> Result<MhStep>
    where
        R: Rng + ?Sized,
        F: FnMut(&[f64]) -> f64,
    {
        let proposal = self.propose(current, rng)?;
        let proposal_log_target = log_target(&proposal);
        let log_ratio = proposal_log_target - current_log_target;
        // NaN compares false and is rejected.
        let accepted = sampling::open_unit(rng).ln() < log_ratio;

        trace!(
            event = event_names::MH_STEP,
            accepted,
            log_ratio,
            "metropolis step"
        );

        Ok(if accepted {
            MhStep {
                accepted,
                point: proposal,
                log_target: proposal_log_target,
                log_ratio,
            }
        } else {
            MhStep {
                accepted,
                point: current.to_vec(),
                log_target: current_log_target,
                log_ratio,
            }
        })
    }
}

/// Running proposal / acceptance counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceTracker {
    pub proposals: u64,
    pub accepted: u64,
}

impl AcceptanceTracker {
    pub fn record(&mut self, accepted: bool) {
        self.proposals += 1;
        if accepted {
            self.accepted += 1;
        }
    }

    /// Fraction of accepted proposals; 0 before the first proposal.
    pub fn rate(&self) -> f64 {
        if self.proposals == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposals as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
