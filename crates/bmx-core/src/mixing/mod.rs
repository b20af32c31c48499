//! Mixing processes: the random partition law over cluster labels.
//!
//! Marginal processes (Dirichlet, Pitman–Yor) integrate out the weights and
//! expose the predictive masses an engine needs to reassign one datum.
//! Conditional processes (truncated stick-breaking) keep explicit weights
//! instead and refuse the mass queries.

pub mod dirichlet;
pub mod pitman_yor;
pub mod stick_breaking;

pub use dirichlet::DirichletProcess;
pub use pitman_yor::PitmanYorProcess;
pub use stick_breaking::StickBreaking;

use std::fmt::Debug;

use bmx_common::{Error, Result};
use rand::RngCore;

/// How a mass is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MassScale {
    /// Return `ln(mass)` instead of the mass.
    pub log: bool,
    /// Skip the normalizing constant shared by all candidate clusters.
    pub unnormalized: bool,
}

impl MassScale {
    pub const LINEAR: MassScale = MassScale {
        log: false,
        unnormalized: false,
    };
    pub const LOG: MassScale = MassScale {
        log: true,
        unnormalized: false,
    };

    /// Apply this scale to `numerator / normalizer`.
    pub fn apply(self, numerator: f64, normalizer: f64) -> f64 {
        match (self.log, self.unnormalized) {
            (false, false) => numerator / normalizer,
            (false, true) => numerator,
            (true, false) => numerator.ln() - normalizer.ln(),
            (true, true) => numerator.ln(),
        }
    }
}

/// Partition law driving cluster assignment.
///
/// Object safe: the engine holds a `Box<dyn MixingProcess>` chosen at
/// configuration time, so randomness comes in as `&mut dyn RngCore`.
pub trait MixingProcess: Send + Sync + Debug {
    /// Registry identifier.
    fn name(&self) -> &'static str;

    /// `true` for processes that only work with a fixed, enumerable number
    /// of components.
    fn is_conditional(&self) -> bool;

    /// Current process parameters as an ordered tuple.
    fn state(&self) -> Vec<f64>;

    /// `P(K_n = k)` for each `k` in `grid`.
    fn prior_cluster_distribution(&self, grid: &[usize], n: usize) -> Result<Vec<f64>>;

    /// Predictive mass of an existing cluster holding `hier_card` of the
    /// other `n` data.
    fn existing_cluster_mass(
        &self,
        n: usize,
        n_clusters: usize,
        hier_card: usize,
        scale: MassScale,
    ) -> Result<f64>;

    /// Predictive mass of opening a new cluster.
    fn new_cluster_mass(&self, n: usize, n_clusters: usize, scale: MassScale) -> Result<f64>;

    /// Explicit component weights (conditional processes only).
    fn mixing_weights(&self, _scale: MassScale) -> Result<Vec<f64>> {
        Err(Error::Unsupported {
            model: self.name(),
            operation: "mixing_weights",
        })
    }

    /// Resample the process parameters given the current cluster sizes.
    fn update_state(&mut self, cluster_sizes: &[usize], rng: &mut dyn RngCore) -> Result<()>;
}

/// Shared `k = 0` / `k > n` edge handling for cluster-count priors.
/// Returns `None` when `k` needs the family-specific formula.
pub(crate) fn structural_cluster_probability(k: usize, n: usize) -> Option<f64> {
    if k == 0 {
        return Some(if n == 0 { 1.0 } else { 0.0 });
    }
    if k > n {
        return Some(0.0);
    }
    None
}
