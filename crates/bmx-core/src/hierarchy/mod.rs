//! Cluster hierarchies: a per-cluster likelihood plus the prior its
//! parameters are drawn from.
//!
//! The engine picks the update path once from [`Hierarchy::is_conjugate`]:
//!
//! - conjugate families implement [`ConjugateHierarchy`] and update a
//!   cluster by drawing from closed-form posterior hyperparameters
//!   ([`conjugate_update`]);
//! - non-conjugate families implement [`NonConjugateHierarchy`] and update a
//!   cluster with one Metropolis step on its full conditional
//!   ([`non_conjugate_update`]).
//!
//! Each family's [`Hierarchy::sample_given_data`] forwards to exactly one of
//! the two, so neither path can reach the other's operations.
//!
//! An empty cluster is not an error: both paths fall back to the prior.

pub mod lapnig;
pub mod nnig;

pub use lapnig::{LapNigHierarchy, LaplaceState, LaplaceStats};
pub use nnig::{NnigHierarchy, NormalState, NormalStats};

use std::fmt::Debug;

use bmx_common::Result;
use rand::Rng;

/// Data values currently assigned to a cluster. Only populated for
/// hierarchies whose [`Hierarchy::tracks_data`] is true.
pub type ClusterData = Vec<f64>;

/// Shared contract of every hierarchy family.
pub trait Hierarchy: Send + Sync + Debug {
    /// Per-cluster parameters.
    type State: Clone + Debug + PartialEq;
    /// Parameters of the prior the states are drawn from.
    type Hypers: Clone + Debug + PartialEq;
    /// Incremental sufficient statistics; `Default` is the zero element.
    type Stats: Clone + Debug + Default + PartialEq;

    /// Registry identifier.
    fn name(&self) -> &'static str;

    fn is_conjugate(&self) -> bool;

    /// Whether clusters must keep their raw data values.
    fn tracks_data(&self) -> bool {
        !self.is_conjugate()
    }

    /// Log density of one observation given cluster parameters.
    fn like_lpdf(&self, x: f64, state: &Self::State) -> f64;

    /// Deterministic state for a cluster created without data.
    fn initialize_state(&self, hypers: &Self::Hypers) -> Self::State;

    fn initialize_hypers(&self) -> Self::Hypers;

    /// Fresh parameters from the prior.
    fn draw<R: Rng + ?Sized>(&self, hypers: &Self::Hypers, rng: &mut R) -> Result<Self::State>;

    /// Add (`add = true`) or remove `x`. Removing exactly undoes adding.
    fn update_summary_statistics(
        &self,
        x: f64,
        add: bool,
        stats: &mut Self::Stats,
        state: &Self::State,
        data: &mut ClusterData,
    ) -> Result<()>;

    fn clear_summary_statistics(&self, stats: &mut Self::Stats) {
        *stats = Self::Stats::default();
    }

    /// Resample hyperparameters from the states of all active clusters.
    /// Identity unless the family carries a hyperprior.
    fn update_hypers<R: Rng + ?Sized>(
        &self,
        _states: &[Self::State],
        _hypers: &mut Self::Hypers,
        _rng: &mut R,
    ) -> Result<()> {
        Ok(())
    }

    /// One posterior update of a cluster's parameters.
    ///
    /// Returns whether the state moved: always `true` for conjugate draws,
    /// the Metropolis outcome for non-conjugate families.
    fn sample_given_data<R: Rng + ?Sized>(
        &self,
        state: &mut Self::State,
        stats: &mut Self::Stats,
        data: &ClusterData,
        cardinality: usize,
        hypers: &Self::Hypers,
        rng: &mut R,
    ) -> Result<bool>;
}

/// Families with a closed-form posterior.
pub trait ConjugateHierarchy: Hierarchy {
    /// Log predictive density of `x` with parameters integrated out.
    fn marg_lpdf(&self, x: f64, hypers: &Self::Hypers) -> f64;

    /// Posterior hyperparameters; `hypers` unchanged when `cardinality == 0`.
    fn compute_posterior_hypers(
        &self,
        cardinality: usize,
        hypers: &Self::Hypers,
        stats: &Self::Stats,
    ) -> Self::Hypers;
}

/// Families updated by Metropolis on the full conditional.
pub trait NonConjugateHierarchy: Hierarchy {
    /// One Metropolis step; `data` must be non-empty. Returns acceptance.
    fn sample_full_conditional<R: Rng + ?Sized>(
        &self,
        state: &mut Self::State,
        stats: &mut Self::Stats,
        data: &ClusterData,
        hypers: &Self::Hypers,
        rng: &mut R,
    ) -> Result<bool>;
}

/// Conjugate path: draw from the posterior hyperparameters.
pub fn conjugate_update<H, R>(
    hierarchy: &H,
    state: &mut H::State,
    stats: &H::Stats,
    cardinality: usize,
    hypers: &H::Hypers,
    rng: &mut R,
) -> Result<bool>
where
    H: ConjugateHierarchy,
    R: Rng + ?Sized,
{
    let posterior = hierarchy.compute_posterior_hypers(cardinality, hypers, stats);
    *state = hierarchy.draw(&posterior, rng)?;
    Ok(true)
}

/// Non-conjugate path: prior draw for an empty cluster, else one
/// Metropolis step.
pub fn non_conjugate_update<H, R>(
    hierarchy: &H,
    state: &mut H::State,
    stats: &mut H::Stats,
    data: &ClusterData,
    hypers: &H::Hypers,
    rng: &mut R,
) -> Result<bool>
where
    H: NonConjugateHierarchy,
    R: Rng + ?Sized,
{
    if data.is_empty() {
        *state = hierarchy.draw(hypers, rng)?;
        hierarchy.clear_summary_statistics(stats);
        return Ok(false);
    }
    hierarchy.sample_full_conditional(state, stats, data, hypers, rng)
}
