//! One active cluster as the engine sees it.
//!
//! Bundles the state, statistics, tracked data, cardinality and acceptance
//! counts of a cluster and routes every call through its hierarchy, so the
//! statistics invariants cannot be bypassed by the caller.

use bmx_common::{Error, Result};
use rand::Rng;

use crate::hierarchy::{ClusterData, Hierarchy};
use crate::mh::AcceptanceTracker;

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster<H: Hierarchy> {
    state: H::State,
    stats: H::Stats,
    data: ClusterData,
    cardinality: usize,
    acceptance: AcceptanceTracker,
}

impl<H: Hierarchy> Cluster<H> {
    /// Empty cluster at the deterministic initial state.
    pub fn new(hierarchy: &H, hypers: &H::Hypers) -> Self {
        Self::with_state(hierarchy.initialize_state(hypers))
    }

    /// Empty cluster with parameters drawn from the prior.
    pub fn from_prior<R: Rng + ?Sized>(
        hierarchy: &H,
        hypers: &H::Hypers,
        rng: &mut R,
    ) -> Result<Self> {
        Ok(Self::with_state(hierarchy.draw(hypers, rng)?))
    }

    fn with_state(state: H::State) -> Self {
        Self {
            state,
            stats: H::Stats::default(),
            data: ClusterData::new(),
            cardinality: 0,
            acceptance: AcceptanceTracker::default(),
        }
    }

    pub fn state(&self) -> &H::State {
        &self.state
    }

    pub fn stats(&self) -> &H::Stats {
        &self.stats
    }

    /// Tracked data values; empty for hierarchies that do not track data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    pub fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    pub fn acceptance(&self) -> &AcceptanceTracker {
        &self.acceptance
    }

    pub fn add_datum(&mut self, hierarchy: &H, x: f64) -> Result<()> {
        hierarchy.update_summary_statistics(x, true, &mut self.stats, &self.state, &mut self.data)?;
        self.cardinality += 1;
        Ok(())
    }

    /// Remove a value previously passed to [`Self::add_datum`].
    ///
    /// Only families that track their data can tell an unknown value
    /// apart; they fail with [`Error::MissingDatum`] and leave the cluster
    /// unchanged. Conjugate families keep sufficient statistics alone, so
    /// removing a value that was never added still decrements the
    /// cardinality and subtracts it from the sums, leaving the cluster
    /// inconsistent. The caller owns the allocation and must only remove
    /// members. An empty cluster always fails with `MissingDatum`.
    pub fn remove_datum(&mut self, hierarchy: &H, x: f64) -> Result<()> {
        if self.cardinality == 0 {
            return Err(Error::MissingDatum { value: x });
        }
        hierarchy.update_summary_statistics(x, false, &mut self.stats, &self.state, &mut self.data)?;
        self.cardinality -= 1;
        if self.cardinality == 0 {
            hierarchy.clear_summary_statistics(&mut self.stats);
        }
        Ok(())
    }

    /// One posterior update of the cluster parameters. Non-conjugate
    /// outcomes on non-empty clusters feed the acceptance counts.
    pub fn sample_given_data<R: Rng + ?Sized>(
        &mut self,
        hierarchy: &H,
        hypers: &H::Hypers,
        rng: &mut R,
    ) -> Result<bool> {
        let moved = hierarchy.sample_given_data(
            &mut self.state,
            &mut self.stats,
            &self.data,
            self.cardinality,
            hypers,
            rng,
        )?;
        if !hierarchy.is_conjugate() && self.cardinality > 0 {
            self.acceptance.record(moved);
        }
        Ok(moved)
    }

    /// Log likelihood of `x` under the current parameters.
    pub fn like_lpdf(&self, hierarchy: &H, x: f64) -> f64 {
        hierarchy.like_lpdf(x, &self.state)
    }

    /// Drop all data, keeping the parameters.
    pub fn clear(&mut self, hierarchy: &H) {
        hierarchy.clear_summary_statistics(&mut self.stats);
        self.data.clear();
        self.cardinality = 0;
    }
}
