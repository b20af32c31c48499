//! Truncated stick-breaking with `H` components.
//!
//! ```text
//! v_h ~ Beta(a_h, b_h)    h < H,    v_H = 1
//! w_h = v_h · Π_{l<h} (1 − v_l)
//! ```
//!
//! This is a conditional process: the engine samples allocations against
//! explicit weights, so the marginal mass queries are unsupported. The
//! cluster-count prior has no closed form and is estimated by Monte Carlo
//! with a generator seeded from the configured seed, so repeated calls
//! return identical estimates.

use bmx_common::{Error, Result};
use bmx_config::validate::validate_beta_params;
use bmx_config::BetaParams;
use bmx_math::sampling;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use super::{MassScale, MixingProcess};

#[derive(Debug, Clone, PartialEq)]
pub struct StickBreaking {
    sticks: Vec<BetaParams>,
    weights: Vec<f64>,
    mc_iterations: usize,
    mc_seed: u64,
}

impl StickBreaking {
    /// One Beta law per component; the last one is unused since its stick
    /// is the whole remainder. Weights start at their prior expectation.
    pub fn new(sticks: Vec<BetaParams>, mc_iterations: usize, mc_seed: u64) -> Result<Self> {
        if sticks.is_empty() {
            return Err(Error::invalid_parameter(
                "sticks",
                "at least one component is required",
            ));
        }
        for (i, stick) in sticks.iter().enumerate() {
            validate_beta_params(&format!("sticks[{}]", i), stick)?;
        }
        if mc_iterations == 0 {
            return Err(Error::invalid_parameter("mc_iterations", "must be > 0"));
        }
        let mut means: Vec<f64> = sticks.iter().map(BetaParams::mean).collect();
        if let Some(last) = means.last_mut() {
            *last = 1.0;
        }
        let weights = break_sticks(&means);
        Ok(Self {
            sticks,
            weights,
            mc_iterations,
            mc_seed,
        })
    }

    pub fn num_components(&self) -> usize {
        self.sticks.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn draw_weights<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>> {
        let last = self.sticks.len() - 1;
        let mut proportions = Vec::with_capacity(self.sticks.len());
        for stick in &self.sticks[..last] {
            proportions.push(sampling::beta(rng, stick.alpha, stick.beta)?);
        }
        proportions.push(1.0);
        Ok(break_sticks(&proportions))
    }

    /// Monte Carlo estimate of `P(K_n = k)` for each `k` in `grid` from
    /// `iterations` weight draws, each followed by `n` inverse-CDF
    /// allocations.
    pub fn estimate_cluster_distribution<R: Rng + ?Sized>(
        &self,
        grid: &[usize],
        n: usize,
        iterations: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        if iterations == 0 {
            return Err(Error::invalid_parameter("iterations", "must be > 0"));
        }
        let h = self.sticks.len();
        let mut counts = vec![0usize; h + 1];
        let mut seen = vec![false; h];

        for _ in 0..iterations {
            let weights = self.draw_weights(rng)?;
            let cdf: Vec<f64> = weights
                .iter()
                .scan(0.0, |acc, w| {
                    *acc += w;
                    Some(*acc)
                })
                .collect();

            seen.iter_mut().for_each(|s| *s = false);
            let mut distinct = 0;
            for _ in 0..n {
                let u: f64 = rng.random();
                // Rounding can leave the final cumulative weight just under 1.
                let label = cdf.iter().position(|&c| u < c).unwrap_or(h - 1);
                if !seen[label] {
                    seen[label] = true;
                    distinct += 1;
                }
            }
            counts[distinct] += 1;
        }

        Ok(grid
            .iter()
            .map(|&k| {
                counts
                    .get(k)
                    .map_or(0.0, |&c| c as f64 / iterations as f64)
            })
            .collect())
    }
}

/// `w_h = v_h Π_{l<h} (1 − v_l)`.
fn break_sticks(proportions: &[f64]) -> Vec<f64> {
    let mut remaining = 1.0;
    proportions
        .iter()
        .map(|v| {
            let w = v * remaining;
            remaining *= 1.0 - v;
            w
        })
        .collect()
}

impl MixingProcess for StickBreaking {
    fn name(&self) -> &'static str {
        "stick_breaking"
    }

    fn is_conditional(&self) -> bool {
        true
    }

    fn state(&self) -> Vec<f64> {
        self.weights.clone()
    }

    fn prior_cluster_distribution(&self, grid: &[usize], n: usize) -> Result<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(self.mc_seed);
        self.estimate_cluster_distribution(grid, n, self.mc_iterations, &mut rng)
    }

    fn existing_cluster_mass(
        &self,
        _n: usize,
        _n_clusters: usize,
        _hier_card: usize,
        _scale: MassScale,
    ) -> Result<f64> {
        Err(Error::Unsupported {
            model: self.name(),
            operation: "existing_cluster_mass",
        })
    }

    fn new_cluster_mass(&self, _n: usize, _n_clusters: usize, _scale: MassScale) -> Result<f64> {
        Err(Error::Unsupported {
            model: self.name(),
            operation: "new_cluster_mass",
        })
    }

    fn mixing_weights(&self, scale: MassScale) -> Result<Vec<f64>> {
        Ok(if scale.log {
            self.weights.iter().map(|w| w.ln()).collect()
        } else {
            self.weights.clone()
        })
    }

    /// Blocked Gibbs: `v_h ~ Beta(a_h + n_h, b_h + Σ_{l>h} n_l)`.
    fn update_state(&mut self, cluster_sizes: &[usize], rng: &mut dyn RngCore) -> Result<()> {
        let h = self.sticks.len();
        if cluster_sizes.len() != h {
            return Err(Error::invalid_parameter(
                "cluster_sizes",
                format!("expected one size per component ({}), got {}", h, cluster_sizes.len()),
            ));
        }

        let mut tail: usize = cluster_sizes.iter().sum();
        let mut proportions = Vec::with_capacity(h);
        for (stick, &size) in self.sticks[..h - 1].iter().zip(cluster_sizes) {
            tail -= size;
            proportions.push(sampling::beta(
                rng,
                stick.alpha + size as f64,
                stick.beta + tail as f64,
            )?);
        }
        proportions.push(1.0);
        self.weights = break_sticks(&proportions);
        Ok(())
    }
}
