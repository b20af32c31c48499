//! Dirichlet process with total mass `M`.
//!
//! ```text
//! P(existing cluster j) = n_j / (n + M)
//! P(new cluster)        = M   / (n + M)
//! P(K_n = k)            = Γ(M) / Γ(M + n) · |s(n, k)| · M^k
//! ```
//!
//! `M` is either fixed or carries a Gamma(shape, rate) hyperprior and is
//! resampled with the Escobar–West auxiliary-variable step.

use bmx_common::{Error, Result};
use bmx_config::validate::{require_positive, validate_gamma_params};
use bmx_config::GammaParams;
use bmx_math::{log_rising_factorial, sampling, TriangularMemoizer};
use rand::RngCore;
use tracing::{debug, warn};

use super::{structural_cluster_probability, MassScale, MixingProcess};
use crate::logging::event_names;

#[derive(Debug, Clone, Copy, PartialEq)]
enum TotalMass {
    Fixed(f64),
    Random { current: f64, prior: GammaParams },
}

#[derive(Debug)]
pub struct DirichletProcess {
    mass: TotalMass,
    stirling: TriangularMemoizer,
}

impl DirichletProcess {
    /// Fixed total mass `M > 0`.
    pub fn new(total_mass: f64) -> Result<Self> {
        require_positive("total_mass", total_mass)?;
        Ok(Self {
            mass: TotalMass::Fixed(total_mass),
            stirling: TriangularMemoizer::stirling_first_kind(),
        })
    }

    /// Random total mass under `Gamma(shape, rate)`, started at the prior mean.
    pub fn with_mass_prior(prior: GammaParams) -> Result<Self> {
        validate_gamma_params("total_mass_prior", &prior)?;
        Ok(Self {
            mass: TotalMass::Random {
                current: prior.mean(),
                prior,
            },
            stirling: TriangularMemoizer::stirling_first_kind(),
        })
    }

    /// Current total mass.
    pub fn total_mass(&self) -> f64 {
        match self.mass {
            TotalMass::Fixed(m) => m,
            TotalMass::Random { current, .. } => current,
        }
    }

    pub fn has_mass_prior(&self) -> bool {
        matches!(self.mass, TotalMass::Random { .. })
    }

    /// Mass used for the cluster-count prior. A random mass is replaced by
    /// its prior mean.
    fn prior_mass(&self) -> f64 {
        match self.mass {
            TotalMass::Fixed(m) => m,
            TotalMass::Random { prior, .. } => {
                let mean = prior.mean();
                warn!(
                    event = event_names::MASS_SUBSTITUTED,
                    substituted = mean,
                    "total mass is random; cluster-count prior uses the hyperprior mean"
                );
                mean
            }
        }
    }
}

impl MixingProcess for DirichletProcess {
    fn name(&self) -> &'static str {
        "dirichlet"
    }

    fn is_conditional(&self) -> bool {
        false
    }

    fn state(&self) -> Vec<f64> {
        vec![self.total_mass()]
    }

    fn prior_cluster_distribution(&self, grid: &[usize], n: usize) -> Result<Vec<f64>> {
        let mass = self.prior_mass();
        let ln_mass = mass.ln();
        let ln_norm = -log_rising_factorial(mass, n);
        Ok(grid
            .iter()
            .map(|&k| {
                structural_cluster_probability(k, n).unwrap_or_else(|| {
                    (ln_norm + self.stirling.ln_evaluate(n, k) + k as f64 * ln_mass).exp()
                })
            })
            .collect())
    }

    fn existing_cluster_mass(
        &self,
        n: usize,
        _n_clusters: usize,
        hier_card: usize,
        scale: MassScale,
    ) -> Result<f64> {
        Ok(scale.apply(hier_card as f64, n as f64 + self.total_mass()))
    }

    fn new_cluster_mass(&self, n: usize, _n_clusters: usize, scale: MassScale) -> Result<f64> {
        let mass = self.total_mass();
        Ok(scale.apply(mass, n as f64 + mass))
    }

    /// Escobar–West: `η ~ Beta(M + 1, n)`, then `M` from a two-component
    /// Gamma mixture with rate `b − ln η`.
    fn update_state(&mut self, cluster_sizes: &[usize], rng: &mut dyn RngCore) -> Result<()> {
        let TotalMass::Random { current, prior } = self.mass else {
            return Ok(());
        };
        let n: usize = cluster_sizes.iter().sum();
        if n == 0 {
            return Ok(());
        }
        let k = cluster_sizes.iter().filter(|&&size| size > 0).count() as f64;

        let eta = sampling::beta(rng, current + 1.0, n as f64)?;
        let rate = prior.rate - eta.ln();
        let odds = (prior.shape + k - 1.0) / (n as f64 * rate);
        let weight = odds / (1.0 + odds);
        let shape = if sampling::open_unit(rng) < weight {
            prior.shape + k
        } else {
            prior.shape + k - 1.0
        };
        let updated = sampling::gamma(rng, shape, rate)?;
        if !(updated.is_finite() && updated > 0.0) {
            return Err(Error::NumericalInstability(format!(
                "total mass update produced {}",
                updated
            )));
        }

        self.mass = TotalMass::Random {
            current: updated,
            prior,
        };
        debug!(
            event = event_names::MASS_UPDATED,
            previous = current,
            total_mass = updated,
            clusters = k,
            n,
            "dirichlet total mass resampled"
        );
        Ok(())
    }
}
