//! Pitman–Yor process with strength `θ > 0` and discount `σ ∈ (0, 1)`.
//!
//! ```text
//! P(existing cluster j) = (n_j − σ)   / (n + θ)
//! P(new cluster)        = (θ + k σ)   / (n + θ)
//! P(K_n = k)            = exp(V(n, k) + ln C(n, k; σ) − k ln σ)
//! V(n, k)               = Σ_{l<k} ln(θ + lσ) − ln (θ)_n
//! ```

use bmx_common::{Error, Result};
use bmx_config::validate::require_positive;
use bmx_math::{log_rising_factorial, TriangularMemoizer};
use rand::RngCore;

use super::{structural_cluster_probability, MassScale, MixingProcess};

#[derive(Debug)]
pub struct PitmanYorProcess {
    strength: f64,
    discount: f64,
    factorials: TriangularMemoizer,
}

impl PitmanYorProcess {
    pub fn new(strength: f64, discount: f64) -> Result<Self> {
        require_positive("strength", strength)?;
        if !(discount > 0.0 && discount < 1.0) {
            return Err(Error::invalid_parameter(
                "discount",
                format!("must be in (0, 1), got {}", discount),
            ));
        }
        Ok(Self {
            strength,
            discount,
            factorials: TriangularMemoizer::generalized_factorial(discount)?,
        })
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }
}

impl MixingProcess for PitmanYorProcess {
    fn name(&self) -> &'static str {
        "pitman_yor"
    }

    fn is_conditional(&self) -> bool {
        false
    }

    fn state(&self) -> Vec<f64> {
        vec![self.strength, self.discount]
    }

    fn prior_cluster_distribution(&self, grid: &[usize], n: usize) -> Result<Vec<f64>> {
        let (theta, sigma) = (self.strength, self.discount);
        let ln_norm = log_rising_factorial(theta, n);
        let ln_sigma = sigma.ln();
        Ok(grid
            .iter()
            .map(|&k| {
                structural_cluster_probability(k, n).unwrap_or_else(|| {
                    let ln_v: f64 = (0..k)
                        .map(|l| (theta + l as f64 * sigma).ln())
                        .sum::<f64>()
                        - ln_norm;
                    (ln_v + self.factorials.ln_evaluate(n, k) - k as f64 * ln_sigma).exp()
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
        let numerator = if hier_card == 0 {
            0.0
        } else {
            hier_card as f64 - self.discount
        };
        Ok(scale.apply(numerator, n as f64 + self.strength))
    }

    fn new_cluster_mass(&self, n: usize, n_clusters: usize, scale: MassScale) -> Result<f64> {
        let numerator = self.strength + n_clusters as f64 * self.discount;
        Ok(scale.apply(numerator, n as f64 + self.strength))
    }

    fn update_state(&mut self, _cluster_sizes: &[usize], _rng: &mut dyn RngCore) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_parameters() {
        assert!(PitmanYorProcess::new(0.0, 0.5).is_err());
        assert!(PitmanYorProcess::new(1.0, 0.0).is_err());
        assert!(PitmanYorProcess::new(1.0, 1.0).is_err());
        assert!(PitmanYorProcess::new(1.0, 0.5).is_ok());
    }

    #[test]
    fn masses_sum_to_one() {
        let py = PitmanYorProcess::new(1.3, 0.4).unwrap();
        let sizes = [5usize, 1, 2, 2];
        let n: usize = sizes.iter().sum();
        let k = sizes.len();
        let total: f64 = sizes
            .iter()
            .map(|&c| py.existing_cluster_mass(n, k, c, MassScale::LINEAR).unwrap())
            .sum::<f64>()
            + py.new_cluster_mass(n, k, MassScale::LINEAR).unwrap();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_cluster_has_zero_mass() {
        let py = PitmanYorProcess::new(1.0, 0.3).unwrap();
        assert_eq!(
            py.existing_cluster_mass(4, 2, 0, MassScale::LINEAR).unwrap(),
            0.0
        );
        assert_eq!(
            py.existing_cluster_mass(4, 2, 0, MassScale::LOG).unwrap(),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn two_observation_closed_form() {
        let (theta, sigma) = (0.8, 0.25);
        let py = PitmanYorProcess::new(theta, sigma).unwrap();
        let p = py.prior_cluster_distribution(&[1, 2], 2).unwrap();
        assert!((p[0] - (1.0 - sigma) / (theta + 1.0)).abs() < 1e-10);
        assert!((p[1] - (theta + sigma) / (theta + 1.0)).abs() < 1e-10);
    }

    #[test]
    fn mixing_weights_unsupported() {
        let py = PitmanYorProcess::new(1.0, 0.5).unwrap();
        assert!(matches!(
            py.mixing_weights(MassScale::LINEAR),
            Err(Error::Unsupported { .. })
        ));
    }
}
