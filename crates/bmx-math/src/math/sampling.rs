//! Random variate helpers over an explicit generator.
//!
//! Every helper takes the caller's generator; nothing here touches a global
//! RNG, so a seeded generator reproduces a whole sweep. Parameters reaching
//! these functions have already been validated at construction time, so a
//! rejection here means non-finite values leaked into a sweep and is
//! reported as [`Error::NumericalInstability`].
//!
//! Parameterizations:
//! - `gamma(shape, rate)`: density ∝ x^(shape-1) e^(-rate·x)
//! - `inv_gamma(shape, scale)`: 1 / Gamma(shape, rate = scale)

use bmx_common::{Error, Result};
use rand::distr::Open01;
use rand::Rng;
use rand_distr::{Beta, Distribution, Gamma, Normal};

fn unstable(dist: &str, detail: impl std::fmt::Display) -> Error {
    Error::NumericalInstability(format!("cannot sample {}: {}", dist, detail))
}

/// Draw from `Normal(mean, sd^2)`.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> Result<f64> {
    if !mean.is_finite() {
        return Err(unstable("normal", format!("mean {}", mean)));
    }
    let dist = Normal::new(mean, sd).map_err(|e| unstable("normal", e))?;
    Ok(dist.sample(rng))
}

/// Draw from `Gamma(shape, rate)`.
pub fn gamma<R: Rng + ?Sized>(rng: &mut R, shape: f64, rate: f64) -> Result<f64> {
    if !(rate > 0.0 && rate.is_finite()) {
        return Err(unstable("gamma", format!("rate {}", rate)));
    }
    let dist = Gamma::new(shape, 1.0 / rate).map_err(|e| unstable("gamma", e))?;
    Ok(dist.sample(rng))
}

/// Draw from `InverseGamma(shape, scale)`.
pub fn inv_gamma<R: Rng + ?Sized>(rng: &mut R, shape: f64, scale: f64) -> Result<f64> {
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(unstable("inverse gamma", format!("scale {}", scale)));
    }
    let g = gamma(rng, shape, 1.0)?;
    Ok(scale / g)
}

/// Draw from `Beta(alpha, beta)`.
pub fn beta<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64) -> Result<f64> {
    let dist = Beta::new(alpha, beta).map_err(|e| unstable("beta", e))?;
    Ok(dist.sample(rng))
}

/// Uniform draw on the open interval (0, 1); its log is always finite.
pub fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    Open01.sample(rng)
}
