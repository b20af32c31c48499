//! Log-domain arithmetic for mixture weights and normalising constants.
//!
//! Assignment probabilities, cluster-count priors and Metropolis ratios are
//! all carried as logarithms; these helpers keep sums and gamma-function
//! ratios finite where the natural-scale values would overflow.
//!
//! Boundary conventions: an empty or all `-inf` sum is `-inf`, any `NaN`
//! input propagates, and `+inf` absorbs.

/// `0.5 · ln(2π)`.
pub(crate) const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

/// Arguments below this are shifted up by the recurrence before the
/// asymptotic series is applied.
const SERIES_THRESHOLD: f64 = 10.0;

/// Rising factorials up to this length are summed term by term.
const EXACT_RISING_TERMS: usize = 64;

/// `ln Σ exp(v)` in one pass, rescaling the running sum whenever a larger
/// maximum appears.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let mut max = f64::NEG_INFINITY;
    let mut scaled = 0.0;
    for &v in values {
        if v.is_nan() {
            return f64::NAN;
        }
        if v == f64::INFINITY {
            return f64::INFINITY;
        }
        if v == f64::NEG_INFINITY {
            continue;
        }
        if v <= max {
            scaled += (v - max).exp();
        } else {
            scaled = scaled * (max - v).exp() + 1.0;
            max = v;
        }
    }
    if max == f64::NEG_INFINITY {
        f64::NEG_INFINITY
    } else {
        max + scaled.ln()
    }
}

/// `ln(exp(a) + exp(b))`.
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if lo == f64::NEG_INFINITY || hi == f64::INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

/// Shift log-weights in place so their exponentials sum to one, returning
/// the log normaliser. All `-inf` weights are left as they are.
pub fn log_normalize(values: &mut [f64]) -> f64 {
    let total = log_sum_exp(values);
    if total.is_finite() {
        values.iter_mut().for_each(|v| *v -= total);
    }
    total
}

/// `ln Γ(x)` for `x > 0`; `NaN` elsewhere.
///
/// Small arguments are raised past [`SERIES_THRESHOLD`] with
/// `Γ(x) = Γ(x + 1) / x`, then Stirling's series is truncated after the
/// `x⁻⁹` term (absolute error below 1e-13).
pub fn log_gamma(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    if x == f64::INFINITY {
        return f64::INFINITY;
    }

    let mut z = x;
    let mut ln_shift = 0.0;
    while z < SERIES_THRESHOLD {
        ln_shift += z.ln();
        z += 1.0;
    }

    let inv = 1.0 / z;
    let inv2 = inv * inv;
    // Bernoulli coefficients B_2k / (2k(2k − 1)).
    let correction = inv
        * (1.0 / 12.0
            + inv2
                * (-1.0 / 360.0
                    + inv2 * (1.0 / 1260.0 + inv2 * (-1.0 / 1680.0 + inv2 * (1.0 / 1188.0)))));
    (z - 0.5) * z.ln() - z + LN_SQRT_2PI + correction - ln_shift
}

/// `ln (x)_n = ln Γ(x + n) − ln Γ(x)`, the normaliser of the Dirichlet
/// and Pitman–Yor predictive rules after `n` draws.
pub fn log_rising_factorial(x: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    if n <= EXACT_RISING_TERMS {
        (0..n).map(|i| (x + i as f64).ln()).sum()
    } else {
        log_gamma(x + n as f64) - log_gamma(x)
    }
}
