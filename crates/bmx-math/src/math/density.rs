//! Log-densities of the likelihoods and centering measures used by the
//! hierarchies.
//!
//! All functions return `NEG_INFINITY` outside the support and `NAN` for
//! invalid parameters, mirroring the boundary conventions of
//! [`super::stable`].

use super::stable::{log_gamma, LN_SQRT_2PI};

/// Log-density of `Normal(mean, sd^2)` at `x`.
pub fn normal_log_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    if x.is_nan() || mean.is_nan() || sd.is_nan() || sd <= 0.0 {
        return f64::NAN;
    }
    let z = (x - mean) / sd;
    -LN_SQRT_2PI - sd.ln() - 0.5 * z * z
}

/// Log-density of a location-scale Student-t with `df` degrees of freedom.
pub fn student_t_log_pdf(x: f64, df: f64, loc: f64, scale: f64) -> f64 {
    if x.is_nan() || df.is_nan() || loc.is_nan() || scale.is_nan() {
        return f64::NAN;
    }
    if df <= 0.0 || scale <= 0.0 {
        return f64::NAN;
    }
    let z = (x - loc) / scale;
    log_gamma(0.5 * (df + 1.0))
        - log_gamma(0.5 * df)
        - 0.5 * (df * std::f64::consts::PI).ln()
        - scale.ln()
        - 0.5 * (df + 1.0) * (z * z / df).ln_1p()
}

/// Log-density of `InverseGamma(shape, scale)` at `x`:
/// `f(x) = scale^shape / Γ(shape) * x^(-shape-1) * exp(-scale / x)`.
pub fn inv_gamma_log_pdf(x: f64, shape: f64, scale: f64) -> f64 {
    if x.is_nan() || shape.is_nan() || scale.is_nan() {
        return f64::NAN;
    }
    if shape <= 0.0 || scale <= 0.0 {
        return f64::NAN;
    }
    if x <= 0.0 {
        return f64::NEG_INFINITY;
    }
    shape * scale.ln() - log_gamma(shape) - (shape + 1.0) * x.ln() - scale / x
}

/// Log-density of `Laplace(location, scale)` at `x`.
pub fn laplace_log_pdf(x: f64, location: f64, scale: f64) -> f64 {
    if x.is_nan() || location.is_nan() || scale.is_nan() || scale <= 0.0 {
        return f64::NAN;
    }
    -(2.0 * scale).ln() - (x - location).abs() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn normal_standard_at_zero() {
        let expected = -(2.0 * std::f64::consts::PI).sqrt().ln();
        assert!(approx_eq(normal_log_pdf(0.0, 0.0, 1.0), expected, 1e-12));
    }

    #[test]
    fn normal_rejects_non_positive_sd() {
        assert!(normal_log_pdf(0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn student_t_one_df_is_cauchy() {
        // Cauchy(0, 1) at 1: 1 / (2 * pi)
        let out = student_t_log_pdf(1.0, 1.0, 0.0, 1.0);
        assert!(approx_eq(out, (1.0 / (2.0 * std::f64::consts::PI)).ln(), 1e-10));
    }

    #[test]
    fn student_t_large_df_approaches_normal() {
        let t = student_t_log_pdf(0.7, 1e7, 0.0, 1.0);
        let n = normal_log_pdf(0.7, 0.0, 1.0);
        assert!(approx_eq(t, n, 1e-5));
    }

    #[test]
    fn inv_gamma_known_value() {
        // IG(1, 1) at 1: exp(-1)
        assert!(approx_eq(inv_gamma_log_pdf(1.0, 1.0, 1.0), -1.0, 1e-12));
        assert_eq!(inv_gamma_log_pdf(-1.0, 2.0, 1.0), f64::NEG_INFINITY);
    }

    #[test]
    fn laplace_peak_value() {
        // Laplace(0, 2) at 0: 1/4
        assert!(approx_eq(laplace_log_pdf(0.0, 0.0, 2.0), 0.25f64.ln(), 1e-12));
        assert!(approx_eq(
            laplace_log_pdf(3.0, 1.0, 2.0),
            0.25f64.ln() - 1.0,
            1e-12
        ));
    }
}
