//! Property-based tests for bmx-math numerical functions.
//!
//! Uses proptest to verify mathematical properties hold across many random inputs.

use bmx_math::{
    inv_gamma_log_pdf, laplace_log_pdf, log_add_exp, log_gamma, log_sum_exp, normal_log_pdf,
    TriangularMemoizer,
};
use proptest::prelude::*;

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-10;

/// Looser tolerance for log_gamma, whose series carries truncation error.
const LGAMMA_TOL: f64 = 1e-8;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    if a.is_infinite() && b.is_infinite() {
        return a.signum() == b.signum();
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

// ============================================================================
// log-domain sums
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn log_sum_exp_commutative(a in -100.0..100.0f64, b in -100.0..100.0f64) {
        let ab = log_sum_exp(&[a, b]);
        let ba = log_sum_exp(&[b, a]);
        prop_assert!(approx_eq(ab, ba, TOL), "lse([{},{}])={} != {}", a, b, ab, ba);
    }

    #[test]
    fn log_add_exp_matches_log_sum_exp(a in -100.0..100.0f64, b in -100.0..100.0f64) {
        let lae = log_add_exp(a, b);
        let lse = log_sum_exp(&[a, b]);
        prop_assert!(approx_eq(lae, lse, TOL));
    }

    #[test]
    fn log_sum_exp_no_overflow(a in 500.0..700.0f64, b in 500.0..700.0f64) {
        let result = log_sum_exp(&[a, b]);
        prop_assert!(result.is_finite());
        prop_assert!(result >= a.max(b) - TOL);
    }
}

// ============================================================================
// log_gamma
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Γ(x + 1) = x Γ(x).
    #[test]
    fn log_gamma_recurrence(x in 0.1..50.0f64) {
        let lhs = log_gamma(x + 1.0);
        let rhs = x.ln() + log_gamma(x);
        prop_assert!(approx_eq(lhs, rhs, LGAMMA_TOL), "x={} lhs={} rhs={}", x, lhs, rhs);
    }
}

// ============================================================================
// densities
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn normal_symmetric_about_mean(mean in -10.0..10.0f64, sd in 0.1..5.0f64, d in 0.0..5.0f64) {
        let left = normal_log_pdf(mean - d, mean, sd);
        let right = normal_log_pdf(mean + d, mean, sd);
        prop_assert!(approx_eq(left, right, TOL));
    }

    #[test]
    fn laplace_decreases_away_from_location(loc in -10.0..10.0f64, b in 0.1..5.0f64, d in 0.01..5.0f64) {
        prop_assert!(laplace_log_pdf(loc + d, loc, b) < laplace_log_pdf(loc, loc, b));
    }

    #[test]
    fn inv_gamma_finite_on_support(x in 0.01..100.0f64, shape in 0.5..10.0f64, scale in 0.1..10.0f64) {
        prop_assert!(inv_gamma_log_pdf(x, shape, scale).is_finite());
    }
}

// ============================================================================
// triangular recurrences
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The cached table satisfies the defining Stirling recurrence.
    #[test]
    fn stirling_satisfies_recurrence(n in 2usize..120, k_frac in 0.0..1.0f64) {
        let s = TriangularMemoizer::stirling_first_kind();
        let k = 1 + ((n - 1) as f64 * k_frac) as usize;
        let lhs = s.ln_evaluate(n, k);
        let stay = ((n - 1) as f64).ln() + s.ln_evaluate(n - 1, k);
        let rhs = log_add_exp(stay, s.ln_evaluate(n - 1, k - 1));
        prop_assert!(approx_eq(lhs, rhs, 1e-9), "n={} k={} lhs={} rhs={}", n, k, lhs, rhs);
    }

    /// C(n, 1; σ) = σ (1 - σ)_{n-1}.
    #[test]
    fn generalized_factorial_first_column(n in 1usize..60, sigma in 0.05..0.95f64) {
        let c = TriangularMemoizer::generalized_factorial(sigma).unwrap();
        let expected = sigma.ln() + (1..n).map(|i| (i as f64 - sigma).ln()).sum::<f64>();
        prop_assert!(approx_eq(c.ln_evaluate(n, 1), expected, 1e-9));
    }
}
