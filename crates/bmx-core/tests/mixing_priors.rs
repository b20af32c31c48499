//! Property-based tests for mixing-process invariants.
//!
//! Covers:
//! - Marginal assignment masses form a probability vector
//! - Cluster-count priors sum to one over k = 1..n
//! - Dirichlet process expected cluster count
//! - Stick-breaking Monte Carlo determinism

use bmx_config::BetaParams;
use bmx_core::{DirichletProcess, MassScale, MixingProcess, PitmanYorProcess, StickBreaking};
use bmx_math::log_sum_exp;
use proptest::prelude::*;

fn partition_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..40, 1..12)
}

fn assignment_masses(
    process: &dyn MixingProcess,
    sizes: &[usize],
    scale: MassScale,
) -> Vec<f64> {
    let n: usize = sizes.iter().sum();
    let k = sizes.len();
    let mut masses: Vec<f64> = sizes
        .iter()
        .map(|&c| process.existing_cluster_mass(n, k, c, scale).unwrap())
        .collect();
    masses.push(process.new_cluster_mass(n, k, scale).unwrap());
    masses
}

proptest! {
    #[test]
    fn dp_masses_are_a_distribution(mass in 0.01f64..50.0, sizes in partition_strategy()) {
        let dp = DirichletProcess::new(mass).unwrap();
        let linear = assignment_masses(&dp, &sizes, MassScale::LINEAR);
        prop_assert!(linear.iter().all(|m| *m >= 0.0));
        prop_assert!((linear.iter().sum::<f64>() - 1.0).abs() < 1e-10);

        let log = assignment_masses(&dp, &sizes, MassScale::LOG);
        prop_assert!(log_sum_exp(&log).abs() < 1e-10);
    }

    #[test]
    fn py_masses_are_a_distribution(
        strength in 0.01f64..20.0,
        discount in 0.01f64..0.99,
        sizes in partition_strategy(),
    ) {
        let py = PitmanYorProcess::new(strength, discount).unwrap();
        let linear = assignment_masses(&py, &sizes, MassScale::LINEAR);
        prop_assert!(linear.iter().all(|m| *m >= 0.0));
        prop_assert!((linear.iter().sum::<f64>() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn unnormalized_masses_share_a_normalizer(mass in 0.1f64..10.0, sizes in partition_strategy()) {
        let dp = DirichletProcess::new(mass).unwrap();
        let linear = assignment_masses(&dp, &sizes, MassScale::LINEAR);
        let raw = assignment_masses(
            &dp,
            &sizes,
            MassScale { log: false, unnormalized: true },
        );
        let total: f64 = raw.iter().sum();
        for (p, r) in linear.iter().zip(&raw) {
            prop_assert!((p - r / total).abs() < 1e-10);
        }
    }

    #[test]
    fn dp_cluster_prior_sums_to_one(mass in 0.05f64..20.0, n in 1usize..120) {
        let dp = DirichletProcess::new(mass).unwrap();
        let grid: Vec<usize> = (0..=n + 1).collect();
        let p = dp.prior_cluster_distribution(&grid, n).unwrap();
        prop_assert_eq!(p[0], 0.0);
        prop_assert_eq!(p[n + 1], 0.0);
        prop_assert!(p.iter().all(|v| v.is_finite() && *v >= 0.0));
        prop_assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-8);
    }

    #[test]
    fn py_cluster_prior_sums_to_one(
        strength in 0.1f64..10.0,
        discount in 0.05f64..0.95,
        n in 1usize..80,
    ) {
        let py = PitmanYorProcess::new(strength, discount).unwrap();
        let grid: Vec<usize> = (1..=n).collect();
        let p = py.prior_cluster_distribution(&grid, n).unwrap();
        prop_assert!(p.iter().all(|v| v.is_finite() && *v >= 0.0));
        prop_assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    }
}

#[test]
fn dp_expected_cluster_count() {
    // E[K_n] = Σ_{i<n} M / (M + i)
    for (mass, n) in [(0.5, 10usize), (1.0, 50), (4.0, 200)] {
        let dp = DirichletProcess::new(mass).unwrap();
        let grid: Vec<usize> = (1..=n).collect();
        let p = dp.prior_cluster_distribution(&grid, n).unwrap();
        let expected: f64 = grid.iter().zip(&p).map(|(k, pk)| *k as f64 * pk).sum();
        let closed: f64 = (0..n).map(|i| mass / (mass + i as f64)).sum();
        assert!(
            (expected - closed).abs() < 1e-6,
            "M={} n={}: {} vs {}",
            mass,
            n,
            expected,
            closed
        );
    }
}

#[test]
fn dp_large_n_stays_finite() {
    let dp = DirichletProcess::new(2.0).unwrap();
    let n = 1000;
    let grid: Vec<usize> = (1..=n).collect();
    let p = dp.prior_cluster_distribution(&grid, n).unwrap();
    assert!(p.iter().all(|v| v.is_finite()));
    assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-6);
}

#[test]
fn py_single_observation() {
    let py = PitmanYorProcess::new(2.0, 0.5).unwrap();
    assert_eq!(py.prior_cluster_distribution(&[0, 1, 2], 1).unwrap(), vec![0.0, 1.0, 0.0]);
}

#[test]
fn stick_breaking_prior_is_seed_deterministic() {
    let sticks = vec![
        BetaParams {
            alpha: 1.0,
            beta: 2.0
        };
        6
    ];
    let grid: Vec<usize> = (1..=6).collect();

    let a = StickBreaking::new(sticks.clone(), 2_000, 17).unwrap();
    let b = StickBreaking::new(sticks.clone(), 2_000, 17).unwrap();
    let pa = a.prior_cluster_distribution(&grid, 20).unwrap();
    let pb = b.prior_cluster_distribution(&grid, 20).unwrap();
    assert_eq!(pa, pb);
    assert_eq!(pa, a.prior_cluster_distribution(&grid, 20).unwrap());
    assert!((pa.iter().sum::<f64>() - 1.0).abs() < 1e-12);

    let other = StickBreaking::new(sticks, 2_000, 18).unwrap();
    assert_ne!(pa, other.prior_cluster_distribution(&grid, 20).unwrap());
}

#[test]
fn stick_breaking_caps_cluster_count() {
    let sticks = vec![
        BetaParams {
            alpha: 1.0,
            beta: 1.0
        };
        3
    ];
    let sb = StickBreaking::new(sticks, 500, 4).unwrap();
    let p = sb.prior_cluster_distribution(&[4, 5, 100], 50).unwrap();
    assert_eq!(p, vec![0.0, 0.0, 0.0]);
}
