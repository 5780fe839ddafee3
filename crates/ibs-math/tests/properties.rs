//! Property-based tests for ibs-math numerical functions.
//!
//! Uses proptest to verify mathematical identities across many random inputs.

use ibs_math::binomial::{binomial_pmf, binomial_support};
use ibs_math::{
    digamma, dilogarithm, log_binomial, neumaier_sum, polygamma, trigamma, BackendKind,
    NumericBackend, TRIGAMMA_ONE,
};
use proptest::prelude::*;

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-10;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

// ============================================================================
// digamma / trigamma recurrences
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// digamma(n + 1) = digamma(n) + 1/n.
    #[test]
    fn digamma_recurrence(n in 1u64..5_000) {
        let x = n as f64;
        let lhs = digamma(x + 1.0).unwrap();
        let rhs = digamma(x).unwrap() + 1.0 / x;
        prop_assert!(approx_eq(lhs, rhs, TOL), "n={}: {} != {}", n, lhs, rhs);
    }

    /// trigamma(n + 1) = trigamma(n) - 1/n².
    #[test]
    fn trigamma_recurrence(n in 1u64..5_000) {
        let x = n as f64;
        let lhs = trigamma(x + 1.0).unwrap();
        let rhs = trigamma(x).unwrap() - 1.0 / (x * x);
        prop_assert!(approx_eq(lhs, rhs, TOL), "n={}: {} != {}", n, lhs, rhs);
    }

    /// trigamma is positive and decreasing, bounded by trigamma(1).
    #[test]
    fn trigamma_positive_decreasing(n in 1u64..10_000) {
        let x = n as f64;
        let t = polygamma(1, x).unwrap();
        prop_assert!(t > 0.0);
        prop_assert!(t <= TRIGAMMA_ONE);
        prop_assert!(polygamma(1, x + 1.0).unwrap() < t);
    }

    /// Both backends agree with the free functions.
    #[test]
    fn backends_agree(n in 1u64..20_000) {
        let x = n as f64;
        let fast = BackendKind::Asymptotic.backend();
        let reference = BackendKind::Series.backend();
        prop_assert!(approx_eq(fast.digamma(x).unwrap(), reference.digamma(x).unwrap(), 1e-11));
        prop_assert!(approx_eq(
            fast.polygamma(1, x).unwrap(),
            reference.polygamma(1, x).unwrap(),
            1e-11
        ));
    }

    /// Fractional arguments are always rejected.
    #[test]
    fn fractional_arguments_rejected(x in 0.0f64..1_000.0) {
        prop_assume!(x.fract() != 0.0);
        prop_assert!(digamma(x).is_err());
        prop_assert!(trigamma(x).is_err());
    }
}

// ============================================================================
// dilogarithm
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Li2 is increasing and non-negative on [0, 1).
    #[test]
    fn dilogarithm_monotone(x in 0.0f64..0.99) {
        let a = dilogarithm(x).unwrap();
        let b = dilogarithm(x + 0.005).unwrap();
        prop_assert!(a >= 0.0);
        prop_assert!(b > a);
    }

    /// Li2(x) + Li2(-x) = Li2(x²)/2.
    #[test]
    fn dilogarithm_duplication(x in -0.9f64..0.9) {
        let lhs = dilogarithm(x).unwrap() + dilogarithm(-x).unwrap();
        let rhs = 0.5 * dilogarithm(x * x).unwrap();
        prop_assert!(approx_eq(lhs, rhs, 1e-10), "x={}: {} != {}", x, lhs, rhs);
    }
}

// ============================================================================
// binomial support
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The pmf is a probability distribution with mean n·p.
    #[test]
    fn binomial_normalized_with_mean_np(n in 0u64..200, p in 0.0f64..=1.0) {
        let mut total = 0.0;
        let mut mean = 0.0;
        for (k, mass) in binomial_support(n, p) {
            prop_assert!(mass >= 0.0);
            total += mass;
            mean += k as f64 * mass;
        }
        prop_assert!(approx_eq(total, 1.0, 1e-9));
        prop_assert!((mean - n as f64 * p).abs() < 1e-7 * (n as f64).max(1.0));
    }

    /// Symmetry: P(k; n, p) = P(n - k; n, 1 - p).
    #[test]
    fn binomial_symmetry(n in 1u64..100, k_frac in 0.0f64..=1.0, p in 0.01f64..0.99) {
        let k = ((n as f64) * k_frac).floor() as u64;
        let a = binomial_pmf(k, n, p);
        let b = binomial_pmf(n - k, n, 1.0 - p);
        prop_assert!(approx_eq(a, b, 1e-9));
    }

    /// log C(n, k) = log C(n, n - k).
    #[test]
    fn log_binomial_symmetric(n in 0u64..1_000, k_frac in 0.0f64..=1.0) {
        let k = ((n as f64) * k_frac).floor() as u64;
        prop_assert!(approx_eq(log_binomial(n, k), log_binomial(n, n - k), 1e-9));
    }

    /// Compensated sum is order independent for finite inputs.
    #[test]
    fn neumaier_sum_order_independent(values in prop::collection::vec(-1e6f64..1e6, 0..64)) {
        let forward = neumaier_sum(&values);
        let mut reversed = values.clone();
        reversed.reverse();
        let backward = neumaier_sum(&reversed);
        prop_assert!(approx_eq(forward, backward, 1e-9));
    }
}
