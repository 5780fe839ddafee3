//! Exact moments of the fixed-sample estimators against hand enumeration.

use ibs_core::{
    fixed_analytical_moments, fixed_analytical_moments_all, BernoulliSimulator, Error,
    FixedEstimator,
};
use ibs_math::SmoothingScheme;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
}

/// Binomial(4, 0.25) masses for k = 0..=4.
const MASS: [f64; 5] = [
    81.0 / 256.0,
    108.0 / 256.0,
    54.0 / 256.0,
    12.0 / 256.0,
    1.0 / 256.0,
];

fn enumerate(value: impl Fn(f64) -> f64) -> (f64, f64) {
    let mean: f64 = (0..5).map(|k| MASS[k] * value(k as f64)).sum();
    let variance: f64 = (0..5)
        .map(|k| {
            let d = value(k as f64) - mean;
            MASS[k] * d * d
        })
        .sum();
    (mean, variance)
}

#[test]
fn pseudo_count_schemes_match_enumeration() {
    let cases = [
        (SmoothingScheme::Fixed, 1.0, 1.0),
        (SmoothingScheme::Laplace, 1.0, 2.0),
        (SmoothingScheme::Jeffreys, 0.5, 1.0),
    ];
    for (scheme, alpha, beta) in cases {
        let (mean, variance) = enumerate(|k| ((k + alpha) / (4.0 + beta)).ln());
        let moments = fixed_analytical_moments(0.25, 4, scheme).unwrap();
        assert!(close(moments.mean, mean), "{scheme}: {} vs {mean}", moments.mean);
        assert!(
            close(moments.variance, variance),
            "{scheme}: {} vs {variance}",
            moments.variance
        );
    }
}

#[test]
fn clipped_scheme_matches_enumeration() {
    let (mean, variance) = enumerate(|k| (k / 4.0).clamp(1e-12, 1.0 - 1e-12).ln());
    let moments = fixed_analytical_moments(0.25, 4, SmoothingScheme::Clipped).unwrap();
    assert!(close(moments.mean, mean));
    assert!(close(moments.variance, variance));
}

#[test]
fn naive_scheme_with_reachable_zero_is_infinite() {
    let moments = fixed_analytical_moments(0.25, 4, SmoothingScheme::Naive).unwrap();
    assert_eq!(moments.mean, f64::NEG_INFINITY);
    assert_eq!(moments.variance, f64::INFINITY);
}

#[test]
fn degenerate_probabilities() {
    // p = 1: only k = M is reachable
    for scheme in SmoothingScheme::ALL {
        let moments = fixed_analytical_moments(1.0, 6, scheme).unwrap();
        assert_eq!(moments.variance, 0.0, "{scheme}");
        assert!(close(moments.mean, scheme.log_prob(6, 6).unwrap()));
    }

    // p = 0: the certain outcome is zero matches
    let naive = fixed_analytical_moments(0.0, 6, SmoothingScheme::Naive).unwrap();
    assert_eq!(naive.mean, f64::NEG_INFINITY);
    assert_eq!(naive.variance, 0.0);

    let laplace = fixed_analytical_moments(0.0, 6, SmoothingScheme::Laplace).unwrap();
    assert!(close(laplace.mean, (1.0_f64 / 8.0).ln()));
    assert_eq!(laplace.variance, 0.0);
}

#[test]
fn zero_samples() {
    let moments = fixed_analytical_moments(0.4, 0, SmoothingScheme::Laplace).unwrap();
    assert!(close(moments.mean, 0.5_f64.ln()));
    assert_eq!(moments.variance, 0.0);

    for scheme in [SmoothingScheme::Naive, SmoothingScheme::Clipped] {
        assert!(matches!(
            fixed_analytical_moments(0.4, 0, scheme),
            Err(Error::InvalidArgument(_))
        ));
    }
}

#[test]
fn trial_moments_add_across_trials() {
    let probabilities = [0.1, 0.25, 0.7];
    let total = fixed_analytical_moments_all(&probabilities, 5, SmoothingScheme::Jeffreys).unwrap();

    let mut mean = 0.0;
    let mut variance = 0.0;
    for &p in &probabilities {
        let m = fixed_analytical_moments(p, 5, SmoothingScheme::Jeffreys).unwrap();
        mean += m.mean;
        variance += m.variance;
    }
    assert!(close(total.mean, mean));
    assert!(close(total.variance, variance));
}

#[test]
fn out_of_range_probability_is_rejected() {
    for p in [-0.1, 1.5, f64::NAN] {
        assert!(fixed_analytical_moments(p, 3, SmoothingScheme::Fixed).is_err());
    }
}

#[test]
fn empirical_mean_matches_exact_mean() {
    let p = 0.35;
    let samples = 5;
    let trials = 20_000;
    let estimator = FixedEstimator::new(samples, SmoothingScheme::Laplace).unwrap();
    let stimuli = vec![(); trials];
    let responses = vec![true; trials];

    let est = estimator
        .estimate(&stimuli, &responses, &mut BernoulliSimulator::new(11), &p)
        .unwrap();
    let exact = fixed_analytical_moments(p, samples, SmoothingScheme::Laplace).unwrap();

    let empirical_mean = est.log_likelihood / trials as f64;
    let standard_error = (exact.variance / trials as f64).sqrt();
    assert!((empirical_mean - exact.mean).abs() < 5.0 * standard_error);
    assert_eq!(est.total_samples, samples * trials as u64);
}
