//! Statistical checks of the IBS estimator against its closed-form moments.
//!
//! Every check uses a fixed seed and a tolerance of several standard errors,
//! so the outcomes are deterministic and far from the rejection boundary.

use ibs_core::{
    ibs_analytical_mean, ibs_analytical_variance, BernoulliSimulator, IbsEstimator, IbsOptions,
};
use ibs_math::BackendKind;

const PROBABILITIES: [f64; 5] = [0.1, 0.2, 0.5, 0.8, 0.9];

fn estimator(repeats: u32) -> IbsEstimator<'static> {
    IbsEstimator::new(
        BackendKind::Asymptotic.backend(),
        IbsOptions::default().with_repeats(repeats),
    )
    .expect("valid options")
}

// ============================================================================
// Mean
// ============================================================================

#[test]
fn repeated_estimate_centres_on_log_p() {
    for (i, &p) in PROBABILITIES.iter().enumerate() {
        let repeats = (1000.0 / p).round() as u32;
        let mut sim = BernoulliSimulator::new(1000 + i as u64);
        let est = estimator(repeats)
            .estimate(&[()], &[true], &mut sim, &p)
            .unwrap();

        // standard error from the estimator's own variance output
        let truth = ibs_analytical_mean(&[p]).unwrap();
        let z = est.z_score(truth);
        assert!(
            z.abs() < 4.0,
            "p={p}: estimate {} vs ln p {} (z {z})",
            est.log_likelihood,
            truth
        );
    }
}

#[test]
fn multi_trial_estimate_centres_on_sum_of_logs() {
    let probabilities = [0.3, 0.6, 0.9, 0.45];
    let stimuli: Vec<f64> = probabilities.to_vec();
    let responses = vec![true; probabilities.len()];
    let repeats = 4000;

    // stimulus carries the per-trial probability
    let mut rng_sim = BernoulliSimulator::new(77);
    let mut sim = |_: &(), p: &f64| ibs_core::Simulator::simulate(&mut rng_sim, p, &());
    let est = estimator(repeats)
        .estimate(&stimuli, &responses, &mut sim, &())
        .unwrap();

    let truth = ibs_analytical_mean(&probabilities).unwrap();
    assert!(est.z_score(truth).abs() < 5.0);
}

// ============================================================================
// Variance and cost
// ============================================================================

#[test]
fn reported_variance_tracks_dilogarithm() {
    for (i, &p) in PROBABILITIES.iter().enumerate() {
        let repeats = 20_000;
        let mut sim = BernoulliSimulator::new(2000 + i as u64);
        let est = estimator(repeats)
            .estimate(&[()], &[true], &mut sim, &p)
            .unwrap();

        // R * Σv/R² is the mean per-repeat variance estimate
        let per_repeat = est.variance * f64::from(repeats);
        let expected = ibs_analytical_variance(&[p]).unwrap();
        assert!(
            (per_repeat - expected).abs() < 0.06,
            "p={p}: mean reported variance {per_repeat} vs Li2(1-p) {expected}"
        );
    }
}

#[test]
fn sample_cost_matches_geometric_mean() {
    for (i, &p) in PROBABILITIES.iter().enumerate() {
        let repeats = 5000_u32;
        let mut sim = BernoulliSimulator::new(3000 + i as u64);
        let est = estimator(repeats)
            .estimate(&[()], &[true], &mut sim, &p)
            .unwrap();

        let r = f64::from(repeats);
        let expected = r / p;
        let sd = (r * (1.0 - p)).sqrt() / p;
        assert!(
            (est.total_samples as f64 - expected).abs() < 5.0 * sd.max(1.0),
            "p={p}: {} samples, expected about {expected}",
            est.total_samples
        );
    }
}

#[test]
fn backends_agree_on_identical_draws() {
    let options = IbsOptions::default().with_repeats(50);
    let asymptotic = IbsEstimator::new(BackendKind::Asymptotic.backend(), options).unwrap();
    let series = IbsEstimator::new(BackendKind::Series.backend(), options).unwrap();

    let stimuli = vec![(); 8];
    let responses = vec![true; 8];
    let a = asymptotic
        .estimate(&stimuli, &responses, &mut BernoulliSimulator::new(5), &0.05)
        .unwrap();
    let b = series
        .estimate(&stimuli, &responses, &mut BernoulliSimulator::new(5), &0.05)
        .unwrap();

    assert_eq!(a.total_samples, b.total_samples);
    assert!((a.log_likelihood - b.log_likelihood).abs() < 1e-9);
    assert!((a.variance - b.variance).abs() < 1e-9);
}
