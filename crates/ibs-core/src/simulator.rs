//! The simulator capability.
//!
//! A simulator maps `(parameters, stimulus)` to a response. Calls are
//! stochastic and each one consumes simulator randomness, so simulators are
//! taken by `&mut`. The estimators own no random state of their own: feeding
//! two estimator calls from one simulator gives them independent draws, and
//! re-seeding a simulator replays the exact same estimate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Anything that can draw a response for a stimulus under some parameters.
pub trait Simulator<P: ?Sized, S: ?Sized> {
    /// Response type, compared by equality against observations.
    type Response;

    /// Draw one response.
    fn simulate(&mut self, params: &P, stimulus: &S) -> Self::Response;
}

impl<P, S, R, F> Simulator<P, S> for F
where
    P: ?Sized,
    S: ?Sized,
    F: FnMut(&P, &S) -> R,
{
    type Response = R;

    fn simulate(&mut self, params: &P, stimulus: &S) -> R {
        self(params, stimulus)
    }
}

/// Bernoulli model: parameters are the success probability, stimuli are
/// ignored, and the response is `U < p` for a uniform draw `U`.
#[derive(Debug, Clone)]
pub struct BernoulliSimulator {
    rng: StdRng,
}

impl BernoulliSimulator {
    pub fn new(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(rng: StdRng) -> Self {
        BernoulliSimulator { rng }
    }
}

impl<S: ?Sized> Simulator<f64, S> for BernoulliSimulator {
    type Response = bool;

    fn simulate(&mut self, p: &f64, _stimulus: &S) -> bool {
        self.rng.random::<f64>() < *p
    }
}

/// Derive the seed of run `index` from a base seed.
///
/// SplitMix64 finalizer over `base + index`, so neighbouring runs (and the
/// base seed itself) get unrelated streams.
pub fn derive_seed(base: u64, index: u64) -> u64 {
    let mut z = base
        .wrapping_add(index.wrapping_add(1))
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_a_simulator() {
        let mut calls = 0_u32;
        let mut sim = |p: &u32, s: &u32| {
            calls += 1;
            p + s
        };
        assert_eq!(sim.simulate(&2, &3), 5);
        assert_eq!(sim.simulate(&1, &1), 2);
        drop(sim);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_bernoulli_is_reproducible() {
        let mut a = BernoulliSimulator::new(42);
        let mut b = BernoulliSimulator::new(42);
        let da: Vec<bool> = (0..64).map(|_| a.simulate(&0.5, &())).collect();
        let db: Vec<bool> = (0..64).map(|_| b.simulate(&0.5, &())).collect();
        assert_eq!(da, db);
    }

    #[test]
    fn test_bernoulli_degenerate_probabilities() {
        let mut sim = BernoulliSimulator::new(7);
        assert!((0..100).all(|_| sim.simulate(&1.0, &())));
        assert!((0..100).all(|_| !sim.simulate(&0.0, &())));
    }

    #[test]
    fn test_bernoulli_rate() {
        let mut sim = BernoulliSimulator::new(11);
        let n = 20_000;
        let hits = (0..n).filter(|_| sim.simulate(&0.3, &())).count();
        let rate = hits as f64 / n as f64;
        assert!((rate - 0.3).abs() < 0.02, "rate {}", rate);
    }

    #[test]
    fn test_derive_seed_distinct() {
        let seeds: std::collections::HashSet<u64> = (0..1000).map(|i| derive_seed(123, i)).collect();
        assert_eq!(seeds.len(), 1000);
        assert_ne!(derive_seed(123, 0), 123);
        assert_eq!(derive_seed(5, 9), derive_seed(5, 9));
    }
}
