//! Binomial distribution over match counts.
//!
//! A fixed-sample estimator that draws `n` simulator samples with per-draw
//! match probability `p` sees `k ~ Binomial(n, p)` matches. Exact moments of
//! any estimator `f(k)` follow from enumerating the full support `k = 0..=n`.

use super::stable::log_binomial;

/// Binomial probability mass `C(n,k) p^k (1-p)^(n-k)`.
///
/// Evaluated in the log domain so large `n` does not overflow the
/// coefficient. Returns NAN when `p` is not a probability.
pub fn binomial_pmf(k: u64, n: u64, p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if k > n {
        return 0.0;
    }
    if p == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if p == 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }
    let kf = k as f64;
    let nf = n as f64;
    (log_binomial(n, k) + kf * p.ln() + (nf - kf) * (-p).ln_1p()).exp()
}

/// Iterator over `(k, P(K = k))` for `K ~ Binomial(n, p)`.
#[derive(Debug, Clone)]
pub struct BinomialSupport {
    n: u64,
    p: f64,
    next: u64,
    done: bool,
}

impl Iterator for BinomialSupport {
    type Item = (u64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let k = self.next;
        if k == self.n {
            self.done = true;
        } else {
            self.next += 1;
        }
        Some((k, binomial_pmf(k, self.n, self.p)))
    }
}

/// Enumerate the full binomial support, including zero-mass points.
pub fn binomial_support(n: u64, p: f64) -> BinomialSupport {
    BinomialSupport {
        n,
        p,
        next: 0,
        done: false,
    }
}
