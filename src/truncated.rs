//! Left-truncated count distributions.
//!
//! [`Truncated`] conditions a baseline distribution on `X > boundary`;
//! `boundary = 0` gives the zero-truncated Poisson / negative binomial
//! used for positive-only counts.
//!
//! # Sampling
//!
//! The textbook recipe draws `u ~ Uniform(F(b), 1)` and returns `F⁻¹(u)`.
//! Here the same event is evaluated on the survival scale: with
//! `tail = S(b)` and `w ~ Uniform(0, 1)`, return the smallest `x` with
//! `S(x) ≤ tail·(1 − w)`. This keeps full precision when `F(b)` is close
//! to 1, and the result is always above the boundary.

use crate::config::SamplerConfig;
use crate::discrete::{
    normal_start, require_quantile_probability, search_smallest, DiscreteDistribution,
};
use crate::error::{Result, SamplingError};

/// Baseline distribution restricted to `{boundary + 1, boundary + 2, ...}`.
///
/// # Examples
/// ```
/// use count_sampler::discrete::{DiscreteDistribution, Poisson};
/// use count_sampler::truncated::Truncated;
/// let ztp = Truncated::zero(Poisson::new(2.0).unwrap()).unwrap();
/// assert_eq!(ztp.pmf(0), 0.0);
/// // E[X | X > 0] = λ / (1 − e^(−λ))
/// let expected = 2.0 / (1.0 - (-2.0_f64).exp());
/// assert!((ztp.mean() - expected).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Truncated<D> {
    base: D,
    boundary: u64,
    /// Baseline P(X ≤ boundary).
    excluded: f64,
    /// Baseline P(X > boundary).
    tail: f64,
    mean: f64,
    variance: f64,
}

impl<D: DiscreteDistribution> Truncated<D> {
    /// Truncates `base` at `boundary` with the default tail-mass floor.
    ///
    /// # Errors
    /// `InvalidParameter` if the baseline has (numerically) no mass above
    /// the boundary.
    pub fn new(base: D, boundary: u64) -> Result<Self> {
        Self::with_min_tail_mass(base, boundary, SamplerConfig::DEFAULT_MIN_TAIL_MASS)
    }

    /// Zero-truncated version of `base`.
    pub fn zero(base: D) -> Result<Self> {
        Self::new(base, 0)
    }

    /// Truncates `base` at `boundary`, rejecting rates whose tail mass above
    /// the boundary is at or below `min_tail_mass`.
    ///
    /// The moments are computed here, in one pass over `1..=boundary`, so
    /// quantiles and draws never revisit the excluded range.
    pub fn with_min_tail_mass(base: D, boundary: u64, min_tail_mass: f64) -> Result<Self> {
        let tail = base.sf(boundary);
        if !tail.is_finite() || tail <= min_tail_mass {
            return Err(SamplingError::InvalidParameter(format!(
                "truncation at {boundary} leaves tail mass {tail} (minimum {min_tail_mass}); \
                 the rate is too small for a meaningful truncated draw"
            )));
        }
        if tail < 1e-6 {
            log::debug!("truncation at {boundary} keeps only {tail:e} of the baseline mass");
        }
        let (m1, m2) = excluded_moments(&base, boundary);
        let base_mean = base.mean();
        let mean = (base_mean - m1) / tail;
        let second = (base.variance() + base_mean * base_mean - m2) / tail;
        Ok(Self {
            excluded: base.cdf(boundary),
            base,
            boundary,
            tail,
            mean,
            variance: (second - mean * mean).max(0.0),
        })
    }

    pub fn base(&self) -> &D {
        &self.base
    }

    pub fn boundary(&self) -> u64 {
        self.boundary
    }

    /// Baseline mass at or below the boundary, `F(boundary)`.
    pub fn excluded_mass(&self) -> f64 {
        self.excluded
    }

    /// Baseline mass above the boundary, `S(boundary)`.
    pub fn tail_mass(&self) -> f64 {
        self.tail
    }
}

/// Σ_{k ≤ boundary} kʲ · P_base(k) for j = 1, 2.
fn excluded_moments<D: DiscreteDistribution>(base: &D, boundary: u64) -> (f64, f64) {
    (1..=boundary).fold((0.0, 0.0), |(m1, m2), k| {
        let w = base.pmf(k);
        let kf = k as f64;
        (m1 + kf * w, m2 + kf * kf * w)
    })
}

impl<D: DiscreteDistribution> DiscreteDistribution for Truncated<D> {
    fn ln_pmf(&self, k: u64) -> f64 {
        if k <= self.boundary {
            return f64::NEG_INFINITY;
        }
        self.base.ln_pmf(k) - self.tail.ln()
    }

    fn cdf(&self, k: u64) -> f64 {
        if k <= self.boundary {
            return 0.0;
        }
        1.0 - self.sf(k)
    }

    fn sf(&self, k: u64) -> f64 {
        if k <= self.boundary {
            return 1.0;
        }
        (self.base.sf(k) / self.tail).min(1.0)
    }

    fn mean(&self) -> f64 {
        self.mean
    }

    fn variance(&self) -> f64 {
        self.variance
    }

    /// Smallest `k > boundary` with `S_base(k) ≤ S_base(boundary)·(1 − p)`.
    fn quantile(&self, p: f64) -> Result<u64> {
        require_quantile_probability(p)?;
        let target = self.tail * (1.0 - p);
        let first = self.boundary + 1;
        let start = normal_start(self.mean, self.variance, p).max(first);
        search_smallest(start, |k| k >= first && self.base.sf(k) <= target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discrete::{NegativeBinomial, Poisson};
    use crate::random::create_rng;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    #[test]
    fn test_zero_truncated_poisson_pmf() {
        let lambda = 5.0_f64;
        let ztp = Truncated::zero(Poisson::new(lambda).unwrap()).unwrap();
        let p0 = (-lambda).exp();
        assert_eq!(ztp.pmf(0), 0.0);
        let expected = lambda * p0 / (1.0 - p0);
        assert_relative_eq!(ztp.pmf(1), expected, max_relative = 1e-10);
        let total: f64 = (0..80).map(|k| ztp.pmf(k)).sum();
        assert!((total - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_boundary_one() {
        let t = Truncated::new(Poisson::new(3.0).unwrap(), 1).unwrap();
        assert_eq!(t.pmf(0), 0.0);
        assert_eq!(t.pmf(1), 0.0);
        assert_eq!(t.cdf(1), 0.0);
        assert_eq!(t.quantile(0.0).unwrap(), 2);
        let base = Poisson::new(3.0).unwrap();
        assert_relative_eq!(t.excluded_mass(), base.pmf(0) + base.pmf(1), max_relative = 1e-12);
    }

    #[test]
    fn test_moments_zero_truncated() {
        let lambda = 2.0_f64;
        let ztp = Truncated::zero(Poisson::new(lambda).unwrap()).unwrap();
        let p0 = (-lambda).exp();
        let mean = lambda / (1.0 - p0);
        // Var = mean·(1 + λ − mean)
        let var = mean * (1.0 + lambda - mean);
        assert_relative_eq!(ztp.mean(), mean, max_relative = 1e-10);
        assert_relative_eq!(ztp.variance(), var, max_relative = 1e-8);
    }

    #[test]
    fn test_moments_with_boundary_match_pmf() {
        let t = Truncated::new(NegativeBinomial::new(4.0, 0.5).unwrap(), 2).unwrap();
        let (mut m1, mut m2) = (0.0, 0.0);
        for k in 0..2000_u64 {
            let w = t.pmf(k);
            m1 += k as f64 * w;
            m2 += (k * k) as f64 * w;
        }
        assert_relative_eq!(t.mean(), m1, max_relative = 1e-8);
        assert_relative_eq!(t.variance(), m2 - m1 * m1, max_relative = 1e-6);
    }

    #[test]
    fn test_degenerate_rate_rejected() {
        let err = Truncated::zero(Poisson::new(1e-14).unwrap()).unwrap_err();
        assert!(matches!(err, SamplingError::InvalidParameter(_)));
        assert!(Truncated::with_min_tail_mass(Poisson::new(0.01).unwrap(), 0, 0.5).is_err());
    }

    #[test]
    fn test_tiny_rate_still_positive() {
        let ztp = Truncated::zero(Poisson::new(1e-6).unwrap()).unwrap();
        let mut rng = create_rng(11);
        for _ in 0..1_000 {
            assert!(ztp.sample(&mut rng).unwrap() >= 1);
        }
        // Nearly all mass sits at 1.
        assert!(ztp.pmf(1) > 0.999);
    }

    #[test]
    fn test_large_rate_quantile() {
        let t = Truncated::zero(Poisson::new(10_000.0).unwrap()).unwrap();
        let k = t.quantile(0.5).unwrap();
        assert!((k as f64 - 10_000.0).abs() < 5.0, "median = {k}");
    }

    /// Poisson that counts PMF evaluations.
    struct CountingPoisson<'a> {
        inner: Poisson,
        pmf_calls: &'a Cell<usize>,
    }

    impl DiscreteDistribution for CountingPoisson<'_> {
        fn ln_pmf(&self, k: u64) -> f64 {
            self.pmf_calls.set(self.pmf_calls.get() + 1);
            self.inner.ln_pmf(k)
        }
        fn cdf(&self, k: u64) -> f64 {
            self.inner.cdf(k)
        }
        fn sf(&self, k: u64) -> f64 {
            self.inner.sf(k)
        }
        fn mean(&self) -> f64 {
            self.inner.mean()
        }
        fn variance(&self) -> f64 {
            self.inner.variance()
        }
    }

    #[test]
    fn test_large_boundary_draws_skip_excluded_range() {
        let pmf_calls = Cell::new(0);
        let base = CountingPoisson {
            inner: Poisson::new(20_000.0).unwrap(),
            pmf_calls: &pmf_calls,
        };
        let t = Truncated::new(base, 19_800).unwrap();
        assert_eq!(pmf_calls.get(), 19_800);

        let mut rng = create_rng(5);
        for _ in 0..200 {
            assert!(t.sample(&mut rng).unwrap() > 19_800);
        }
        // E[X | X > b] sits about 23 above λ here, the median about 14.
        let median = t.quantile(0.5).unwrap();
        assert!(median > 20_000 && median < 20_040, "median = {median}");
        assert!(t.mean() > 20_010.0 && t.mean() < 20_040.0, "mean = {}", t.mean());
        assert_eq!(pmf_calls.get(), 19_800);
    }

    #[test]
    fn test_quantile_consistency() {
        let t = Truncated::zero(NegativeBinomial::new(1.5, 2.0).unwrap()).unwrap();
        for &p in &[0.0, 0.05, 0.4, 0.75, 0.99] {
            let k = t.quantile(p).unwrap();
            assert!(k >= 1);
            assert!(t.cdf(k) >= p - 1e-12, "p={p}, k={k}");
            if k > 1 {
                assert!(t.cdf(k - 1) < p + 1e-12);
            }
        }
        assert!(t.quantile(2.0).is_err());
    }
}
