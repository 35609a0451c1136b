//! Two-part count models with excess zeros.
//!
//! - [`ZeroInflated`]: with probability π the observation is a structural
//!   zero, otherwise it is drawn from the baseline (which can produce
//!   zeros of its own).
//! - [`Hurdle`]: a Bernoulli gate decides zero versus positive; positives
//!   come from the zero-truncated baseline, so P(X = 0) = π exactly.
//!
//! | Model | P(X = 0) | P(X = k), k ≥ 1 |
//! |---|---|---|
//! | zero-inflated | π + (1−π)·f(0) | (1−π)·f(k) |
//! | hurdle | π | (1−π)·f(k) / (1 − f(0)) |

use rand::Rng;

use crate::config::SamplerConfig;
use crate::discrete::{require_quantile_probability, DiscreteDistribution};
use crate::error::{require_probability, Result};
use crate::random::bernoulli_unchecked;
use crate::truncated::Truncated;

// ============================================================================
// Zero-Inflated Mixture
// ============================================================================

/// Mixture of a point mass at zero (weight π) and a baseline count
/// distribution (weight 1 − π).
///
/// # Examples
/// ```
/// use count_sampler::discrete::{DiscreteDistribution, Poisson};
/// use count_sampler::inflated::ZeroInflated;
/// let zip = ZeroInflated::new(Poisson::new(2.0).unwrap(), 0.3).unwrap();
/// let expected = 0.3 + 0.7 * (-2.0_f64).exp();
/// assert!((zip.pmf(0) - expected).abs() < 1e-12);
/// assert!((zip.mean() - 1.4).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroInflated<D> {
    base: D,
    pi: f64,
}

impl<D: DiscreteDistribution> ZeroInflated<D> {
    /// # Errors
    /// `InvalidParameter` if `pi` is outside `[0, 1]`.
    pub fn new(base: D, pi: f64) -> Result<Self> {
        let pi = require_probability("zero-inflation probability", pi)?;
        Ok(Self { base, pi })
    }

    pub fn base(&self) -> &D {
        &self.base
    }

    pub fn pi(&self) -> f64 {
        self.pi
    }
}

impl<D: DiscreteDistribution> DiscreteDistribution for ZeroInflated<D> {
    fn ln_pmf(&self, k: u64) -> f64 {
        if k == 0 {
            return (self.pi + (1.0 - self.pi) * self.base.pmf(0)).ln();
        }
        (-self.pi).ln_1p() + self.base.ln_pmf(k)
    }

    fn cdf(&self, k: u64) -> f64 {
        self.pi + (1.0 - self.pi) * self.base.cdf(k)
    }

    fn sf(&self, k: u64) -> f64 {
        (1.0 - self.pi) * self.base.sf(k)
    }

    fn mean(&self) -> f64 {
        (1.0 - self.pi) * self.base.mean()
    }

    fn variance(&self) -> f64 {
        let m = self.base.mean();
        (1.0 - self.pi) * (self.base.variance() + self.pi * m * m)
    }

    fn quantile(&self, p: f64) -> Result<u64> {
        require_quantile_probability(p)?;
        if p <= self.cdf(0) {
            return Ok(0);
        }
        let inner = ((p - self.pi) / (1.0 - self.pi)).clamp(0.0, 1.0);
        self.base.quantile(inner)
    }

    /// Structural-zero indicator first, baseline draw only when it fails.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<u64>
    where
        Self: Sized,
    {
        if bernoulli_unchecked(self.pi, rng) {
            return Ok(0);
        }
        self.base.sample(rng)
    }
}

// ============================================================================
// Hurdle Model
// ============================================================================

/// Zero with probability π, otherwise a draw from the zero-truncated
/// baseline.
///
/// # Examples
/// ```
/// use count_sampler::discrete::{DiscreteDistribution, Poisson};
/// use count_sampler::inflated::Hurdle;
/// let h = Hurdle::new(Poisson::new(3.0).unwrap(), 0.4).unwrap();
/// assert!((h.pmf(0) - 0.4).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hurdle<D> {
    positive: Truncated<D>,
    pi: f64,
}

impl<D: DiscreteDistribution> Hurdle<D> {
    /// # Errors
    /// `InvalidParameter` if `pi` is outside `[0, 1]` or the baseline has no
    /// usable mass above zero.
    ///
    /// The positive part is always built, so a rate whose zero-truncated
    /// tail is below the floor is rejected even at `pi = 1`, where the
    /// positive part would never be drawn.
    pub fn new(base: D, pi: f64) -> Result<Self> {
        Self::with_min_tail_mass(base, pi, SamplerConfig::DEFAULT_MIN_TAIL_MASS)
    }

    /// [`Hurdle::new`] with an explicit tail-mass floor for the positive part.
    pub fn with_min_tail_mass(base: D, pi: f64, min_tail_mass: f64) -> Result<Self> {
        let pi = require_probability("hurdle zero probability", pi)?;
        let positive = Truncated::with_min_tail_mass(base, 0, min_tail_mass)?;
        Ok(Self { positive, pi })
    }

    /// Zero-truncated positive part.
    pub fn positive(&self) -> &Truncated<D> {
        &self.positive
    }

    pub fn pi(&self) -> f64 {
        self.pi
    }
}

impl<D: DiscreteDistribution> DiscreteDistribution for Hurdle<D> {
    fn ln_pmf(&self, k: u64) -> f64 {
        if k == 0 {
            return self.pi.ln();
        }
        (-self.pi).ln_1p() + self.positive.ln_pmf(k)
    }

    fn cdf(&self, k: u64) -> f64 {
        self.pi + (1.0 - self.pi) * self.positive.cdf(k)
    }

    fn sf(&self, k: u64) -> f64 {
        (1.0 - self.pi) * self.positive.sf(k)
    }

    fn mean(&self) -> f64 {
        (1.0 - self.pi) * self.positive.mean()
    }

    fn variance(&self) -> f64 {
        let m = self.positive.mean();
        (1.0 - self.pi) * (self.positive.variance() + self.pi * m * m)
    }

    fn quantile(&self, p: f64) -> Result<u64> {
        require_quantile_probability(p)?;
        if p <= self.pi {
            return Ok(0);
        }
        let inner = ((p - self.pi) / (1.0 - self.pi)).clamp(0.0, 1.0);
        self.positive.quantile(inner)
    }

    /// Gate `g ~ Bernoulli(1 − π)`; a positive draw only when `g = 1`.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<u64>
    where
        Self: Sized,
    {
        if !bernoulli_unchecked(1.0 - self.pi, rng) {
            return Ok(0);
        }
        self.positive.sample(rng)
    }
}
