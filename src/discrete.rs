//! Discrete count distributions.
//!
//! [`DiscreteDistribution`] is the capability every baseline family and
//! every derived (truncated, inflated, hurdle) distribution exposes:
//! PMF, CDF, survival, quantile and moments. Samplers are written against
//! the trait, never against a concrete family.
//!
//! # Supported Families
//!
//! | Family | Parameters | Mean | Variance |
//! |---|---|---|---|
//! | [`Poisson`] | λ | λ | λ |
//! | [`NegativeBinomial`] | μ, α (size r = 1/α) | μ | μ + αμ² |
//!
//! The generalized Poisson family lives in
//! [`generalized_poisson`](crate::generalized_poisson).

use rand::Rng;

use crate::error::{require_positive, Result, SamplingError};
use crate::random::open_unit;
use crate::special;

/// Largest count the bracketed quantile search will consider.
///
/// Counts beyond 2⁵² are no longer exactly representable as `f64`, so the
/// CDF cannot distinguish neighbours there.
pub const SEARCH_LIMIT: u64 = 1 << 52;

/// Probability mass, distribution and quantile functions of a
/// distribution on the non-negative integers.
pub trait DiscreteDistribution {
    /// ln P(X = k). Returns `f64::NEG_INFINITY` outside the support.
    fn ln_pmf(&self, k: u64) -> f64;

    /// P(X = k).
    fn pmf(&self, k: u64) -> f64 {
        self.ln_pmf(k).exp()
    }

    /// P(X ≤ k).
    fn cdf(&self, k: u64) -> f64;

    /// P(X > k). Implementations override this where the upper tail has
    /// a direct form that avoids `1 − cdf` cancellation.
    fn sf(&self, k: u64) -> f64 {
        1.0 - self.cdf(k)
    }

    fn mean(&self) -> f64;

    fn variance(&self) -> f64;

    /// Smallest `k` with `cdf(k) ≥ p`.
    ///
    /// The default implementation starts from a normal approximation and
    /// brackets the answer with geometrically growing steps, then bisects:
    /// O(log k) CDF evaluations, independent of how large the rate is.
    ///
    /// # Errors
    /// - `InvalidParameter` if `p` is NaN or outside `[0, 1]`.
    /// - `NumericOverflow` if the answer lies beyond [`SEARCH_LIMIT`].
    fn quantile(&self, p: f64) -> Result<u64> {
        require_quantile_probability(p)?;
        let start = normal_start(self.mean(), self.variance(), p);
        search_smallest(start, |k| self.cdf(k) >= p)
    }

    /// Draws one value by inverse-CDF sampling with a caller-owned RNG.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<u64>
    where
        Self: Sized,
    {
        self.quantile(open_unit(rng))
    }
}

/// Builds the per-observation distribution of a count family from a rate.
///
/// A regression model produces one rate per observation (`λ_i = exp(x_i·β)`);
/// the family decides what the rate means (Poisson mean, NB2 mean, ...)
/// and carries any parameters shared by all observations.
pub trait CountFamily {
    type Distribution: DiscreteDistribution;

    /// # Errors
    /// `InvalidParameter` if `rate` is not a valid parameter for the family.
    fn at_rate(&self, rate: f64) -> Result<Self::Distribution>;
}

pub(crate) fn require_quantile_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(SamplingError::InvalidParameter(format!(
            "quantile probability must lie in [0, 1], got {p}"
        )));
    }
    Ok(())
}

/// Starting point `mean + z_p·sd`, clamped into the search range.
pub(crate) fn normal_start(mean: f64, variance: f64, p: f64) -> u64 {
    let z = special::inverse_normal_cdf(p).clamp(-40.0, 40.0);
    let guess = mean + z * variance.max(0.0).sqrt();
    if guess.is_finite() && guess > 0.0 {
        (guess.floor() as u64).min(SEARCH_LIMIT)
    } else {
        0
    }
}

/// Smallest `k` in `[0, SEARCH_LIMIT]` for which the monotone predicate
/// `reached` holds, searching outward from `start`.
///
/// # Errors
/// `NumericOverflow` if `reached` is still false at [`SEARCH_LIMIT`].
pub(crate) fn search_smallest<F>(start: u64, reached: F) -> Result<u64>
where
    F: Fn(u64) -> bool,
{
    let start = start.min(SEARCH_LIMIT);
    let mut lo: u64;
    let mut hi: u64;

    // Bracket so that !reached(lo) && reached(hi).
    if reached(start) {
        if start == 0 {
            return Ok(0);
        }
        hi = start;
        let mut step = 1_u64;
        loop {
            let candidate = hi.saturating_sub(step);
            if !reached(candidate) {
                lo = candidate;
                break;
            }
            if candidate == 0 {
                return Ok(0);
            }
            hi = candidate;
            step = step.saturating_mul(2);
        }
    } else {
        lo = start;
        let mut step = 1_u64;
        let mut expansions = 0_u32;
        loop {
            if lo >= SEARCH_LIMIT {
                return Err(SamplingError::NumericOverflow(format!(
                    "quantile search passed {SEARCH_LIMIT} without reaching its target"
                )));
            }
            let candidate = lo.saturating_add(step).min(SEARCH_LIMIT);
            if reached(candidate) {
                hi = candidate;
                break;
            }
            lo = candidate;
            step = step.saturating_mul(2);
            expansions += 1;
        }
        if expansions > 24 {
            log::debug!("quantile bracket needed {expansions} expansions from {start}");
        }
    }

    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if reached(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(hi)
}

// ============================================================================
// Poisson Distribution
// ============================================================================

/// Poisson distribution with rate λ.
///
/// # Mathematical Definition
/// - PMF: λᵏ e^(−λ) / k!
/// - CDF: Q(k+1, λ) (regularized upper incomplete gamma)
/// - Survival: P(k+1, λ)
/// - Mean = Variance = λ
///
/// # Examples
/// ```
/// use count_sampler::discrete::{DiscreteDistribution, Poisson};
/// let p = Poisson::new(2.0).unwrap();
/// assert!((p.pmf(0) - (-2.0_f64).exp()).abs() < 1e-15);
/// assert_eq!(p.quantile(0.5).unwrap(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poisson {
    lambda: f64,
}

impl Poisson {
    /// # Errors
    /// `InvalidParameter` unless `lambda` is finite and > 0.
    pub fn new(lambda: f64) -> Result<Self> {
        let lambda = require_positive("Poisson rate", lambda)?;
        Ok(Self { lambda })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl DiscreteDistribution for Poisson {
    fn ln_pmf(&self, k: u64) -> f64 {
        k as f64 * self.lambda.ln() - self.lambda - special::ln_factorial(k)
    }

    fn cdf(&self, k: u64) -> f64 {
        special::regularized_upper_gamma(k as f64 + 1.0, self.lambda)
    }

    fn sf(&self, k: u64) -> f64 {
        special::regularized_lower_gamma(k as f64 + 1.0, self.lambda)
    }

    fn mean(&self) -> f64 {
        self.lambda
    }

    fn variance(&self) -> f64 {
        self.lambda
    }
}

// ============================================================================
// Negative Binomial Distribution
// ============================================================================

/// Negative binomial distribution in the NB2 mean/dispersion form.
///
/// With size `r = 1/α` and success probability `p = r/(r+μ)`, `X` counts
/// failures before the r-th success.
///
/// # Mathematical Definition
/// - PMF: Γ(k+r) / (Γ(r)·k!) · pʳ · (1−p)ᵏ
/// - CDF: I_p(r, k+1)
/// - Survival: I_{1−p}(k+1, r)
/// - Mean: μ, Variance: μ + αμ²
///
/// # Examples
/// ```
/// use count_sampler::discrete::{DiscreteDistribution, NegativeBinomial};
/// let nb = NegativeBinomial::new(2.0, 0.5).unwrap();
/// // P(0) = pʳ = (2/4)²
/// assert!((nb.pmf(0) - 0.25).abs() < 1e-12);
/// assert!((nb.variance() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegativeBinomial {
    mu: f64,
    size: f64,
    /// r/(r+μ)
    p: f64,
    /// μ/(r+μ), kept separately so the upper tail avoids `1 − p`.
    q: f64,
}

impl NegativeBinomial {
    /// Creates NB2(μ, α).
    ///
    /// # Errors
    /// `InvalidParameter` unless both `mu` and `alpha` are finite and > 0.
    pub fn new(mu: f64, alpha: f64) -> Result<Self> {
        let alpha = require_positive("negative binomial dispersion", alpha)?;
        Self::from_size(mu, 1.0 / alpha)
    }

    /// Creates a negative binomial from its mean and size `r` (θ).
    ///
    /// # Errors
    /// `InvalidParameter` unless both `mu` and `size` are finite and > 0.
    pub fn from_size(mu: f64, size: f64) -> Result<Self> {
        let mu = require_positive("negative binomial mean", mu)?;
        let size = require_positive("negative binomial size", size)?;
        let total = size + mu;
        Ok(Self {
            mu,
            size,
            p: size / total,
            q: mu / total,
        })
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn alpha(&self) -> f64 {
        1.0 / self.size
    }
}

impl DiscreteDistribution for NegativeBinomial {
    fn ln_pmf(&self, k: u64) -> f64 {
        let kf = k as f64;
        let r = self.size;
        special::ln_gamma(kf + r) - special::ln_gamma(r) - special::ln_factorial(k)
            + r * (-self.q).ln_1p()
            + kf * self.q.ln()
    }

    fn cdf(&self, k: u64) -> f64 {
        special::regularized_incomplete_beta(self.p, self.size, k as f64 + 1.0)
    }

    fn sf(&self, k: u64) -> f64 {
        special::regularized_incomplete_beta(self.q, k as f64 + 1.0, self.size)
    }

    fn mean(&self) -> f64 {
        self.mu
    }

    fn variance(&self) -> f64 {
        self.mu + self.mu * self.mu / self.size
    }
}

// ============================================================================
// Families
// ============================================================================

/// Poisson responses: the rate is λ.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoissonFamily;

impl CountFamily for PoissonFamily {
    type Distribution = Poisson;

    fn at_rate(&self, rate: f64) -> Result<Poisson> {
        Poisson::new(rate)
    }
}

/// NB2 responses with a dispersion α shared by all observations; the rate
/// is the mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegativeBinomialFamily {
    alpha: f64,
}

impl NegativeBinomialFamily {
    /// # Errors
    /// `InvalidParameter` unless `alpha` is finite and > 0.
    pub fn new(alpha: f64) -> Result<Self> {
        let alpha = require_positive("negative binomial dispersion", alpha)?;
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl CountFamily for NegativeBinomialFamily {
    type Distribution = NegativeBinomial;

    fn at_rate(&self, rate: f64) -> Result<NegativeBinomial> {
        NegativeBinomial::new(rate, self.alpha)
    }
}

/// NB-P responses: the size grows with the mean as `r_i = θ·μ_i^Q`, so the
/// variance is `μ + μ^(2−Q)/θ`. `Q = 0` is NB2 with `α = 1/θ`, `Q = 1` is NB1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegativeBinomialPFamily {
    theta: f64,
    q: f64,
}

impl NegativeBinomialPFamily {
    /// # Errors
    /// `InvalidParameter` unless `theta` is finite and > 0 and `q` is finite.
    pub fn new(theta: f64, q: f64) -> Result<Self> {
        let theta = require_positive("NB-P theta", theta)?;
        if !q.is_finite() {
            return Err(SamplingError::InvalidParameter(format!(
                "NB-P exponent Q must be finite, got {q}"
            )));
        }
        Ok(Self { theta, q })
    }
}

impl CountFamily for NegativeBinomialPFamily {
    type Distribution = NegativeBinomial;

    fn at_rate(&self, rate: f64) -> Result<NegativeBinomial> {
        let rate = require_positive("negative binomial mean", rate)?;
        NegativeBinomial::from_size(rate, self.theta * rate.powf(self.q))
    }
}

// ============================================================================
// Tests
// ============================================================================
