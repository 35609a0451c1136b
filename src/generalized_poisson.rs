//! Generalized Poisson distribution (Consul's form).
//!
//! ```text
//! P(n | μ, δ) = μ (μ + δ·n)^(n−1) · exp(−μ − δ·n) / n!      n = 0, 1, 2, ...
//! ```
//!
//! The dispersion δ is a single signed parameter: δ > 0 over-dispersion,
//! δ < 0 under-dispersion, δ = 0 is exactly Poisson(μ).
//!
//! # Validity
//!
//! The formula is only a probability mass function on part of its nominal
//! domain. Construction requires μ > 0, δ < 1 and `δ ≥ max(−1, −μ/4)`.
//! For δ < 0 the factor `μ + δ·n` turns non-positive past some `m`; the
//! support is cut at the largest `m` with `μ + δ·m > 0` and the mass on
//! `0..=m` is renormalized.
//!
//! There is no closed-form quantile. Sampling sums the PMF from zero until
//! the running total reaches the uniform draw, bounded by `max_terms`.

use crate::config::SamplerConfig;
use crate::discrete::{require_quantile_probability, CountFamily, DiscreteDistribution};
use crate::error::{require_positive, Result, SamplingError};
use crate::special;

/// Generalized Poisson distribution with location μ and signed dispersion δ.
///
/// # Examples
/// ```
/// use count_sampler::discrete::{DiscreteDistribution, Poisson};
/// use count_sampler::generalized_poisson::GeneralizedPoisson;
/// let gp = GeneralizedPoisson::new(3.0, 0.0).unwrap();
/// let po = Poisson::new(3.0).unwrap();
/// assert!((gp.pmf(4) - po.pmf(4)).abs() < 1e-12);
///
/// // δ below −μ/4 is outside the valid region
/// assert!(GeneralizedPoisson::new(1.0, -0.3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralizedPoisson {
    mu: f64,
    delta: f64,
    /// Last support point when δ < 0.
    support_end: Option<u64>,
    /// Total unnormalized mass of the support (1 unless truncated).
    norm: f64,
    max_terms: u64,
}

impl GeneralizedPoisson {
    /// Creates GP(μ, δ) with the default summation cap.
    ///
    /// # Errors
    /// `InvalidParameter` if (μ, δ) is outside the validity region.
    pub fn new(mu: f64, delta: f64) -> Result<Self> {
        Self::with_max_terms(mu, delta, SamplerConfig::DEFAULT_MAX_TERMS)
    }

    /// Creates GP(μ, δ) whose cumulative summation stops after `max_terms`.
    ///
    /// # Errors
    /// - `InvalidParameter` if (μ, δ) is outside the validity region or
    ///   `max_terms` is zero.
    /// - `NumericOverflow` if normalizing a truncated support needs more
    ///   than `max_terms` terms.
    pub fn with_max_terms(mu: f64, delta: f64, max_terms: u64) -> Result<Self> {
        let mu = require_positive("generalized Poisson location", mu)?;
        require_dispersion(delta)?;
        let lower = (-mu / 4.0).max(-1.0);
        if delta < lower {
            return Err(SamplingError::InvalidParameter(format!(
                "generalized Poisson dispersion {delta} is below max(-1, -mu/4) = {lower} for mu = {mu}"
            )));
        }
        if max_terms == 0 {
            return Err(SamplingError::InvalidParameter(
                "max_terms must be at least 1".into(),
            ));
        }

        let support_end = (delta < 0.0).then(|| last_positive(mu, delta));
        let mut gp = Self {
            mu,
            delta,
            support_end,
            norm: 1.0,
            max_terms,
        };
        if support_end.is_some() {
            gp.norm = gp.support_mass()?;
            if (1.0 - gp.norm).abs() > 1e-6 {
                log::warn!(
                    "generalized Poisson support truncated at {:?} holds mass {} (mu = {mu}, delta = {delta}); renormalizing",
                    support_end,
                    gp.norm
                );
            }
        }
        Ok(gp)
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Last point of the support, `None` when the support is unbounded (δ ≥ 0).
    pub fn support_end(&self) -> Option<u64> {
        self.support_end
    }

    fn beyond_support(&self, n: u64) -> bool {
        matches!(self.support_end, Some(end) if n > end)
    }

    /// Unnormalized ln PMF from the closed form.
    fn ln_term(&self, n: u64) -> f64 {
        if self.beyond_support(n) {
            return f64::NEG_INFINITY;
        }
        let base = self.mu + self.delta * n as f64;
        if base <= 0.0 {
            return f64::NEG_INFINITY;
        }
        self.mu.ln() + (n as f64 - 1.0) * base.ln() - base - special::ln_factorial(n)
    }

    /// Unnormalized PMF term, rejected if the closed form overflows.
    ///
    /// Terms are never negative: `ln_term` is `−∞` wherever `μ + δ·n ≤ 0`.
    fn term(&self, n: u64) -> Result<f64> {
        let t = self.ln_term(n).exp();
        if !t.is_finite() {
            return Err(SamplingError::InvalidParameter(format!(
                "generalized Poisson PMF is {t} at n = {n} (mu = {}, delta = {})",
                self.mu, self.delta
            )));
        }
        Ok(t)
    }

    /// Sums the unnormalized PMF over the truncated support, stopping once
    /// the remaining terms are negligible.
    fn support_mass(&self) -> Result<f64> {
        let end = self.support_end.unwrap_or(u64::MAX);
        let mean = self.mean();
        let mut acc = 0.0;
        for n in 0..self.max_terms {
            let t = self.term(n)?;
            acc += t;
            if n >= end || (n as f64 > mean && t <= f64::EPSILON * acc) {
                return Ok(acc);
            }
        }
        Err(SamplingError::NumericOverflow(format!(
            "generalized Poisson normalization did not settle within {} terms",
            self.max_terms
        )))
    }
}

impl DiscreteDistribution for GeneralizedPoisson {
    fn ln_pmf(&self, k: u64) -> f64 {
        self.ln_term(k) - self.norm.ln()
    }

    /// Cumulative sum of the PMF; summation ends early at the support end,
    /// at the term cap, or once terms past the mean underflow to zero.
    fn cdf(&self, k: u64) -> f64 {
        let mean = self.mean();
        let mut acc = 0.0;
        for n in 0..=k.min(self.max_terms) {
            if self.beyond_support(n) {
                break;
            }
            let t = self.ln_term(n).exp();
            acc += t;
            if t == 0.0 && n as f64 > mean {
                break;
            }
        }
        (acc / self.norm).min(1.0)
    }

    fn sf(&self, k: u64) -> f64 {
        (1.0 - self.cdf(k)).max(0.0)
    }

    /// μ/(1−δ). For δ < 0 this ignores the support cut.
    fn mean(&self) -> f64 {
        self.mu / (1.0 - self.delta)
    }

    /// μ/(1−δ)³. For δ < 0 this ignores the support cut.
    fn variance(&self) -> f64 {
        self.mu / (1.0 - self.delta).powi(3)
    }

    /// Smallest `k` whose cumulative PMF reaches `p`, by direct summation.
    ///
    /// # Errors
    /// - `InvalidParameter` if `p` is outside `[0, 1]` or a PMF term
    ///   overflows.
    /// - `NumericOverflow` if `max_terms` terms do not reach `p`.
    fn quantile(&self, p: f64) -> Result<u64> {
        require_quantile_probability(p)?;
        let target = p * self.norm;
        let mean = self.mean();
        let mut acc = 0.0;
        for n in 0..self.max_terms {
            let t = self.term(n)?;
            acc += t;
            if acc >= target {
                return Ok(n);
            }
            if let Some(end) = self.support_end {
                if n >= end {
                    return Ok(end);
                }
            }
            if t == 0.0 && n as f64 > mean {
                return Ok(n);
            }
        }
        Err(SamplingError::NumericOverflow(format!(
            "cumulative generalized Poisson mass reached {acc} < {target} after {} terms (mu = {}, delta = {})",
            self.max_terms, self.mu, self.delta
        )))
    }
}

/// Largest `m` with `μ + δ·m > 0`, for δ < 0.
fn last_positive(mu: f64, delta: f64) -> u64 {
    let ratio = mu / -delta;
    let mut m = if ratio.is_finite() {
        (ratio.ceil() - 1.0).max(0.0) as u64
    } else {
        u64::MAX
    };
    while m > 0 && mu + delta * m as f64 <= 0.0 {
        m -= 1;
    }
    while m < u64::MAX && mu + delta * (m + 1) as f64 > 0.0 {
        m += 1;
    }
    m
}

fn require_dispersion(delta: f64) -> Result<f64> {
    if !delta.is_finite() || delta >= 1.0 || delta < -1.0 {
        return Err(SamplingError::InvalidParameter(format!(
            "generalized Poisson dispersion must lie in [-1, 1), got {delta}"
        )));
    }
    Ok(delta)
}

/// Generalized Poisson responses with a dispersion δ shared by all
/// observations; the rate is the location μ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralizedPoissonFamily {
    delta: f64,
    max_terms: u64,
}

impl GeneralizedPoissonFamily {
    /// # Errors
    /// `InvalidParameter` if δ is outside `[-1, 1)`. The μ-dependent bound
    /// is checked per observation.
    pub fn new(delta: f64) -> Result<Self> {
        let delta = require_dispersion(delta)?;
        Ok(Self {
            delta,
            max_terms: SamplerConfig::DEFAULT_MAX_TERMS,
        })
    }

    pub fn with_max_terms(mut self, max_terms: u64) -> Self {
        self.max_terms = max_terms;
        self
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }
}

impl CountFamily for GeneralizedPoissonFamily {
    type Distribution = GeneralizedPoisson;

    fn at_rate(&self, rate: f64) -> Result<GeneralizedPoisson> {
        GeneralizedPoisson::with_max_terms(rate, self.delta, self.max_terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discrete::Poisson;
    use crate::random::create_rng;
    use approx::assert_relative_eq;

    #[test]
    fn test_reduces_to_poisson() {
        for &mu in &[0.3, 1.0, 4.5, 30.0] {
            let gp = GeneralizedPoisson::new(mu, 0.0).unwrap();
            let po = Poisson::new(mu).unwrap();
            for n in 0..60 {
                assert_relative_eq!(gp.pmf(n), po.pmf(n), max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(GeneralizedPoisson::new(0.0, 0.1).is_err());
        assert!(GeneralizedPoisson::new(-1.0, 0.1).is_err());
        assert!(GeneralizedPoisson::new(2.0, 1.0).is_err());
        assert!(GeneralizedPoisson::new(2.0, f64::NAN).is_err());
        assert!(GeneralizedPoisson::new(20.0, -1.2).is_err());
        // −μ/4 = −0.25
        assert!(GeneralizedPoisson::new(1.0, -0.3).is_err());
        assert!(GeneralizedPoisson::new(1.0, -0.25).is_ok());
        assert!(GeneralizedPoisson::with_max_terms(1.0, 0.1, 0).is_err());
    }

    #[test]
    fn test_over_dispersed_mass_sums_to_one() {
        let gp = GeneralizedPoisson::new(3.0, 0.3).unwrap();
        assert_eq!(gp.support_end(), None);
        let total: f64 = (0..400).map(|n| gp.pmf(n)).sum();
        assert!((total - 1.0).abs() < 1e-9, "total = {total}");
    }

    #[test]
    fn test_under_dispersed_support_and_mass() {
        // μ + δ·n > 0 ⇔ n < 10
        let gp = GeneralizedPoisson::new(3.0, -0.3).unwrap();
        assert_eq!(gp.support_end(), Some(9));
        assert_eq!(gp.pmf(10), 0.0);
        assert_eq!(gp.pmf(25), 0.0);
        let total: f64 = (0..=9).map(|n| gp.pmf(n)).sum();
        assert!((total - 1.0).abs() < 1e-12, "total = {total}");
        assert_relative_eq!(gp.cdf(9), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_last_positive() {
        assert_eq!(last_positive(3.0, -0.3), 9);
        assert_eq!(last_positive(2.0, -0.5), 3);
        assert_eq!(last_positive(2.5, -0.5), 4);
    }

    #[test]
    fn test_cdf_matches_quantile() {
        let gp = GeneralizedPoisson::new(6.0, 0.2).unwrap();
        for &p in &[0.01, 0.3, 0.5, 0.8, 0.99] {
            let k = gp.quantile(p).unwrap();
            assert!(gp.cdf(k) >= p - 1e-12);
            if k > 0 {
                assert!(gp.cdf(k - 1) < p);
            }
        }
        assert_eq!(gp.quantile(0.0).unwrap(), 0);
        assert!(gp.quantile(1.5).is_err());
    }

    #[test]
    fn test_sample_mean_over_dispersed() {
        let gp = GeneralizedPoisson::new(2.0, 0.3).unwrap();
        let mut rng = create_rng(160);
        let n = 20_000;
        let draws: Vec<u64> = (0..n).map(|_| gp.sample(&mut rng).unwrap()).collect();
        let mean = draws.iter().sum::<u64>() as f64 / n as f64;
        // μ/(1−δ) = 2.857, Var = μ/(1−δ)³ ≈ 5.83, SE ≈ 0.017
        assert!((mean - 2.0 / 0.7).abs() < 0.08, "mean = {mean}");
    }

    #[test]
    fn test_sample_stays_in_truncated_support() {
        let gp = GeneralizedPoisson::new(2.0, -0.5).unwrap();
        let end = gp.support_end().unwrap();
        let mut rng = create_rng(3);
        for _ in 0..5_000 {
            assert!(gp.sample(&mut rng).unwrap() <= end);
        }
    }

    #[test]
    fn test_term_cap_reports_overflow() {
        let gp = GeneralizedPoisson::with_max_terms(50.0, 0.5, 10).unwrap();
        let err = gp.quantile(0.5).unwrap_err();
        assert!(matches!(err, SamplingError::NumericOverflow(_)));
    }

    #[test]
    fn test_family_checks_location_bound() {
        let fam = GeneralizedPoissonFamily::new(-0.3).unwrap();
        assert!(fam.at_rate(4.0).is_ok());
        assert!(fam.at_rate(1.0).is_err());
        assert!(GeneralizedPoissonFamily::new(1.0).is_err());
        assert!(GeneralizedPoissonFamily::new(-1.5).is_err());
    }
}
