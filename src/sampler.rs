//! Vectorized per-observation samplers.
//!
//! Each sampler takes one parameter per observation (rates from
//! `exp(X·β)`, probabilities from `sigmoid(Z·γ)`) and returns one count
//! per observation.
//!
//! A call first builds every per-observation distribution, so any invalid
//! rate, probability or length mismatch fails before a single random
//! number is consumed. There are no partial results.
//!
//! # Examples
//! ```
//! use count_sampler::discrete::PoissonFamily;
//! use count_sampler::random::create_rng;
//! use count_sampler::sampler::{TruncatedSampler, ZeroInflatedSampler};
//!
//! let mut rng = create_rng(42);
//! let ztp = TruncatedSampler::zero(PoissonFamily).sample(&[0.5, 2.0, 8.0], &mut rng).unwrap();
//! assert!(ztp.iter().all(|&y| y >= 1));
//!
//! let zip = ZeroInflatedSampler::new(PoissonFamily)
//!     .sample(&[2.0, 2.0], &[0.3, 1.0], &mut rng)
//!     .unwrap();
//! assert_eq!(zip[1], 0);
//! ```

use rand::Rng;

use crate::config::SamplerConfig;
use crate::discrete::{CountFamily, DiscreteDistribution};
use crate::error::{require_same_len, Result, SamplingError};
use crate::generalized_poisson::GeneralizedPoissonFamily;
use crate::inflated::{Hurdle, ZeroInflated};
use crate::truncated::Truncated;

/// Prefixes an error with the observation it came from.
fn at_observation(i: usize, err: SamplingError) -> SamplingError {
    match err {
        SamplingError::InvalidParameter(msg) => {
            SamplingError::InvalidParameter(format!("observation {i}: {msg}"))
        }
        SamplingError::NumericOverflow(msg) => {
            SamplingError::NumericOverflow(format!("observation {i}: {msg}"))
        }
        other => other,
    }
}

/// Builds one distribution per observation, failing on the first invalid one.
fn build_all<T, P, B>(params: &[P], mut build: B) -> Result<Vec<T>>
where
    P: Copy,
    B: FnMut(P) -> Result<T>,
{
    params
        .iter()
        .enumerate()
        .map(|(i, &p)| build(p).map_err(|e| at_observation(i, e)))
        .collect()
}

fn draw_all<D, R>(distributions: &[D], rng: &mut R) -> Result<Vec<u64>>
where
    D: DiscreteDistribution,
    R: Rng + ?Sized,
{
    distributions
        .iter()
        .enumerate()
        .map(|(i, d)| d.sample(rng).map_err(|e| at_observation(i, e)))
        .collect()
}

// ============================================================================
// Baseline
// ============================================================================

/// Plain draws from the family at each rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineSampler<F> {
    family: F,
}

impl<F: CountFamily> BaselineSampler<F> {
    pub fn new(family: F) -> Self {
        Self { family }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rates: &[f64], rng: &mut R) -> Result<Vec<u64>> {
        let dists = build_all(rates, |rate| self.family.at_rate(rate))?;
        draw_all(&dists, rng)
    }
}

// ============================================================================
// Truncated
// ============================================================================

/// Draws from the family conditioned on `X > boundary`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncatedSampler<F> {
    family: F,
    boundary: u64,
    config: SamplerConfig,
}

impl<F: CountFamily> TruncatedSampler<F> {
    pub fn new(family: F, boundary: u64) -> Self {
        Self {
            family,
            boundary,
            config: SamplerConfig::default(),
        }
    }

    /// Zero-truncated sampler (`X ≥ 1`).
    pub fn zero(family: F) -> Self {
        Self::new(family, 0)
    }

    pub fn with_config(mut self, config: SamplerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn boundary(&self) -> u64 {
        self.boundary
    }

    /// One draw per rate, each strictly above the boundary.
    ///
    /// # Errors
    /// - `InvalidParameter` for an invalid rate, an invalid config, or a
    ///   rate whose tail mass above the boundary is below
    ///   `config.min_tail_mass`.
    /// - `NumericOverflow` if a quantile search runs past its limit.
    pub fn sample<R: Rng + ?Sized>(&self, rates: &[f64], rng: &mut R) -> Result<Vec<u64>> {
        self.config.validate()?;
        let dists = build_all(rates, |rate| {
            let base = self.family.at_rate(rate)?;
            Truncated::with_min_tail_mass(base, self.boundary, self.config.min_tail_mass)
        })?;
        draw_all(&dists, rng)
    }
}

// ============================================================================
// Zero-Inflated
// ============================================================================

/// Structural zero with probability `π_i`, otherwise a baseline draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroInflatedSampler<F> {
    family: F,
}

impl<F: CountFamily> ZeroInflatedSampler<F> {
    pub fn new(family: F) -> Self {
        Self { family }
    }

    /// # Errors
    /// `LengthMismatch` if `pis.len() != rates.len()`, `InvalidParameter`
    /// for an invalid rate or a probability outside `[0, 1]`.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rates: &[f64],
        pis: &[f64],
        rng: &mut R,
    ) -> Result<Vec<u64>> {
        require_same_len(rates.len(), pis.len())?;
        let pairs: Vec<(f64, f64)> = rates.iter().copied().zip(pis.iter().copied()).collect();
        let dists = build_all(&pairs, |(rate, pi)| {
            ZeroInflated::new(self.family.at_rate(rate)?, pi)
        })?;
        draw_all(&dists, rng)
    }
}

// ============================================================================
// Hurdle
// ============================================================================

/// Zero with probability `π_i`, otherwise a zero-truncated draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HurdleSampler<F> {
    family: F,
    config: SamplerConfig,
}

impl<F: CountFamily> HurdleSampler<F> {
    pub fn new(family: F) -> Self {
        Self {
            family,
            config: SamplerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SamplerConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    /// Same as [`ZeroInflatedSampler::sample`], plus `InvalidParameter`
    /// for rates with no usable mass above zero.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rates: &[f64],
        pis: &[f64],
        rng: &mut R,
    ) -> Result<Vec<u64>> {
        self.config.validate()?;
        require_same_len(rates.len(), pis.len())?;
        let pairs: Vec<(f64, f64)> = rates.iter().copied().zip(pis.iter().copied()).collect();
        let dists = build_all(&pairs, |(rate, pi)| {
            let base = self.family.at_rate(rate)?;
            Hurdle::with_min_tail_mass(base, pi, self.config.min_tail_mass)
        })?;
        draw_all(&dists, rng)
    }
}

// ============================================================================
// Generalized Poisson
// ============================================================================

/// Generalized Poisson draws with a shared dispersion δ and per-observation
/// location μ_i.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralizedPoissonSampler {
    delta: f64,
    config: SamplerConfig,
}

impl GeneralizedPoissonSampler {
    /// # Errors
    /// `InvalidParameter` if δ is outside `[-1, 1)`.
    pub fn new(delta: f64) -> Result<Self> {
        GeneralizedPoissonFamily::new(delta)?;
        Ok(Self {
            delta,
            config: SamplerConfig::default(),
        })
    }

    pub fn with_config(mut self, config: SamplerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// # Errors
    /// - `InvalidParameter` if some μ_i is not positive or violates
    ///   `δ ≥ −μ_i/4`.
    /// - `NumericOverflow` if a draw needs more than `config.max_terms`
    ///   PMF terms.
    pub fn sample<R: Rng + ?Sized>(&self, mus: &[f64], rng: &mut R) -> Result<Vec<u64>> {
        self.config.validate()?;
        let family = GeneralizedPoissonFamily::new(self.delta)?.with_max_terms(self.config.max_terms);
        let dists = build_all(mus, |mu| family.at_rate(mu))?;
        draw_all(&dists, rng)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::discrete::{NegativeBinomialFamily, PoissonFamily};
    use crate::random::create_rng;
    use proptest::prelude::*;

    fn rates_and_pis() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
        (1_usize..40).prop_flat_map(|n| {
            (
                proptest::collection::vec(0.05_f64..30.0, n),
                proptest::collection::vec(0.0_f64..=1.0, n),
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn same_seed_same_draws((rates, pis) in rates_and_pis(), seed in 0_u64..10_000) {
            let zi = ZeroInflatedSampler::new(PoissonFamily);
            prop_assert_eq!(
                zi.sample(&rates, &pis, &mut create_rng(seed)).unwrap(),
                zi.sample(&rates, &pis, &mut create_rng(seed)).unwrap()
            );
            let hurdle = HurdleSampler::new(NegativeBinomialFamily::new(0.7).unwrap());
            prop_assert_eq!(
                hurdle.sample(&rates, &pis, &mut create_rng(seed)).unwrap(),
                hurdle.sample(&rates, &pis, &mut create_rng(seed)).unwrap()
            );
            let ztp = TruncatedSampler::zero(PoissonFamily);
            prop_assert_eq!(
                ztp.sample(&rates, &mut create_rng(seed)).unwrap(),
                ztp.sample(&rates, &mut create_rng(seed)).unwrap()
            );
            let gp = GeneralizedPoissonSampler::new(0.3).unwrap();
            prop_assert_eq!(
                gp.sample(&rates, &mut create_rng(seed)).unwrap(),
                gp.sample(&rates, &mut create_rng(seed)).unwrap()
            );
        }

        #[test]
        fn output_length_matches_input((rates, pis) in rates_and_pis(), seed in 0_u64..10_000) {
            let mut rng = create_rng(seed);
            let y = HurdleSampler::new(PoissonFamily).sample(&rates, &pis, &mut rng).unwrap();
            prop_assert_eq!(y.len(), rates.len());
            for (&k, &pi) in y.iter().zip(&pis) {
                if pi == 1.0 {
                    prop_assert_eq!(k, 0);
                }
            }
        }
    }
}
