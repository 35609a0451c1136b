//! Sampler configuration.

use crate::error::{Result, SamplingError};

/// Numerical limits shared by the samplers.
///
/// # Examples
/// ```
/// use count_sampler::config::SamplerConfig;
/// let cfg = SamplerConfig::default().with_max_terms(50_000);
/// assert!(cfg.validate().is_ok());
/// assert_eq!(cfg.max_terms, 50_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplerConfig {
    /// Smallest baseline tail mass `P(X > boundary)` a truncated
    /// distribution accepts. Rates leaving less mass than this above the
    /// boundary are rejected as degenerate.
    pub min_tail_mass: f64,
    /// Maximum number of PMF terms summed by cumulative inverse-CDF
    /// sampling (generalized Poisson).
    pub max_terms: u64,
}

impl SamplerConfig {
    pub const DEFAULT_MIN_TAIL_MASS: f64 = 1e-12;
    pub const DEFAULT_MAX_TERMS: u64 = 1_000_000;

    pub fn with_min_tail_mass(mut self, min_tail_mass: f64) -> Self {
        self.min_tail_mass = min_tail_mass;
        self
    }

    pub fn with_max_terms(mut self, max_terms: u64) -> Self {
        self.max_terms = max_terms;
        self
    }

    /// Checks that the limits are usable.
    ///
    /// # Errors
    /// `InvalidParameter` if `min_tail_mass` is outside `[0, 1)` or
    /// `max_terms` is zero.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.min_tail_mass) {
            return Err(SamplingError::InvalidParameter(format!(
                "min_tail_mass must lie in [0, 1), got {}",
                self.min_tail_mass
            )));
        }
        if self.max_terms == 0 {
            return Err(SamplingError::InvalidParameter(
                "max_terms must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            min_tail_mass: Self::DEFAULT_MIN_TAIL_MASS,
            max_terms: Self::DEFAULT_MAX_TERMS,
        }
    }
}
