//! Error type shared by every distribution and sampler in the crate.

/// Errors raised while constructing distributions or drawing samples.
///
/// Every operation validates its inputs up front and fails immediately;
/// there are no partial results and no retries.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingError {
    /// A rate, dispersion or probability lies outside its valid domain.
    InvalidParameter(String),
    /// A quantile search or cumulative summation did not reach its target
    /// within the configured bound.
    NumericOverflow(String),
    /// Parallel parameter slices (or a coefficient vector) disagree in length.
    LengthMismatch { expected: usize, found: usize },
    /// A design matrix is empty, ragged or contains non-finite entries.
    InvalidDesign(String),
}

impl std::fmt::Display for SamplingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplingError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            SamplingError::NumericOverflow(msg) => write!(f, "numeric overflow: {msg}"),
            SamplingError::LengthMismatch { expected, found } => {
                write!(f, "length mismatch: expected {expected}, found {found}")
            }
            SamplingError::InvalidDesign(msg) => write!(f, "invalid design matrix: {msg}"),
        }
    }
}

impl std::error::Error for SamplingError {}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SamplingError>;

/// Checks that `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SamplingError::InvalidParameter(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(value)
}

/// Checks that `value` is a probability in `[0, 1]`.
pub(crate) fn require_probability(name: &str, value: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SamplingError::InvalidParameter(format!(
            "{name} must lie in [0, 1], got {value}"
        )));
    }
    Ok(value)
}

/// Checks that two parallel slices have the same length.
pub(crate) fn require_same_len(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(SamplingError::LengthMismatch { expected, found });
    }
    Ok(())
}
