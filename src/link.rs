//! Link functions between a linear predictor and a distribution parameter.
//!
//! A regression model computes `η = X·β` and maps it to a rate through
//! the inverse link (`λ = exp(η)` for counts, `π = 1/(1+exp(−η))` for
//! inflation probabilities).

use crate::error::{Result, SamplingError};
use crate::special;

/// Monotone link function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Link {
    /// `g(μ) = μ`
    Identity,
    /// `g(μ) = ln μ`, inverse `exp(η)`. The canonical link for counts.
    Log,
    /// `g(π) = ln(π/(1−π))`, inverse is the logistic sigmoid.
    Logit,
    /// `g(π) = Φ⁻¹(π)`, inverse is the standard normal CDF.
    Probit,
}

impl Link {
    /// Maps a linear predictor to the parameter scale.
    ///
    /// # Examples
    /// ```
    /// use count_sampler::link::Link;
    /// assert!((Link::Log.inverse(0.0) - 1.0).abs() < 1e-15);
    /// assert!((Link::Logit.inverse(0.0) - 0.5).abs() < 1e-15);
    /// ```
    pub fn inverse(self, eta: f64) -> f64 {
        match self {
            Link::Identity => eta,
            Link::Log => eta.exp(),
            Link::Logit => sigmoid(eta),
            Link::Probit => special::standard_normal_cdf(eta),
        }
    }

    /// Maps a parameter value back to the linear-predictor scale.
    ///
    /// # Errors
    /// `InvalidParameter` if `value` is outside the link's domain
    /// (`value <= 0` for `Log`, outside `(0, 1)` for `Logit`/`Probit`).
    pub fn apply(self, value: f64) -> Result<f64> {
        match self {
            Link::Identity => Ok(value),
            Link::Log => {
                if value.is_nan() || value <= 0.0 {
                    return Err(SamplingError::InvalidParameter(format!(
                        "log link requires a positive value, got {value}"
                    )));
                }
                Ok(value.ln())
            }
            Link::Logit | Link::Probit => {
                if value.is_nan() || value <= 0.0 || value >= 1.0 {
                    return Err(SamplingError::InvalidParameter(format!(
                        "{self:?} link requires a value in (0, 1), got {value}"
                    )));
                }
                if self == Link::Logit {
                    Ok((value / (1.0 - value)).ln())
                } else {
                    Ok(special::inverse_normal_cdf(value))
                }
            }
        }
    }
}

/// Stable sigmoid `1 / (1 + exp(−x))` that never overflows.
pub fn sigmoid(x: f64) -> f64 {
    let e = (-x.abs()).exp();
    let recip = 1.0 / (1.0 + e);
    if x >= 0.0 {
        recip
    } else {
        e * recip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_extremes() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(-1000.0) < 1e-300);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_inverse_known_values() {
        assert_eq!(Link::Identity.inverse(-3.5), -3.5);
        assert!((Link::Log.inverse(1.0) - std::f64::consts::E).abs() < 1e-15);
        // 1/(1+exp(-2)) as in the logistic inflation filter
        assert!((Link::Logit.inverse(2.0) - 0.8807970779778823).abs() < 1e-14);
        assert!((Link::Probit.inverse(1.959963984540054) - 0.975).abs() < 1e-13);
    }

    #[test]
    fn test_apply_rejects_out_of_domain() {
        assert!(Link::Log.apply(0.0).is_err());
        assert!(Link::Log.apply(-1.0).is_err());
        assert!(Link::Logit.apply(0.0).is_err());
        assert!(Link::Logit.apply(1.0).is_err());
        assert!(Link::Probit.apply(f64::NAN).is_err());
        assert!(Link::Identity.apply(-7.0).is_ok());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn log_round_trip(eta in -20.0_f64..20.0) {
            let back = Link::Log.apply(Link::Log.inverse(eta)).unwrap();
            prop_assert!((back - eta).abs() < 1e-12);
        }

        #[test]
        fn logit_round_trip(eta in -15.0_f64..15.0) {
            let back = Link::Logit.apply(Link::Logit.inverse(eta)).unwrap();
            prop_assert!((back - eta).abs() < 1e-8, "eta={eta}, back={back}");
        }

        #[test]
        fn probit_round_trip(eta in -5.0_f64..5.0) {
            let back = Link::Probit.apply(Link::Probit.inverse(eta)).unwrap();
            prop_assert!((back - eta).abs() < 1e-9, "eta={eta}, back={back}");
        }

        #[test]
        fn inverse_links_are_monotone(a in -10.0_f64..10.0, b in -10.0_f64..10.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            for link in [Link::Identity, Link::Log, Link::Logit] {
                prop_assert!(link.inverse(lo) <= link.inverse(hi));
            }
            // rounding across the series / continued-fraction switch
            prop_assert!(Link::Probit.inverse(lo) <= Link::Probit.inverse(hi) + 1e-15);
        }
    }
}
