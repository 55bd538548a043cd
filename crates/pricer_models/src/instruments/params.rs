//! Validated option parameters.

use num_traits::Float;

use crate::analytical::AnalyticalError;

/// Inputs of a European option under Black-Scholes dynamics.
///
/// Spot, strike, expiry and volatility are strictly positive and finite;
/// the rate may be any finite value. A value is immutable once built:
/// [`with_spot`](Self::with_spot) and [`with_expiry`](Self::with_expiry)
/// return new, re-validated values.
///
/// # Type Parameters
/// * `T` - Floating-point type implementing `Float` (e.g., `f64`, `f32`)
///
/// # Examples
/// ```
/// use pricer_models::instruments::OptionParameters;
///
/// let params = OptionParameters::new(100.0_f64, 100.0, 1.0, 0.05, 0.2).unwrap();
/// assert_eq!(params.strike(), 100.0);
///
/// // Negative rates are allowed, zero volatility is not
/// assert!(OptionParameters::new(100.0_f64, 100.0, 1.0, -0.01, 0.2).is_ok());
/// assert!(OptionParameters::new(100.0_f64, 100.0, 1.0, 0.05, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OptionParameters<T: Float> {
    spot: T,
    strike: T,
    expiry: T,
    rate: T,
    volatility: T,
}

#[inline]
fn positive<T: Float>(name: &'static str, value: T) -> Result<T, AnalyticalError> {
    if value.is_finite() && value > T::zero() {
        Ok(value)
    } else {
        Err(AnalyticalError::InvalidParameter {
            name,
            value: value.to_f64().unwrap_or(f64::NAN),
        })
    }
}

impl<T: Float> OptionParameters<T> {
    /// Creates validated option parameters.
    ///
    /// # Errors
    /// `AnalyticalError::InvalidParameter` naming the first offending input when
    /// spot, strike, expiry or volatility is not strictly positive and finite,
    /// or when the rate is not finite.
    pub fn new(spot: T, strike: T, expiry: T, rate: T, volatility: T) -> Result<Self, AnalyticalError> {
        if !rate.is_finite() {
            return Err(AnalyticalError::InvalidParameter {
                name: "rate",
                value: rate.to_f64().unwrap_or(f64::NAN),
            });
        }

        Ok(Self {
            spot: positive("spot", spot)?,
            strike: positive("strike", strike)?,
            expiry: positive("expiry", expiry)?,
            rate,
            volatility: positive("volatility", volatility)?,
        })
    }

    /// Returns a copy with a different spot.
    pub fn with_spot(&self, spot: T) -> Result<Self, AnalyticalError> {
        Ok(Self {
            spot: positive("spot", spot)?,
            ..*self
        })
    }

    /// Returns a copy with a different time to expiry.
    pub fn with_expiry(&self, expiry: T) -> Result<Self, AnalyticalError> {
        Ok(Self {
            expiry: positive("expiry", expiry)?,
            ..*self
        })
    }

    /// Spot price (S).
    #[inline]
    pub fn spot(&self) -> T {
        self.spot
    }

    /// Strike price (K).
    #[inline]
    pub fn strike(&self) -> T {
        self.strike
    }

    /// Time to expiry in years (T).
    #[inline]
    pub fn expiry(&self) -> T {
        self.expiry
    }

    /// Continuously compounded risk-free rate (r).
    #[inline]
    pub fn rate(&self) -> T {
        self.rate
    }

    /// Volatility (σ).
    #[inline]
    pub fn volatility(&self) -> T {
        self.volatility
    }

    /// Discount factor e^(-rT).
    #[inline]
    pub fn discount_factor(&self) -> T {
        (-self.rate * self.expiry).exp()
    }
}

impl Default for OptionParameters<f64> {
    /// At-the-money one-year option: S = K = 100, T = 1, r = 5%, σ = 20%.
    fn default() -> Self {
        Self {
            spot: 100.0,
            strike: 100.0,
            expiry: 1.0,
            rate: 0.05,
            volatility: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid_params() {
        let params = OptionParameters::new(100.0_f64, 95.0, 0.5, 0.03, 0.25).unwrap();
        assert_eq!(params.spot(), 100.0);
        assert_eq!(params.strike(), 95.0);
        assert_eq!(params.expiry(), 0.5);
        assert_eq!(params.rate(), 0.03);
        assert_eq!(params.volatility(), 0.25);
    }

    #[test]
    fn test_each_positive_parameter_is_validated() {
        let cases = [
            (OptionParameters::new(0.0_f64, 100.0, 1.0, 0.05, 0.2), "spot", 0.0),
            (OptionParameters::new(100.0_f64, -5.0, 1.0, 0.05, 0.2), "strike", -5.0),
            (OptionParameters::new(100.0_f64, 100.0, -1.0, 0.05, 0.2), "expiry", -1.0),
            (OptionParameters::new(100.0_f64, 100.0, 1.0, 0.05, -0.2), "volatility", -0.2),
        ];
        for (result, expected_name, expected_value) in cases {
            match result {
                Err(AnalyticalError::InvalidParameter { name, value }) => {
                    assert_eq!(name, expected_name);
                    assert_eq!(value, expected_value);
                }
                other => panic!("Expected InvalidParameter for {}, got {:?}", expected_name, other),
            }
        }
    }

    #[test]
    fn test_non_finite_inputs_rejected() {
        assert!(OptionParameters::new(f64::INFINITY, 100.0, 1.0, 0.05, 0.2).is_err());
        assert!(OptionParameters::new(100.0, f64::NAN, 1.0, 0.05, 0.2).is_err());
        match OptionParameters::new(100.0, 100.0, 1.0, f64::NAN, 0.2) {
            Err(AnalyticalError::InvalidParameter { name, .. }) => assert_eq!(name, "rate"),
            other => panic!("Expected InvalidParameter for rate, got {:?}", other),
        }
    }

    #[test]
    fn test_with_spot_and_expiry_copy() {
        let base = OptionParameters::<f64>::default();
        let moved = base.with_spot(120.0).unwrap().with_expiry(0.25).unwrap();

        assert_eq!(moved.spot(), 120.0);
        assert_eq!(moved.expiry(), 0.25);
        assert_eq!(moved.strike(), base.strike());
        assert_eq!(base.spot(), 100.0);
        assert_eq!(base.expiry(), 1.0);

        assert!(base.with_spot(-1.0).is_err());
        assert!(base.with_expiry(0.0).is_err());
    }

    #[test]
    fn test_discount_factor() {
        let params = OptionParameters::new(100.0_f64, 100.0, 2.0, 0.05, 0.2).unwrap();
        assert!((params.discount_factor() - (-0.1_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_f32_compatibility() {
        let params = OptionParameters::new(100.0_f32, 100.0, 1.0, 0.05, 0.2).unwrap();
        assert_eq!(params.spot(), 100.0_f32);
    }
}
