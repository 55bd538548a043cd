//! Greek sensitivities and combined pricing results.

use std::collections::BTreeMap;

use num_traits::Float;

use crate::instruments::{OptionParameters, OptionType};

/// Option sensitivities in market quoting conventions.
///
/// - `delta`: ∂V/∂S
/// - `gamma`: ∂²V/∂S²
/// - `vega`: ∂V/∂σ per 1% move in volatility
/// - `theta`: ∂V/∂t per calendar day
/// - `rho`: ∂V/∂r per 1% move in the rate
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greeks<T: Float> {
    /// Delta: ∂V/∂S
    pub delta: T,
    /// Gamma: ∂²V/∂S²
    pub gamma: T,
    /// Vega: ∂V/∂σ / 100
    pub vega: T,
    /// Theta: ∂V/∂t / 365
    pub theta: T,
    /// Rho: ∂V/∂r / 100
    pub rho: T,
}

impl<T: Float> Greeks<T> {
    /// Greek names in reporting order.
    pub const NAMES: [&'static str; 5] = ["delta", "gamma", "vega", "theta", "rho"];

    /// Name → value mapping.
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    /// use pricer_models::instruments::OptionType;
    ///
    /// let bs = BlackScholes::new(100.0_f64, 100.0, 1.0, 0.05, 0.2).unwrap();
    /// let map = bs.greeks(OptionType::Call).unwrap().to_map();
    /// assert_eq!(map.len(), 5);
    /// assert!((map["delta"] - 0.6368).abs() < 1e-3);
    /// ```
    pub fn to_map(&self) -> BTreeMap<&'static str, T> {
        Self::NAMES.into_iter().zip(self.values()).collect()
    }

    /// Values in the order of [`Self::NAMES`].
    pub fn values(&self) -> [T; 5] {
        [self.delta, self.gamma, self.vega, self.theta, self.rho]
    }

    /// Returns `true` if every sensitivity is finite.
    pub fn is_finite(&self) -> bool {
        self.values().iter().all(|v| v.is_finite())
    }
}

/// Both option prices, both greek sets and the parity check for one
/// parameter set.
///
/// Derived on demand by [`BlackScholes::summary`](super::BlackScholes::summary);
/// never cached by the pricer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PricingResult<T: Float> {
    /// Inputs the result was computed from.
    pub params: OptionParameters<T>,
    /// Call price.
    pub call_price: T,
    /// Put price.
    pub put_price: T,
    /// Call greeks.
    pub call_greeks: Greeks<T>,
    /// Put greeks.
    pub put_greeks: Greeks<T>,
    /// |(C - P) - (S - K·e^(-rT))|
    pub parity_residual: T,
}

impl<T: Float> PricingResult<T> {
    /// Price for the given option kind.
    #[inline]
    pub fn price(&self, kind: OptionType) -> T {
        match kind {
            OptionType::Call => self.call_price,
            OptionType::Put => self.put_price,
        }
    }

    /// Greeks for the given option kind.
    #[inline]
    pub fn greeks(&self, kind: OptionType) -> &Greeks<T> {
        match kind {
            OptionType::Call => &self.call_greeks,
            OptionType::Put => &self.put_greeks,
        }
    }
}
