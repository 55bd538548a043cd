//! The option problem a network is trained for.

use pricer_models::analytical::BlackScholes;
use pricer_models::instruments::{OptionParameters, OptionType};

use crate::error::PinnError;

/// European call pricing problem on the domain `[0, s_max] × [0, T]`.
///
/// A network, its trainer and the trained model are bound to exactly one
/// problem for their whole lifetime.
///
/// # Examples
/// ```
/// use pricer_pinn::PinnProblem;
///
/// let problem = PinnProblem::with_domain_multiplier(100.0, 1.0, 0.05, 0.2, 4.0).unwrap();
/// assert_eq!(problem.s_max(), 400.0);
/// assert_eq!(problem.terminal_value(130.0), 30.0);
/// assert_eq!(problem.normalise_spot(200.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PinnProblem {
    strike: f64,
    expiry: f64,
    rate: f64,
    volatility: f64,
    s_max: f64,
}

fn positive(name: &'static str, value: f64) -> Result<f64, PinnError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PinnError::InvalidParameter { name, value })
    }
}

impl PinnProblem {
    /// Creates a problem with an explicit upper spot bound.
    ///
    /// # Errors
    /// `PinnError::InvalidParameter` if K, T, σ or `s_max` is not strictly
    /// positive and finite, if `s_max <= K`, or if r is not finite.
    pub fn new(strike: f64, expiry: f64, rate: f64, volatility: f64, s_max: f64) -> Result<Self, PinnError> {
        if !rate.is_finite() {
            return Err(PinnError::InvalidParameter { name: "rate", value: rate });
        }
        let strike = positive("strike", strike)?;
        let s_max = positive("s_max", s_max)?;
        if s_max <= strike {
            return Err(PinnError::InvalidParameter { name: "s_max", value: s_max });
        }
        Ok(Self {
            strike,
            expiry: positive("expiry", expiry)?,
            rate,
            volatility: positive("volatility", volatility)?,
            s_max,
        })
    }

    /// Creates a problem with `s_max = multiplier · K`.
    pub fn with_domain_multiplier(
        strike: f64,
        expiry: f64,
        rate: f64,
        volatility: f64,
        multiplier: f64,
    ) -> Result<Self, PinnError> {
        let multiplier = positive("domain_multiplier", multiplier)?;
        Self::new(strike, expiry, rate, volatility, multiplier * strike)
    }

    /// Problem for the strike, expiry, rate and volatility of `params`.
    pub fn from_params(params: &OptionParameters<f64>, multiplier: f64) -> Result<Self, PinnError> {
        Self::with_domain_multiplier(
            params.strike(),
            params.expiry(),
            params.rate(),
            params.volatility(),
            multiplier,
        )
    }

    /// Strike (K).
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Maturity (T).
    #[inline]
    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    /// Risk-free rate (r).
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Volatility (σ).
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Upper edge of the spot domain.
    #[inline]
    pub fn s_max(&self) -> f64 {
        self.s_max
    }

    /// Call payoff at maturity, max(S - K, 0).
    #[inline]
    pub fn terminal_value(&self, spot: f64) -> f64 {
        OptionType::Call.payoff(spot, self.strike)
    }

    /// Far-field value S_max - K·e^(-r(T-t)).
    #[inline]
    pub fn upper_boundary_value(&self, t: f64) -> f64 {
        self.s_max - self.strike * (-self.rate * (self.expiry - t)).exp()
    }

    /// Maps `[0, s_max]` onto `[-1, 1]`.
    #[inline]
    pub fn normalise_spot(&self, spot: f64) -> f64 {
        2.0 * spot / self.s_max - 1.0
    }

    /// Maps `[0, T]` onto `[-1, 1]`.
    #[inline]
    pub fn normalise_time(&self, t: f64) -> f64 {
        2.0 * t / self.expiry - 1.0
    }

    /// Closed-form call value at calendar time `t`, i.e. with `T - t` to
    /// expiry. At or past maturity this is the payoff.
    ///
    /// # Errors
    /// `PinnError::Analytical` if the reference pricer rejects the inputs.
    pub fn analytic_call(&self, spot: f64, t: f64) -> Result<f64, PinnError> {
        let remaining = self.expiry - t;
        if remaining <= 0.0 {
            return Ok(self.terminal_value(spot));
        }
        let params = OptionParameters::new(spot, self.strike, remaining, self.rate, self.volatility)?;
        Ok(BlackScholes::from_params(&params)?.price(OptionType::Call)?)
    }
}
