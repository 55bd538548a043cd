//! Black-Scholes pricing model for European options.
//!
//! Closed-form prices and greeks for European calls and puts under
//! lognormal dynamics with constant rate and volatility.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·N(-d₂) - S·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T

use num_traits::Float;

use super::distributions::{norm_cdf, norm_pdf};
use super::error::AnalyticalError;
use super::greeks::{Greeks, PricingResult};
use crate::instruments::{OptionParameters, OptionType};

/// Smallest σ√T accepted before d₁ is considered degenerate.
pub const MIN_TOTAL_VOLATILITY: f64 = 1e-8;

/// Days per year used for theta quoting.
const DAYS_PER_YEAR: f64 = 365.0;

/// Scale for vega and rho, quoted per percentage point.
const PERCENT: f64 = 100.0;

#[inline]
fn constant<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

#[inline]
fn ensure_finite<T: Float>(what: &str, value: T) -> Result<T, AnalyticalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalyticalError::NumericalInstability {
            message: format!("{} is not finite", what),
        })
    }
}

/// Black-Scholes model bound to one set of option parameters.
///
/// The pricer is an immutable value: every operation is a pure function of
/// the parameters it was built from.
///
/// # Type Parameters
/// * `T` - Floating-point type implementing `Float` (e.g., `f64`, `f32`)
///
/// # Examples
/// ```
/// use pricer_models::analytical::BlackScholes;
///
/// let bs = BlackScholes::new(100.0_f64, 100.0, 1.0, 0.05, 0.2).unwrap();
/// let call_price = bs.price_call();
/// let put_price = bs.price_put();
///
/// // Put-call parity: C - P = S - K*exp(-rT)
/// let parity = call_price - put_price - (100.0 - 100.0 * (-0.05_f64).exp());
/// assert!(parity.abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholes<T: Float> {
    params: OptionParameters<T>,
}

impl<T: Float> BlackScholes<T> {
    /// Creates a new Black-Scholes model.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidParameter` if S, K, T or σ is not strictly
    ///   positive and finite, or r is not finite
    /// - `AnalyticalError::NumericalInstability` if σ√T < [`MIN_TOTAL_VOLATILITY`]
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    ///
    /// assert!(BlackScholes::new(100.0_f64, 100.0, 1.0, 0.05, 0.2).is_ok());
    /// assert!(BlackScholes::new(-100.0_f64, 100.0, 1.0, 0.05, 0.2).is_err());
    /// assert!(BlackScholes::new(100.0_f64, 100.0, 1.0, 0.05, 0.0).is_err());
    /// ```
    pub fn new(spot: T, strike: T, expiry: T, rate: T, volatility: T) -> Result<Self, AnalyticalError> {
        Self::from_params(&OptionParameters::new(spot, strike, expiry, rate, volatility)?)
    }

    /// Creates a model from already validated parameters.
    ///
    /// # Errors
    /// `AnalyticalError::NumericalInstability` if σ√T < [`MIN_TOTAL_VOLATILITY`].
    pub fn from_params(params: &OptionParameters<T>) -> Result<Self, AnalyticalError> {
        let total_vol = params.volatility() * params.expiry().sqrt();
        if total_vol < constant(MIN_TOTAL_VOLATILITY) {
            return Err(AnalyticalError::NumericalInstability {
                message: format!(
                    "sigma * sqrt(T) = {:e} is below {:e}",
                    total_vol.to_f64().unwrap_or(f64::NAN),
                    MIN_TOTAL_VOLATILITY
                ),
            });
        }
        Ok(Self { params: *params })
    }

    /// Parameters the model was built from.
    #[inline]
    pub fn params(&self) -> &OptionParameters<T> {
        &self.params
    }

    /// Returns `(d₁, d₂)`.
    ///
    /// d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T), d₂ = d₁ - σ√T
    #[inline]
    pub fn d1_d2(&self) -> (T, T) {
        let p = &self.params;
        let vol_sqrt_t = p.volatility() * p.expiry().sqrt();
        let drift = (p.rate() + constant::<T>(0.5) * p.volatility() * p.volatility()) * p.expiry();
        let d1 = ((p.spot() / p.strike()).ln() + drift) / vol_sqrt_t;
        (d1, d1 - vol_sqrt_t)
    }

    /// d₁ term.
    #[inline]
    pub fn d1(&self) -> T {
        self.d1_d2().0
    }

    /// d₂ term.
    #[inline]
    pub fn d2(&self) -> T {
        self.d1_d2().1
    }

    /// European call price, C = S·N(d₁) - K·e^(-rT)·N(d₂).
    #[inline]
    pub fn price_call(&self) -> T {
        let p = &self.params;
        let (d1, d2) = self.d1_d2();
        p.spot() * norm_cdf(d1) - p.strike() * p.discount_factor() * norm_cdf(d2)
    }

    /// European put price, P = K·e^(-rT)·N(-d₂) - S·N(-d₁).
    #[inline]
    pub fn price_put(&self) -> T {
        let p = &self.params;
        let (d1, d2) = self.d1_d2();
        p.strike() * p.discount_factor() * norm_cdf(-d2) - p.spot() * norm_cdf(-d1)
    }

    /// Price for the given option kind.
    ///
    /// # Errors
    /// `AnalyticalError::NumericalInstability` if the price is not finite.
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    /// use pricer_models::instruments::OptionType;
    ///
    /// let bs = BlackScholes::new(100.0_f64, 100.0, 1.0, 0.05, 0.2).unwrap();
    /// let call = bs.price(OptionType::Call).unwrap();
    /// assert!((call - 10.4506).abs() < 1e-3);
    /// ```
    pub fn price(&self, kind: OptionType) -> Result<T, AnalyticalError> {
        let value = match kind {
            OptionType::Call => self.price_call(),
            OptionType::Put => self.price_put(),
        };
        ensure_finite("price", value)
    }

    /// Delta, ∂V/∂S: N(d₁) for calls, N(d₁) - 1 for puts.
    #[inline]
    pub fn delta(&self, kind: OptionType) -> T {
        let n_d1 = norm_cdf(self.d1());
        match kind {
            OptionType::Call => n_d1,
            OptionType::Put => n_d1 - T::one(),
        }
    }

    /// Gamma, ∂²V/∂S² = φ(d₁) / (S·σ·√T), identical for calls and puts.
    #[inline]
    pub fn gamma(&self) -> T {
        let p = &self.params;
        norm_pdf(self.d1()) / (p.spot() * p.volatility() * p.expiry().sqrt())
    }

    /// Vega, ∂V/∂σ = S·√T·φ(d₁), per unit volatility.
    #[inline]
    pub fn vega(&self) -> T {
        let p = &self.params;
        p.spot() * p.expiry().sqrt() * norm_pdf(self.d1())
    }

    /// Theta, ∂V/∂t per year (calendar time moving forward).
    ///
    /// - Call: -(S·σ·φ(d₁))/(2√T) - r·K·e^(-rT)·N(d₂)
    /// - Put: -(S·σ·φ(d₁))/(2√T) + r·K·e^(-rT)·N(-d₂)
    #[inline]
    pub fn theta(&self, kind: OptionType) -> T {
        let p = &self.params;
        let (d1, d2) = self.d1_d2();
        let decay = -(p.spot() * p.volatility() * norm_pdf(d1)) / (constant::<T>(2.0) * p.expiry().sqrt());
        let carry = p.rate() * p.strike() * p.discount_factor();
        match kind {
            OptionType::Call => decay - carry * norm_cdf(d2),
            OptionType::Put => decay + carry * norm_cdf(-d2),
        }
    }

    /// Rho, ∂V/∂r per unit rate.
    ///
    /// - Call: K·T·e^(-rT)·N(d₂)
    /// - Put: -K·T·e^(-rT)·N(-d₂)
    #[inline]
    pub fn rho(&self, kind: OptionType) -> T {
        let p = &self.params;
        let d2 = self.d2();
        let scale = p.strike() * p.expiry() * p.discount_factor();
        match kind {
            OptionType::Call => scale * norm_cdf(d2),
            OptionType::Put => -scale * norm_cdf(-d2),
        }
    }

    /// All greeks in market conventions (vega and rho per 1%, theta per day).
    ///
    /// # Errors
    /// `AnalyticalError::NumericalInstability` if any sensitivity is not finite.
    pub fn greeks(&self, kind: OptionType) -> Result<Greeks<T>, AnalyticalError> {
        let percent = constant::<T>(PERCENT);
        let greeks = Greeks {
            delta: self.delta(kind),
            gamma: self.gamma(),
            vega: self.vega() / percent,
            theta: self.theta(kind) / constant(DAYS_PER_YEAR),
            rho: self.rho(kind) / percent,
        };
        if greeks.is_finite() {
            Ok(greeks)
        } else {
            Err(AnalyticalError::NumericalInstability {
                message: format!("greeks for {} are not finite", kind),
            })
        }
    }

    /// Put-call parity residual, |(C - P) - (S - K·e^(-rT))|.
    #[inline]
    pub fn put_call_parity(&self) -> T {
        let p = &self.params;
        let forward = p.spot() - p.strike() * p.discount_factor();
        ((self.price_call() - self.price_put()) - forward).abs()
    }

    /// Both prices, both greek sets and the parity residual.
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    /// use pricer_models::instruments::OptionType;
    ///
    /// let summary = BlackScholes::new(100.0_f64, 100.0, 1.0, 0.05, 0.2)
    ///     .unwrap()
    ///     .summary()
    ///     .unwrap();
    /// assert!((summary.put_price - 5.5735).abs() < 1e-3);
    /// assert!(summary.parity_residual < 1e-10);
    /// assert!(summary.greeks(OptionType::Put).delta < 0.0);
    /// ```
    pub fn summary(&self) -> Result<PricingResult<T>, AnalyticalError> {
        Ok(PricingResult {
            params: self.params,
            call_price: self.price(OptionType::Call)?,
            put_price: self.price(OptionType::Put)?,
            call_greeks: self.greeks(OptionType::Call)?,
            put_greeks: self.greeks(OptionType::Put)?,
            parity_residual: ensure_finite("parity residual", self.put_call_parity())?,
        })
    }
}

/// Prices a European call in one call.
///
/// # Errors
/// Same as [`BlackScholes::new`] and [`BlackScholes::price`].
pub fn call_price<T: Float>(spot: T, strike: T, expiry: T, rate: T, volatility: T) -> Result<T, AnalyticalError> {
    BlackScholes::new(spot, strike, expiry, rate, volatility)?.price(OptionType::Call)
}

/// Prices a European put in one call.
///
/// # Errors
/// Same as [`BlackScholes::new`] and [`BlackScholes::price`].
pub fn put_price<T: Float>(spot: T, strike: T, expiry: T, rate: T, volatility: T) -> Result<T, AnalyticalError> {
    BlackScholes::new(spot, strike, expiry, rate, volatility)?.price(OptionType::Put)
}
