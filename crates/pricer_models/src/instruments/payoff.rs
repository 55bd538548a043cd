//! Option type and payoff definitions.

use std::fmt;
use std::str::FromStr;

use num_traits::Float;
use thiserror::Error;

/// European option kind.
///
/// # Examples
/// ```
/// use pricer_models::instruments::OptionType;
///
/// let kind: OptionType = "PUT".parse().unwrap();
/// assert_eq!(kind, OptionType::Put);
/// assert_eq!(kind.payoff(90.0_f64, 100.0), 10.0);
/// assert_eq!(kind.to_string(), "put");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OptionType {
    /// Call option: max(S - K, 0)
    Call,
    /// Put option: max(K - S, 0)
    Put,
}

impl OptionType {
    /// Exact terminal payoff.
    #[inline]
    pub fn payoff<T: Float>(&self, spot: T, strike: T) -> T {
        let intrinsic = match self {
            OptionType::Call => spot - strike,
            OptionType::Put => strike - spot,
        };
        intrinsic.max(T::zero())
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// Error returned when a string names neither `call` nor `put`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown option type '{0}': expected 'call' or 'put'")]
pub struct ParseOptionTypeError(pub String);

impl FromStr for OptionType {
    type Err = ParseOptionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            _ => Err(ParseOptionTypeError(s.to_string())),
        }
    }
}
