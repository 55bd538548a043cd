//! Price surfaces and greek profiles over spot/maturity grids.
//!
//! Every cell is priced from its own parameter value
//! (`params.with_spot(s).with_expiry(t)`), so evaluation is a pure map and
//! runs in parallel with Rayon.

use rayon::prelude::*;

use super::black_scholes::BlackScholes;
use super::error::AnalyticalError;
use super::greeks::Greeks;
use crate::instruments::{OptionParameters, OptionType};

/// Option values on a maturity × spot grid.
///
/// `values[i][j]` is the price at `maturities[i]` and `spots[j]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceSurface {
    /// Spot grid (columns).
    pub spots: Vec<f64>,
    /// Maturity grid (rows).
    pub maturities: Vec<f64>,
    /// Prices indexed `[maturity][spot]`.
    pub values: Vec<Vec<f64>>,
}

impl PriceSurface {
    /// Price at grid indices, `None` if out of range.
    #[inline]
    pub fn get(&self, maturity_index: usize, spot_index: usize) -> Option<f64> {
        self.values.get(maturity_index)?.get(spot_index).copied()
    }

    /// Grid dimensions as `(maturities, spots)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.maturities.len(), self.spots.len())
    }
}

fn require_non_empty(name: &str, grid: &[f64]) -> Result<(), AnalyticalError> {
    if grid.is_empty() {
        Err(AnalyticalError::InvalidGrid {
            message: format!("{} grid is empty", name),
        })
    } else {
        Ok(())
    }
}

/// Prices `kind` on every (maturity, spot) pair.
///
/// Strike, rate and volatility come from `params`; its spot and expiry are
/// replaced per cell.
///
/// # Errors
/// - `AnalyticalError::InvalidGrid` if either grid is empty
/// - `AnalyticalError::InvalidParameter` if a grid value is not strictly positive
/// - `AnalyticalError::NumericalInstability` as for [`BlackScholes::price`]
///
/// # Examples
/// ```
/// use pricer_models::analytical::price_surface;
/// use pricer_models::instruments::{OptionParameters, OptionType};
///
/// let params = OptionParameters::default();
/// let surface = price_surface(&params, &[90.0, 100.0, 110.0], &[0.5, 1.0], OptionType::Call).unwrap();
/// assert_eq!(surface.shape(), (2, 3));
/// assert!(surface.values[1][2] > surface.values[1][0]);
/// ```
pub fn price_surface(
    params: &OptionParameters<f64>,
    spots: &[f64],
    maturities: &[f64],
    kind: OptionType,
) -> Result<PriceSurface, AnalyticalError> {
    require_non_empty("spot", spots)?;
    require_non_empty("maturity", maturities)?;

    let values = maturities
        .par_iter()
        .map(|&expiry| {
            let row_params = params.with_expiry(expiry)?;
            spots
                .par_iter()
                .map(|&spot| BlackScholes::from_params(&row_params.with_spot(spot)?)?.price(kind))
                .collect::<Result<Vec<f64>, AnalyticalError>>()
        })
        .collect::<Result<Vec<Vec<f64>>, AnalyticalError>>()?;

    Ok(PriceSurface {
        spots: spots.to_vec(),
        maturities: maturities.to_vec(),
        values,
    })
}

/// Greeks of `kind` at each spot, all other inputs taken from `params`.
///
/// # Errors
/// As for [`price_surface`].
pub fn greek_profile(
    params: &OptionParameters<f64>,
    spots: &[f64],
    kind: OptionType,
) -> Result<Vec<Greeks<f64>>, AnalyticalError> {
    require_non_empty("spot", spots)?;

    spots
        .par_iter()
        .map(|&spot| BlackScholes::from_params(&params.with_spot(spot)?)?.greeks(kind))
        .collect()
}

/// Evenly spaced grid of `n` points from `start` to `end` inclusive.
///
/// # Errors
/// `AnalyticalError::InvalidGrid` if `n == 0`, the bounds are not finite, or
/// `n == 1` with distinct bounds.
pub fn linspace(start: f64, end: f64, n: usize) -> Result<Vec<f64>, AnalyticalError> {
    if n == 0 || !start.is_finite() || !end.is_finite() || (n == 1 && start != end) {
        return Err(AnalyticalError::InvalidGrid {
            message: format!("cannot build {} points on [{}, {}]", n, start, end),
        });
    }
    if n == 1 {
        return Ok(vec![start]);
    }
    let step = (end - start) / (n - 1) as f64;
    Ok((0..n)
        .map(|i| if i + 1 == n { end } else { start + step * i as f64 })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_surface_orientation() {
        let params = OptionParameters::default();
        let spots = [80.0, 100.0, 120.0];
        let maturities = [0.25, 1.0];
        let surface = price_surface(&params, &spots, &maturities, OptionType::Call).unwrap();

        assert_eq!(surface.values.len(), maturities.len());
        for (i, &t) in maturities.iter().enumerate() {
            assert_eq!(surface.values[i].len(), spots.len());
            for (j, &s) in spots.iter().enumerate() {
                let expected = BlackScholes::new(s, 100.0, t, 0.05, 0.2).unwrap().price_call();
                assert_eq!(surface.get(i, j), Some(expected));
            }
        }
        assert_eq!(surface.get(2, 0), None);
    }

    #[test]
    fn test_surface_does_not_touch_base_params() {
        let params = OptionParameters::default();
        let _ = price_surface(&params, &[50.0, 150.0], &[2.0], OptionType::Put).unwrap();
        assert_eq!(params, OptionParameters::default());
    }

    #[test]
    fn test_empty_grids_rejected() {
        let params = OptionParameters::default();
        assert!(matches!(
            price_surface(&params, &[], &[1.0], OptionType::Call),
            Err(AnalyticalError::InvalidGrid { .. })
        ));
        assert!(matches!(
            price_surface(&params, &[100.0], &[], OptionType::Call),
            Err(AnalyticalError::InvalidGrid { .. })
        ));
        assert!(matches!(
            greek_profile(&params, &[], OptionType::Call),
            Err(AnalyticalError::InvalidGrid { .. })
        ));
    }

    #[test]
    fn test_invalid_grid_values_rejected() {
        let params = OptionParameters::default();
        match price_surface(&params, &[100.0, -1.0], &[1.0], OptionType::Call) {
            Err(AnalyticalError::InvalidParameter { name, value }) => {
                assert_eq!(name, "spot");
                assert_eq!(value, -1.0);
            }
            other => panic!("Expected InvalidParameter, got {:?}", other),
        }
        assert!(price_surface(&params, &[100.0], &[0.0], OptionType::Call).is_err());
    }

    #[test]
    fn test_greek_profile_matches_pointwise() {
        let params = OptionParameters::default();
        let spots = [60.0, 100.0, 140.0];
        let profile = greek_profile(&params, &spots, OptionType::Put).unwrap();

        assert_eq!(profile.len(), 3);
        for (greeks, &s) in profile.iter().zip(spots.iter()) {
            let expected = BlackScholes::from_params(&params.with_spot(s).unwrap())
                .unwrap()
                .greeks(OptionType::Put)
                .unwrap();
            assert_eq!(*greeks, expected);
        }
        // Put delta rises towards zero as spot increases
        assert!(profile[0].delta < profile[1].delta);
        assert!(profile[1].delta < profile[2].delta);
    }

    #[test]
    fn test_linspace() {
        let grid = linspace(50.0, 150.0, 5).unwrap();
        assert_eq!(grid, vec![50.0, 75.0, 100.0, 125.0, 150.0]);
        assert_eq!(linspace(1.0, 1.0, 1).unwrap(), vec![1.0]);
        assert!(linspace(0.0, 1.0, 0).is_err());
        assert!(linspace(0.0, 1.0, 1).is_err());
        assert!(linspace(0.0, f64::NAN, 3).is_err());

        let fine = linspace(0.1, 0.3, 3).unwrap();
        assert_relative_eq!(fine[1], 0.2, epsilon = 1e-15);
        assert_eq!(fine[2], 0.3);
    }
}
