//! Smooth activations.
//!
//! The neural pricer needs a positivity-enforcing output activation whose
//! derivatives exist everywhere. `softplus` is a smoothed `max(x, 0)` and
//! `sigmoid` is its derivative.
//!
//! Generic over `T: num_traits::Float`.

use num_traits::Float;

/// Softplus activation, `ln(1 + exp(x))`.
///
/// Strictly positive for every finite input and asymptotic to `max(x, 0)`.
/// Evaluated as `x + ln(1 + exp(-x))` for positive `x` so large inputs do
/// not overflow.
///
/// # Examples
/// ```
/// use pricer_core::math::smoothing::softplus;
///
/// assert!((softplus(0.0_f64) - 2.0_f64.ln()).abs() < 1e-15);
/// assert!((softplus(800.0_f64) - 800.0).abs() < 1e-12);
/// assert!(softplus(-800.0_f64) >= 0.0);
/// ```
#[inline]
pub fn softplus<T: Float>(x: T) -> T {
    if x > T::zero() {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Logistic sigmoid, `1 / (1 + exp(-x))`, the derivative of [`softplus`].
///
/// Uses the `exp(x) / (1 + exp(x))` form for negative inputs so the
/// exponential never overflows.
#[inline]
pub fn sigmoid<T: Float>(x: T) -> T {
    let one = T::one();
    if x >= T::zero() {
        one / (one + (-x).exp())
    } else {
        let e = x.exp();
        e / (one + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_softplus_matches_closed_form() {
        for &x in &[-30.0_f64, -2.5, -1e-3, 0.0, 0.7, 4.0, 25.0] {
            assert_relative_eq!(softplus(x), x.exp().ln_1p(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_softplus_is_positive_and_stable() {
        for &x in &[-700.0_f64, -50.0, -1.0, 0.0, 1.0, 50.0, 700.0] {
            let y = softplus(x);
            assert!(y.is_finite());
            assert!(y >= 0.0);
            assert!(y >= x);
        }
        assert!(softplus(-30.0_f64) > 0.0);
    }

    #[test]
    fn test_sigmoid_is_softplus_derivative() {
        let h = 1e-6;
        for &x in &[-8.0_f64, -1.5, 0.0, 0.3, 6.0] {
            let fd = (softplus(x + h) - softplus(x - h)) / (2.0 * h);
            assert_relative_eq!(sigmoid(x), fd, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_sigmoid_symmetry_and_limits() {
        for &x in &[0.1_f64, 2.0, 15.0, 800.0] {
            assert_relative_eq!(sigmoid(x) + sigmoid(-x), 1.0, epsilon = 1e-15);
        }
        assert_eq!(sigmoid(-800.0_f64), 0.0);
        assert_eq!(sigmoid(800.0_f64), 1.0);
    }

    proptest! {
        #[test]
        fn softplus_bounds_hold(x in -700.0_f64..700.0) {
            let y = softplus(x);
            prop_assert!(y >= x.max(0.0));
            prop_assert!(y <= x.max(0.0) + 2.0_f64.ln() + 1e-12);
            let s = sigmoid(x);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_softplus_f32() {
        let y = softplus(1.0_f32);
        assert!((y - 1.313_261_7).abs() < 1e-5);
    }
}
