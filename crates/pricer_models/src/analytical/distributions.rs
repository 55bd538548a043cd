//! Standard normal distribution functions.
//!
//! - `norm_cdf`: cumulative distribution function Φ
//! - `norm_pdf`: probability density function φ
//!
//! Both are generic over `T: Float`. Φ is built on a rational erfc
//! approximation whose reflection `erfc(-x) = 2 - erfc(x)` is applied
//! exactly, so `Φ(x) + Φ(-x) = 1` holds to rounding for every `x != 0`
//! and Black-Scholes put-call parity is preserved to machine precision.

use num_traits::Float;

/// 1 / sqrt(2π)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Abramowitz & Stegun 7.1.26 polynomial coefficients, lowest order first.
const ERFC_COEFFS: [f64; 5] = [
    0.254_829_592,
    -0.284_496_736,
    1.421_413_741,
    -1.453_152_027,
    1.061_405_429,
];

/// A&S 7.1.26 rational argument scale.
const ERFC_P: f64 = 0.327_591_1;

#[inline]
fn constant<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// Complementary error function, absolute error below 1.5e-7.
#[inline]
fn erfc_approx<T: Float>(x: T) -> T {
    let abs_x = x.abs();
    let t = T::one() / (T::one() + constant::<T>(ERFC_P) * abs_x);

    let poly = ERFC_COEFFS
        .iter()
        .rev()
        .fold(T::zero(), |acc, &c| acc * t + constant(c));
    let tail = t * poly * (-abs_x * abs_x).exp();

    if x < T::zero() {
        constant::<T>(2.0) - tail
    } else {
        tail
    }
}

/// Standard normal cumulative distribution function.
///
/// Φ(x) = ½·erfc(−x/√2), accurate to about 1e-7 for every finite `x` and
/// always within `[0, 1]`.
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
/// assert!(norm_cdf(-3.0_f64) < 0.01);
/// assert!(norm_cdf(3.0_f64) > 0.99);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    let arg = -x / constant(std::f64::consts::SQRT_2);
    constant::<T>(0.5) * erfc_approx(arg)
}

/// Standard normal probability density function.
///
/// φ(x) = exp(−x²/2) / √(2π)
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0_f64) - 0.3989422804).abs() < 1e-9);
/// assert!((norm_pdf(1.0_f64) - 0.2419707245).abs() < 1e-9);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    constant::<T>(FRAC_1_SQRT_2PI) * (-constant::<T>(0.5) * x * x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_norm_cdf_reference_values() {
        let cases = [
            (0.0, 0.5),
            (1.0, 0.841_344_746_068_542_9),
            (-1.0, 0.158_655_253_931_457_07),
            (2.0, 0.977_249_868_051_820_8),
            (-2.0, 0.022_750_131_948_179_195),
            (3.0, 0.998_650_101_968_369_9),
        ];
        for (x, expected) in cases {
            assert_relative_eq!(norm_cdf(x), expected, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_norm_cdf_reflection_is_exact() {
        for i in (-60..=60).filter(|&i| i != 0) {
            let x = i as f64 * 0.1;
            assert_relative_eq!(norm_cdf(x) + norm_cdf(-x), 1.0, epsilon = 1e-15);
        }
        // Both halves take the same branch at the origin.
        assert_relative_eq!(2.0 * norm_cdf(0.0_f64), 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_norm_cdf_monotonic_and_bounded() {
        let mut previous = norm_cdf(-10.0_f64);
        assert!(previous >= 0.0);
        for i in -99..=100 {
            let current = norm_cdf(i as f64 * 0.1);
            assert!(current >= previous, "CDF not monotonic at x = {}", i as f64 * 0.1);
            assert!(current <= 1.0);
            previous = current;
        }
    }

    #[test]
    fn test_norm_cdf_tails() {
        assert!(norm_cdf(8.0_f64) > 0.999_999);
        assert!(norm_cdf(-8.0_f64) < 1e-6);
        assert!(norm_cdf(-40.0_f64) >= 0.0);
    }

    #[test]
    fn test_norm_pdf_symmetry_and_peak() {
        let peak = norm_pdf(0.0_f64);
        assert_relative_eq!(peak, FRAC_1_SQRT_2PI, epsilon = 1e-15);
        for x in [0.1, 0.5, 1.0, 2.0, 3.0] {
            assert_relative_eq!(norm_pdf(x), norm_pdf(-x), epsilon = 1e-15);
            assert!(norm_pdf(x) < peak);
        }
        assert!(norm_pdf(8.0_f64) < 1e-12);
    }

    #[test]
    fn test_cdf_derivative_is_pdf() {
        let h = 1e-4;
        for x in [-2.0, -1.0, 0.0, 1.0, 2.0] {
            let fd = (norm_cdf(x + h) - norm_cdf(x - h)) / (2.0 * h);
            assert_relative_eq!(fd, norm_pdf(x), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_f32_compatibility() {
        assert!((norm_cdf(0.0_f32) - 0.5).abs() < 1e-5);
        assert!((norm_pdf(0.0_f32) - 0.398_942_3).abs() < 1e-5);
    }
}
