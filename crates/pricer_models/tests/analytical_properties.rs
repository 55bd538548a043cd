//! Property-based tests for the Black-Scholes pricer.
//!
//! Checks no-arbitrage identities, monotonicity, limiting behaviour and the
//! pricing PDE over randomly drawn parameter sets.

use approx::assert_relative_eq;
use pricer_models::analytical::{greek_profile, price_surface, BlackScholes};
use pricer_models::instruments::{OptionParameters, OptionType};
use proptest::prelude::*;

/// Parameter sets near the money with σ√T ≥ 0.1, where every greek is far
/// above the CDF approximation error.
fn moderate_params() -> impl Strategy<Value = OptionParameters<f64>> {
    (
        50.0_f64..200.0,
        0.9_f64..1.1,
        0.25_f64..2.0,
        -0.02_f64..0.1,
        0.2_f64..0.6,
    )
        .prop_map(|(strike, moneyness, expiry, rate, vol)| {
            OptionParameters::new(strike * moneyness, strike, expiry, rate, vol).unwrap()
        })
}

/// Any valid parameter set across a wide range.
fn wide_params() -> impl Strategy<Value = OptionParameters<f64>> {
    (
        1.0_f64..500.0,
        1.0_f64..500.0,
        0.01_f64..5.0,
        -0.05_f64..0.2,
        0.01_f64..1.5,
    )
        .prop_map(|(spot, strike, expiry, rate, vol)| {
            OptionParameters::new(spot, strike, expiry, rate, vol).unwrap()
        })
}

fn model(params: &OptionParameters<f64>) -> BlackScholes<f64> {
    BlackScholes::from_params(params).unwrap()
}

proptest! {
    #[test]
    fn put_call_parity_holds(params in wide_params()) {
        let residual = model(&params).put_call_parity();
        prop_assert!(residual < 1e-10, "parity residual {:e}", residual);
    }

    #[test]
    fn prices_are_bounded(params in wide_params()) {
        let bs = model(&params);
        let call = bs.price(OptionType::Call).unwrap();
        let put = bs.price(OptionType::Put).unwrap();
        let discounted_strike = params.strike() * params.discount_factor();

        // Tolerance covers the CDF approximation error
        let tol = 1e-6 * params.spot().max(params.strike());
        prop_assert!(call >= (params.spot() - discounted_strike).max(0.0) - tol);
        prop_assert!(call <= params.spot() + tol);
        prop_assert!(put >= (discounted_strike - params.spot()).max(0.0) - tol);
        prop_assert!(put <= discounted_strike + tol);
    }

    #[test]
    fn call_increases_and_put_decreases_in_spot(params in moderate_params()) {
        let bumped = params.with_spot(params.spot() * 1.01).unwrap();
        let (lo, hi) = (model(&params), model(&bumped));
        prop_assert!(hi.price_call() > lo.price_call());
        prop_assert!(hi.price_put() < lo.price_put());
    }

    #[test]
    fn prices_increase_in_volatility(params in moderate_params()) {
        let bumped = OptionParameters::new(
            params.spot(),
            params.strike(),
            params.expiry(),
            params.rate(),
            params.volatility() * 1.05,
        )
        .unwrap();
        let (lo, hi) = (model(&params), model(&bumped));
        prop_assert!(lo.vega() > 0.0);
        prop_assert!(hi.price_call() > lo.price_call());
        prop_assert!(hi.price_put() > lo.price_put());
    }

    #[test]
    fn analytic_price_satisfies_the_pde(params in moderate_params()) {
        // ∂V/∂t + ½σ²S²V_SS + rSV_S - rV = 0, with ∂V/∂t = raw theta
        let bs = model(&params);
        let (s, r, sigma) = (params.spot(), params.rate(), params.volatility());
        for kind in [OptionType::Call, OptionType::Put] {
            let residual = bs.theta(kind)
                + 0.5 * sigma * sigma * s * s * bs.gamma()
                + r * s * bs.delta(kind)
                - r * bs.price(kind).unwrap();
            prop_assert!(residual.abs() < 1e-5 * params.strike(), "{} residual {}", kind, residual);
        }
    }

    #[test]
    fn surface_cell_matches_scalar_price(params in moderate_params()) {
        for kind in [OptionType::Call, OptionType::Put] {
            let surface = price_surface(&params, &[params.spot()], &[params.expiry()], kind).unwrap();
            prop_assert_eq!(surface.values[0][0], model(&params).price(kind).unwrap());
        }
    }
}

#[test]
fn call_vanishes_as_spot_goes_to_zero() {
    let params = OptionParameters::new(1e-3_f64, 100.0, 1.0, 0.05, 0.2).unwrap();
    let call = model(&params).price_call();
    assert!(call.abs() < 1e-10, "call = {}", call);
}

#[test]
fn call_approaches_forward_at_far_boundary() {
    // S_max = 4K
    let params = OptionParameters::new(400.0_f64, 100.0, 1.0, 0.05, 0.2).unwrap();
    let call = model(&params).price_call();
    assert_relative_eq!(call, 400.0 - 100.0 * (-0.05_f64).exp(), epsilon = 1e-4);
}

#[test]
fn greek_profile_is_consistent_with_summary() {
    let params = OptionParameters::default();
    let spots: Vec<f64> = (50..=150).step_by(10).map(f64::from).collect();
    let profile = greek_profile(&params, &spots, OptionType::Call).unwrap();

    for (greeks, &s) in profile.iter().zip(&spots) {
        let summary = model(&params.with_spot(s).unwrap()).summary().unwrap();
        assert_eq!(greeks, &summary.call_greeks);
    }
    // Call delta increases in spot
    assert!(profile.windows(2).all(|w| w[0].delta < w[1].delta));
}
