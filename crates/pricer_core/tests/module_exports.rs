//! Integration tests for module exports.
//!
//! Verify that all public modules and types are correctly exported
//! and accessible via absolute paths.

/// Smoothing functions and activations are accessible via absolute path.
#[test]
fn test_smoothing_module_exports() {
    use pricer_core::math::smoothing::sigmoid;
    use pricer_core::math::smoothing::softplus;

    let _ = softplus(0.5_f64);
    let _ = sigmoid(0.5_f64);
}

/// The error type is re-exported from `types`.
#[test]
fn test_types_module_exports() {
    use pricer_core::types::error::PricingError as Direct;
    use pricer_core::types::PricingError;

    let err: Direct = PricingError::InvalidInput("strike must be positive".to_string());
    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
    assert_eq!(boxed.to_string(), "Invalid input: strike must be positive");
}
