//! Gradient Checking
//!
//! Compares an analytic derivative with a central-difference estimate. This is
//! the standard sanity check for hand-written backward passes.
//!
//! ## Test Function
//!
//! ```text
//! f(x)  = x² + 3x + 1
//! f'(x) = 2x + 3
//! ```
//!
//! ## Algorithm
//!
//! ```text
//! numerical = (f(x + ε) - f(x - ε)) / 2ε
//! diff      = |analytical - numerical|
//! rel_error = diff / max(|analytical|, |numerical|, 1e-8)
//! passed    = rel_error < 1e-5
//! ```
//!
//! The `1e-8` floor in the denominator keeps the relative error finite where
//! the derivative crosses zero (x = -1.5).
//!
//! ## Example
//!
//! ```rust
//! use backprop_lab::gradient_check::gradient_check;
//!
//! let result = gradient_check(2.0, 1e-4);
//! assert_eq!(result.analytical, 7.0);
//! assert!(result.passed);
//! ```

use rayon::prelude::*;
use serde::Serialize;

/// Relative error below which a check passes
pub const PASS_THRESHOLD: f64 = 1e-5;

/// Denominator floor for the relative error
pub const RELATIVE_ERROR_FLOOR: f64 = 1e-8;

/// Slider range for x
pub const X_RANGE: (f64, f64) = (-5.0, 5.0);

/// Slider range for the ε exponent (ε = 10^k)
pub const EPSILON_EXPONENT_RANGE: (i32, i32) = (-6, -2);

/// Outcome of one gradient check
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GradientCheckResult {
    pub analytical: f64,
    pub numerical: f64,
    pub absolute_difference: f64,
    pub relative_error: f64,
    pub passed: bool,
}

/// The test function f(x) = x² + 3x + 1
pub fn test_function(x: f64) -> f64 {
    x * x + 3.0 * x + 1.0
}

/// Closed-form derivative f'(x) = 2x + 3
pub fn analytical_gradient(x: f64) -> f64 {
    2.0 * x + 3.0
}

/// Central-difference estimate of f'(x)
pub fn numerical_gradient(x: f64, epsilon: f64) -> f64 {
    (test_function(x + epsilon) - test_function(x - epsilon)) / (2.0 * epsilon)
}

/// Compare the analytic and numerical derivative at `x`
///
/// # Arguments
///
/// * `x` - Point at which to differentiate
/// * `epsilon` - Finite-difference step size
///
/// # Returns
///
/// Both gradients, their absolute difference, the relative error, and whether
/// the relative error is under [`PASS_THRESHOLD`].
pub fn gradient_check(x: f64, epsilon: f64) -> GradientCheckResult {
    let analytical = analytical_gradient(x);
    let numerical = numerical_gradient(x, epsilon);
    let absolute_difference = (analytical - numerical).abs();
    let scale = analytical
        .abs()
        .max(numerical.abs())
        .max(RELATIVE_ERROR_FLOOR);
    let relative_error = absolute_difference / scale;

    GradientCheckResult {
        analytical,
        numerical,
        absolute_difference,
        relative_error,
        passed: relative_error < PASS_THRESHOLD,
    }
}

/// Run the check at many points
///
/// # Performance
///
/// Points are independent, so they are evaluated in parallel via Rayon.
pub fn sweep(xs: &[f64], epsilon: f64) -> Vec<GradientCheckResult> {
    xs.par_iter().map(|&x| gradient_check(x, epsilon)).collect()
}

/// Help text shown under the demo, derived from [`PASS_THRESHOLD`]
pub fn help_text() -> String {
    format!(
        "Numerical gradient ≈ (f(x+ε) - f(x-ε)) / 2ε\n\
         If the relative error is below {:.0e}, gradients are likely correct.",
        PASS_THRESHOLD
    )
}

/// Slider-backed gradient checking demo
///
/// Holds the two user inputs, clamped to their slider ranges, and recomputes
/// the result on demand.
#[derive(Clone, Debug)]
pub struct GradientChecker {
    x: f64,
    epsilon_exponent: i32,
}

impl Default for GradientChecker {
    fn default() -> Self {
        Self {
            x: 2.0,
            epsilon_exponent: -4,
        }
    }
}

impl GradientChecker {
    pub fn new(x: f64, epsilon_exponent: i32) -> Self {
        let mut checker = Self::default();
        checker.set_x(x);
        checker.set_epsilon_exponent(epsilon_exponent);
        checker
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn epsilon_exponent(&self) -> i32 {
        self.epsilon_exponent
    }

    /// ε = 10^k
    pub fn epsilon(&self) -> f64 {
        10f64.powi(self.epsilon_exponent)
    }

    /// Move the x slider: clamped to [-5, 5] and snapped to a 0.1 step
    ///
    /// NaN and infinities are ignored.
    pub fn set_x(&mut self, x: f64) {
        if x.is_finite() {
            self.x = ((x * 10.0).round() / 10.0).clamp(X_RANGE.0, X_RANGE.1);
        }
    }

    pub fn set_epsilon_exponent(&mut self, k: i32) {
        self.epsilon_exponent = k.clamp(EPSILON_EXPONENT_RANGE.0, EPSILON_EXPONENT_RANGE.1);
    }

    pub fn result(&self) -> GradientCheckResult {
        gradient_check(self.x, self.epsilon())
    }

    /// Text panel mirroring what the page displays
    pub fn report(&self) -> String {
        let r = self.result();
        let eps = self.epsilon();
        format!(
            "Analytical Gradient: {:.8}   f'({x}) = 2({x}) + 3\n\
             Numerical Gradient:  {:.8}   (f({:.4}) - f({:.4})) / 2ε\n\
             Absolute Difference: {:.4e}\n\
             Relative Error:      {:.4e}\n\
             {}",
            r.analytical,
            r.numerical,
            self.x + eps,
            self.x - eps,
            r.absolute_difference,
            r.relative_error,
            if r.passed { "✓ PASS" } else { "✗ CHECK" },
            x = self.x,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_check_at_two() {
        let result = gradient_check(2.0, 1e-4);
        assert_eq!(result.analytical, 7.0);
        assert_abs_diff_eq!(result.numerical, 7.0, epsilon = 1e-6);
        assert!(result.relative_error < 1e-5);
        assert!(result.passed);
    }

    #[test]
    fn test_relative_error_finite_at_zero_derivative() {
        let result = gradient_check(-1.5, 1e-4);
        assert_eq!(result.analytical, 0.0);
        assert!(result.relative_error.is_finite());
    }

    #[test]
    fn test_large_epsilon_still_exact_for_quadratic() {
        // Central differences are exact on quadratics up to rounding
        let result = gradient_check(3.3, 1e-2);
        assert_abs_diff_eq!(result.numerical, result.analytical, epsilon = 1e-9);
        assert!(result.passed);
    }

    #[test]
    fn test_sweep_covers_slider_range() {
        let xs: Vec<f64> = (-50..=50).map(|i| i as f64 * 0.1).collect();
        let results = sweep(&xs, 1e-4);
        assert_eq!(results.len(), xs.len());
        for (x, r) in xs.iter().zip(&results) {
            assert_eq!(r.analytical, analytical_gradient(*x));
            assert!(r.absolute_difference < 1e-6);
        }
    }

    #[test]
    fn test_checker_clamps_inputs() {
        let mut checker = GradientChecker::new(12.0, -9);
        assert_eq!(checker.x(), 5.0);
        assert_eq!(checker.epsilon_exponent(), -6);

        checker.set_epsilon_exponent(0);
        assert_eq!(checker.epsilon_exponent(), -2);
        assert_abs_diff_eq!(checker.epsilon(), 0.01, epsilon = 1e-15);
    }

    #[test]
    fn test_checker_snaps_x_and_ignores_non_finite() {
        let mut checker = GradientChecker::new(f64::NAN, -4);
        assert_eq!(checker.x(), 2.0);

        checker.set_x(1.234);
        assert_eq!(checker.x(), 1.2);
        checker.set_x(-1.47);
        assert_eq!(checker.x(), -1.5);

        checker.set_x(f64::INFINITY);
        assert_eq!(checker.x(), -1.5);
        assert!(checker.result().passed);
    }

    #[test]
    fn test_help_text_uses_pass_threshold() {
        assert!(help_text().contains("1e-5"));
        assert!(GradientChecker::default().report().contains("PASS"));
    }
}
