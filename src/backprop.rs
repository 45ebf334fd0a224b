//! Backprop Calculator
//!
//! Walks one training example through a fixed 2-2-1 sigmoid network and shows
//! every intermediate number of the forward and backward pass.
//!
//! ## Network
//!
//! ```text
//!  x₁ ─┬─▶ [h₁] ─┐
//!      ╳         ├─▶ [ŷ]
//!  x₂ ─┴─▶ [h₂] ─┘
//!
//! W¹ = [[0.1, 0.2], [0.3, 0.4]]   b¹ = [0.1, 0.1]
//! W² = [0.5, 0.6]                 b² = 0.1
//! ```
//!
//! ## Equations
//!
//! ```text
//! Forward:
//!   z¹ = W¹x + b¹        a¹ = σ(z¹)
//!   z² = W²·a¹ + b²      ŷ  = σ(z²)
//!   L  = ½(y - ŷ)²
//!
//! Backward:
//!   δ²      = -(y - ŷ) · ŷ(1 - ŷ)
//!   ∂L/∂W²ᵢ = δ² · a¹ᵢ
//!   δ¹ᵢ     = W²ᵢ · δ² · a¹ᵢ(1 - a¹ᵢ)
//!
//! Update:
//!   W²ᵢ ← W²ᵢ - η · ∂L/∂W²ᵢ
//! ```

use crate::activation::sigmoid;
use serde::Serialize;

/// Fixed network weights
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BackpropNetwork {
    pub w1: [[f64; 2]; 2],
    pub b1: [f64; 2],
    pub w2: [f64; 2],
    pub b2: f64,
}

impl Default for BackpropNetwork {
    fn default() -> Self {
        Self {
            w1: [[0.1, 0.2], [0.3, 0.4]],
            b1: [0.1, 0.1],
            w2: [0.5, 0.6],
            b2: 0.1,
        }
    }
}

/// Forward pass intermediates
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ForwardValues {
    pub z1: [f64; 2],
    pub a1: [f64; 2],
    pub z2: f64,
    pub y_hat: f64,
    pub loss: f64,
}

/// Backward pass intermediates
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BackwardValues {
    pub delta2: f64,
    pub d_w2: [f64; 2],
    pub delta1: [f64; 2],
}

/// Everything the calculator displays for one input
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BackpropResult {
    pub forward: ForwardValues,
    pub backward: BackwardValues,
    /// Output weights after one gradient step
    pub updated_w2: [f64; 2],
}

impl BackpropNetwork {
    /// Run forward, backward and one update of W²
    ///
    /// # Arguments
    ///
    /// * `x1`, `x2` - Inputs
    /// * `y` - Target
    /// * `lr` - Learning rate η
    pub fn compute(&self, x1: f64, x2: f64, y: f64, lr: f64) -> BackpropResult {
        // Forward pass
        let z1 = [
            self.w1[0][0] * x1 + self.w1[0][1] * x2 + self.b1[0],
            self.w1[1][0] * x1 + self.w1[1][1] * x2 + self.b1[1],
        ];
        let a1 = [sigmoid(z1[0]), sigmoid(z1[1])];
        let z2 = self.w2[0] * a1[0] + self.w2[1] * a1[1] + self.b2;
        let y_hat = sigmoid(z2);
        let loss = 0.5 * (y - y_hat).powi(2);

        // Backward pass
        let d_loss_d_yhat = -(y - y_hat);
        let d_yhat_d_z2 = y_hat * (1.0 - y_hat);
        let delta2 = d_loss_d_yhat * d_yhat_d_z2;

        let d_w2 = [delta2 * a1[0], delta2 * a1[1]];
        let delta1 = [
            self.w2[0] * delta2 * a1[0] * (1.0 - a1[0]),
            self.w2[1] * delta2 * a1[1] * (1.0 - a1[1]),
        ];

        BackpropResult {
            forward: ForwardValues {
                z1,
                a1,
                z2,
                y_hat,
                loss,
            },
            backward: BackwardValues {
                delta2,
                d_w2,
                delta1,
            },
            updated_w2: [self.w2[0] - lr * d_w2[0], self.w2[1] - lr * d_w2[1]],
        }
    }
}

/// Slider range for x₁, x₂ and y
pub const INPUT_RANGE: (f64, f64) = (0.0, 1.0);
/// Slider range for η
pub const LEARNING_RATE_RANGE: (f64, f64) = (0.1, 2.0);

/// Calculator with slider state
#[derive(Clone, Debug)]
pub struct BackpropCalculator {
    pub network: BackpropNetwork,
    x1: f64,
    x2: f64,
    y: f64,
    lr: f64,
}

impl Default for BackpropCalculator {
    fn default() -> Self {
        Self {
            network: BackpropNetwork::default(),
            x1: 0.5,
            x2: 0.3,
            y: 1.0,
            lr: 0.5,
        }
    }
}

impl BackpropCalculator {
    /// Set all four sliders, snapping each to its range and 0.1 step
    ///
    /// A non-finite value leaves that slider where it was.
    pub fn set_inputs(&mut self, x1: f64, x2: f64, y: f64, lr: f64) {
        self.x1 = slider(x1, INPUT_RANGE).unwrap_or(self.x1);
        self.x2 = slider(x2, INPUT_RANGE).unwrap_or(self.x2);
        self.y = slider(y, INPUT_RANGE).unwrap_or(self.y);
        self.lr = slider(lr, LEARNING_RATE_RANGE).unwrap_or(self.lr);
    }

    pub fn inputs(&self) -> (f64, f64, f64, f64) {
        (self.x1, self.x2, self.y, self.lr)
    }

    pub fn result(&self) -> BackpropResult {
        self.network.compute(self.x1, self.x2, self.y, self.lr)
    }

    /// Text panel mirroring the page output
    pub fn report(&self) -> String {
        let r = self.result();
        let f = &r.forward;
        let b = &r.backward;
        let w2 = self.network.w2;

        let mut out = String::new();
        out.push_str("▶ Forward Pass\n");
        out.push_str(&format!("z¹ = [{:.4}, {:.4}]\n", f.z1[0], f.z1[1]));
        out.push_str(&format!("a¹ = [{:.4}, {:.4}]\n", f.a1[0], f.a1[1]));
        out.push_str(&format!("z² = {:.4}\n", f.z2));
        out.push_str(&format!("ŷ = {:.4}\n", f.y_hat));
        out.push_str(&format!("Loss = {:.6}\n", f.loss));
        out.push_str("\n◀ Backward Pass\n");
        out.push_str(&format!("δ² = {:.6}\n", b.delta2));
        out.push_str(&format!("∂L/∂W² = [{:.6}, {:.6}]\n", b.d_w2[0], b.d_w2[1]));
        out.push_str(&format!("δ¹ = [{:.6}, {:.6}]\n", b.delta1[0], b.delta1[1]));
        out.push_str(&format!("\nWeight Updates (η = {}):\n", self.lr));
        out.push_str(&format!("W²[0]: {} → {:.4}\n", w2[0], r.updated_w2[0]));
        out.push_str(&format!("W²[1]: {} → {:.4}\n", w2[1], r.updated_w2[1]));
        out
    }
}

/// Clamp to `range` and round to the nearest 0.1, or `None` if not finite
fn slider(value: f64, (lo, hi): (f64, f64)) -> Option<f64> {
    value
        .is_finite()
        .then(|| ((value * 10.0).round() / 10.0).clamp(lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_forward_pass_default_inputs() {
        let r = BackpropNetwork::default().compute(0.5, 0.3, 1.0, 0.5);

        assert_abs_diff_eq!(r.forward.z1[0], 0.21, epsilon = 1e-12);
        assert_abs_diff_eq!(r.forward.z1[1], 0.37, epsilon = 1e-12);
        assert_abs_diff_eq!(r.forward.a1[0], sigmoid(0.21), epsilon = 1e-12);

        let z2 = 0.5 * sigmoid(0.21) + 0.6 * sigmoid(0.37) + 0.1;
        assert_abs_diff_eq!(r.forward.z2, z2, epsilon = 1e-12);
        assert_abs_diff_eq!(r.forward.y_hat, sigmoid(z2), epsilon = 1e-12);
        assert!(r.forward.y_hat < 1.0);
        assert_abs_diff_eq!(
            r.forward.loss,
            0.5 * (1.0 - r.forward.y_hat).powi(2),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_update_moves_output_toward_target() {
        let net = BackpropNetwork::default();
        let r = net.compute(0.5, 0.3, 1.0, 0.5);

        // Target above prediction: δ² < 0, so both W² entries grow
        assert!(r.backward.delta2 < 0.0);
        assert!(r.updated_w2[0] > net.w2[0]);
        assert!(r.updated_w2[1] > net.w2[1]);

        let updated = BackpropNetwork {
            w2: r.updated_w2,
            ..net
        };
        let after = updated.compute(0.5, 0.3, 1.0, 0.5);
        assert!(after.forward.loss < r.forward.loss);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let net = BackpropNetwork::default();
        let (x1, x2, y) = (0.8, 0.1, 0.2);
        let r = net.compute(x1, x2, y, 0.5);
        let h = 1e-6;

        for i in 0..2 {
            let mut plus = net.clone();
            plus.w2[i] += h;
            let mut minus = net.clone();
            minus.w2[i] -= h;
            let numeric = (plus.compute(x1, x2, y, 0.0).forward.loss
                - minus.compute(x1, x2, y, 0.0).forward.loss)
                / (2.0 * h);
            assert_abs_diff_eq!(r.backward.d_w2[i], numeric, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_calculator_clamps_and_reports() {
        let mut calc = BackpropCalculator::default();
        calc.set_inputs(-1.0, 2.0, 0.5, 10.0);
        assert_eq!(calc.inputs(), (0.0, 1.0, 0.5, 2.0));

        let report = calc.report();
        assert!(report.contains("▶ Forward Pass"));
        assert!(report.contains("W²[0]: 0.5 →"));
    }

    #[test]
    fn test_calculator_snaps_and_ignores_non_finite() {
        let mut calc = BackpropCalculator::default();
        calc.set_inputs(0.34, 0.76, f64::NAN, f64::INFINITY);
        assert_eq!(calc.inputs(), (0.3, 0.8, 1.0, 0.5));

        calc.set_inputs(f64::NEG_INFINITY, f64::NAN, 0.0, 1.26);
        assert_eq!(calc.inputs(), (0.3, 0.8, 0.0, 1.3));
        assert!(calc.result().forward.loss.is_finite());
    }
}
