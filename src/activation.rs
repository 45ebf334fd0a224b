//! Activation Functions
//!
//! This module provides the four activation functions the tutorial explores,
//! each paired with its analytic derivative for backpropagation.
//!
//! ## Functions
//!
//! ```text
//! sigmoid(x)    = 1 / (1 + e^(-x))         sigmoid'(x) = s(x)(1 - s(x))
//! tanh(x)       = (e^x - e^-x)/(e^x + e^-x) tanh'(x)    = 1 - tanh(x)²
//! relu(x)       = max(0, x)                relu'(x)    = 1 if x > 0 else 0
//! leaky_relu(x) = x if x > 0 else 0.01x    leaky'(x)   = 1 if x > 0 else 0.01
//! ```
//!
//! All four are total over the reals. ReLU has no derivative at exactly 0; we
//! use the one-sided convention that x ≤ 0 takes the flat-region slope.
//!
//! ## Why Look at Derivatives?
//!
//! The derivative is what flows backward during training:
//! - **Sigmoid**: derivative peaks at 0.25 and vanishes for large |x|
//! - **Tanh**: peaks at 1.0, still saturates at the tails
//! - **ReLU**: constant slope 1 for positive inputs, dead for negative ones
//! - **Leaky ReLU**: keeps a small slope on the negative side
//!
//! ## Example
//!
//! ```rust
//! use backprop_lab::activation::{activation, Activation};
//!
//! let (value, derivative) = activation(Activation::Sigmoid, 0.0);
//! assert_eq!(value, 0.5);
//! assert_eq!(derivative, 0.25);
//! ```

use crate::error::LabError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Slope of leaky ReLU on the negative side
pub const LEAKY_SLOPE: f64 = 0.01;

/// Activation function kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Activation {
    Sigmoid,
    Tanh,
    Relu,
    LeakyRelu,
}

/// A function value and its derivative at one input
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivationSample {
    pub x: f64,
    pub value: f64,
    pub derivative: f64,
}

impl Activation {
    /// All kinds, in the order the explorer offers them
    pub const ALL: [Activation; 4] = [
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::Relu,
        Activation::LeakyRelu,
    ];

    /// Function value at `x`
    pub fn value(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
            Activation::LeakyRelu => {
                if x > 0.0 {
                    x
                } else {
                    LEAKY_SLOPE * x
                }
            }
        }
    }

    /// Analytic derivative at `x`
    pub fn derivative(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            Activation::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            Activation::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyRelu => {
                if x > 0.0 {
                    1.0
                } else {
                    LEAKY_SLOPE
                }
            }
        }
    }

    /// Evaluate value and derivative together
    pub fn sample(self, x: f64) -> ActivationSample {
        ActivationSample {
            x,
            value: self.value(x),
            derivative: self.derivative(x),
        }
    }

    /// Human-readable name shown in the explorer legend
    pub fn name(self) -> &'static str {
        match self {
            Activation::Sigmoid => "Sigmoid",
            Activation::Tanh => "Tanh",
            Activation::Relu => "ReLU",
            Activation::LeakyRelu => "Leaky ReLU",
        }
    }

    /// Formula string shown next to the curve
    pub fn formula(self) -> &'static str {
        match self {
            Activation::Sigmoid => "σ(x) = 1/(1+e⁻ˣ)",
            Activation::Tanh => "tanh(x) = (eˣ-e⁻ˣ)/(eˣ+e⁻ˣ)",
            Activation::Relu => "ReLU(x) = max(0, x)",
            Activation::LeakyRelu => "LReLU(x) = max(0.01x, x)",
        }
    }

    /// Curve colour
    pub fn color(self) -> &'static str {
        match self {
            Activation::Sigmoid => "#4ecdc4",
            Activation::Tanh => "#5b7cfa",
            Activation::Relu => "#d4a853",
            Activation::LeakyRelu => "#c44569",
        }
    }

    /// Identifier used in markup (`data-fn="leakyRelu"`)
    pub fn id(self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Relu => "relu",
            Activation::LeakyRelu => "leakyRelu",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "relu" => Ok(Activation::Relu),
            "leakyRelu" | "leaky_relu" | "leaky-relu" => Ok(Activation::LeakyRelu),
            other => Err(LabError::UnknownActivation(other.to_string())),
        }
    }
}

/// Logistic sigmoid
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Evaluate an activation and its derivative
///
/// # Arguments
///
/// * `kind` - Which activation function
/// * `x` - Input value (any real)
///
/// # Returns
///
/// Tuple of (value, derivative)
pub fn activation(kind: Activation, x: f64) -> (f64, f64) {
    (kind.value(x), kind.derivative(x))
}

/// Sample an activation at evenly spaced points
///
/// Produces `count` samples from `start` to `end` inclusive. Used to draw the
/// function and derivative curves one pixel column at a time.
///
/// # Arguments
///
/// * `kind` - Which activation function
/// * `start` - First x value
/// * `end` - Last x value
/// * `count` - Number of samples (0 yields an empty vector, 1 yields `start`)
///
/// # Performance
///
/// Uses parallel computation via Rayon; each sample is independent.
pub fn sample_curve(kind: Activation, start: f64, end: f64, count: usize) -> Vec<ActivationSample> {
    if count == 0 {
        return Vec::new();
    }
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };

    (0..count)
        .into_par_iter()
        .map(|i| kind.sample(start + step * i as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sigmoid_at_zero() {
        let (value, derivative) = activation(Activation::Sigmoid, 0.0);
        assert_eq!(value, 0.5);
        assert_eq!(derivative, 0.25);
    }

    #[test]
    fn test_sigmoid_bounded_and_derivative_identity() {
        for i in -200..=200 {
            let x = i as f64 * 0.1;
            let s = Activation::Sigmoid.sample(x);
            assert!(s.value > 0.0 && s.value < 1.0, "sigmoid({}) = {}", x, s.value);
            assert_abs_diff_eq!(s.derivative, s.value * (1.0 - s.value), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_tanh_derivative_identity() {
        for i in -50..=50 {
            let x = i as f64 * 0.1;
            let t = x.tanh();
            assert_abs_diff_eq!(Activation::Tanh.derivative(x), 1.0 - t * t, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_relu_value_and_step_derivative() {
        for x in [-3.0, -0.5, 0.0, 0.5, 3.0] {
            let s = Activation::Relu.sample(x);
            assert_eq!(s.value, f64::max(0.0, x));
            assert!(s.derivative == 0.0 || s.derivative == 1.0);
        }
        // One-sided convention at the kink
        assert_eq!(Activation::Relu.derivative(0.0), 0.0);
    }

    #[test]
    fn test_leaky_relu_negative_side() {
        assert_abs_diff_eq!(Activation::LeakyRelu.value(-2.0), -0.02, epsilon = 1e-12);
        assert_eq!(Activation::LeakyRelu.derivative(-2.0), LEAKY_SLOPE);
        assert_eq!(Activation::LeakyRelu.derivative(0.0), LEAKY_SLOPE);
        assert_eq!(Activation::LeakyRelu.derivative(1e-9), 1.0);
    }

    #[test]
    fn test_derivatives_match_finite_differences() {
        let h = 1e-6;
        for kind in Activation::ALL {
            for x in [-2.3, -0.7, 0.4, 1.9] {
                let numeric = (kind.value(x + h) - kind.value(x - h)) / (2.0 * h);
                assert_abs_diff_eq!(kind.derivative(x), numeric, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_parse_identifiers() {
        assert_eq!("sigmoid".parse::<Activation>().unwrap(), Activation::Sigmoid);
        assert_eq!("leakyRelu".parse::<Activation>().unwrap(), Activation::LeakyRelu);
        assert_eq!("leaky_relu".parse::<Activation>().unwrap(), Activation::LeakyRelu);
        assert!("softplus".parse::<Activation>().is_err());

        for kind in Activation::ALL {
            assert_eq!(kind.id().parse::<Activation>().unwrap(), kind);
        }
    }

    #[test]
    fn test_sample_curve_endpoints() {
        let samples = sample_curve(Activation::Relu, -5.0, 5.0, 11);
        assert_eq!(samples.len(), 11);
        assert_eq!(samples[0].x, -5.0);
        assert_abs_diff_eq!(samples[10].x, 5.0, epsilon = 1e-12);
        assert_eq!(samples[10].value, samples[10].x);

        assert!(sample_curve(Activation::Tanh, 0.0, 1.0, 0).is_empty());
        assert_eq!(sample_curve(Activation::Tanh, 0.3, 1.0, 1)[0].x, 0.3);
    }
}
