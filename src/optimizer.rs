//! Optimizer Step Kernels
//!
//! This module advances a 2-D point one step toward the minimum of the bowl
//! used by the gradient descent demo:
//!
//! ```text
//! f(x, y) = x² + y²        ∇f(x, y) = (2x, 2y)
//! ```
//!
//! The gradient is exact. Three update rules are available.
//!
//! ## Algorithms
//!
//! ```text
//! # Plain gradient descent
//! θ = θ - α * g
//!
//! # Momentum (β = 0.9)
//! m = β * m + (1 - β) * g
//! θ = θ - α * m
//!
//! # Adam-style (β₁ = 0.9, β₂ = 0.999, ε = 1e-8)
//! m = β₁ * m + (1 - β₁) * g
//! v = β₂ * v + (1 - β₂) * g²
//! θ = θ - α * m / (√v + ε)
//! ```
//!
//! ## No Bias Correction
//!
//! Textbook Adam divides m and v by `(1 - β^t)` so that early steps are not
//! biased toward zero. This variant leaves the correction out, so the first
//! Adam steps are short and lengthen as m and v warm up.
//!
//! ## Example
//!
//! ```rust
//! use backprop_lab::optimizer::{optimizer_step, OptimizerKind, OptimizerState, Vec2};
//!
//! let state = OptimizerState::at(Vec2::new(2.0, 2.0));
//! let next = optimizer_step(OptimizerKind::Sgd, state, 0.1);
//! assert!((next.position.x - 1.6).abs() < 1e-12);
//! ```

use crate::error::LabError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

/// Momentum decay rate
pub const MOMENTUM_BETA: f64 = 0.9;
/// Adam first-moment decay rate
pub const ADAM_BETA1: f64 = 0.9;
/// Adam second-moment decay rate
pub const ADAM_BETA2: f64 = 0.999;
/// Adam numerical stability constant
pub const ADAM_EPSILON: f64 = 1e-8;
/// Both coordinates below this magnitude count as converged
pub const CONVERGENCE_TOLERANCE: f64 = 0.01;

/// A point or vector in the plane
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Apply `f` to each coordinate
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y))
    }

    /// Combine two vectors coordinate-wise
    pub fn zip_with(self, other: Vec2, f: impl Fn(f64, f64) -> f64) -> Self {
        Self::new(f(self.x, other.x), f(self.y, other.y))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Update rule selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Sgd,
    Momentum,
    Adam,
}

impl OptimizerKind {
    pub const ALL: [OptimizerKind; 3] = [
        OptimizerKind::Sgd,
        OptimizerKind::Momentum,
        OptimizerKind::Adam,
    ];

    /// Trajectory colour in the descent demo
    pub fn color(self) -> &'static str {
        match self {
            OptimizerKind::Sgd => "#4ecdc4",
            OptimizerKind::Momentum => "#5b7cfa",
            OptimizerKind::Adam => "#c44569",
        }
    }

    /// Identifier used in markup and on the command line
    pub fn id(self) -> &'static str {
        match self {
            OptimizerKind::Sgd => "sgd",
            OptimizerKind::Momentum => "momentum",
            OptimizerKind::Adam => "adam",
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for OptimizerKind {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sgd" => Ok(OptimizerKind::Sgd),
            "momentum" => Ok(OptimizerKind::Momentum),
            "adam" => Ok(OptimizerKind::Adam),
            other => Err(LabError::UnknownOptimizer(other.to_string())),
        }
    }
}

/// Position plus running moment estimates
///
/// # Fields
///
/// - `position`: Current point on the loss surface
/// - `momentum`: First moment (used by momentum and Adam)
/// - `velocity`: Second moment (Adam only)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizerState {
    pub position: Vec2,
    pub momentum: Vec2,
    pub velocity: Vec2,
}

impl OptimizerState {
    /// Fresh state at `position` with zeroed moments
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            momentum: Vec2::ZERO,
            velocity: Vec2::ZERO,
        }
    }

    /// Advance in place by one step
    pub fn step(&mut self, kind: OptimizerKind, learning_rate: f64) {
        *self = optimizer_step(kind, *self, learning_rate);
    }

    /// Loss at the current position
    pub fn loss(&self) -> f64 {
        loss(self.position)
    }

    pub fn is_converged(&self) -> bool {
        is_converged(self.position)
    }
}

/// Bowl loss f(x, y) = x² + y²
pub fn loss(p: Vec2) -> f64 {
    p.x * p.x + p.y * p.y
}

/// Exact gradient of the bowl loss
pub fn gradient(p: Vec2) -> Vec2 {
    p * 2.0
}

/// True once both coordinates are within the convergence tolerance
pub fn is_converged(p: Vec2) -> bool {
    p.x.abs() < CONVERGENCE_TOLERANCE && p.y.abs() < CONVERGENCE_TOLERANCE
}

/// Perform one optimizer step on the bowl loss
///
/// # Arguments
///
/// * `kind` - Update rule
/// * `state` - Current position and moment estimates
/// * `learning_rate` - Step size α
///
/// # Returns
///
/// The new state. Plain SGD carries the moments through untouched; momentum
/// leaves `velocity` untouched.
pub fn optimizer_step(
    kind: OptimizerKind,
    state: OptimizerState,
    learning_rate: f64,
) -> OptimizerState {
    let grad = gradient(state.position);

    match kind {
        OptimizerKind::Sgd => OptimizerState {
            position: state.position - grad * learning_rate,
            ..state
        },
        OptimizerKind::Momentum => {
            let momentum = state.momentum * MOMENTUM_BETA + grad * (1.0 - MOMENTUM_BETA);
            OptimizerState {
                position: state.position - momentum * learning_rate,
                momentum,
                velocity: state.velocity,
            }
        }
        OptimizerKind::Adam => {
            let momentum = state.momentum * ADAM_BETA1 + grad * (1.0 - ADAM_BETA1);
            let velocity = state.velocity * ADAM_BETA2 + grad.map(|g| g * g) * (1.0 - ADAM_BETA2);

            // Per-coordinate adaptive step: m / (√v + ε)
            let update = momentum.zip_with(velocity, |m, v| m / (v.sqrt() + ADAM_EPSILON));

            OptimizerState {
                position: state.position - update * learning_rate,
                momentum,
                velocity,
            }
        }
    }
}
