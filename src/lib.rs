//! Backprop Lab: Interactive Neural Network Lessons
//!
//! The state and numerics behind a hands-on backpropagation tutorial: small
//! demos a reader can poke at while learning how gradients flow through a
//! network. Everything here is host-agnostic; a web page, a terminal or a
//! test drives the demos through method calls and draws them onto a
//! [`render::Surface`].
//!
//! # Modules
//!
//! Numeric kernels:
//! - [`activation`] - Sigmoid, tanh, ReLU and leaky ReLU with derivatives
//! - [`optimizer`] - SGD, momentum and Adam steps on a 2-D quadratic bowl
//! - [`gradient_check`] - Analytical vs. centred-difference gradients
//!
//! Demos:
//! - [`quiz`] - Multiple-choice quiz state machine
//! - [`backprop`] - Step-by-step forward/backward calculator for a 2-2-1 network
//! - [`descent`] - Animated gradient descent on the loss surface
//! - [`explorer`] - Activation function plotter with pointer tracking
//! - [`network`] - Animated forward/backward network and hoverable diagram
//! - [`comp_graph`] - Computational graph for f = (x + y) × z
//!
//! Page plumbing:
//! - [`page`] - Theme, navigation, progress tracking, copy buttons
//! - [`store`] - Key-value persistence
//! - [`render`] - Drawing commands and surfaces
//! - [`config`] - Demo settings and presets
//! - [`trajectory_logger`] - CSV log of descent trajectories
//!
//! # Example
//!
//! ```rust
//! use backprop_lab::{gradient_check, optimizer_step, OptimizerKind, OptimizerState, Vec2};
//!
//! // One SGD step from (2, 2)
//! let state = OptimizerState::at(Vec2::new(2.0, 2.0));
//! let next = optimizer_step(OptimizerKind::Sgd, state, 0.1);
//! assert!((next.position.x - 1.6).abs() < 1e-12);
//!
//! // f(x) = x² + 3x + 1 at x = 2
//! let check = gradient_check(2.0, 1e-4);
//! assert!(check.passed);
//! ```

pub mod activation;
pub mod backprop;
pub mod comp_graph;
pub mod config;
pub mod descent;
pub mod error;
pub mod explorer;
pub mod gradient_check;
pub mod network;
pub mod optimizer;
pub mod page;
pub mod quiz;
pub mod render;
pub mod store;
pub mod trajectory_logger;

// Re-export main types for convenience
pub use activation::{activation, Activation, ActivationSample};
pub use backprop::{BackpropCalculator, BackpropNetwork, BackpropResult};
pub use comp_graph::{CompGraph, GraphMode};
pub use config::LabConfig;
pub use descent::GradientDescentDemo;
pub use error::{LabError, Result};
pub use explorer::ActivationExplorer;
pub use gradient_check::{gradient_check, GradientCheckResult, GradientChecker};
pub use network::{AnimatedNetwork, StaticNetwork};
pub use optimizer::{optimizer_step, OptimizerKind, OptimizerState, Vec2};
pub use page::{SectionTracker, Theme, ThemeManager};
pub use quiz::{Question, Quiz, QuizPhase, QuizRegistry, QuizSummary};
pub use render::{DrawCommand, RecordingSurface, Surface};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use trajectory_logger::TrajectoryLogger;
