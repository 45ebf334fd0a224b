//! Lab Configuration
//!
//! Every tunable the demos start from: optimizer and learning rate for the
//! descent demo, the gradient checker's starting point, canvas sizes and the
//! layer shapes of the two network diagrams.
//!
//! Configurations are plain serde structs, so a host can ship one as JSON:
//!
//! ```text
//! {
//!   "optimizer": "adam",
//!   "learning_rate": 0.3,
//!   "max_steps": 150,
//!   ...
//! }
//! ```

use crate::descent::GradientDescentDemo;
use crate::error::Result;
use crate::gradient_check::GradientChecker;
use crate::network::{AnimatedNetwork, StaticNetwork, ANIMATED_LAYERS, STATIC_LAYERS};
use crate::optimizer::OptimizerKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Canvas dimensions in pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Starting settings for every demo on the page
///
/// # Fields
///
/// - `optimizer`, `learning_rate`: initial descent demo controls
/// - `max_steps`: step limit for headless descent runs
/// - `seed`: fixes every random draw when set
/// - `gradient_check_x`, `epsilon_exponent`: initial checker sliders
/// - `*_canvas`: pixel size of each drawing surface
/// - `animated_layers`, `static_layers`: neurons per layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabConfig {
    pub optimizer: OptimizerKind,
    pub learning_rate: f64,
    pub max_steps: usize,
    pub seed: Option<u64>,
    pub gradient_check_x: f64,
    pub epsilon_exponent: i32,
    pub descent_canvas: CanvasSize,
    pub explorer_canvas: CanvasSize,
    pub network_canvas: CanvasSize,
    pub animated_layers: Vec<usize>,
    pub static_layers: Vec<usize>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerKind::Sgd,
            learning_rate: 0.1,
            max_steps: 500,
            seed: None,
            gradient_check_x: 2.0,
            epsilon_exponent: -4,
            descent_canvas: CanvasSize::new(500.0, 400.0),
            explorer_canvas: CanvasSize::new(600.0, 300.0),
            network_canvas: CanvasSize::new(600.0, 350.0),
            animated_layers: ANIMATED_LAYERS.to_vec(),
            static_layers: STATIC_LAYERS.to_vec(),
        }
    }
}

impl LabConfig {
    /// Fast, reproducible settings for tests and quick demos
    ///
    /// Adam with a large step converges well inside `max_steps`.
    pub fn quick() -> Self {
        Self {
            optimizer: OptimizerKind::Adam,
            learning_rate: 0.3,
            max_steps: 150,
            seed: Some(42),
            ..Self::default()
        }
    }

    /// Slow settings that make momentum's overshoot easy to watch
    pub fn slow_motion() -> Self {
        Self {
            optimizer: OptimizerKind::Momentum,
            learning_rate: 0.02,
            max_steps: 2000,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Random source for the demos: seeded if `seed` is set
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::rng().random()),
        }
    }

    pub fn descent_demo<R: Rng + ?Sized>(&self, rng: &mut R) -> GradientDescentDemo {
        GradientDescentDemo::new(self.optimizer, self.learning_rate, rng)
    }

    pub fn gradient_checker(&self) -> GradientChecker {
        GradientChecker::new(self.gradient_check_x, self.epsilon_exponent)
    }

    pub fn animated_network(&self) -> AnimatedNetwork {
        let CanvasSize { width, height } = self.network_canvas;
        match self.seed {
            Some(seed) => AnimatedNetwork::with_seed(&self.animated_layers, width, height, seed),
            None => AnimatedNetwork::new(&self.animated_layers, width, height),
        }
    }

    pub fn static_network(&self) -> StaticNetwork {
        let CanvasSize { width, height } = self.network_canvas;
        StaticNetwork::new(&self.static_layers, width, height)
    }
}
