//! Gradient Descent Demo
//!
//! A ball rolling down the bowl f(x, y) = x² + y² under a chosen update rule.
//! The demo owns its optimizer state and trajectory; the host calls
//! [`GradientDescentDemo::tick`] once per animation frame.
//!
//! ## Lifecycle
//!
//! ```text
//! reset ──▶ idle ──start──▶ running ──tick──▶ running ... ──converged──▶ idle
//!                ◀──stop────
//! ```
//!
//! `tick` checks the running flag first, so a stop between frames takes effect
//! before the next step.

use crate::optimizer::{is_converged, OptimizerKind, OptimizerState, Vec2};
use crate::render::{DrawCommand, Stroke, Surface, TextAlign};
use crate::trajectory_logger::TrajectoryLogger;
use rand::Rng;
use std::collections::VecDeque;

/// Longest trajectory kept for drawing
pub const MAX_PATH_LEN: usize = 200;

/// Clamp range for the learning-rate slider
pub const LEARNING_RATE_RANGE: (f64, f64) = (0.001, 1.0);

/// Centre of the random starting region
pub const START: Vec2 = Vec2::new(2.0, 2.0);

/// Half-width of the random starting region
pub const START_JITTER: f64 = 0.5;

/// Step size used when a non-finite one is requested at construction
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

const CONTOUR_LEVELS: [f64; 8] = [0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0];

/// Gradient descent visualization state
pub struct GradientDescentDemo {
    optimizer: OptimizerKind,
    learning_rate: f64,
    state: OptimizerState,
    path: VecDeque<Vec2>,
    running: bool,
    steps: usize,
    logger: Option<TrajectoryLogger>,
}

impl GradientDescentDemo {
    /// Create a demo at a random start near (2, 2)
    pub fn new<R: Rng + ?Sized>(optimizer: OptimizerKind, learning_rate: f64, rng: &mut R) -> Self {
        let mut demo = Self::starting_at(optimizer, learning_rate, START);
        demo.reset(rng);
        demo
    }

    /// Create a demo at a fixed start
    pub fn starting_at(optimizer: OptimizerKind, learning_rate: f64, position: Vec2) -> Self {
        let mut demo = Self {
            optimizer,
            learning_rate: clamp_learning_rate(learning_rate).unwrap_or(DEFAULT_LEARNING_RATE),
            state: OptimizerState::default(),
            path: VecDeque::with_capacity(MAX_PATH_LEN),
            running: false,
            steps: 0,
            logger: None,
        };
        demo.restart_from(position);
        demo
    }

    /// Log every subsequent step to `logger`
    pub fn attach_logger(&mut self, logger: TrajectoryLogger) {
        self.logger = Some(logger);
        self.log_position();
    }

    pub fn detach_logger(&mut self) -> Option<TrajectoryLogger> {
        self.logger.take()
    }

    /// Jump to a new random start and clear all moments
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let start = Vec2::new(
            START.x + rng.random_range(-START_JITTER..START_JITTER),
            START.y + rng.random_range(-START_JITTER..START_JITTER),
        );
        self.restart_from(start);
    }

    /// Restart from an explicit position
    pub fn restart_from(&mut self, position: Vec2) {
        self.state = OptimizerState::at(position);
        self.path.clear();
        self.path.push_back(position);
        self.running = false;
        self.steps = 0;
        self.log_position();
    }

    /// Take one optimizer step and extend the trajectory
    pub fn step(&mut self) {
        self.state.step(self.optimizer, self.learning_rate);
        self.steps += 1;

        self.path.push_back(self.state.position);
        if self.path.len() > MAX_PATH_LEN {
            self.path.pop_front();
        }
        self.log_position();
    }

    /// Advance one animation frame
    ///
    /// # Returns
    ///
    /// `true` if the demo is still running after this frame.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.step();

        if is_converged(self.state.position) {
            self.running = false;
            tracing::info!(
                optimizer = %self.optimizer,
                learning_rate = self.learning_rate,
                steps = self.steps,
                "converged"
            );
        }
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Switch update rule; starts over from a fresh random point
    pub fn set_optimizer<R: Rng + ?Sized>(&mut self, optimizer: OptimizerKind, rng: &mut R) {
        self.optimizer = optimizer;
        self.reset(rng);
    }

    /// Change the step size, clamped to the slider range
    ///
    /// NaN and infinities are ignored and the current rate is kept.
    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        if let Some(lr) = clamp_learning_rate(learning_rate) {
            self.learning_rate = lr;
        }
    }

    pub fn optimizer(&self) -> OptimizerKind {
        self.optimizer
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn state(&self) -> &OptimizerState {
        &self.state
    }

    pub fn position(&self) -> Vec2 {
        self.state.position
    }

    pub fn loss(&self) -> f64 {
        self.state.loss()
    }

    /// Steps taken since the last reset
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn path(&self) -> impl Iterator<Item = &Vec2> {
        self.path.iter()
    }

    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    /// Render contours, trajectory, current point and readout
    pub fn draw(&self, surface: &mut impl Surface) {
        let (w, h) = surface.size();
        let scale = w.min(h) / 8.0;
        let center = Vec2::new(w / 2.0, h / 2.0);
        let to_screen = |p: &Vec2| Vec2::new(center.x + p.x * scale, center.y + p.y * scale);

        surface.draw(DrawCommand::Clear);

        // Contour lines of the bowl: x² + y² = level
        for (i, level) in CONTOUR_LEVELS.iter().enumerate() {
            surface.draw(DrawCommand::Ring {
                center,
                radius: level.sqrt() * scale,
                stroke: Stroke::solid(
                    format!("rgba(212, 168, 83, {:.2})", 0.1 + i as f64 * 0.05),
                    1.0,
                ),
            });
        }

        if self.path.len() > 1 {
            surface.draw(DrawCommand::Polyline {
                points: self.path.iter().map(to_screen).collect(),
                stroke: Stroke::solid(self.optimizer.color(), 2.0),
            });
        }

        surface.draw(DrawCommand::Disc {
            center: to_screen(&self.state.position),
            radius: 8.0,
            color: "#d4a853".to_string(),
        });
        surface.draw(DrawCommand::Disc {
            center,
            radius: 6.0,
            color: "rgba(46, 204, 113, 0.5)".to_string(),
        });

        surface.text(
            Vec2::new(center.x, center.y + 20.0),
            "Minimum",
            "#6b6660",
            TextAlign::Center,
        );

        let p = self.state.position;
        surface.text(
            Vec2::new(10.0, 20.0),
            format!("Position: ({:.3}, {:.3})", p.x, p.y),
            "#e8e6e3",
            TextAlign::Left,
        );
        surface.text(
            Vec2::new(10.0, 40.0),
            format!("Loss: {:.4}", self.loss()),
            "#e8e6e3",
            TextAlign::Left,
        );
        surface.text(
            Vec2::new(10.0, 60.0),
            format!("Steps: {}", self.path.len()),
            "#e8e6e3",
            TextAlign::Left,
        );
    }

    fn log_position(&mut self) {
        if let Some(logger) = self.logger.as_mut() {
            if let Err(err) = logger.log(
                self.steps,
                self.optimizer,
                self.learning_rate,
                self.state.position,
            ) {
                tracing::warn!(error = %err, "failed to write trajectory row");
            }
        }
    }
}

fn clamp_learning_rate(learning_rate: f64) -> Option<f64> {
    learning_rate
        .is_finite()
        .then(|| learning_rate.clamp(LEARNING_RATE_RANGE.0, LEARNING_RATE_RANGE.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reset_lands_near_start() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let demo = GradientDescentDemo::new(OptimizerKind::Sgd, 0.1, &mut rng);
            let p = demo.position();
            assert!((1.5..2.5).contains(&p.x));
            assert!((1.5..2.5).contains(&p.y));
            assert_eq!(demo.path_len(), 1);
            assert_eq!(demo.state().momentum, Vec2::ZERO);
            assert!(!demo.is_running());
        }
    }

    #[test]
    fn test_tick_is_noop_until_started() {
        let mut demo = GradientDescentDemo::starting_at(OptimizerKind::Sgd, 0.1, START);
        assert!(!demo.tick());
        assert_eq!(demo.position(), START);
        assert_eq!(demo.steps(), 0);

        demo.start();
        assert!(demo.tick());
        assert!((demo.position().x - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_runs_until_converged_then_stops() {
        for kind in OptimizerKind::ALL {
            let mut demo = GradientDescentDemo::starting_at(kind, 0.1, START);
            demo.start();

            let mut frames = 0;
            while demo.tick() {
                frames += 1;
                assert!(frames < 10_000, "{} never converged", kind);
            }

            assert!(is_converged(demo.position()));
            assert!(!demo.is_running());
            assert!(demo.path_len() <= MAX_PATH_LEN);
        }
    }

    #[test]
    fn test_stop_halts_between_frames() {
        let mut demo = GradientDescentDemo::starting_at(OptimizerKind::Adam, 0.05, START);
        demo.start();
        demo.tick();
        let position = demo.position();
        demo.stop();
        assert!(!demo.tick());
        assert_eq!(demo.position(), position);
    }

    #[test]
    fn test_path_is_capped() {
        let mut demo = GradientDescentDemo::starting_at(OptimizerKind::Sgd, 0.001, START);
        for _ in 0..(MAX_PATH_LEN + 50) {
            demo.step();
        }
        assert_eq!(demo.path_len(), MAX_PATH_LEN);
        assert_eq!(demo.steps(), MAX_PATH_LEN + 50);
        assert_eq!(*demo.path().last().unwrap(), demo.position());
    }

    #[test]
    fn test_learning_rate_clamped() {
        let mut demo = GradientDescentDemo::starting_at(OptimizerKind::Sgd, 5.0, START);
        assert_eq!(demo.learning_rate(), 1.0);
        demo.set_learning_rate(-1.0);
        assert_eq!(demo.learning_rate(), 0.001);
    }

    #[test]
    fn test_non_finite_learning_rate_ignored() {
        let mut demo = GradientDescentDemo::starting_at(OptimizerKind::Sgd, f64::NAN, START);
        assert_eq!(demo.learning_rate(), DEFAULT_LEARNING_RATE);

        demo.set_learning_rate(0.2);
        demo.set_learning_rate(f64::NAN);
        demo.set_learning_rate(f64::INFINITY);
        assert_eq!(demo.learning_rate(), 0.2);

        demo.start();
        let mut frames = 0;
        while demo.tick() {
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(demo.position().is_finite());
        assert!(is_converged(demo.position()));
    }

    #[test]
    fn test_set_optimizer_resets() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut demo = GradientDescentDemo::new(OptimizerKind::Sgd, 0.1, &mut rng);
        demo.start();
        demo.tick();
        demo.tick();

        demo.set_optimizer(OptimizerKind::Momentum, &mut rng);
        assert_eq!(demo.optimizer(), OptimizerKind::Momentum);
        assert_eq!(demo.steps(), 0);
        assert_eq!(demo.path_len(), 1);
        assert!(!demo.is_running());
    }

    #[test]
    fn test_draw_emits_contours_and_readout() {
        let mut demo = GradientDescentDemo::starting_at(OptimizerKind::Sgd, 0.1, START);
        demo.step();

        let mut surface = RecordingSurface::new(400.0, 400.0);
        demo.draw(&mut surface);

        let rings = surface.count(|c| matches!(c, DrawCommand::Ring { .. }));
        assert_eq!(rings, CONTOUR_LEVELS.len());
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::Polyline { .. })), 1);

        let texts = surface.texts();
        assert!(texts.contains(&"Minimum"));
        assert!(texts.contains(&"Position: (1.600, 1.600)"));
        assert!(texts.contains(&"Steps: 2"));
    }

    #[test]
    fn test_logger_records_every_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");

        let mut demo = GradientDescentDemo::starting_at(OptimizerKind::Momentum, 0.1, START);
        demo.attach_logger(TrajectoryLogger::new(&path).unwrap());
        for _ in 0..5 {
            demo.step();
        }
        let logger = demo.detach_logger().unwrap();
        assert_eq!(logger.rows(), 6);
    }
}
