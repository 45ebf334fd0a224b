//! Activation Function Explorer
//!
//! Plots an activation function and its derivative, with a marker that follows
//! the pointer.
//!
//! ## Coordinates
//!
//! ```text
//! math x ∈ [-5, 5]  ↔  screen x ∈ [0, width]    (scale = width / 10)
//! math y ∈ [-2, 2]  ↔  screen y ∈ [height, 0]   (scale = height / 4)
//! ```
//!
//! The origin sits at the centre of the canvas and screen y grows downward.

use crate::activation::{sample_curve, Activation, ActivationSample};
use crate::optimizer::Vec2;
use crate::render::{DrawCommand, Stroke, Surface, TextAlign};

/// Half the visible x range
pub const X_HALF_SPAN: f64 = 5.0;
/// Half the visible y range
pub const Y_HALF_SPAN: f64 = 2.0;

/// Explorer state: chosen function, pointer position, canvas size
#[derive(Clone, Debug)]
pub struct ActivationExplorer {
    function: Activation,
    input: f64,
    width: f64,
    height: f64,
}

impl ActivationExplorer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            function: Activation::Sigmoid,
            input: 0.0,
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn function(&self) -> Activation {
        self.function
    }

    pub fn set_function(&mut self, function: Activation) {
        self.function = function;
    }

    pub fn input(&self) -> f64 {
        self.input
    }

    /// Math x to screen x
    pub fn math_to_screen_x(&self, x: f64) -> f64 {
        let scale = self.width / (2.0 * X_HALF_SPAN);
        self.width / 2.0 + x * scale
    }

    /// Screen x to math x
    pub fn screen_to_math_x(&self, sx: f64) -> f64 {
        let scale = self.width / (2.0 * X_HALF_SPAN);
        (sx - self.width / 2.0) / scale
    }

    /// Math y to screen y
    pub fn math_to_screen_y(&self, y: f64) -> f64 {
        let scale = self.height / (2.0 * Y_HALF_SPAN);
        self.height / 2.0 - y * scale
    }

    /// Pointer (mouse or touch) moved to screen x
    pub fn pointer_moved(&mut self, screen_x: f64) -> ActivationSample {
        self.input = self.screen_to_math_x(screen_x);
        self.info()
    }

    /// Value and derivative at the current input
    pub fn info(&self) -> ActivationSample {
        self.function.sample(self.input)
    }

    /// One-line readout: `x = 0.000  f(x) = 0.5000  f'(x) = 0.2500`
    pub fn info_text(&self) -> String {
        let s = self.info();
        format!(
            "x = {:.3}  f(x) = {:.4}  f'(x) = {:.4}",
            s.x, s.value, s.derivative
        )
    }

    /// Render grid, axes, both curves and the pointer marker
    pub fn draw(&self, surface: &mut impl Surface) {
        let (w, h) = (self.width, self.height);
        let grid = Stroke::solid("rgba(255,255,255,0.05)", 1.0);
        let axis = Stroke::solid("rgba(255,255,255,0.3)", 1.0);

        surface.draw(DrawCommand::Clear);

        for x in -5..=5 {
            let sx = self.math_to_screen_x(x as f64);
            surface.draw(DrawCommand::Line {
                from: Vec2::new(sx, 0.0),
                to: Vec2::new(sx, h),
                stroke: grid.clone(),
            });
        }
        for y in -2..=2 {
            let sy = self.math_to_screen_y(y as f64);
            surface.draw(DrawCommand::Line {
                from: Vec2::new(0.0, sy),
                to: Vec2::new(w, sy),
                stroke: grid.clone(),
            });
        }

        surface.draw(DrawCommand::Line {
            from: Vec2::new(0.0, h / 2.0),
            to: Vec2::new(w, h / 2.0),
            stroke: axis.clone(),
        });
        surface.draw(DrawCommand::Line {
            from: Vec2::new(w / 2.0, 0.0),
            to: Vec2::new(w / 2.0, h),
            stroke: axis,
        });

        // One sample per pixel column
        let columns = w.max(0.0) as usize;
        let samples = sample_curve(
            self.function,
            self.screen_to_math_x(0.0),
            self.screen_to_math_x(columns.saturating_sub(1) as f64),
            columns,
        );
        let color = self.function.color();

        surface.draw(DrawCommand::Polyline {
            points: samples
                .iter()
                .map(|s| Vec2::new(self.math_to_screen_x(s.x), self.math_to_screen_y(s.value)))
                .collect(),
            stroke: Stroke::solid(color, 3.0),
        });
        surface.draw(DrawCommand::Polyline {
            points: samples
                .iter()
                .map(|s| Vec2::new(self.math_to_screen_x(s.x), self.math_to_screen_y(s.derivative)))
                .collect(),
            stroke: Stroke::dashed(color, 2.0),
        });

        let current = self.info();
        let px = self.math_to_screen_x(current.x);
        surface.draw(DrawCommand::Line {
            from: Vec2::new(px, 0.0),
            to: Vec2::new(px, h),
            stroke: Stroke::dashed("rgba(212, 168, 83, 0.5)", 1.0),
        });
        surface.draw(DrawCommand::Disc {
            center: Vec2::new(px, self.math_to_screen_y(current.value)),
            radius: 6.0,
            color: color.to_string(),
        });
        surface.draw(DrawCommand::Disc {
            center: Vec2::new(px, self.math_to_screen_y(current.derivative)),
            radius: 4.0,
            color: "#e8e6e3".to_string(),
        });

        surface.text(
            Vec2::new(10.0, 20.0),
            format!("{} (solid)  derivative (dashed)", self.function.formula()),
            color,
            TextAlign::Left,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_screen_math_mapping() {
        let explorer = ActivationExplorer::new(600.0, 300.0);
        assert_eq!(explorer.math_to_screen_x(0.0), 300.0);
        assert_eq!(explorer.math_to_screen_x(-5.0), 0.0);
        assert_eq!(explorer.math_to_screen_x(5.0), 600.0);
        assert_eq!(explorer.math_to_screen_y(0.0), 150.0);
        assert_eq!(explorer.math_to_screen_y(2.0), 0.0);

        for sx in [0.0, 17.0, 300.0, 599.0] {
            assert_abs_diff_eq!(
                explorer.math_to_screen_x(explorer.screen_to_math_x(sx)),
                sx,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_pointer_updates_sample() {
        let mut explorer = ActivationExplorer::new(600.0, 300.0);
        explorer.set_function(Activation::Relu);

        let sample = explorer.pointer_moved(420.0);
        assert_abs_diff_eq!(sample.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sample.value, 2.0, epsilon = 1e-12);
        assert_eq!(sample.derivative, 1.0);

        let sample = explorer.pointer_moved(120.0);
        assert_eq!(sample.value, 0.0);
        assert_eq!(sample.derivative, 0.0);
    }

    #[test]
    fn test_info_text() {
        let explorer = ActivationExplorer::new(600.0, 300.0);
        assert_eq!(explorer.info_text(), "x = 0.000  f(x) = 0.5000  f'(x) = 0.2500");
    }

    #[test]
    fn test_draw_one_point_per_column() {
        let mut explorer = ActivationExplorer::new(200.0, 100.0);
        explorer.set_function(Activation::Tanh);
        let mut surface = RecordingSurface::new(200.0, 100.0);
        explorer.draw(&mut surface);

        let curves: Vec<_> = surface
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Polyline { points, stroke } => Some((points.len(), stroke.dashed)),
                _ => None,
            })
            .collect();
        assert_eq!(curves, vec![(200, false), (200, true)]);
    }
}
