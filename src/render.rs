//! Drawing Primitives
//!
//! Demos never touch a canvas directly. They emit [`DrawCommand`]s into a
//! [`Surface`], which the host UI translates into whatever its rendering
//! backend needs. [`RecordingSurface`] keeps the commands in a display list,
//! which is what tests and headless demos use.

use crate::optimizer::Vec2;

/// Horizontal text anchor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Stroke styling
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    pub dashed: bool,
}

impl Stroke {
    pub fn solid(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            dashed: false,
        }
    }

    pub fn dashed(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            dashed: true,
        }
    }
}

/// A single drawing primitive, in pixel coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear,
    Line {
        from: Vec2,
        to: Vec2,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<Vec2>,
        stroke: Stroke,
    },
    /// Unfilled circle
    Ring {
        center: Vec2,
        radius: f64,
        stroke: Stroke,
    },
    /// Filled disc
    Disc {
        center: Vec2,
        radius: f64,
        color: String,
    },
    Text {
        at: Vec2,
        text: String,
        color: String,
        align: TextAlign,
    },
}

/// Something the demos can draw on
pub trait Surface {
    /// Drawable area in pixels (width, height)
    fn size(&self) -> (f64, f64);

    fn draw(&mut self, command: DrawCommand);

    fn text(&mut self, at: Vec2, text: impl Into<String>, color: &str, align: TextAlign)
    where
        Self: Sized,
    {
        self.draw(DrawCommand::Text {
            at,
            text: text.into(),
            color: color.to_string(),
            align,
        });
    }
}

/// Surface that records every command
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// All text drawn so far
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of commands matching a predicate
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn draw(&mut self, command: DrawCommand) {
        if command == DrawCommand::Clear {
            self.commands.clear();
        }
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_discards_previous_frame() {
        let mut surface = RecordingSurface::new(100.0, 50.0);
        surface.text(Vec2::new(1.0, 2.0), "old", "#fff", TextAlign::Left);
        surface.draw(DrawCommand::Clear);
        surface.text(Vec2::new(1.0, 2.0), "new", "#fff", TextAlign::Left);

        assert_eq!(surface.texts(), vec!["new"]);
        assert_eq!(surface.commands.len(), 2);
        assert_eq!(surface.size(), (100.0, 50.0));
    }
}
