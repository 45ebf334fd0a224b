//! Trajectory Logger
//!
//! Records the path an optimizer takes across the loss surface, one CSV row
//! per step, so runs with different update rules and learning rates can be
//! plotted side by side afterwards.
//!
//! ## Example
//!
//! ```rust,no_run
//! use backprop_lab::TrajectoryLogger;
//! use backprop_lab::optimizer::{OptimizerKind, Vec2};
//!
//! let mut logger = TrajectoryLogger::new("descent_sgd.csv")?;
//! logger.log(1, OptimizerKind::Sgd, 0.1, Vec2::new(1.6, 1.6))?;
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ## CSV Format
//!
//! - `step`: Step number (0 is the starting point)
//! - `elapsed_seconds`: Time since the logger was created
//! - `optimizer`: `sgd`, `momentum` or `adam`
//! - `learning_rate`: Step size in use
//! - `x`, `y`: Position after the step
//! - `loss`: x² + y² at that position

use crate::optimizer::{loss, OptimizerKind, Vec2};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// CSV logger for optimizer trajectories
///
/// # Fields
///
/// - `writer`: Output CSV file
/// - `start_time`: When logging started (for elapsed time)
/// - `rows`: Rows written so far
pub struct TrajectoryLogger {
    writer: BufWriter<File>,
    start_time: Instant,
    rows: usize,
}

impl TrajectoryLogger {
    /// Create the CSV file and write its header
    pub fn new(log_path: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut writer = BufWriter::new(File::create(log_path.as_ref())?);
        writeln!(writer, "step,elapsed_seconds,optimizer,learning_rate,x,y,loss")?;
        writer.flush()?;

        tracing::debug!(path = %log_path.as_ref().display(), "trajectory log created");

        Ok(Self {
            writer,
            start_time: Instant::now(),
            rows: 0,
        })
    }

    /// Append one step
    ///
    /// Each row is flushed immediately so an interrupted run keeps its data.
    pub fn log(
        &mut self,
        step: usize,
        optimizer: OptimizerKind,
        learning_rate: f64,
        position: Vec2,
    ) -> std::io::Result<()> {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let loss = loss(position);

        writeln!(
            self.writer,
            "{},{:.4},{},{:.4},{:.6},{:.6},{:.6}",
            step, elapsed, optimizer, learning_rate, position.x, position.y, loss
        )?;
        self.writer.flush()?;
        self.rows += 1;

        tracing::trace!(step, x = position.x, y = position.y, loss, "descent step");
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajectory.csv");

        let mut logger = TrajectoryLogger::new(&path).unwrap();
        logger.log(0, OptimizerKind::Momentum, 0.1, Vec2::new(2.0, 2.0)).unwrap();
        logger.log(1, OptimizerKind::Momentum, 0.1, Vec2::new(1.96, 1.96)).unwrap();
        assert_eq!(logger.rows(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "step,elapsed_seconds,optimizer,learning_rate,x,y,loss");
        assert!(lines[1].starts_with("0,"));
        assert!(lines[1].contains(",momentum,0.1000,2.000000,2.000000,8.000000"));
    }
}
