//! Gradient Descent on the Loss Bowl
//!
//! Runs the descent demo headlessly: starts near (2, 2), steps the chosen
//! optimizer until it converges or hits the step limit, and prints the
//! trajectory as it goes. With `--log` every step is also written to CSV.
//!
//! ## Usage
//!
//! ```bash
//! # Plain SGD with the page defaults
//! cargo run --example descent
//!
//! # Compare update rules at the same step size
//! cargo run --example descent -- --optimizer momentum --lr 0.05 --log momentum.csv
//! cargo run --example descent -- --optimizer adam --lr 0.05 --log adam.csv
//!
//! # Start from a saved configuration
//! cargo run --example descent -- --config lab.json
//! ```

use backprop_lab::{GradientDescentDemo, LabConfig, OptimizerKind, TrajectoryLogger};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "descent", about = "Watch an optimizer roll down f(x, y) = x² + y²")]
struct Args {
    /// Configuration file (JSON); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use a named preset: default, quick, slow-motion
    #[arg(long)]
    preset: Option<String>,

    /// Update rule: sgd, momentum, adam
    #[arg(long)]
    optimizer: Option<OptimizerKind>,

    /// Step size (clamped to 0.001..=1.0)
    #[arg(long)]
    lr: Option<f64>,

    /// Give up after this many steps
    #[arg(long)]
    max_steps: Option<usize>,

    /// Seed for the starting point
    #[arg(long)]
    seed: Option<u64>,

    /// Write every step to this CSV file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Print every Nth step
    #[arg(long, default_value = "5")]
    print_every: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // ========================================================================
    // Resolve configuration from file or preset + CLI overrides
    // ========================================================================
    let mut config = match (&args.config, args.preset.as_deref()) {
        (Some(path), _) => LabConfig::load(path)?,
        (None, None | Some("default")) => LabConfig::default(),
        (None, Some("quick")) => LabConfig::quick(),
        (None, Some("slow-motion")) => LabConfig::slow_motion(),
        (None, Some(other)) => {
            return Err(format!(
                "Unknown preset '{}'. Use default, quick or slow-motion.",
                other
            )
            .into())
        }
    };
    if let Some(kind) = args.optimizer {
        config.optimizer = kind;
    }
    if let Some(lr) = args.lr {
        config.learning_rate = lr;
    }
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut rng = config.rng();
    let mut demo: GradientDescentDemo = config.descent_demo(&mut rng);
    if let Some(path) = &args.log {
        demo.attach_logger(TrajectoryLogger::new(path)?);
    }

    println!("\n{}", "=".repeat(60));
    println!(
        "  {} with learning rate {}",
        demo.optimizer(),
        demo.learning_rate()
    );
    println!("{}", "=".repeat(60));
    println!(
        "  start: ({:.3}, {:.3})   loss {:.4}\n",
        demo.position().x,
        demo.position().y,
        demo.loss()
    );

    // ========================================================================
    // Run until convergence or the step limit
    // ========================================================================
    demo.start();
    let print_every = args.print_every.max(1);
    while demo.is_running() && demo.steps() < config.max_steps {
        demo.tick();
        if demo.steps() % print_every == 0 || !demo.is_running() {
            let p = demo.position();
            println!(
                "  step {:>4}   ({:>8.4}, {:>8.4})   loss {:.6}",
                demo.steps(),
                p.x,
                p.y,
                demo.loss()
            );
        }
    }

    println!();
    if demo.is_running() {
        demo.stop();
        println!(
            "  Stopped after {} steps without converging (loss {:.6})",
            demo.steps(),
            demo.loss()
        );
    } else {
        println!("  Converged in {} steps", demo.steps());
    }
    if let Some(logger) = demo.detach_logger() {
        println!("  Wrote {} rows to {}", logger.rows(), args.log.unwrap_or_default().display());
    }

    Ok(())
}
