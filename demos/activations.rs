//! Activation Function Table
//!
//! Prints value and derivative for each activation function across a range of
//! inputs, then an ASCII sketch of one curve. Handy for checking intuition
//! about saturation: watch σ'(x) collapse towards zero as |x| grows.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example activations
//! cargo run --example activations -- --function tanh --from -3 --to 3 --points 13
//! ```

use backprop_lab::activation::{sample_curve, Activation};
use clap::Parser;

#[derive(Parser)]
#[command(name = "activations", about = "Tabulate activation functions and their derivatives")]
struct Args {
    /// Function to plot: sigmoid, tanh, relu, leakyRelu
    #[arg(long, default_value = "sigmoid")]
    function: Activation,

    /// Left end of the input range
    #[arg(long, default_value = "-5", allow_hyphen_values = true)]
    from: f64,

    /// Right end of the input range
    #[arg(long, default_value = "5", allow_hyphen_values = true)]
    to: f64,

    /// Number of table rows
    #[arg(long, default_value = "11")]
    points: usize,
}

const PLOT_WIDTH: usize = 61;
const PLOT_HEIGHT: usize = 15;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if args.points < 2 || args.from >= args.to {
        return Err("Need at least 2 points and --from < --to".into());
    }

    // ========================================================================
    // Table: f(x) and f'(x) for every function
    // ========================================================================
    print!("\n{:>8}", "x");
    for kind in Activation::ALL {
        print!(" | {:>10} {:>10}", kind.name(), "deriv");
    }
    println!();
    println!("{}", "-".repeat(8 + Activation::ALL.len() * 24));

    let columns: Vec<_> = Activation::ALL
        .iter()
        .map(|&kind| sample_curve(kind, args.from, args.to, args.points))
        .collect();

    for row in 0..args.points {
        print!("{:>8.3}", columns[0][row].x);
        for column in &columns {
            print!(" | {:>10.5} {:>10.5}", column[row].value, column[row].derivative);
        }
        println!();
    }

    // ========================================================================
    // ASCII plot of the chosen function
    // ========================================================================
    let kind = args.function;
    println!("\n{}   {}\n", kind.name(), kind.formula());

    let samples = sample_curve(kind, args.from, args.to, PLOT_WIDTH);
    let (lo, hi) = samples
        .iter()
        .flat_map(|s| [s.value, s.derivative])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = (hi - lo).max(1e-9);

    let mut grid = vec![vec![' '; PLOT_WIDTH]; PLOT_HEIGHT];
    let row_of = |v: f64| ((hi - v) / span * (PLOT_HEIGHT - 1) as f64).round() as usize;
    for (col, s) in samples.iter().enumerate() {
        grid[row_of(s.derivative)][col] = '.';
        grid[row_of(s.value)][col] = '*';
    }

    for (i, line) in grid.iter().enumerate() {
        let label = match i {
            0 => format!("{:>7.2}", hi),
            i if i == PLOT_HEIGHT - 1 => format!("{:>7.2}", lo),
            _ => " ".repeat(7),
        };
        println!("{} |{}", label, line.iter().collect::<String>());
    }
    println!("        {:<w$}{}", args.from, args.to, w = PLOT_WIDTH - 1);
    println!("\n  * f(x)   . f'(x)");

    Ok(())
}
