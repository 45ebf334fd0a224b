//! Gradient Checking
//!
//! Compares f'(x) = 2x + 3 against the centred difference
//! (f(x+ε) − f(x−ε)) / 2ε for f(x) = x² + 3x + 1, first at a single point and
//! then across a sweep of x values and step sizes. The sweep shows the
//! trade-off: large ε is inaccurate for curved functions, tiny ε drowns in
//! floating-point cancellation.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example gradient_check
//! cargo run --example gradient_check -- --x -1.5 --eps-exp -6
//! cargo run --example gradient_check -- --sweep --json
//! ```

use backprop_lab::gradient_check::{help_text, sweep, EPSILON_EXPONENT_RANGE};
use backprop_lab::GradientChecker;
use clap::Parser;

#[derive(Parser)]
#[command(name = "gradient_check", about = "Compare analytical and numerical gradients")]
struct Args {
    /// Point to check, in [-5, 5]
    #[arg(long, default_value = "2.0", allow_hyphen_values = true)]
    x: f64,

    /// ε = 10^k with k in [-6, -2]
    #[arg(long, default_value = "-4", allow_hyphen_values = true)]
    eps_exp: i32,

    /// Also check x = -5..5 at every ε exponent
    #[arg(long)]
    sweep: bool,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let checker = GradientChecker::new(args.x, args.eps_exp);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&checker.result())?);
    } else {
        println!("\n{}\n", checker.report());
        println!("{}\n", help_text());
    }

    if !args.sweep {
        return Ok(());
    }

    let xs: Vec<f64> = (-10..=10).map(|i| i as f64 * 0.5).collect();
    let (lo, hi) = EPSILON_EXPONENT_RANGE;

    for k in lo..=hi {
        let epsilon = 10f64.powi(k);
        let results = sweep(&xs, epsilon);

        if args.json {
            println!("{}", serde_json::to_string(&results)?);
            continue;
        }

        let worst = results
            .iter()
            .map(|r| r.relative_error)
            .fold(0.0_f64, f64::max);
        let passed = results.iter().filter(|r| r.passed).count();
        println!(
            "  ε = 1e{:<3}  passed {:>2}/{}   worst relative error {:.3e}",
            k,
            passed,
            results.len(),
            worst
        );
    }

    Ok(())
}
