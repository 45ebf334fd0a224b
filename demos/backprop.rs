//! Backprop Step by Step
//!
//! Runs one forward and backward pass through the 2-input, 2-hidden, 1-output
//! sigmoid network and prints every intermediate value, then repeats the
//! update for a few iterations so the loss can be seen falling.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example backprop
//! cargo run --example backprop -- --x1 0.9 --x2 0.1 --y 0.0 --lr 1.5 --iterations 20
//! ```

use backprop_lab::BackpropCalculator;
use clap::Parser;

#[derive(Parser)]
#[command(name = "backprop", about = "Trace a forward and backward pass by hand")]
struct Args {
    /// First input, in [0, 1]
    #[arg(long, default_value = "0.5")]
    x1: f64,

    /// Second input, in [0, 1]
    #[arg(long, default_value = "0.3")]
    x2: f64,

    /// Target output, in [0, 1]
    #[arg(long, default_value = "1.0")]
    y: f64,

    /// Learning rate, in [0.1, 2]
    #[arg(long, default_value = "0.5")]
    lr: f64,

    /// Apply the output-layer update this many times
    #[arg(long, default_value = "0")]
    iterations: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut calculator = BackpropCalculator::default();
    calculator.set_inputs(args.x1, args.x2, args.y, args.lr);

    let (x1, x2, y, lr) = calculator.inputs();
    println!("\nInputs: x = [{}, {}], y = {}, η = {}\n", x1, x2, y, lr);
    println!("{}", calculator.report());

    if args.iterations == 0 {
        return Ok(());
    }

    println!("Training the output layer:\n");
    for i in 1..=args.iterations {
        let result = calculator.result();
        calculator.network.w2 = result.updated_w2;
        let after = calculator.result();
        println!(
            "  iter {:>3}   ŷ {:.4}   loss {:.6}   W² = [{:.4}, {:.4}]",
            i,
            after.forward.y_hat,
            after.forward.loss,
            calculator.network.w2[0],
            calculator.network.w2[1]
        );
    }

    Ok(())
}
