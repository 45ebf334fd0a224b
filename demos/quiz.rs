//! Quiz Runner
//!
//! Plays a multiple-choice quiz from a JSON file, either answering from
//! `--answers` or reading choices from stdin.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive
//! cargo run --example quiz
//!
//! # Scripted answers (0-based option indices)
//! cargo run --example quiz -- --answers 1,2,1,0
//!
//! # Your own questions
//! cargo run --example quiz -- --questions my_quiz.json
//! ```
//!
//! ## Question Format
//!
//! ```text
//! [
//!   { "question": "...", "options": ["a", "b"], "correct": 1, "explanation": "..." }
//! ]
//! ```

use backprop_lab::{Quiz, QuizPhase};
use clap::Parser;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quiz", about = "Take a backpropagation quiz in the terminal")]
struct Args {
    /// JSON file with the questions
    #[arg(long, default_value = "demos/data/backprop_quiz.json")]
    questions: PathBuf,

    /// Comma-separated answers instead of reading stdin
    #[arg(long, value_delimiter = ',')]
    answers: Option<Vec<usize>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut quiz = Quiz::from_json(&fs::read_to_string(&args.questions)?)?;

    let mut scripted = args.answers.map(|a| a.into_iter());
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let QuizPhase::Displaying { .. } = quiz.phase() {
        let Some(question) = quiz.current_question() else {
            break;
        };
        println!("\n{}", quiz.progress_label().unwrap_or_default());
        println!("{}\n", question.question);
        for (i, option) in question.options.iter().enumerate() {
            println!("  [{}] {}", i, option);
        }

        let choice = match scripted.as_mut() {
            Some(answers) => match answers.next() {
                Some(choice) => choice,
                None => return Err("Ran out of --answers before the quiz finished".into()),
            },
            None => {
                print!("\nYour answer: ");
                io::stdout().flush()?;
                match lines.next() {
                    Some(line) => match line?.trim().parse() {
                        Ok(choice) => choice,
                        Err(_) => {
                            println!("Enter an option number.");
                            continue;
                        }
                    },
                    None => return Ok(()),
                }
            }
        };

        quiz.select(choice);
        if quiz.check().is_none() {
            println!("No such option: {}", choice);
            continue;
        }
        if let Some(feedback) = quiz.feedback() {
            println!("\n{}\n{}", feedback.title, feedback.explanation);
        }
        quiz.advance();
    }

    if let Some(summary) = quiz.summary() {
        println!("\n{}", "=".repeat(40));
        println!("  Score: {} ({}%)", summary, summary.percent());
        println!("  {}", summary.verdict());
        println!("{}", "=".repeat(40));
    }

    Ok(())
}
