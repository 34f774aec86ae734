use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    fuzz::{self, FuzzArgs},
    signup::{self, SignupArgs},
    synth::{self, SynthArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(name = "splice", about = "Invariant-preserving value synthesis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize one value strictly between two bounds.
    Synth(SynthArgs),
    /// Replay a sign-up sheet script and desensitize every logged-out user.
    Signup(SignupArgs),
    /// Check random bounded synthesis requests against their bounds.
    Fuzz(FuzzArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    // Stdout carries JSON only.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Synth(args) => synth::run(&args),
        Command::Signup(args) => signup::run(&args),
        Command::Fuzz(args) => fuzz::run(&args),
    }
}
