//! FlowShare - production data validation and back-allocation for joint ventures
//!
//! A CLI for importing field measurements, auditing them for anomalies and
//! reconciling partner volumes against the terminal.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
