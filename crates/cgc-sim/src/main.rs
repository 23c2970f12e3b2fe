use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    coarse::{self, CoarseArgs},
    pentagon::{self, PentagonArgs},
    three_node::{self, ThreeNodeArgs},
    version::{self, VersionArgs},
};

mod commands;
mod config;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "cgc-sim", about = "Coherence-gradient divergence diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Three-node loop with antisymmetric coupling.
    ThreeNode(ThreeNodeArgs),
    /// Damped pentagon loop, or a general ring with `--nodes`.
    Pentagon(PentagonArgs),
    /// Compare the fine exponent against a projected estimate.
    CoarseGrained(CoarseArgs),
    /// Print the package version.
    Version(VersionArgs),
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    let result = match &cli.command {
        Command::ThreeNode(args) => three_node::run(args),
        Command::Pentagon(args) => pentagon::run(args),
        Command::CoarseGrained(args) => coarse::run(args),
        Command::Version(args) => version::run(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
