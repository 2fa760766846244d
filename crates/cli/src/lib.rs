//! Command surface and orchestration for the `signet` binary.
//!
//! The heavy lifting lives in the library crates; this crate parses the
//! command line, wires the sign and verify flows together, configures
//! logging, and translates outcomes into the process exit code.

use clap::Parser as _;

pub mod common;
pub mod exit;
pub mod messages;
pub mod opts;
pub mod paths;
pub mod sign;
pub mod verify;

use opts::{Command, Signet};

/// Parses the command line, runs the selected command and returns the
/// process exit code.
pub fn run() -> i32 {
    let cli = match Signet::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    exit::OK
                }
                _ => exit::USAGE,
            };
        }
    };

    init_logging(cli.quiet());

    match &cli.command {
        Command::Sign(args) => sign::handle(args),
        Command::Verify(args) => verify::handle(args),
        Command::Version => {
            print_version();
            exit::OK
        }
    }
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn print_version() {
    let parallelism = std::thread::available_parallelism().map(usize::from).unwrap_or(1);
    println!(
        "signet V{} ({} cpu{})",
        env!("CARGO_PKG_VERSION"),
        parallelism,
        common::count_ending(parallelism),
    );
}
