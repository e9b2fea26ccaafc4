//! # di-vectors CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use di_vectors_cli::common::{CommonArgs, run_common};
use di_vectors_cli::create::{CreateArgs, run_create};
use di_vectors_cli::keygen::{KeygenArgs, run_keygen};
use di_vectors_cli::verify::{VerifyArgs, run_verify};
use tracing_subscriber::EnvFilter;

/// Data Integrity test vector generator.
///
/// Creates and verifies Data Integrity proofs for the ECDSA, ML-DSA, and
/// SLH-DSA cryptosuites, writing the intermediate values of each step.
#[derive(Parser, Debug)]
#[command(name = "di-vectors", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a key material file.
    Keygen(KeygenArgs),

    /// Sign a document with each selected cryptosuite.
    Create(CreateArgs),

    /// Verify signed documents.
    Verify(VerifyArgs),

    /// Write transformation, proof configuration, and hashing intermediates.
    Common(CommonArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Create(args) => run_create(&args).await,
        Commands::Verify(args) => run_verify(&args).await,
        Commands::Common(args) => run_common(&args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
