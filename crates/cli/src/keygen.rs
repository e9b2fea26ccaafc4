//! # Keygen Subcommand
//!
//! Writes a key material file with a fresh key pair for each requested
//! family.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use di_vectors::{Algorithm, Keyring};
use tracing::info;

use crate::{SUCCESS, write};

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Key material file to write.
    #[arg(long)]
    pub out: PathBuf,

    /// Key type to generate (repeatable): p256, mldsa44, mldsa65, mldsa87,
    /// slh128s, slh192s, or slh256s. Defaults to all.
    #[arg(long = "algorithm", value_name = "TAG")]
    pub algorithms: Vec<String>,
}

/// Execute the keygen subcommand.
///
/// # Errors
///
/// Returns an error if a key type is unknown, key generation fails, or the
/// file cannot be written.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let algorithms = if args.algorithms.is_empty() {
        Algorithm::ALL.to_vec()
    } else {
        args.algorithms
            .iter()
            .map(|tag| tag.parse().with_context(|| format!("--algorithm {tag}")))
            .collect::<Result<Vec<Algorithm>>>()?
    };

    let keyring = Keyring::generate(&algorithms)?;
    write(&args.out, keyring.to_json()?)?;

    info!(path = %args.out.display(), count = algorithms.len(), "key material written");
    Ok(SUCCESS)
}
