//! # Common Subcommand
//!
//! Writes the intermediate values of the transformation, proof
//! configuration, and hashing algorithms without signing:
//!
//! - `transform-<canon>-<hash>.txt` for each scheme and hash in use;
//! - `proofConfig-<id>.txt` for each suite;
//! - `hashing.json` mapping suite to combined hash, hex encoded.

use anyhow::{Result, anyhow};
use clap::Args;
use di_vectors::{Cryptosuite, Digested, ProofPipeline};
use serde_json::{Map, Value};

use crate::{CaseArgs, Inputs, report, run_cases, write};

/// Arguments for the `common` subcommand.
#[derive(Args, Debug)]
pub struct CommonArgs {
    #[command(flatten)]
    pub case: CaseArgs,
}

/// Execute the common subcommand.
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or an output file cannot
/// be written. Failures of individual cases are logged and reflected in the
/// exit code.
pub async fn run_common(args: &CommonArgs) -> Result<u8> {
    let inputs = args.case.load()?;
    let outcomes =
        run_cases(&inputs, |inputs, suite| async move { common_case(&inputs, suite).await }).await;

    let out_dir = &args.case.out_dir;
    let mut hashes = Map::new();
    for (suite, outcome) in &outcomes {
        let Ok(digested) = outcome else {
            continue;
        };
        let transform = format!("transform-{}-{}.txt", suite.canonicalization(), suite.hash());
        write(&out_dir.join(transform), &digested.transformed)?;
        write(&out_dir.join(format!("proofConfig-{}.txt", suite.id())), &digested.proof_config)?;
        hashes.insert(suite.id().to_string(), Value::String(hex::encode(&digested.combined_hash)));
    }
    write(&out_dir.join("hashing.json"), serde_json::to_string_pretty(&hashes)?)?;

    Ok(report(&outcomes))
}

async fn common_case(inputs: &Inputs, suite: &'static Cryptosuite) -> Result<Digested> {
    let Some(entry) = inputs.keyring.entry(suite.algorithm()) else {
        return Err(anyhow!("no {} key", suite.algorithm()));
    };
    let context = inputs.document.get("@context").cloned();
    let options = inputs.template.options(context, suite.id(), entry.public_key_multibase())?;

    let pipeline = ProofPipeline::new(inputs.loader.as_ref());
    Ok(pipeline.digest(&inputs.document, &options, suite).await?)
}
