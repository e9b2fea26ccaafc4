//! # Create Subcommand
//!
//! Signs the input document with every selected cryptosuite. For each suite
//! `<id>` the following are written under `<out-dir>/<id>/`:
//!
//! - `signed-<id>.json`: the signed document;
//! - `transform.txt`: the canonical document;
//! - `proofConfig.txt`: the canonical proof configuration;
//! - `combinedHash.txt`: the combined hash, hex encoded.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use di_vectors::{Cryptosuite, ProofPipeline};
use tracing::debug;

use crate::{CaseArgs, Inputs, report, run_cases, write};

/// Arguments for the `create` subcommand.
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub case: CaseArgs,
}

/// Execute the create subcommand.
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded. Failures of individual
/// cases are logged and reflected in the exit code.
pub async fn run_create(args: &CreateArgs) -> Result<u8> {
    let inputs = args.case.load()?;
    let out_dir = Arc::new(args.case.out_dir.clone());

    let outcomes = run_cases(&inputs, |inputs, suite| {
        let out_dir = Arc::clone(&out_dir);
        async move { create_case(&inputs, suite, &out_dir).await }
    })
    .await;

    Ok(report(&outcomes))
}

async fn create_case(inputs: &Inputs, suite: &'static Cryptosuite, out_dir: &Path) -> Result<()> {
    let key_pair = inputs.keyring.key_pair(suite.algorithm())?;
    let pipeline = ProofPipeline::new(inputs.loader.as_ref());
    let signed = pipeline
        .create_with_digest(&inputs.document, &inputs.template, &key_pair, suite.id())
        .await?;

    let dir = out_dir.join(suite.id());
    let document = serde_json::to_string_pretty(&signed.document)?;
    write(&dir.join(format!("signed-{}.json", suite.id())), document)?;
    write(&dir.join("transform.txt"), &signed.digested.transformed)?;
    write(&dir.join("proofConfig.txt"), &signed.digested.proof_config)?;
    write(&dir.join("combinedHash.txt"), hex::encode(&signed.digested.combined_hash))?;

    debug!(suite = suite.id(), dir = %dir.display(), "vector written");
    Ok(())
}
