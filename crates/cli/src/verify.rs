//! # Verify Subcommand
//!
//! Verifies signed documents, printing one line per file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Args;
use di_vectors::{ProofPipeline, StaticLoader};
use serde_json::Value;
use tracing::error;

use crate::{ContextArgs, FAILURE, SUCCESS, read_json};

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Cryptosuite to verify with. Defaults to each proof's `cryptosuite`.
    #[arg(long)]
    pub suite: Option<String>,

    #[command(flatten)]
    pub context: ContextArgs,

    /// Signed documents.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Execute the verify subcommand.
///
/// # Errors
///
/// Returns an error if a `--context` argument is invalid. Unreadable files
/// and failed verifications are reported and reflected in the exit code.
pub async fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let loader = Arc::new(args.context.loader()?);

    let handles: Vec<_> = args
        .files
        .iter()
        .map(|path| {
            let task = verify_file(Arc::clone(&loader), path.clone(), args.suite.clone());
            (path, tokio::spawn(task))
        })
        .collect();

    let mut code = SUCCESS;
    for (path, handle) in handles {
        let outcome = handle.await.unwrap_or_else(|e| Err(anyhow!("case aborted: {e}")));
        match outcome {
            Ok(true) => println!("{}: verified", path.display()),
            Ok(false) => {
                println!("{}: NOT verified", path.display());
                code = FAILURE;
            }
            Err(e) => {
                error!(path = %path.display(), "{e:#}");
                println!("{}: error: {e:#}", path.display());
                code = FAILURE;
            }
        }
    }
    Ok(code)
}

async fn verify_file(
    loader: Arc<StaticLoader>, path: PathBuf, suite: Option<String>,
) -> Result<bool> {
    let document = read_json(&path)?;
    let suite = match suite {
        Some(suite) => suite,
        None => document
            .pointer("/proof/cryptosuite")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("no proof.cryptosuite in {}", path.display()))?
            .to_string(),
    };

    let pipeline = ProofPipeline::new(loader.as_ref());
    Ok(pipeline.verify(&document, &suite).await?)
}
