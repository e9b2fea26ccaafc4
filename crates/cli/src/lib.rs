//! # di-vectors CLI
//!
//! Batch driver for the proof pipeline. Every subcommand iterates the
//! cryptosuite registry, runs one case per selected suite concurrently, and
//! isolates failures so that one bad case does not abort the batch.
//!
//! ```bash
//! di-vectors keygen --out keys.json
//! di-vectors create --keys keys.json --input unsigned.json \
//!     --proof-options proofOptions.json --out-dir output
//! di-vectors verify output/*/signed-*.json
//! di-vectors common --keys keys.json --input unsigned.json \
//!     --proof-options proofOptions.json --out-dir output/commonAlgs
//! ```

pub mod common;
pub mod create;
pub mod keygen;
pub mod verify;

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{SecondsFormat, Utc};
use clap::Args;
use di_vectors::{Cryptosuite, Keyring, ProofTemplate, StaticLoader, cryptosuite};
use serde_json::Value;
use tracing::{error, info};

/// Exit code when every case succeeded.
pub const SUCCESS: u8 = 0;

/// Exit code when at least one case failed.
pub const FAILURE: u8 = 1;

/// Extra JSON-LD contexts, as `URL=PATH` pairs.
#[derive(Args, Debug, Default)]
pub struct ContextArgs {
    /// Serve the JSON-LD context in PATH for URL (repeatable).
    #[arg(long = "context", value_name = "URL=PATH")]
    pub contexts: Vec<String>,
}

impl ContextArgs {
    /// Build a context loader holding the bundled contexts plus any given on
    /// the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument is not `URL=PATH` or a file cannot be
    /// read.
    pub fn loader(&self) -> Result<StaticLoader> {
        let mut loader = StaticLoader::default();
        for arg in &self.contexts {
            let Some((url, path)) = arg.split_once('=') else {
                bail!("context must be URL=PATH: {arg}");
            };
            loader.insert_file(url, path)?;
        }
        Ok(loader)
    }
}

/// Inputs shared by the `create` and `common` subcommands.
#[derive(Args, Debug)]
pub struct CaseArgs {
    /// Key material file.
    #[arg(long)]
    pub keys: PathBuf,

    /// Unsigned input document.
    #[arg(long)]
    pub input: PathBuf,

    /// Proof options template.
    #[arg(long)]
    pub proof_options: PathBuf,

    /// Output directory.
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Cryptosuite to run (repeatable). Defaults to every suite with a key
    /// in the key material file.
    #[arg(long = "suite", value_name = "ID")]
    pub suites: Vec<String>,

    #[command(flatten)]
    pub context: ContextArgs,
}

/// Loaded inputs, shared between concurrently running cases.
#[derive(Clone, Debug)]
pub struct Inputs {
    /// Key material.
    pub keyring: Arc<Keyring>,

    /// Unsigned document.
    pub document: Arc<Value>,

    /// Proof options template.
    pub template: Arc<ProofTemplate>,

    /// JSON-LD context loader.
    pub loader: Arc<StaticLoader>,

    /// Selected cryptosuites.
    pub suites: Vec<&'static Cryptosuite>,
}

impl CaseArgs {
    /// Load and validate the inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, a suite is
    /// unknown, or a selected suite has no key.
    pub fn load(&self) -> Result<Inputs> {
        let keyring = Keyring::load(&self.keys)?;
        let document = read_json(&self.input)?;
        let mut template: ProofTemplate = serde_json::from_value(read_json(&self.proof_options)?)
            .with_context(|| format!("invalid proof options in {}", self.proof_options.display()))?;

        // every case in a batch shares one creation time
        if template.created.is_none() {
            template.created = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let suites = select_suites(&self.suites, &keyring)?;

        Ok(Inputs {
            keyring: Arc::new(keyring),
            document: Arc::new(document),
            template: Arc::new(template),
            loader: Arc::new(self.context.loader()?),
            suites,
        })
    }
}

/// Run `case` for every selected suite concurrently, returning outcomes in
/// registry order. A case that panics is reported as failed.
pub async fn run_cases<T, F, Fut>(
    inputs: &Inputs, case: F,
) -> Vec<(&'static Cryptosuite, Result<T>)>
where
    T: Send + 'static,
    F: Fn(Inputs, &'static Cryptosuite) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let handles: Vec<_> = inputs
        .suites
        .iter()
        .map(|&suite| (suite, tokio::spawn(case(inputs.clone(), suite))))
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (suite, handle) in handles {
        let outcome = handle.await.unwrap_or_else(|e| Err(anyhow!("case aborted: {e}")));
        outcomes.push((suite, outcome));
    }
    outcomes
}

/// Log each outcome and return the batch exit code.
#[must_use]
pub fn report<T>(outcomes: &[(&'static Cryptosuite, Result<T>)]) -> u8 {
    let mut code = SUCCESS;
    for (suite, outcome) in outcomes {
        match outcome {
            Ok(_) => info!(suite = suite.id(), "ok"),
            Err(e) => {
                error!(suite = suite.id(), "{e:#}");
                code = FAILURE;
            }
        }
    }
    code
}

/// Resolve the requested suites, or every suite with a key when none are
/// requested.
///
/// # Errors
///
/// Returns an error if a requested suite is unknown or has no key.
pub fn select_suites(ids: &[String], keyring: &Keyring) -> Result<Vec<&'static Cryptosuite>> {
    let available = keyring.algorithms();
    if ids.is_empty() {
        return Ok(cryptosuite::all()
            .iter()
            .filter(|suite| available.contains(&suite.algorithm()))
            .collect());
    }

    ids.iter()
        .map(|id| {
            let suite = cryptosuite::lookup(id)?;
            if !available.contains(&suite.algorithm()) {
                return Err(anyhow!("no {} key for {id}", suite.algorithm()));
            }
            Ok(suite)
        })
        .collect()
}

/// Read and parse a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not JSON.
pub fn read_json(path: &Path) -> Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("issue reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Write a file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the file or its parent directory cannot be written.
pub fn write(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("issue creating {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("issue writing {}", path.display()))
}
