//! RDFC-1.0 canonicalization.
//!
//! Context URLs are resolved up front and inlined so the JSON-LD processor
//! receives a self-contained document and never dereferences anything.
//!
//! The JSON-LD parser drives its own single-threaded runtime, so expansion
//! and normalization run on tokio's blocking pool.

use std::collections::HashMap;

use serde_json::{Map, Value};
use sha2::{Digest, Sha512};
use sophia_api::parser::QuadParser as _;
use sophia_api::source::QuadSource as _;
use sophia_c14n::hash::HashFunction;
use sophia_c14n::rdfc10::{self, DEFAULT_DEPTH_FACTOR, DEFAULT_PERMUTATION_LIMIT};
use sophia_inmem::dataset::LightDataset;
use sophia_jsonld::JsonLdParser;
use tracing::debug;

use super::ContextLoader;
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;

const CONTEXT: &str = "@context";

pub async fn canonicalize<L: ContextLoader>(
    value: &Value, hash: HashAlgorithm, loader: &L,
) -> Result<String> {
    let resolved = resolve(value, loader).await?;
    let document = inline(value, &resolved, &mut Vec::new())?;
    let json = serde_json::to_string(&document)?;

    tokio::task::spawn_blocking(move || normalize(&json, hash))
        .await
        .map_err(|e| Error::Canonicalization(format!("canonicalization task failed: {e}")))?
}

// Expand a self-contained JSON-LD document and serialize the canonical
// N-Quads.
fn normalize(json: &str, hash: HashAlgorithm) -> Result<String> {
    let dataset: LightDataset = JsonLdParser::new()
        .parse_str(json)
        .collect_quads()
        .map_err(|e| Error::Canonicalization(format!("issue expanding JSON-LD: {e}")))?;

    let mut nquads = Vec::new();
    match hash {
        HashAlgorithm::Sha256 => rdfc10::normalize(&dataset, &mut nquads),
        HashAlgorithm::Sha384 => rdfc10::normalize_sha384(&dataset, &mut nquads),
        HashAlgorithm::Sha512 => rdfc10::normalize_with::<Sha512Hash, _, _>(
            &dataset,
            &mut nquads,
            DEFAULT_DEPTH_FACTOR,
            DEFAULT_PERMUTATION_LIMIT,
        ),
    }
    .map_err(|e| Error::Canonicalization(format!("issue normalizing dataset: {e}")))?;

    String::from_utf8(nquads).map_err(|e| Error::Canonicalization(e.to_string()))
}

// Load every context reachable from `value`, following URLs found in loaded
// contexts. Keyed by URL, holding the `@context` member of each document.
async fn resolve<L: ContextLoader>(value: &Value, loader: &L) -> Result<HashMap<String, Value>> {
    let mut pending = Vec::new();
    collect_urls(value, &mut pending);

    let mut resolved = HashMap::new();
    while let Some(url) = pending.pop() {
        if resolved.contains_key(&url) {
            continue;
        }
        debug!(%url, "loading context");
        let document = loader
            .load(&url)
            .await
            .map_err(|e| Error::Canonicalization(format!("unable to load context {url}: {e}")))?;
        let Some(context) = document.get(CONTEXT) else {
            return Err(Error::Canonicalization(format!("{url} is not a context document")));
        };
        collect_context_urls(context, &mut pending);
        resolved.insert(url, context.clone());
    }

    Ok(resolved)
}

fn collect_urls(value: &Value, urls: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, member) in map {
                if key == CONTEXT {
                    collect_context_urls(member, urls);
                } else {
                    collect_urls(member, urls);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_urls(item, urls)),
        _ => {}
    }
}

fn collect_context_urls(context: &Value, urls: &mut Vec<String>) {
    match context {
        Value::String(url) => urls.push(url.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_context_urls(item, urls)),
        // scoped contexts inside term definitions
        Value::Object(_) => collect_urls(context, urls),
        _ => {}
    }
}

fn inline(
    value: &Value, resolved: &HashMap<String, Value>, stack: &mut Vec<String>,
) -> Result<Value> {
    match value {
        Value::Object(map) => {
            let mut inlined = Map::with_capacity(map.len());
            for (key, member) in map {
                let member = if key == CONTEXT {
                    inline_context(member, resolved, stack)?
                } else {
                    inline(member, resolved, stack)?
                };
                inlined.insert(key.clone(), member);
            }
            Ok(Value::Object(inlined))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| inline(item, resolved, stack))
            .collect::<Result<_>>()
            .map(Value::Array),
        _ => Ok(value.clone()),
    }
}

fn inline_context(
    context: &Value, resolved: &HashMap<String, Value>, stack: &mut Vec<String>,
) -> Result<Value> {
    match context {
        Value::String(url) => {
            if stack.contains(url) {
                return Err(Error::Canonicalization(format!("recursive context: {url}")));
            }
            let Some(loaded) = resolved.get(url) else {
                return Err(Error::Canonicalization(format!("unresolved context: {url}")));
            };
            stack.push(url.clone());
            let inlined = inline_context(loaded, resolved, stack);
            stack.pop();
            inlined
        }
        // a context array may not nest arrays, so splice resolved arrays in
        Value::Array(items) => {
            let mut inlined = Vec::with_capacity(items.len());
            for item in items {
                match inline_context(item, resolved, stack)? {
                    Value::Array(nested) => inlined.extend(nested),
                    other => inlined.push(other),
                }
            }
            Ok(Value::Array(inlined))
        }
        Value::Object(_) => inline(context, resolved, stack),
        _ => Ok(context.clone()),
    }
}

struct Sha512Hash(Sha512);

impl HashFunction for Sha512Hash {
    type Output = [u8; 64];

    fn initialize() -> Self {
        Self(Sha512::new())
    }

    fn update(&mut self, data: impl AsRef<[u8]>) {
        Digest::update(&mut self.0, data.as_ref());
    }

    fn finalize(self) -> Self::Output {
        let mut output = [0; 64];
        output.copy_from_slice(&self.0.finalize());
        output
    }
}
