//! Context resolution for JSON-LD processing.

use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::path::Path;

use anyhow::{Result, anyhow};
use serde_json::Value;

const CREDENTIALS_V2_URL: &str = "https://www.w3.org/ns/credentials/v2";
const CREDENTIALS_V2: &str = include_str!("contexts/credentials-v2.jsonld");

const EXAMPLES_V2_URL: &str = "https://www.w3.org/ns/credentials/examples/v2";
const EXAMPLES_V2: &str = include_str!("contexts/examples-v2.jsonld");

/// `ContextLoader` is used by implementers to resolve JSON-LD context URLs
/// referenced by documents being canonicalized.
pub trait ContextLoader: Send + Sync {
    /// Fetch the context document for `url`. The returned JSON is the whole
    /// document, that is, an object with an `@context` member.
    fn load(&self, url: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// In-memory context loader.
///
/// The default loader holds bundled copies of the W3C credentials v2 and
/// examples v2 contexts.
#[derive(Clone, Debug)]
pub struct StaticLoader {
    contexts: HashMap<String, String>,
}

impl Default for StaticLoader {
    fn default() -> Self {
        let mut loader = Self::empty();
        loader.insert(CREDENTIALS_V2_URL, CREDENTIALS_V2);
        loader.insert(EXAMPLES_V2_URL, EXAMPLES_V2);
        loader
    }
}

impl StaticLoader {
    /// A loader with no contexts.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            contexts: HashMap::new(),
        }
    }

    /// Add or replace the context document served for `url`.
    pub fn insert(&mut self, url: impl Into<String>, document: impl Into<String>) {
        self.contexts.insert(url.into(), document.into());
    }

    /// Serve the context document in `path` for `url`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not JSON.
    pub fn insert_file(&mut self, url: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let document = fs::read_to_string(path)
            .map_err(|e| anyhow!("issue reading {}: {e}", path.display()))?;
        serde_json::from_str::<Value>(&document)
            .map_err(|e| anyhow!("{} is not JSON: {e}", path.display()))?;
        self.insert(url, document);
        Ok(())
    }
}

impl ContextLoader for StaticLoader {
    async fn load(&self, url: &str) -> Result<Value> {
        let Some(document) = self.contexts.get(url) else {
            return Err(anyhow!("no context loaded for {url}"));
        };
        serde_json::from_str(document).map_err(|e| anyhow!("issue parsing context {url}: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bundled_contexts() {
        let loader = StaticLoader::default();
        for url in [CREDENTIALS_V2_URL, EXAMPLES_V2_URL] {
            let document = loader.load(url).await.expect("should load");
            assert!(document.get("@context").is_some_and(Value::is_object), "{url}");
        }
        loader.load("https://example.com/missing").await.expect_err("not bundled");
    }

    #[tokio::test]
    async fn insert_file_rejects_non_json() {
        let dir = tempfile::tempdir().expect("should create dir");
        let path = dir.path().join("bad.jsonld");
        fs::write(&path, "not json").expect("should write");

        let mut loader = StaticLoader::empty();
        loader.insert_file("https://example.com/bad", &path).expect_err("should reject");
        loader.load("https://example.com/bad").await.expect_err("nothing inserted");
    }
}
