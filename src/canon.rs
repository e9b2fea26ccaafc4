//! # Canonicalization
//!
//! Documents and proof options are canonicalized with one of two schemes
//! before hashing:
//!
//! - RDFC-1.0: the JSON-LD value is expanded to an RDF dataset and
//!   serialized as canonical N-Quads. Context URLs are resolved through a
//!   [`ContextLoader`] passed in by the caller.
//! - JCS (RFC 8785): deterministic JSON with sorted keys and no
//!   insignificant whitespace.

mod loader;
#[cfg(feature = "rdfc")]
mod rdfc;

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

pub use self::loader::{ContextLoader, StaticLoader};
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;

/// Canonicalization scheme.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Canonicalization {
    /// RDF Dataset Canonicalization (RDFC-1.0).
    Rdfc,

    /// JSON Canonicalization Scheme (RFC 8785).
    Jcs,
}

impl Canonicalization {
    /// Lower-case name as used in output file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rdfc => "rdfc",
            Self::Jcs => "jcs",
        }
    }
}

impl Display for Canonicalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Canonicalization {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rdfc" => Ok(Self::Rdfc),
            "jcs" => Ok(Self::Jcs),
            _ => Err(Error::Canonicalization(format!("unsupported scheme: {s}"))),
        }
    }
}

/// Canonicalize `value` with the given scheme.
///
/// `hash` selects the digest used internally by RDFC-1.0 when labelling
/// blank nodes. JCS ignores it.
///
/// # Errors
/// Returns [`Error::Canonicalization`] if a context cannot be resolved, the
/// value is not valid JSON-LD, or RDFC support was not compiled in.
///
/// # Panics
/// RDFC canonicalization panics if called outside a tokio runtime.
#[instrument(level = "debug", skip(value, loader))]
pub async fn canonicalize<L: ContextLoader>(
    value: &Value, scheme: Canonicalization, hash: HashAlgorithm, loader: &L,
) -> Result<String> {
    match scheme {
        Canonicalization::Jcs => jcs(value),
        Canonicalization::Rdfc => {
            #[cfg(feature = "rdfc")]
            {
                rdfc::canonicalize(value, hash, loader).await
            }
            #[cfg(not(feature = "rdfc"))]
            {
                let _ = (hash, loader);
                Err(Error::Canonicalization("built without RDFC support".to_string()))
            }
        }
    }
}

fn jcs(value: &Value) -> Result<String> {
    serde_json_canonicalizer::to_string(value).map_err(|e| Error::Canonicalization(e.to_string()))
}
