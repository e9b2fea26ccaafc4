//! # Hashing
//!
//! The combined hash signed by every cryptosuite is the SHA-256 hash of the
//! canonical proof configuration followed by the suite's hash of the
//! transformed document.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{Error, Result};

/// Document hash algorithm.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256, 32-byte digest.
    Sha256,

    /// SHA-384, 48-byte digest.
    Sha384,

    /// SHA-512, 64-byte digest.
    Sha512,
}

impl HashAlgorithm {
    /// Hash algorithm mandated for a NIST security category: 1–2 use
    /// SHA-256, 3–4 use SHA-384, and 5 uses SHA-512. `None` outside 1–5.
    #[must_use]
    pub const fn for_category(category: u8) -> Option<Self> {
        match category {
            1 | 2 => Some(Self::Sha256),
            3 | 4 => Some(Self::Sha384),
            5 => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Digest length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Hash `data`.
    #[must_use]
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Lower-case name as used in output file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }
}

impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(Error::UnsupportedHash(s.to_string())),
        }
    }
}

/// Compute the combined hash `SHA-256(proof_config) ‖ HASH(transformed)`.
///
/// The proof configuration is always hashed with SHA-256, whatever the
/// suite's document hash.
#[must_use]
pub fn combine(transformed: &str, proof_config: &str, hash: HashAlgorithm) -> Vec<u8> {
    let mut combined = Sha256::digest(proof_config.as_bytes()).to_vec();
    combined.extend(hash.digest(transformed.as_bytes()));
    combined
}
