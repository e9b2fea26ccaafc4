//! Key management
//!
//! A keyring is the key material file shared between vector generation runs:
//! a JSON object mapping key-type tags (`"mldsa65"`, `"slh128s"`, ...) to hex
//! encoded key pairs and their multibase public keys.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::{Algorithm, KeyPair};

/// Key material for a set of signature families.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Keyring(BTreeMap<String, Entry>);

/// Keyring entry as stored in the key material file.
#[derive(Clone, Debug, Deserialize, Serialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[zeroize(skip)]
    public_key_hex: String,
    secret_key_hex: String,
    #[zeroize(skip)]
    public_key_multibase: String,
}

impl Entry {
    /// The multibase-encoded public key.
    #[must_use]
    pub fn public_key_multibase(&self) -> &str {
        &self.public_key_multibase
    }
}

impl From<&KeyPair> for Entry {
    fn from(key_pair: &KeyPair) -> Self {
        Self {
            public_key_hex: hex::encode(key_pair.public_key()),
            secret_key_hex: hex::encode(key_pair.secret_key().as_bytes()),
            public_key_multibase: key_pair.public_key_multibase().to_string(),
        }
    }
}

impl Keyring {
    /// Generate a fresh key pair for each of the given families.
    ///
    /// # Errors
    /// Returns an error if key generation fails for any family.
    pub fn generate(algorithms: &[Algorithm]) -> Result<Self> {
        let mut keyring = Self::default();
        for algorithm in algorithms {
            keyring.insert(&KeyPair::generate(*algorithm)?);
        }
        Ok(keyring)
    }

    /// Parse a key material file.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| anyhow!("issue parsing key material: {e}"))
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Load a key material file from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| anyhow!("issue reading {}: {e}", path.display()))?;
        Self::from_json(&json)
    }

    /// Write the key material file to disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .map_err(|e| anyhow!("issue writing {}: {e}", path.display()))
    }

    /// Add or replace the entry for the key pair's family.
    pub fn insert(&mut self, key_pair: &KeyPair) {
        self.0.insert(key_pair.algorithm().tag().to_string(), Entry::from(key_pair));
    }

    /// Get the entry for a family, if present.
    #[must_use]
    pub fn entry(&self, algorithm: Algorithm) -> Option<&Entry> {
        self.0.get(algorithm.tag())
    }

    /// Rebuild the key pair stored for a family.
    ///
    /// # Errors
    /// Returns an error if there is no entry for the family, the hex is
    /// malformed, or the multibase key does not match the public key.
    pub fn key_pair(&self, algorithm: Algorithm) -> Result<KeyPair> {
        let Some(entry) = self.entry(algorithm) else {
            return Err(anyhow!("no {} key in keyring", algorithm.tag()));
        };
        let public_key = hex::decode(&entry.public_key_hex)
            .map_err(|e| anyhow!("issue decoding public key hex: {e}"))?;
        let secret_key = hex::decode(&entry.secret_key_hex)
            .map_err(|e| anyhow!("issue decoding secret key hex: {e}"))?;
        KeyPair::from_parts(algorithm, public_key, secret_key, &entry.public_key_multibase)
    }

    /// Families with an entry in the keyring. Unrecognised tags are skipped.
    #[must_use]
    pub fn algorithms(&self) -> Vec<Algorithm> {
        self.0.keys().filter_map(|tag| tag.parse().ok()).collect()
    }
}
