//! # Signature Families and Key Types

use std::fmt::{self, Display};
use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::multikey::{self, Encoding, MultiKey};

/// Prefix bytes to indicate a compressed P-256 public key (`p256-pub`).
pub const P256_CODEC: [u8; 2] = [0x80, 0x24];

/// Prefix bytes to indicate an ML-DSA-44 public key (`mldsa-44-pub`).
pub const MLDSA44_CODEC: [u8; 2] = [0x90, 0x24];

/// Prefix bytes to indicate an ML-DSA-65 public key (`mldsa-65-pub`).
pub const MLDSA65_CODEC: [u8; 2] = [0x91, 0x24];

/// Prefix bytes to indicate an ML-DSA-87 public key (`mldsa-87-pub`).
pub const MLDSA87_CODEC: [u8; 2] = [0x92, 0x24];

/// Prefix bytes to indicate an SLH-DSA-SHA2-128s public key.
pub const SLHDSA_SHA2_128S_CODEC: [u8; 2] = [0xa0, 0x24];

/// Prefix bytes to indicate an SLH-DSA-SHA2-192s public key.
pub const SLHDSA_SHA2_192S_CODEC: [u8; 2] = [0xa4, 0x24];

/// Prefix bytes to indicate an SLH-DSA-SHA2-256s public key.
pub const SLHDSA_SHA2_256S_CODEC: [u8; 2] = [0xa8, 0x24];

/// Signature algorithm family.
///
/// Serialized using the key-type tags found in key material files.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// ECDSA over the NIST P-256 curve.
    #[serde(rename = "p256")]
    EcdsaP256,

    /// ML-DSA-44 (FIPS 204), security category 2.
    #[serde(rename = "mldsa44")]
    MlDsa44,

    /// ML-DSA-65 (FIPS 204), security category 3.
    #[serde(rename = "mldsa65")]
    MlDsa65,

    /// ML-DSA-87 (FIPS 204), security category 5.
    #[serde(rename = "mldsa87")]
    MlDsa87,

    /// SLH-DSA-SHA2-128s (FIPS 205), security category 1.
    #[serde(rename = "slh128s")]
    SlhDsaSha2_128s,

    /// SLH-DSA-SHA2-192s (FIPS 205), security category 3.
    #[serde(rename = "slh192s")]
    SlhDsaSha2_192s,

    /// SLH-DSA-SHA2-256s (FIPS 205), security category 5.
    #[serde(rename = "slh256s")]
    SlhDsaSha2_256s,
}

impl Algorithm {
    /// Every supported signature family.
    pub const ALL: [Self; 7] = [
        Self::EcdsaP256,
        Self::MlDsa44,
        Self::MlDsa65,
        Self::MlDsa87,
        Self::SlhDsaSha2_128s,
        Self::SlhDsaSha2_192s,
        Self::SlhDsaSha2_256s,
    ];

    /// The multicodec prefix identifying public keys of this family.
    #[must_use]
    pub const fn codec(self) -> [u8; 2] {
        match self {
            Self::EcdsaP256 => P256_CODEC,
            Self::MlDsa44 => MLDSA44_CODEC,
            Self::MlDsa65 => MLDSA65_CODEC,
            Self::MlDsa87 => MLDSA87_CODEC,
            Self::SlhDsaSha2_128s => SLHDSA_SHA2_128S_CODEC,
            Self::SlhDsaSha2_192s => SLHDSA_SHA2_192S_CODEC,
            Self::SlhDsaSha2_256s => SLHDSA_SHA2_256S_CODEC,
        }
    }

    /// NIST security category of the family.
    #[must_use]
    pub const fn security_category(self) -> u8 {
        match self {
            Self::EcdsaP256 | Self::SlhDsaSha2_128s => 1,
            Self::MlDsa44 => 2,
            Self::MlDsa65 | Self::SlhDsaSha2_192s => 3,
            Self::MlDsa87 | Self::SlhDsaSha2_256s => 5,
        }
    }

    /// The multibase encoding used for keys and signatures of this family.
    #[must_use]
    pub const fn encoding(self) -> Encoding {
        match self {
            Self::EcdsaP256 => Encoding::Base58Btc,
            _ => Encoding::Base64Url,
        }
    }

    /// Key-type tag used in key material files.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::EcdsaP256 => "p256",
            Self::MlDsa44 => "mldsa44",
            Self::MlDsa65 => "mldsa65",
            Self::MlDsa87 => "mldsa87",
            Self::SlhDsaSha2_128s => "slh128s",
            Self::SlhDsaSha2_192s => "slh192s",
            Self::SlhDsaSha2_256s => "slh256s",
        }
    }

    /// Resolve the family that owns a multicodec prefix.
    #[must_use]
    pub fn from_codec(codec: [u8; 2]) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.codec() == codec)
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EcdsaP256 => write!(f, "ECDSA-P256"),
            Self::MlDsa44 => write!(f, "ML-DSA-44"),
            Self::MlDsa65 => write!(f, "ML-DSA-65"),
            Self::MlDsa87 => write!(f, "ML-DSA-87"),
            Self::SlhDsaSha2_128s => write!(f, "SLH-DSA-SHA2-128s"),
            Self::SlhDsaSha2_192s => write!(f, "SLH-DSA-SHA2-192s"),
            Self::SlhDsaSha2_256s => write!(f, "SLH-DSA-SHA2-256s"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.tag() == s)
            .ok_or_else(|| anyhow!("unsupported key type: {s}"))
    }
}

/// Secret key material for any supported family.
///
/// Post-quantum secret keys are several kilobytes so, unlike a curve
/// scalar, the bytes are held on the heap. They are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Return the secret key as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for SecretKey {
    fn from(val: Vec<u8>) -> Self {
        Self(val)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED; {}])", self.0.len())
    }
}

/// A signing key pair together with its multibase-encoded public key.
#[derive(Clone, Debug)]
pub struct KeyPair {
    algorithm: Algorithm,
    public_key: Vec<u8>,
    secret_key: SecretKey,
    public_key_multibase: MultiKey,
}

impl KeyPair {
    /// Generate a new key pair for the given family.
    ///
    /// # Errors
    /// Returns an error if the underlying primitive fails to generate keys.
    pub fn generate(algorithm: Algorithm) -> Result<Self> {
        let (public_key, secret_key) = algorithm.generate()?;
        Ok(Self::new(algorithm, public_key, secret_key))
    }

    /// Build a P-256 key pair from a raw 32-byte secret scalar, deriving
    /// the compressed public key.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a valid P-256 secret key.
    pub fn from_p256_secret(secret_key: &[u8]) -> Result<Self> {
        let public_key = crate::sign::p256_public_key(secret_key)?;
        Ok(Self::new(Algorithm::EcdsaP256, public_key, secret_key.to_vec()))
    }

    /// Rebuild a key pair from stored parts, checking that the multibase
    /// public key decodes to `public_key` under the family's prefix.
    ///
    /// # Errors
    /// Returns an error if the multibase key is malformed, carries a
    /// different family's prefix, or does not match `public_key`.
    pub fn from_parts(
        algorithm: Algorithm, public_key: Vec<u8>, secret_key: Vec<u8>, public_key_multibase: &str,
    ) -> Result<Self> {
        let decoded =
            multikey::decode_key(public_key_multibase, algorithm.encoding(), algorithm.codec())?;
        if decoded != public_key {
            bail!("multibase public key does not match the {algorithm} public key");
        }

        Ok(Self {
            algorithm,
            public_key,
            secret_key: SecretKey::from(secret_key),
            public_key_multibase: public_key_multibase.to_string(),
        })
    }

    fn new(algorithm: Algorithm, public_key: Vec<u8>, secret_key: Vec<u8>) -> Self {
        let public_key_multibase =
            multikey::encode(algorithm.codec(), &public_key, algorithm.encoding());
        Self {
            algorithm,
            public_key,
            secret_key: SecretKey::from(secret_key),
            public_key_multibase,
        }
    }

    /// The signature family of the key pair.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The raw public key.
    #[must_use]
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// The secret key.
    #[must_use]
    pub const fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// The public key, prefixed and multibase-encoded.
    #[must_use]
    pub fn public_key_multibase(&self) -> &str {
        &self.public_key_multibase
    }
}
