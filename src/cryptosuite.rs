//! # Cryptosuite Registry
//!
//! A cryptosuite names a fixed combination of canonicalization scheme, hash
//! algorithm, and signature family. The registry is a static table: adding a
//! suite means adding one entry below.

use std::fmt::{self, Display};

use anyhow::Result as AnyResult;
use di_vectors_ecc::{Algorithm, Encoding, Signer};

use crate::canon::Canonicalization;
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;

/// Every registered cryptosuite, in enumeration order.
pub static CRYPTOSUITES: [Cryptosuite; 14] = [
    Cryptosuite::new("ecdsa-rdfc-2019", Canonicalization::Rdfc, Algorithm::EcdsaP256),
    Cryptosuite::new("ecdsa-jcs-2019", Canonicalization::Jcs, Algorithm::EcdsaP256),
    Cryptosuite::new("mldsa44-rdfc-2024", Canonicalization::Rdfc, Algorithm::MlDsa44),
    Cryptosuite::new("mldsa44-jcs-2024", Canonicalization::Jcs, Algorithm::MlDsa44),
    Cryptosuite::new("mldsa65-rdfc-2024", Canonicalization::Rdfc, Algorithm::MlDsa65),
    Cryptosuite::new("mldsa65-jcs-2024", Canonicalization::Jcs, Algorithm::MlDsa65),
    Cryptosuite::new("mldsa87-rdfc-2024", Canonicalization::Rdfc, Algorithm::MlDsa87),
    Cryptosuite::new("mldsa87-jcs-2024", Canonicalization::Jcs, Algorithm::MlDsa87),
    Cryptosuite::new("slhdsa128-rdfc-2024", Canonicalization::Rdfc, Algorithm::SlhDsaSha2_128s),
    Cryptosuite::new("slhdsa128-jcs-2024", Canonicalization::Jcs, Algorithm::SlhDsaSha2_128s),
    Cryptosuite::new("slhdsa192-rdfc-2024", Canonicalization::Rdfc, Algorithm::SlhDsaSha2_192s),
    Cryptosuite::new("slhdsa192-jcs-2024", Canonicalization::Jcs, Algorithm::SlhDsaSha2_192s),
    Cryptosuite::new("slhdsa256-rdfc-2024", Canonicalization::Rdfc, Algorithm::SlhDsaSha2_256s),
    Cryptosuite::new("slhdsa256-jcs-2024", Canonicalization::Jcs, Algorithm::SlhDsaSha2_256s),
];

/// Resolve a cryptosuite identifier.
///
/// # Errors
/// Returns [`Error::UnsupportedAlgorithm`] if `id` is not registered.
pub fn lookup(id: &str) -> Result<&'static Cryptosuite> {
    CRYPTOSUITES
        .iter()
        .find(|suite| suite.id == id)
        .ok_or_else(|| Error::UnsupportedAlgorithm(format!("unknown cryptosuite: {id}")))
}

/// All registered cryptosuites.
#[must_use]
pub fn all() -> &'static [Cryptosuite] {
    &CRYPTOSUITES
}

/// Cryptosuite descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cryptosuite {
    id: &'static str,
    canonicalization: Canonicalization,
    hash: HashAlgorithm,
    algorithm: Algorithm,
}

impl Cryptosuite {
    /// Describe a suite. The hash algorithm follows from the family's
    /// security category.
    ///
    /// # Panics
    /// Panics (at compile time, for the static table) if the family reports
    /// a security category outside 1–5.
    #[must_use]
    pub const fn new(
        id: &'static str, canonicalization: Canonicalization, algorithm: Algorithm,
    ) -> Self {
        let Some(hash) = HashAlgorithm::for_category(algorithm.security_category()) else {
            panic!("security category out of range");
        };
        Self {
            id,
            canonicalization,
            hash,
            algorithm,
        }
    }

    /// The cryptosuite identifier, as carried in `proof.cryptosuite`.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// Canonicalization scheme for both the document and proof options.
    #[must_use]
    pub const fn canonicalization(&self) -> Canonicalization {
        self.canonicalization
    }

    /// Document hash algorithm. Also the digest used inside RDFC.
    #[must_use]
    pub const fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    /// Signature family.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Multicodec prefix of public keys.
    #[must_use]
    pub const fn key_prefix(&self) -> [u8; 2] {
        self.algorithm.codec()
    }

    /// Multibase encoding of public keys and proof values.
    #[must_use]
    pub const fn key_encoding(&self) -> Encoding {
        self.algorithm.encoding()
    }

    /// Sign a combined hash, applying the family's prehash rule first.
    ///
    /// # Errors
    /// Returns [`Error::Signature`] if the signer fails.
    pub async fn sign(&self, signer: &impl Signer, combined_hash: &[u8]) -> Result<Vec<u8>> {
        let msg = self.algorithm.message(combined_hash);
        signer.try_sign(&msg).await.map_err(|e| Error::Signature(e.to_string()))
    }

    /// Verify a signature over a combined hash, applying the family's
    /// prehash rule first.
    ///
    /// # Errors
    /// Returns an error if the signature or public key is malformed for the
    /// family.
    pub fn verify(
        &self, signature: &[u8], combined_hash: &[u8], public_key: &[u8],
    ) -> AnyResult<bool> {
        let msg = self.algorithm.message(combined_hash);
        self.algorithm.verify(signature, &msg, public_key)
    }
}

impl Display for Cryptosuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id)
    }
}
