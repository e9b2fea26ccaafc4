//! # Test Utilities
//!
//! Keys and documents shared by tests across the workspace. Post-quantum key
//! generation is slow, so generated key pairs are cached per process.

use std::sync::LazyLock;

use anyhow::Result;
use dashmap::DashMap;
use di_vectors_ecc::{Algorithm, KeyPair, Keyring};
use serde_json::{Value, json};

/// Secret scalar of the fixed P-256 test key.
pub const P256_SECRET_HEX: &str =
    "C9AFA9D845BA75166B5C215767B1D6934E50C3DB36E89B127B8A622B120F6721";

/// Multibase public key of the fixed P-256 test key.
pub const P256_MULTIKEY: &str = "zDnaepBuvsQ8cpsWrVKw8fbpGpvPeNSjVPTWoq6cRqaYzBKVP";

/// Creation timestamp used by fixed test vectors.
pub const CREATED: &str = "2023-02-24T23:36:38Z";

static KEYS: LazyLock<DashMap<Algorithm, KeyPair>> = LazyLock::new(DashMap::new);

/// The fixed P-256 test key.
///
/// # Errors
///
/// Returns an error if the fixed secret key fails to parse.
pub fn p256_key_pair() -> Result<KeyPair> {
    let secret = hex::decode(P256_SECRET_HEX)?;
    KeyPair::from_p256_secret(&secret)
}

/// A key pair for the family: the fixed key for P-256, otherwise one
/// generated on first use and reused thereafter.
///
/// # Errors
///
/// Returns an error if key generation fails.
pub fn key_pair(algorithm: Algorithm) -> Result<KeyPair> {
    if algorithm == Algorithm::EcdsaP256 {
        return p256_key_pair();
    }
    if let Some(key_pair) = KEYS.get(&algorithm) {
        return Ok(key_pair.clone());
    }
    let key_pair = KeyPair::generate(algorithm)?;
    Ok(KEYS.entry(algorithm).or_insert(key_pair).clone())
}

/// A keyring holding [`key_pair`] for each family.
///
/// # Errors
///
/// Returns an error if key generation fails.
pub fn keyring(algorithms: &[Algorithm]) -> Result<Keyring> {
    let mut keyring = Keyring::default();
    for algorithm in algorithms {
        keyring.insert(&key_pair(*algorithm)?);
    }
    Ok(keyring)
}

/// The minimal credential used by the fixed ECDSA vector.
#[must_use]
pub fn unsigned_credential() -> Value {
    json!({
        "@context": ["https://www.w3.org/ns/credentials/v2"],
        "type": ["VerifiableCredential"]
    })
}

/// A credential using the examples vocabulary.
#[must_use]
pub fn alumni_credential() -> Value {
    json!({
        "@context": [
            "https://www.w3.org/ns/credentials/v2",
            "https://www.w3.org/ns/credentials/examples/v2"
        ],
        "id": "urn:uuid:58172aac-d8ba-11ed-83dd-0b3aef56cc33",
        "type": ["VerifiableCredential", "AlumniCredential"],
        "name": "Alumni Credential",
        "description": "A minimum viable example of an Alumni Credential.",
        "issuer": "https://vc.example/issuers/5678",
        "validFrom": "2023-01-01T00:00:00Z",
        "credentialSubject": {
            "id": "did:example:abcdefgh",
            "alumniOf": "The School of Examples"
        }
    })
}

/// Proof options template with a fixed creation time.
#[must_use]
pub fn proof_template() -> Value {
    json!({
        "type": "DataIntegrityProof",
        "created": CREATED,
        "proofPurpose": "assertionMethod"
    })
}
