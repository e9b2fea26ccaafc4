//! # Data Integrity Proofs
//!
//! ## VC Data Integrity
//!
//! The Verifiable Credential Data Integrity 1.0 [VC-DATA-INTEGRITY]
//! specification defines a set of standard properties describing the details
//! of the proof generation process. The specific details (canonicalization
//! algorithm, hash and proof method algorithms) are defined by separate
//! cryptosuites.
//!
//! A proof is created over two inputs: the document, and a proof
//! configuration built from the [`ProofOptions`] below. Both are
//! canonicalized and hashed, and the combined hash is signed. The signature
//! is added to the proof as `proofValue`, the only proof field that is not
//! part of the proof configuration.
//!
//! The proof configuration carries the document's `@context`, but the
//! embedded [`Proof`] does not: a verifier reattaches the outer document's
//! context when rebuilding the configuration.
//!
//! [VC-DATA-INTEGRITY]: https://www.w3.org/TR/vc-data-integrity/

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::did;
use crate::error::{Error, Result};

/// Proof type for every cryptosuite in the registry.
pub const DATA_INTEGRITY_PROOF: &str = "DataIntegrityProof";

/// Caller-supplied proof options.
///
/// Only `proofPurpose` is required. A `created` timestamp, when present, is
/// used as is. Other fields, including `type`, `cryptosuite`,
/// `verificationMethod`, and `@context`, are set by the pipeline and ignored
/// here.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProofTemplate {
    /// The reason the proof was created, for example `assertionMethod`.
    pub proof_purpose: String,

    /// RFC 3339 creation timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl ProofTemplate {
    /// A template for the given proof purpose.
    #[must_use]
    pub fn new(proof_purpose: impl Into<String>) -> Self {
        Self {
            proof_purpose: proof_purpose.into(),
            created: None,
        }
    }

    /// Fix the creation timestamp.
    #[must_use]
    pub fn created(mut self, created: impl Into<String>) -> Self {
        self.created = Some(created.into());
        self
    }

    /// Build the proof options for a document context, cryptosuite, and
    /// signing key. Without a template timestamp, `created` is the current
    /// UTC time to the second.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProof`] if the template's `created` is not an
    /// RFC 3339 timestamp.
    pub fn options(
        &self, context: Option<Value>, cryptosuite: &str, public_key_multibase: &str,
    ) -> Result<ProofOptions> {
        let created = match &self.created {
            Some(created) => {
                DateTime::parse_from_rfc3339(created).map_err(|e| {
                    Error::InvalidProof(format!("created is not an RFC 3339 timestamp: {e}"))
                })?;
                created.clone()
            }
            None => Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        Ok(ProofOptions {
            context,
            type_: DATA_INTEGRITY_PROOF.to_string(),
            cryptosuite: cryptosuite.to_string(),
            created,
            verification_method: did::verification_method(public_key_multibase),
            proof_purpose: self.proof_purpose.clone(),
        })
    }
}

/// The proof configuration: every proof field except `proofValue`, plus the
/// document's `@context`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProofOptions {
    /// The document's JSON-LD context.
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Always [`DATA_INTEGRITY_PROOF`].
    #[serde(rename = "type")]
    pub type_: String,

    /// Cryptosuite identifier.
    pub cryptosuite: String,

    /// RFC 3339 creation timestamp.
    pub created: String,

    /// `did:key` URL of the verifying key.
    pub verification_method: String,

    /// The reason the proof was created.
    pub proof_purpose: String,
}

impl ProofOptions {
    /// Complete a proof from these options and an encoded signature,
    /// dropping `@context`.
    #[must_use]
    pub fn into_proof(self, proof_value: String) -> Proof {
        Proof {
            type_: self.type_,
            cryptosuite: self.cryptosuite,
            created: self.created,
            verification_method: self.verification_method,
            proof_purpose: self.proof_purpose,
            proof_value,
        }
    }
}

/// A Data Integrity proof as embedded in a signed document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Always [`DATA_INTEGRITY_PROOF`].
    #[serde(rename = "type")]
    pub type_: String,

    /// Cryptosuite identifier.
    pub cryptosuite: String,

    /// RFC 3339 creation timestamp.
    pub created: String,

    /// `did:key` URL of the verifying key.
    pub verification_method: String,

    /// The reason the proof was created.
    pub proof_purpose: String,

    /// Multibase-encoded signature.
    pub proof_value: String,
}

impl Proof {
    /// Rebuild the proof options from the proof and the outer document's
    /// context.
    #[must_use]
    pub fn options(&self, context: Option<Value>) -> ProofOptions {
        ProofOptions {
            context,
            type_: self.type_.clone(),
            cryptosuite: self.cryptosuite.clone(),
            created: self.created.clone(),
            verification_method: self.verification_method.clone(),
            proof_purpose: self.proof_purpose.clone(),
        }
    }
}
