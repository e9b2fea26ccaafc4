//! # Proof Pipeline
//!
//! Creating a proof runs a fixed sequence of stages:
//!
//! 1. transform: canonicalize the document;
//! 2. configure: build and canonicalize the proof options;
//! 3. hash: combine the proof configuration and document hashes;
//! 4. sign: sign the combined hash with the suite's signature family.
//!
//! Verification strips the proof, rebuilds the options from it, and repeats
//! stages 1 to 3 before checking the signature. Each call is independent of
//! any other, so separate documents and suites can be processed
//! concurrently with a shared pipeline.

use di_vectors_ecc::{Signer, multikey};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::canon::{ContextLoader, canonicalize};
use crate::cryptosuite::{self, Cryptosuite};
use crate::did;
use crate::error::{Error, Result};
use crate::hash;
use crate::proof::{Proof, ProofOptions, ProofTemplate};

/// Intermediate values produced while hashing a document and its proof
/// options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Digested {
    /// The canonical document.
    pub transformed: String,

    /// The canonical proof configuration.
    pub proof_config: String,

    /// `SHA-256(proof_config) ‖ HASH(transformed)`.
    pub combined_hash: Vec<u8>,
}

/// A signed document together with the values it was signed over.
#[derive(Clone, Debug)]
pub struct Signed {
    /// The input document with its `proof` attached.
    pub document: Value,

    /// The proof options used, including `@context`.
    pub options: ProofOptions,

    /// Intermediate values.
    pub digested: Digested,
}

/// Creates and verifies Data Integrity proofs.
pub struct ProofPipeline<'a, L: ContextLoader> {
    loader: &'a L,
}

impl<'a, L: ContextLoader> ProofPipeline<'a, L> {
    /// Create a pipeline resolving JSON-LD contexts with `loader`.
    pub const fn new(loader: &'a L) -> Self {
        Self { loader }
    }

    /// Add a Data Integrity proof to `document` using the named suite.
    ///
    /// # Errors
    ///
    /// Returns an error if the suite is unknown, the signer's family does
    /// not match the suite, the template's `created` is not RFC 3339, or any
    /// pipeline stage fails.
    pub async fn create(
        &self, document: &Value, template: &ProofTemplate, signer: &impl Signer, suite_id: &str,
    ) -> Result<Value> {
        Ok(self.create_with_digest(document, template, signer, suite_id).await?.document)
    }

    /// Add a Data Integrity proof to `document`, returning the intermediate
    /// values alongside the signed document.
    ///
    /// # Errors
    ///
    /// As for [`ProofPipeline::create`].
    #[instrument(level = "debug", skip(self, document, template, signer))]
    pub async fn create_with_digest(
        &self, document: &Value, template: &ProofTemplate, signer: &impl Signer, suite_id: &str,
    ) -> Result<Signed> {
        let suite = cryptosuite::lookup(suite_id)?;
        let Value::Object(members) = document else {
            return Err(Error::InvalidDocument("document is not a JSON object".to_string()));
        };

        let algorithm = signer.algorithm().await.map_err(|e| Error::Signature(e.to_string()))?;
        if algorithm != suite.algorithm() {
            return Err(Error::UnsupportedAlgorithm(format!(
                "{suite_id} requires a {} key, signer holds {algorithm}",
                suite.algorithm()
            )));
        }
        let public_key_multibase =
            signer.multikey().await.map_err(|e| Error::Signature(e.to_string()))?;

        let options =
            template.options(members.get("@context").cloned(), suite_id, &public_key_multibase)?;

        let digested = self.digest(document, &options, suite).await?;
        let signature = suite.sign(signer, &digested.combined_hash).await?;
        debug!(len = signature.len(), "signed");

        let proof_value = multikey::encode_bytes(&signature, suite.key_encoding());
        let proof = options.clone().into_proof(proof_value);

        let mut signed = members.clone();
        signed.insert("proof".to_string(), serde_json::to_value(proof)?);

        Ok(Signed {
            document: Value::Object(signed),
            options,
            digested,
        })
    }

    /// Verify the proof on `document` using the named suite.
    ///
    /// Returns `Ok(false)` when the signature does not match, including
    /// when the proof value cannot be decoded or has the wrong length for
    /// the suite.
    ///
    /// # Errors
    ///
    /// Returns an error if the suite is unknown, the document has no proof
    /// or the proof is missing fields, the verification method key cannot be
    /// decoded for the suite, or canonicalization fails.
    #[instrument(level = "debug", skip(self, document))]
    pub async fn verify(&self, document: &Value, suite_id: &str) -> Result<bool> {
        let suite = cryptosuite::lookup(suite_id)?;
        let Value::Object(members) = document else {
            return Err(Error::InvalidDocument("document is not a JSON object".to_string()));
        };

        let mut unsigned = members.clone();
        let Some(proof) = unsigned.remove("proof") else {
            return Err(Error::InvalidProof("document has no proof".to_string()));
        };
        let proof: Proof =
            serde_json::from_value(proof).map_err(|e| Error::InvalidProof(e.to_string()))?;
        if proof.cryptosuite != suite_id {
            debug!(embedded = %proof.cryptosuite, "proof names a different cryptosuite");
        }

        let public_key = multikey::decode_key(
            did::multikey(&proof.verification_method)?,
            suite.key_encoding(),
            suite.key_prefix(),
        )
        .map_err(|e| Error::KeyDecode(e.to_string()))?;

        let options = proof.options(unsigned.get("@context").cloned());
        let digested = self.digest(&Value::Object(unsigned), &options, suite).await?;

        let signature = match multikey::decode_bytes(&proof.proof_value, suite.key_encoding()) {
            Ok(signature) => signature,
            Err(e) => {
                debug!("undecodable proof value: {e}");
                return Ok(false);
            }
        };

        match suite.verify(&signature, &digested.combined_hash, &public_key) {
            Ok(verified) => Ok(verified),
            Err(e) => {
                debug!("malformed signature: {e}");
                Ok(false)
            }
        }
    }

    /// Canonicalize the document and proof options and compute the combined
    /// hash.
    ///
    /// # Errors
    ///
    /// Returns an error if either canonicalization fails.
    #[instrument(level = "debug", skip(self, document, options, suite), fields(suite = suite.id()))]
    pub async fn digest(
        &self, document: &Value, options: &ProofOptions, suite: &Cryptosuite,
    ) -> Result<Digested> {
        let transformed =
            canonicalize(document, suite.canonicalization(), suite.hash(), self.loader).await?;
        debug!("document transformed");

        let options = serde_json::to_value(options)?;
        let proof_config =
            canonicalize(&options, suite.canonicalization(), suite.hash(), self.loader).await?;
        debug!("proof configured");

        let combined_hash = hash::combine(&transformed, &proof_config, suite.hash());
        debug!(combined_hash = %hex::encode(&combined_hash), "hashed");

        Ok(Digested {
            transformed,
            proof_config,
            combined_hash,
        })
    }
}
