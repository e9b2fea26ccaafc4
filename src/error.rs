//! # Errors
//!
//! Every pipeline stage fails with one of the variants below. A signature
//! that is well formed but does not match is not an error: `verify` returns
//! `Ok(false)`.

use thiserror::Error;

/// Errors raised by the proof pipeline and its components.
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown canonicalization scheme, unresolvable context, or a failure
    /// inside the canonicalization collaborator.
    #[error("canonicalization error: {0}")]
    Canonicalization(String),

    /// Hash algorithm outside SHA-256, SHA-384, and SHA-512.
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedHash(String),

    /// Unknown cryptosuite identifier or signature family.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Short, malformed, or foreign-prefixed multibase key.
    #[error("key decode error: {0}")]
    KeyDecode(String),

    /// The document is not a JSON object.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The embedded proof is missing or has missing or malformed fields.
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// The signer failed to produce a signature.
    #[error("signature error: {0}")]
    Signature(String),

    /// JSON serialization or deserialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for proof pipeline operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
