//! # Data Integrity Proofs
//!
//! Create and verify Data Integrity proofs for classical (ECDSA P-256) and
//! post-quantum (ML-DSA, SLH-DSA) cryptosuites, exposing the intermediate
//! values (canonical document, canonical proof configuration, combined
//! hash) needed to publish test vectors.
//!
//! ```rust,ignore
//! let loader = StaticLoader::default();
//! let pipeline = ProofPipeline::new(&loader);
//! let template = ProofTemplate::new("assertionMethod");
//!
//! let signed = pipeline.create(&document, &template, &key_pair, "mldsa44-rdfc-2024").await?;
//! assert!(pipeline.verify(&signed, "mldsa44-rdfc-2024").await?);
//! ```

pub mod canon;
pub mod cryptosuite;
pub mod did;
mod error;
pub mod hash;
mod pipeline;
pub mod proof;

pub use di_vectors_ecc::{Algorithm, Encoding, KeyPair, Keyring, MultiKey, Signer, multikey};

pub use crate::canon::{Canonicalization, ContextLoader, StaticLoader, canonicalize};
pub use crate::cryptosuite::Cryptosuite;
pub use crate::error::{Error, Result};
pub use crate::hash::HashAlgorithm;
pub use crate::pipeline::{Digested, ProofPipeline, Signed};
pub use crate::proof::{Proof, ProofOptions, ProofTemplate};
