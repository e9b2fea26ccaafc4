//! # Signature and Key Utilities
//!
//! Signature families, multikey encoding, and key material handling used
//! by the Data Integrity proof pipeline. This crate is not intended to be
//! used directly.

mod core;
mod keyring;
pub mod multikey;
mod sign;

pub use self::core::*;
pub use self::keyring::*;
pub use self::multikey::{Encoding, MultiKey};
pub use self::sign::*;
