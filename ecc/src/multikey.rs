//! # Multikey Encoding
//!
//! Public keys are identified by a two-byte multicodec prefix followed by the
//! raw key bytes, rendered in one of two multibase alphabets. Signatures use
//! the same alphabets without a prefix.

use std::fmt::{self, Display};

use anyhow::{Result, anyhow, bail};
use multibase::Base;
use serde::{Deserialize, Serialize};

/// Alias for multi-base encoded string.
pub type MultiKey = String;

/// Multibase alphabet.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Bitcoin base58 alphabet (multibase prefix `z`).
    #[serde(rename = "base58btc")]
    Base58Btc,

    /// URL-safe base64 without padding (multibase prefix `u`).
    #[serde(rename = "base64url")]
    Base64Url,
}

impl Encoding {
    const fn base(self) -> Base {
        match self {
            Self::Base58Btc => Base::Base58Btc,
            Self::Base64Url => Base::Base64Url,
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base58Btc => write!(f, "base58btc"),
            Self::Base64Url => write!(f, "base64url"),
        }
    }
}

/// Encode a raw public key as a multikey: `prefix ‖ key` in the named
/// multibase alphabet.
#[must_use]
pub fn encode(prefix: [u8; 2], key: &[u8], encoding: Encoding) -> MultiKey {
    let mut bytes = Vec::with_capacity(key.len() + 2);
    bytes.extend_from_slice(&prefix);
    bytes.extend_from_slice(key);
    multibase::encode(encoding.base(), bytes)
}

/// Decode a multikey, returning the prefix and the raw key.
///
/// The prefix is returned rather than checked; see [`decode_key`] for the
/// checked form.
///
/// # Errors
/// Returns an error if the string is not valid multibase, uses a different
/// alphabet than `encoding`, or decodes to fewer than two bytes.
pub fn decode(encoded: &str, encoding: Encoding) -> Result<([u8; 2], Vec<u8>)> {
    let mut bytes = decode_bytes(encoded, encoding)?;
    if bytes.len() < 2 {
        bail!("multikey too short: {} bytes", bytes.len());
    }
    let key = bytes.split_off(2);
    Ok(([bytes[0], bytes[1]], key))
}

/// Decode a multikey and check that its prefix matches `expected`.
///
/// # Errors
/// Returns an error if decoding fails or the recovered prefix differs from
/// `expected`.
pub fn decode_key(encoded: &str, encoding: Encoding, expected: [u8; 2]) -> Result<Vec<u8>> {
    let (prefix, key) = decode(encoded, encoding)?;
    if prefix != expected {
        bail!(
            "multikey prefix 0x{} does not match expected 0x{}",
            hex::encode(prefix),
            hex::encode(expected)
        );
    }
    Ok(key)
}

/// Multibase-encode arbitrary bytes, such as a signature.
#[must_use]
pub fn encode_bytes(bytes: &[u8], encoding: Encoding) -> String {
    multibase::encode(encoding.base(), bytes)
}

/// Decode multibase-encoded bytes, requiring the named alphabet.
///
/// # Errors
/// Returns an error if the string is not valid multibase or uses a different
/// alphabet.
pub fn decode_bytes(encoded: &str, encoding: Encoding) -> Result<Vec<u8>> {
    let (base, bytes) =
        multibase::decode(encoded).map_err(|e| anyhow!("issue decoding multibase: {e}"))?;
    if base != encoding.base() {
        bail!("expected {encoding} multibase, found {base:?}");
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::Algorithm;

    const P256_MULTIKEY: &str = "zDnaepBuvsQ8cpsWrVKw8fbpGpvPeNSjVPTWoq6cRqaYzBKVP";

    #[test]
    fn decode_known_p256_key() {
        let (prefix, key) = decode(P256_MULTIKEY, Encoding::Base58Btc).expect("should decode");
        assert_eq!(prefix, crate::P256_CODEC);
        assert_eq!(key.len(), 33);
        assert!(key[0] == 0x02 || key[0] == 0x03, "compressed point tag");
        assert_eq!(encode(prefix, &key, Encoding::Base58Btc), P256_MULTIKEY);
    }

    #[test]
    fn wrong_alphabet_rejected() {
        let err = decode(P256_MULTIKEY, Encoding::Base64Url).expect_err("should reject");
        assert!(err.to_string().contains("base64url"));
    }

    #[test]
    fn short_input_rejected() {
        let encoded = encode_bytes(&[0x80], Encoding::Base58Btc);
        decode(&encoded, Encoding::Base58Btc).expect_err("one byte is too short");

        let encoded = encode_bytes(&[], Encoding::Base64Url);
        decode(&encoded, Encoding::Base64Url).expect_err("empty is too short");
    }

    #[test]
    fn foreign_prefix_rejected() {
        let encoded = encode(crate::MLDSA44_CODEC, &[1, 2, 3], Encoding::Base64Url);
        decode_key(&encoded, Encoding::Base64Url, crate::MLDSA65_CODEC)
            .expect_err("prefix mismatch");
        let key = decode_key(&encoded, Encoding::Base64Url, crate::MLDSA44_CODEC)
            .expect("prefix matches");
        assert_eq!(key, vec![1, 2, 3]);
    }

    #[test]
    fn base64url_uses_u_prefix() {
        let encoded = encode(crate::SLHDSA_SHA2_128S_CODEC, &[0xff; 32], Encoding::Base64Url);
        assert!(encoded.starts_with('u'));
        assert!(!encoded.contains('='));
    }

    proptest! {
        #[test]
        fn every_family_round_trips(
            key in proptest::collection::vec(any::<u8>(), 0..128), idx in 0usize..7
        ) {
            let alg = Algorithm::ALL[idx];
            let encoded = encode(alg.codec(), &key, alg.encoding());
            let decoded = decode_key(&encoded, alg.encoding(), alg.codec()).expect("should decode");
            prop_assert_eq!(decoded, key);
        }
    }
}
