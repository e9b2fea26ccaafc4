//! Helper functions for `did:key` verification methods.

use crate::error::{Error, Result};

const DID_KEY: &str = "did:key:";

/// Construct the `did:key` verification method for a multibase public key:
/// `did:key:<multikey>#<multikey>`.
#[must_use]
pub fn verification_method(multikey: &str) -> String {
    format!("{DID_KEY}{multikey}#{multikey}")
}

/// Extract the multibase public key from a verification method.
///
/// The key is taken from the URL fragment. Without a fragment, the
/// method-specific identifier of a `did:key` DID is used.
///
/// # Errors
///
/// Will return an error if no key can be found in the verification method.
pub fn multikey(verification_method: &str) -> Result<&str> {
    let key = match verification_method.split_once('#') {
        Some((_, fragment)) => fragment,
        None => verification_method.strip_prefix(DID_KEY).ok_or_else(|| {
            Error::KeyDecode(format!("no key in verification method: {verification_method}"))
        })?,
    };

    if key.is_empty() {
        return Err(Error::KeyDecode(format!(
            "empty key in verification method: {verification_method}"
        )));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const P256_MULTIKEY: &str = "zDnaepBuvsQ8cpsWrVKw8fbpGpvPeNSjVPTWoq6cRqaYzBKVP";

    #[test]
    fn test_verification_method() {
        let vm = verification_method(P256_MULTIKEY);
        assert_eq!(vm, format!("did:key:{P256_MULTIKEY}#{P256_MULTIKEY}"));
        assert_eq!(multikey(&vm).expect("should parse"), P256_MULTIKEY);
    }

    #[test]
    fn test_multikey_fallbacks() {
        let did = format!("did:key:{P256_MULTIKEY}");
        assert_eq!(multikey(&did).expect("should parse"), P256_MULTIKEY);

        let vm = format!("did:example:123#{P256_MULTIKEY}");
        assert_eq!(multikey(&vm).expect("should parse"), P256_MULTIKEY);

        assert!(matches!(multikey("did:example:123"), Err(Error::KeyDecode(_))));
        assert!(matches!(multikey("did:key:abc#"), Err(Error::KeyDecode(_))));
    }
}
