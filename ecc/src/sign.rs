//! # Signing

use std::borrow::Cow;

use anyhow::{Result, anyhow};
use sha2::{Digest, Sha256};

use crate::core::{Algorithm, KeyPair};
use crate::multikey::MultiKey;

/// Signing and verification per family.
impl Algorithm {
    /// The message actually handed to the signature primitive for a given
    /// combined hash.
    ///
    /// The P-256 primitive expects a pre-hashed digest, so the combined hash
    /// is hashed once more with SHA-256. Post-quantum primitives hash
    /// internally and receive the combined hash unchanged.
    #[must_use]
    pub fn message<'a>(self, combined_hash: &'a [u8]) -> Cow<'a, [u8]> {
        match self {
            Self::EcdsaP256 => Cow::Owned(Sha256::digest(combined_hash).to_vec()),
            _ => Cow::Borrowed(combined_hash),
        }
    }

    /// Generate a `(public_key, secret_key)` pair.
    ///
    /// # Errors
    /// Returns an error if the primitive's key generation fails.
    pub fn generate(self) -> Result<(Vec<u8>, Vec<u8>)> {
        match self {
            Self::EcdsaP256 => p256_dsa::generate(),
            Self::MlDsa44 => ml_dsa_44::generate(),
            Self::MlDsa65 => ml_dsa_65::generate(),
            Self::MlDsa87 => ml_dsa_87::generate(),
            Self::SlhDsaSha2_128s => slh_dsa_sha2_128s::generate(),
            Self::SlhDsaSha2_192s => slh_dsa_sha2_192s::generate(),
            Self::SlhDsaSha2_256s => slh_dsa_sha2_256s::generate(),
        }
    }

    /// Sign `msg` with the family's primitive.
    ///
    /// `msg` is passed through untouched: callers signing a combined hash
    /// should pass it through [`Algorithm::message`] first.
    ///
    /// # Errors
    /// Returns an error if the secret key is malformed for the family or the
    /// primitive fails.
    pub fn try_sign(self, msg: &[u8], secret_key: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::EcdsaP256 => p256_dsa::sign(msg, secret_key),
            Self::MlDsa44 => ml_dsa_44::sign(msg, secret_key),
            Self::MlDsa65 => ml_dsa_65::sign(msg, secret_key),
            Self::MlDsa87 => ml_dsa_87::sign(msg, secret_key),
            Self::SlhDsaSha2_128s => slh_dsa_sha2_128s::sign(msg, secret_key),
            Self::SlhDsaSha2_192s => slh_dsa_sha2_192s::sign(msg, secret_key),
            Self::SlhDsaSha2_256s => slh_dsa_sha2_256s::sign(msg, secret_key),
        }
    }

    /// Verify a signature over `msg`.
    ///
    /// A well-formed signature that does not match yields `Ok(false)`.
    ///
    /// # Errors
    /// Returns an error if the signature or public key cannot be parsed for
    /// the family (for example, a wrong length).
    pub fn verify(self, sig: &[u8], msg: &[u8], public_key: &[u8]) -> Result<bool> {
        match self {
            Self::EcdsaP256 => p256_dsa::verify(sig, msg, public_key),
            Self::MlDsa44 => ml_dsa_44::verify(sig, msg, public_key),
            Self::MlDsa65 => ml_dsa_65::verify(sig, msg, public_key),
            Self::MlDsa87 => ml_dsa_87::verify(sig, msg, public_key),
            Self::SlhDsaSha2_128s => slh_dsa_sha2_128s::verify(sig, msg, public_key),
            Self::SlhDsaSha2_192s => slh_dsa_sha2_192s::verify(sig, msg, public_key),
            Self::SlhDsaSha2_256s => slh_dsa_sha2_256s::verify(sig, msg, public_key),
        }
    }
}

/// Signer is used by implementers to provide signing functionality for
/// Data Integrity proof creation.
pub trait Signer: Send + Sync {
    /// Sign the message with the signer's secret key.
    fn try_sign(&self, msg: &[u8]) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Signature family used by the signer.
    fn algorithm(&self) -> impl Future<Output = Result<Algorithm>> + Send;

    /// The signer's public key as a prefixed multibase string.
    fn multikey(&self) -> impl Future<Output = Result<MultiKey>> + Send;
}

impl Signer for KeyPair {
    async fn try_sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        self.algorithm().try_sign(msg, self.secret_key().as_bytes())
    }

    async fn algorithm(&self) -> Result<Algorithm> {
        Ok(Self::algorithm(self))
    }

    async fn multikey(&self) -> Result<MultiKey> {
        Ok(self.public_key_multibase().to_string())
    }
}

/// Derive the compressed SEC1 public key for a P-256 secret scalar.
pub(crate) fn p256_public_key(secret_key: &[u8]) -> Result<Vec<u8>> {
    p256_dsa::public_key(secret_key)
}

fn array<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| anyhow!("invalid {what} length: expected {N}, got {}", bytes.len()))
}

mod p256_dsa {
    use anyhow::{Result, anyhow};
    use ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
    use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
    use rand::rngs::OsRng;

    pub fn generate() -> Result<(Vec<u8>, Vec<u8>)> {
        let signing_key = SigningKey::random(&mut OsRng);
        let secret_key = signing_key.to_bytes().to_vec();
        Ok((public_key(&secret_key)?, secret_key))
    }

    pub fn public_key(secret_key: &[u8]) -> Result<Vec<u8>> {
        let signing_key = SigningKey::from_slice(secret_key)
            .map_err(|e| anyhow!("issue parsing secret key: {e}"))?;
        Ok(signing_key.verifying_key().to_encoded_point(true).as_bytes().to_vec())
    }

    // RFC 6979 deterministic nonce; s is left as produced (no low-S
    // normalization) to match other P-256 vector generators.
    pub fn sign(digest: &[u8], secret_key: &[u8]) -> Result<Vec<u8>> {
        let signing_key = SigningKey::from_slice(secret_key)
            .map_err(|e| anyhow!("issue parsing secret key: {e}"))?;
        let signature: Signature =
            signing_key.sign_prehash(digest).map_err(|e| anyhow!("issue signing: {e}"))?;
        Ok(signature.to_bytes().to_vec())
    }

    pub fn verify(sig: &[u8], digest: &[u8], public_key: &[u8]) -> Result<bool> {
        let verifying_key = VerifyingKey::from_sec1_bytes(public_key)
            .map_err(|e| anyhow!("unable to build verifying key: {e}"))?;
        let signature =
            Signature::from_slice(sig).map_err(|e| anyhow!("unable to build signature: {e}"))?;
        Ok(verifying_key.verify_prehash(digest, &signature).is_ok())
    }
}

// ML-DSA in pure mode with an empty context string.
macro_rules! ml_dsa {
    ($params:ident) => {
        mod $params {
            use anyhow::{Result, anyhow};
            use fips204::$params::{PK_LEN, PrivateKey, PublicKey, SIG_LEN, SK_LEN, try_keygen};
            use fips204::traits::{SerDes as _, Signer as _, Verifier as _};

            use super::array;

            pub fn generate() -> Result<(Vec<u8>, Vec<u8>)> {
                let (pk, sk) = try_keygen().map_err(|e| anyhow!("issue generating key: {e}"))?;
                Ok((pk.into_bytes().to_vec(), sk.into_bytes().to_vec()))
            }

            pub fn sign(msg: &[u8], secret_key: &[u8]) -> Result<Vec<u8>> {
                let bytes = array::<SK_LEN>(secret_key, "secret key")?;
                let sk = PrivateKey::try_from_bytes(bytes)
                    .map_err(|e| anyhow!("issue parsing secret key: {e}"))?;
                let sig = sk.try_sign(msg, &[]).map_err(|e| anyhow!("issue signing: {e}"))?;
                Ok(sig.to_vec())
            }

            pub fn verify(sig: &[u8], msg: &[u8], public_key: &[u8]) -> Result<bool> {
                let bytes = array::<PK_LEN>(public_key, "public key")?;
                let pk = PublicKey::try_from_bytes(bytes)
                    .map_err(|e| anyhow!("unable to build verifying key: {e}"))?;
                let sig = array::<SIG_LEN>(sig, "signature")?;
                Ok(pk.verify(msg, &sig, &[]))
            }
        }
    };
}

// SLH-DSA in pure mode, hedged randomness, empty context string.
macro_rules! slh_dsa {
    ($params:ident) => {
        mod $params {
            use anyhow::{Result, anyhow};
            use fips205::$params::{PK_LEN, PrivateKey, PublicKey, SIG_LEN, SK_LEN, try_keygen};
            use fips205::traits::{SerDes as _, Signer as _, Verifier as _};

            use super::array;

            pub fn generate() -> Result<(Vec<u8>, Vec<u8>)> {
                let (pk, sk) = try_keygen().map_err(|e| anyhow!("issue generating key: {e}"))?;
                Ok((pk.into_bytes().to_vec(), sk.into_bytes().to_vec()))
            }

            pub fn sign(msg: &[u8], secret_key: &[u8]) -> Result<Vec<u8>> {
                let bytes = array::<SK_LEN>(secret_key, "secret key")?;
                let sk = PrivateKey::try_from_bytes(&bytes)
                    .map_err(|e| anyhow!("issue parsing secret key: {e}"))?;
                let sig =
                    sk.try_sign(msg, &[], true).map_err(|e| anyhow!("issue signing: {e}"))?;
                Ok(sig.to_vec())
            }

            pub fn verify(sig: &[u8], msg: &[u8], public_key: &[u8]) -> Result<bool> {
                let bytes = array::<PK_LEN>(public_key, "public key")?;
                let pk = PublicKey::try_from_bytes(&bytes)
                    .map_err(|e| anyhow!("unable to build verifying key: {e}"))?;
                let sig = array::<SIG_LEN>(sig, "signature")?;
                Ok(pk.verify(msg, &sig, &[]))
            }
        }
    };
}

ml_dsa!(ml_dsa_44);
ml_dsa!(ml_dsa_65);
ml_dsa!(ml_dsa_87);
slh_dsa!(slh_dsa_sha2_128s);
slh_dsa!(slh_dsa_sha2_192s);
slh_dsa!(slh_dsa_sha2_256s);

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET_HEX: &str = "C9AFA9D845BA75166B5C215767B1D6934E50C3DB36E89B127B8A622B120F6721";

    #[test]
    fn prehash_is_family_specific() {
        let combined = [0xab_u8; 64];
        let ecdsa = Algorithm::EcdsaP256.message(&combined);
        assert_eq!(ecdsa.as_ref(), Sha256::digest(combined).as_slice());

        for alg in &Algorithm::ALL[1..] {
            assert_eq!(alg.message(&combined).as_ref(), combined.as_slice());
        }
    }

    #[test]
    fn p256_sign_verify() {
        let secret = hex::decode(SECRET_HEX).expect("valid hex");
        let key_pair = KeyPair::from_p256_secret(&secret).expect("valid key");
        assert_eq!(
            key_pair.public_key_multibase(),
            "zDnaepBuvsQ8cpsWrVKw8fbpGpvPeNSjVPTWoq6cRqaYzBKVP"
        );

        let msg = Algorithm::EcdsaP256.message(b"combined hash");
        let sig = Algorithm::EcdsaP256.try_sign(&msg, &secret).expect("should sign");
        assert_eq!(sig.len(), 64);

        // deterministic nonces
        let again = Algorithm::EcdsaP256.try_sign(&msg, &secret).expect("should sign");
        assert_eq!(sig, again);

        let pk = key_pair.public_key();
        assert!(Algorithm::EcdsaP256.verify(&sig, &msg, pk).expect("well formed"));

        let other = Algorithm::EcdsaP256.message(b"other hash");
        assert!(!Algorithm::EcdsaP256.verify(&sig, &other, pk).expect("well formed"));

        Algorithm::EcdsaP256.verify(&sig[..63], &msg, pk).expect_err("short signature");
    }

    #[test]
    fn ml_dsa_sign_verify() {
        for alg in [Algorithm::MlDsa44, Algorithm::MlDsa65, Algorithm::MlDsa87] {
            let key_pair = KeyPair::generate(alg).expect("should generate");
            let msg = [0x11_u8; 80];
            let sig = alg.try_sign(&msg, key_pair.secret_key().as_bytes()).expect("should sign");
            assert!(alg.verify(&sig, &msg, key_pair.public_key()).expect("well formed"));

            let mut tampered = sig.clone();
            tampered[10] ^= 0x01;
            assert!(!alg.verify(&tampered, &msg, key_pair.public_key()).unwrap_or(false));

            alg.verify(&sig[1..], &msg, key_pair.public_key()).expect_err("short signature");
        }
    }

    #[test]
    fn slh_dsa_sign_verify() {
        let alg = Algorithm::SlhDsaSha2_128s;
        let key_pair = KeyPair::generate(alg).expect("should generate");
        let msg = [0x22_u8; 64];
        let sig = alg.try_sign(&msg, key_pair.secret_key().as_bytes()).expect("should sign");
        assert!(alg.verify(&sig, &msg, key_pair.public_key()).expect("well formed"));
        assert!(!alg.verify(&sig, &[0x23_u8; 64], key_pair.public_key()).expect("well formed"));
    }

    #[test]
    fn wrong_family_key_is_an_error() {
        let key_pair = KeyPair::generate(Algorithm::MlDsa44).expect("should generate");
        Algorithm::MlDsa65
            .try_sign(b"msg", key_pair.secret_key().as_bytes())
            .expect_err("secret key length differs between parameter sets");
    }
}
