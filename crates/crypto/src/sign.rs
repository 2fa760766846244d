//! Hash signing and verification over the two supported schemes.
//!
//! [`HashSigner`] owns a freshly generated private key and signs raw 64-byte
//! digests; [`HashVerifier`] holds only a public key. Both are enums over the
//! scheme variants, so dispatch is static. A signer is destroyed by swapping
//! in the key-less `Destroyed` variant: the private key drops (and zeroizes)
//! immediately, the transition is irreversible, and every subsequent
//! operation fails with [`SignerError::Destroyed`].
//!
//! Ed25519 digests are not signed as-is: the digest is fenced between two
//! fixed 16-byte constants and the resulting 96-byte payload is signed as a
//! regular Ed25519 message. The fences are part of the wire contract and
//! must not change. ECDSA P-521 signs the digest directly as a prehash and
//! produces ASN.1 DER signatures; its public keys are PKIX/SPKI DER.

use ed25519_dalek::Verifier as _;
use p521::{
    ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier},
    elliptic_curve::pkcs8::{DecodePublicKey, EncodePublicKey},
};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Bytes absorbed before the digest in the Ed25519 signing payload.
const ED25519_BEGIN_FENCE: [u8; 16] = [
    0x44, 0x97, 0x72, 0xda, 0xb6, 0xa9, 0x2b, 0x43, 0xc5, 0x06, 0xc4, 0x92, 0x06, 0x37, 0x58, 0xe4,
];

/// Bytes absorbed after the digest in the Ed25519 signing payload.
const ED25519_END_FENCE: [u8; 16] = [
    0xb8, 0x16, 0x17, 0x05, 0x8d, 0x38, 0xc4, 0x50, 0x2b, 0x01, 0x2f, 0xf9, 0x49, 0x9e, 0x2d, 0xdc,
];

/// Smallest accepted Ed25519 public key length.
const ED25519_MIN_KEY_LEN: usize = 32;
/// Largest accepted Ed25519 public key length. Historical encodings ran to
/// 34 bytes; only the standards-conformant 32-byte form can actually parse.
const ED25519_MAX_KEY_LEN: usize = 34;

/// Exact length of a PKIX-DER encoded P-521 public key.
const P521_KEY_LEN: usize = 158;

/// The supported signature schemes and their manifest tag bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// Ed25519 over the fenced digest payload.
    Ed25519,
    /// ECDSA over NIST P-521, signing the digest as a prehash.
    EcDsaP521,
}

impl SignatureScheme {
    /// Returns the scheme's manifest tag byte.
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Ed25519 => 1,
            Self::EcDsaP521 => 2,
        }
    }

    /// Returns the scheme's command-line name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
            Self::EcDsaP521 => "ecdsap521",
        }
    }
}

impl TryFrom<u8> for SignatureScheme {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, u8> {
        match tag {
            1 => Ok(Self::Ed25519),
            2 => Ok(Self::EcDsaP521),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SignatureScheme {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.tag())
    }
}

impl<'de> Deserialize<'de> for SignatureScheme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = u8::deserialize(deserializer)?;
        Self::try_from(tag)
            .map_err(|tag| serde::de::Error::custom(format!("invalid signature type: {tag}")))
    }
}

/// Errors from signer operations.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The signer's private key has been destroyed.
    #[error("hash signer has been destroyed")]
    Destroyed,
    /// The underlying signature primitive failed.
    #[error("signature operation failed: {0}")]
    Internal(String),
}

/// Errors constructing a verifier from public key bytes.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// The key bytes have the wrong length for the scheme.
    #[error("bad {scheme} public key length: {length}")]
    BadLength { scheme: SignatureScheme, length: usize },
    /// The key bytes do not decode as a key of the scheme.
    #[error("public key is not a valid {scheme} key")]
    WrongKind { scheme: SignatureScheme },
}

enum SignerKind {
    Ed25519 { key: ed25519_dalek::SigningKey },
    EcDsaP521 { key: p521::ecdsa::SigningKey },
    Destroyed,
}

/// A freshly generated signing key for one of the supported schemes.
///
/// The handle is valid until [`destroy`](Self::destroy) is called; the
/// destroyed state is irreversible and observable through the `Destroyed`
/// error of every other operation.
pub struct HashSigner {
    kind: SignerKind,
}

impl HashSigner {
    /// Generates a fresh key pair for the given scheme.
    pub fn generate(scheme: SignatureScheme) -> Self {
        let kind = match scheme {
            SignatureScheme::Ed25519 => {
                SignerKind::Ed25519 { key: ed25519_dalek::SigningKey::generate(&mut OsRng) }
            }
            SignatureScheme::EcDsaP521 => {
                SignerKind::EcDsaP521 { key: p521::ecdsa::SigningKey::random(&mut OsRng) }
            }
        };
        Self { kind }
    }

    /// Returns the scheme this signer was generated for, or `Destroyed`.
    pub fn scheme(&self) -> Result<SignatureScheme, SignerError> {
        match &self.kind {
            SignerKind::Ed25519 { .. } => Ok(SignatureScheme::Ed25519),
            SignerKind::EcDsaP521 { .. } => Ok(SignatureScheme::EcDsaP521),
            SignerKind::Destroyed => Err(SignerError::Destroyed),
        }
    }

    /// Returns the marshalled public key: raw 32 bytes for Ed25519, PKIX-DER
    /// for P-521.
    pub fn public_key(&self) -> Result<Vec<u8>, SignerError> {
        match &self.kind {
            SignerKind::Ed25519 { key } => Ok(key.verifying_key().to_bytes().to_vec()),
            SignerKind::EcDsaP521 { key } => {
                let verifying_key = p521::ecdsa::VerifyingKey::from(key);
                let public_key = p521::PublicKey::from_affine(*verifying_key.as_affine())
                    .map_err(|err| SignerError::Internal(err.to_string()))?;
                public_key
                    .to_public_key_der()
                    .map(|der| der.into_vec())
                    .map_err(|err| SignerError::Internal(err.to_string()))
            }
            SignerKind::Destroyed => Err(SignerError::Destroyed),
        }
    }

    /// Signs a raw digest.
    pub fn sign_hash(&self, digest: &[u8]) -> Result<Vec<u8>, SignerError> {
        match &self.kind {
            SignerKind::Ed25519 { key } => {
                use ed25519_dalek::Signer as _;
                Ok(key.sign(&fenced(digest)).to_bytes().to_vec())
            }
            SignerKind::EcDsaP521 { key } => {
                let signature: p521::ecdsa::Signature = key
                    .sign_prehash(digest)
                    .map_err(|err| SignerError::Internal(err.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            SignerKind::Destroyed => Err(SignerError::Destroyed),
        }
    }

    /// Builds the verifier matching this signer's public key.
    pub fn verifier(&self) -> Result<HashVerifier, SignerError> {
        let scheme = self.scheme()?;
        let public_key = self.public_key()?;
        HashVerifier::from_public_key(scheme, &public_key)
            .map_err(|err| SignerError::Internal(err.to_string()))
    }

    /// Irreversibly invalidates the signer.
    ///
    /// The private key is dropped (both key types zeroize their secret
    /// material on drop). Idempotent; never fails.
    pub fn destroy(&mut self) {
        self.kind = SignerKind::Destroyed;
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        matches!(self.kind, SignerKind::Destroyed)
    }
}

impl std::fmt::Debug for HashSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.kind {
            SignerKind::Ed25519 { .. } => "ed25519",
            SignerKind::EcDsaP521 { .. } => "ecdsap521",
            SignerKind::Destroyed => "destroyed",
        };
        f.debug_struct("HashSigner").field("state", &state).finish()
    }
}

enum VerifierKind {
    Ed25519 { key: ed25519_dalek::VerifyingKey },
    EcDsaP521 { key: p521::ecdsa::VerifyingKey },
}

/// A public key of one of the supported schemes.
pub struct HashVerifier {
    kind: VerifierKind,
}

impl HashVerifier {
    /// Builds a verifier from marshalled public key bytes.
    ///
    /// Validates the key length for the scheme before attempting to parse:
    /// Ed25519 admits the historical 32 to 34 byte range (only 32-byte keys
    /// parse), P-521 requires exactly 158 bytes of PKIX-DER.
    pub fn from_public_key(scheme: SignatureScheme, bytes: &[u8]) -> Result<Self, KeyError> {
        match scheme {
            SignatureScheme::Ed25519 => {
                if !(ED25519_MIN_KEY_LEN..=ED25519_MAX_KEY_LEN).contains(&bytes.len()) {
                    return Err(KeyError::BadLength { scheme, length: bytes.len() });
                }
                let raw: [u8; 32] =
                    bytes.try_into().map_err(|_| KeyError::WrongKind { scheme })?;
                let key = ed25519_dalek::VerifyingKey::from_bytes(&raw)
                    .map_err(|_| KeyError::WrongKind { scheme })?;
                Ok(Self { kind: VerifierKind::Ed25519 { key } })
            }
            SignatureScheme::EcDsaP521 => {
                if bytes.len() != P521_KEY_LEN {
                    return Err(KeyError::BadLength { scheme, length: bytes.len() });
                }
                let public_key = p521::PublicKey::from_public_key_der(bytes)
                    .map_err(|_| KeyError::WrongKind { scheme })?;
                let key = p521::ecdsa::VerifyingKey::from_affine(*public_key.as_affine())
                    .map_err(|_| KeyError::WrongKind { scheme })?;
                Ok(Self { kind: VerifierKind::EcDsaP521 { key } })
            }
        }
    }

    /// Returns the scheme of the held public key.
    pub fn scheme(&self) -> SignatureScheme {
        match &self.kind {
            VerifierKind::Ed25519 { .. } => SignatureScheme::Ed25519,
            VerifierKind::EcDsaP521 { .. } => SignatureScheme::EcDsaP521,
        }
    }

    /// Verifies a signature over a raw digest.
    ///
    /// Total over well-formed inputs: malformed and mismatching signatures
    /// alike yield `false`, never an error.
    pub fn verify_hash(&self, digest: &[u8], signature: &[u8]) -> bool {
        match &self.kind {
            VerifierKind::Ed25519 { key } => {
                let Ok(signature) = ed25519_dalek::Signature::from_slice(signature) else {
                    return false;
                };
                key.verify(&fenced(digest), &signature).is_ok()
            }
            VerifierKind::EcDsaP521 { key } => {
                let Ok(signature) = p521::ecdsa::Signature::from_der(signature) else {
                    return false;
                };
                key.verify_prehash(digest, &signature).is_ok()
            }
        }
    }
}

impl std::fmt::Debug for HashVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashVerifier").field("scheme", &self.scheme()).finish()
    }
}

/// Wraps a digest into the fixed Ed25519 signing payload.
fn fenced(digest: &[u8]) -> Vec<u8> {
    let mut payload =
        Vec::with_capacity(ED25519_BEGIN_FENCE.len() + digest.len() + ED25519_END_FENCE.len());
    payload.extend_from_slice(&ED25519_BEGIN_FENCE);
    payload.extend_from_slice(digest);
    payload.extend_from_slice(&ED25519_END_FENCE);
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn digest(seed: u8) -> [u8; 64] {
        let mut digest = [0u8; 64];
        for (i, byte) in digest.iter_mut().enumerate() {
            *byte = seed.wrapping_add(i as u8);
        }
        digest
    }

    #[test]
    fn fences_are_the_fixed_constants() {
        assert_eq!(ED25519_BEGIN_FENCE, hex!("449772dab6a92b43c506c492063758e4"));
        assert_eq!(ED25519_END_FENCE, hex!("b81617058d38c4502b012ff9499e2ddc"));
        assert_ne!(ED25519_BEGIN_FENCE, ED25519_END_FENCE);

        let payload = fenced(&digest(0));
        assert_eq!(payload.len(), 96);
        assert_eq!(&payload[..16], ED25519_BEGIN_FENCE);
        assert_eq!(&payload[80..], ED25519_END_FENCE);
    }

    #[test]
    fn ed25519_sign_verify_round_trip() {
        let signer = HashSigner::generate(SignatureScheme::Ed25519);
        let digest = digest(1);

        let signature = signer.sign_hash(&digest).unwrap();
        let verifier = signer.verifier().unwrap();

        assert!(verifier.verify_hash(&digest, &signature));
        assert!(!verifier.verify_hash(&self::digest(2), &signature));
    }

    #[test]
    fn ecdsap521_sign_verify_round_trip() {
        let signer = HashSigner::generate(SignatureScheme::EcDsaP521);
        let digest = digest(3);

        let public_key = signer.public_key().unwrap();
        assert_eq!(public_key.len(), P521_KEY_LEN);

        let signature = signer.sign_hash(&digest).unwrap();
        let verifier = HashVerifier::from_public_key(SignatureScheme::EcDsaP521, &public_key)
            .unwrap();

        assert!(verifier.verify_hash(&digest, &signature));
        assert!(!verifier.verify_hash(&self::digest(4), &signature));
    }

    #[test]
    fn crossed_schemes_do_not_verify() {
        let ed = HashSigner::generate(SignatureScheme::Ed25519);
        let ec = HashSigner::generate(SignatureScheme::EcDsaP521);
        let digest = digest(5);

        let ed_signature = ed.sign_hash(&digest).unwrap();
        let ec_signature = ec.sign_hash(&digest).unwrap();

        assert!(!ed.verifier().unwrap().verify_hash(&digest, &ec_signature));
        assert!(!ec.verifier().unwrap().verify_hash(&digest, &ed_signature));
    }

    #[test]
    fn wrong_key_lengths_fail_construction() {
        let err = HashVerifier::from_public_key(SignatureScheme::Ed25519, &[0u8; 31]);
        assert!(matches!(err, Err(KeyError::BadLength { length: 31, .. })));

        let err = HashVerifier::from_public_key(SignatureScheme::Ed25519, &[0u8; 35]);
        assert!(matches!(err, Err(KeyError::BadLength { length: 35, .. })));

        // 33 bytes pass the historical length gate but cannot parse.
        let err = HashVerifier::from_public_key(SignatureScheme::Ed25519, &[1u8; 33]);
        assert!(matches!(err, Err(KeyError::WrongKind { .. })));

        let err = HashVerifier::from_public_key(SignatureScheme::EcDsaP521, &[0u8; 64]);
        assert!(matches!(err, Err(KeyError::BadLength { length: 64, .. })));
    }

    #[test]
    fn wrong_key_family_fails_construction() {
        // An Ed25519 key handed to the P-521 constructor has the wrong
        // length; a P-521 key truncated to 32 bytes is not a curve point.
        let ec = HashSigner::generate(SignatureScheme::EcDsaP521);
        let der = ec.public_key().unwrap();
        assert!(HashVerifier::from_public_key(SignatureScheme::Ed25519, &der).is_err());
    }

    #[test]
    fn malformed_signatures_return_false() {
        let signer = HashSigner::generate(SignatureScheme::Ed25519);
        let verifier = signer.verifier().unwrap();
        assert!(!verifier.verify_hash(&digest(6), b"not a signature"));
        assert!(!verifier.verify_hash(&digest(6), &[]));

        let signer = HashSigner::generate(SignatureScheme::EcDsaP521);
        let verifier = signer.verifier().unwrap();
        assert!(!verifier.verify_hash(&digest(6), b"not der"));
    }

    #[test]
    fn destroy_discipline() {
        let mut signer = HashSigner::generate(SignatureScheme::Ed25519);
        assert!(!signer.is_destroyed());
        assert!(signer.public_key().is_ok());

        signer.destroy();
        assert!(signer.is_destroyed());
        assert!(matches!(signer.public_key(), Err(SignerError::Destroyed)));
        assert!(matches!(signer.sign_hash(&digest(7)), Err(SignerError::Destroyed)));
        assert!(matches!(signer.scheme(), Err(SignerError::Destroyed)));

        // Idempotent.
        signer.destroy();
        assert!(signer.is_destroyed());
    }

    #[test]
    fn scheme_tags_round_trip() {
        assert_eq!(SignatureScheme::try_from(1), Ok(SignatureScheme::Ed25519));
        assert_eq!(SignatureScheme::try_from(2), Ok(SignatureScheme::EcDsaP521));
        assert_eq!(SignatureScheme::try_from(0), Err(0));
        assert_eq!(SignatureScheme::try_from(3), Err(3));
        assert_eq!(SignatureScheme::Ed25519.tag(), 1);
        assert_eq!(SignatureScheme::EcDsaP521.tag(), 2);
    }
}
