//! The signature manifest: the persisted record binding a public key, run
//! metadata and one signature per file, plus its own self-signature.
//!
//! The manifest's logical fields have a fixed canonical order; the
//! self-signature covers all of them (see [`canonical`]) so that no field
//! can change without falsifying it. Persistence is JSON with a fixed
//! indent; unknown fields are rejected and the container size is bounded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use signet_crypto::{encoding, EncodingError, HashSigner, HashVerifier, SignatureScheme, SignerError};

pub mod canonical;
pub mod store;

pub use store::{read_manifest, write_manifest, MAX_MANIFEST_SIZE};

/// The only manifest format version currently defined.
pub const FORMAT_V1: u8 = 1;

/// The newest format version this implementation understands.
pub const FORMAT_MAX: u8 = FORMAT_V1;

/// Manifest-level failures.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest file exceeds [`MAX_MANIFEST_SIZE`].
    #[error("manifest file is too large: {size} bytes (limit is {limit})")]
    TooLarge { size: u64, limit: u64 },
    /// A required field is absent or empty.
    #[error("field '{0}' is missing from the manifest")]
    MissingField(&'static str),
    /// The format version is outside the known range.
    #[error("invalid manifest format id: {0}")]
    InvalidFormat(u8),
    /// A stored file signature is the empty string.
    #[error("empty signature for file '{0}'")]
    EmptySignature(String),
    /// The container does not parse as a manifest.
    #[error("malformed manifest: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The self-signature text does not decode.
    #[error("data signature has invalid encoding: {0}")]
    SignatureEncoding(#[from] EncodingError),
    /// Signing the canonical hash failed.
    #[error(transparent)]
    Signer(#[from] SignerError),
    /// The container could not be read or written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The persisted signature manifest.
///
/// Field order mirrors the canonical hashing order; the JSON field names are
/// part of the container contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Manifest {
    /// Format version; currently always [`FORMAT_V1`].
    pub format: u8,
    /// The caller-supplied domain separator.
    pub context_id: String,
    /// Text-encoded marshalled public key.
    pub public_key: String,
    /// Signing timestamp, `YYYY-MM-DD HH:MM:SS ±ZZ:ZZ`.
    pub timestamp: String,
    /// Host the manifest was created on.
    pub hostname: String,
    /// Scheme of the signing key.
    pub signature_type: SignatureScheme,
    /// One text-encoded signature per file, keyed by forward-slash path.
    pub file_signatures: BTreeMap<String, String>,
    /// Text-encoded self-signature over the canonical hash.
    pub data_signature: String,
}

impl Manifest {
    /// Computes the canonical hash and stores its signature as the
    /// manifest's data signature.
    pub fn sign(&mut self, signer: &HashSigner, context_key: &[u8]) -> Result<(), ManifestError> {
        let hash = canonical::canonical_hash(self, context_key);
        let signature = signer.sign_hash(&hash)?;
        self.data_signature = encoding::encode(&signature);
        Ok(())
    }

    /// Recomputes the canonical hash and checks the supplied signature
    /// against it.
    pub fn verify(
        &self,
        verifier: &HashVerifier,
        context_key: &[u8],
        signature: &[u8],
    ) -> bool {
        let hash = canonical::canonical_hash(self, context_key);
        verifier.verify_hash(&hash, signature)
    }

    /// Decodes the stored data signature into raw bytes.
    pub fn data_signature_bytes(&self) -> Result<Vec<u8>, ManifestError> {
        Ok(encoding::decode(&self.data_signature)?)
    }

    /// Decodes the stored public key into raw bytes.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>, ManifestError> {
        Ok(encoding::decode(&self.public_key)?)
    }

    /// Checks completeness and range constraints of all fields.
    ///
    /// The scheme tag needs no check here: an out-of-range tag already fails
    /// deserialization.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.data_signature.is_empty() {
            return Err(ManifestError::MissingField("dataSignature"));
        }
        if self.context_id.is_empty() {
            return Err(ManifestError::MissingField("contextId"));
        }
        if self.format == 0 {
            return Err(ManifestError::MissingField("format"));
        }
        if self.hostname.is_empty() {
            return Err(ManifestError::MissingField("hostname"));
        }
        if self.public_key.is_empty() {
            return Err(ManifestError::MissingField("publicKey"));
        }
        if self.timestamp.is_empty() {
            return Err(ManifestError::MissingField("timestamp"));
        }

        if self.format > FORMAT_MAX {
            return Err(ManifestError::InvalidFormat(self.format));
        }
        if let Some((path, _)) =
            self.file_signatures.iter().find(|(_, signature)| signature.is_empty())
        {
            return Err(ManifestError::EmptySignature(path.clone()));
        }

        Ok(())
    }
}
