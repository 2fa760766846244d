//! Per-file signature creation and verification.
//!
//! Signatures are stored under the forward-slash form of each path so a
//! manifest written on one platform verifies on another; lookups translate
//! back to the host separator. Signing stops at the first failure (a signer
//! that cannot sign one digest cannot sign any); verification collects every
//! failure so a run reports all tampered files, not just the first.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use path_slash::{PathBufExt as _, PathExt as _};
use signet_crypto::{encoding, EncodingError, HashSigner, HashVerifier, SignerError};

use crate::pool::HashResult;

/// Failure while producing the per-file signature map.
#[derive(Debug, thiserror::Error)]
pub enum SignFilesError {
    /// A digest could not be signed.
    #[error("could not sign hash of file '{path}': {source}")]
    Sign {
        path: String,
        #[source]
        source: SignerError,
    },
    /// A path had no usable digest to sign.
    #[error("no hash for file '{path}'")]
    MissingHash { path: String },
}

/// One file's verification failure.
#[derive(Debug, thiserror::Error)]
pub enum VerifyFileError {
    /// The stored signature text does not decode.
    #[error("signature of file '{path}' has invalid encoding: {source}")]
    SignatureEncoding {
        path: String,
        #[source]
        source: EncodingError,
    },
    /// The signature does not verify against the file's digest.
    #[error("file '{path}' has been tampered with")]
    Tampered { path: String },
}

/// Signs every digest and returns the signature map plus the sorted paths.
///
/// Paths are processed in lexicographic byte order; map keys are normalized
/// to forward slashes. The first signing failure aborts.
pub fn sign_file_hashes(
    signer: &HashSigner,
    hashes: &HashMap<String, HashResult>,
) -> Result<(BTreeMap<String, String>, Vec<String>), SignFilesError> {
    let mut paths: Vec<String> = hashes.keys().cloned().collect();
    paths.sort_unstable();

    let mut signatures = BTreeMap::new();
    for path in &paths {
        let digest = hashes[path]
            .digest
            .as_ref()
            .map_err(|_| SignFilesError::MissingHash { path: path.clone() })?;

        let signature = signer
            .sign_hash(digest)
            .map_err(|source| SignFilesError::Sign { path: path.clone(), source })?;

        signatures.insert(Path::new(path).to_slash_lossy().into_owned(), encoding::encode(&signature));
    }

    Ok((signatures, paths))
}

/// Verifies every file signature against the hashed digests.
///
/// Signature keys without a corresponding digest are skipped; the caller
/// reports those as missing files. Returns the verified host-form paths and
/// every failure encountered.
pub fn verify_file_hashes(
    verifier: &HashVerifier,
    signatures: &BTreeMap<String, String>,
    hashes: &HashMap<String, HashResult>,
) -> (Vec<String>, Vec<VerifyFileError>) {
    let mut verified = Vec::with_capacity(hashes.len());
    let mut failures = Vec::new();

    for (key, signature_text) in signatures {
        let local_path = PathBuf::from_slash(key).to_string_lossy().into_owned();

        let Some(result) = hashes.get(&local_path) else {
            continue;
        };
        let Ok(digest) = result.digest.as_ref() else {
            continue;
        };

        let signature = match encoding::decode(signature_text) {
            Ok(signature) => signature,
            Err(source) => {
                failures.push(VerifyFileError::SignatureEncoding {
                    path: local_path,
                    source,
                });
                continue;
            }
        };

        if verifier.verify_hash(digest, &signature) {
            verified.push(local_path);
        } else {
            failures.push(VerifyFileError::Tampered { path: local_path });
        }
    }

    (verified, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_crypto::{key_from_bytes, SignatureScheme};
    use std::fs;

    fn hash_tree(dir: &tempfile::TempDir, names: &[&str]) -> (Vec<u8>, HashMap<String, HashResult>) {
        let mut paths = Vec::new();
        for name in names {
            let path = dir.path().join(name);
            fs::write(&path, format!("contents of {name}")).unwrap();
            paths.push(path.to_string_lossy().into_owned());
        }
        let key = key_from_bytes(b"map");
        let hashes = crate::pool::file_hashes(&paths, &key);
        (key, hashes)
    }

    #[test]
    fn signs_in_sorted_order_and_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let (_key, hashes) = hash_tree(&dir, &["b.txt", "a.txt", "c.txt"]);

        let signer = HashSigner::generate(SignatureScheme::Ed25519);
        let (signatures, sorted) = sign_file_hashes(&signer, &hashes).unwrap();

        assert_eq!(signatures.len(), 3);
        let mut expected = sorted.clone();
        expected.sort_unstable();
        assert_eq!(sorted, expected);
        assert!(signatures.values().all(|s| !s.is_empty()));

        let verifier = signer.verifier().unwrap();
        let (verified, failures) = verify_file_hashes(&verifier, &signatures, &hashes);
        assert_eq!(verified.len(), 3);
        assert!(failures.is_empty());
    }

    #[test]
    fn destroyed_signer_aborts_on_the_first_path() {
        let dir = tempfile::tempdir().unwrap();
        let (_key, hashes) = hash_tree(&dir, &["a.txt", "b.txt"]);

        let mut signer = HashSigner::generate(SignatureScheme::Ed25519);
        signer.destroy();

        let err = sign_file_hashes(&signer, &hashes).unwrap_err();
        assert!(matches!(err, SignFilesError::Sign { .. }));
    }

    #[test]
    fn tampered_digest_is_reported_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let (key, hashes) = hash_tree(&dir, &["a.txt", "b.txt"]);

        let signer = HashSigner::generate(SignatureScheme::Ed25519);
        let (signatures, _) = sign_file_hashes(&signer, &hashes).unwrap();

        // Modify one file after signing and re-hash.
        fs::write(dir.path().join("b.txt"), b"changed").unwrap();
        let paths: Vec<String> = hashes.keys().cloned().collect();
        let rehashed = crate::pool::file_hashes(&paths, &key);

        let verifier = signer.verifier().unwrap();
        let (verified, failures) = verify_file_hashes(&verifier, &signatures, &rehashed);

        assert_eq!(verified.len(), 1);
        assert!(verified[0].ends_with("a.txt"));
        assert_eq!(failures.len(), 1);
        assert!(matches!(&failures[0], VerifyFileError::Tampered { path } if path.ends_with("b.txt")));
    }

    #[test]
    fn undecodable_signature_is_an_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let (_key, hashes) = hash_tree(&dir, &["a.txt"]);

        let signer = HashSigner::generate(SignatureScheme::Ed25519);
        let (mut signatures, _) = sign_file_hashes(&signer, &hashes).unwrap();
        for signature in signatures.values_mut() {
            // '0' and '1' are outside the byte alphabet.
            *signature = "01".into();
        }

        let verifier = signer.verifier().unwrap();
        let (verified, failures) = verify_file_hashes(&verifier, &signatures, &hashes);
        assert!(verified.is_empty());
        assert!(matches!(&failures[0], VerifyFileError::SignatureEncoding { .. }));
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (_key, hashes) = hash_tree(&dir, &["a.txt"]);

        let signer = HashSigner::generate(SignatureScheme::Ed25519);
        let (mut signatures, _) = sign_file_hashes(&signer, &hashes).unwrap();
        signatures.insert("gone.txt".into(), signatures.values().next().unwrap().clone());

        let verifier = signer.verifier().unwrap();
        let (verified, failures) = verify_file_hashes(&verifier, &signatures, &hashes);
        assert_eq!(verified.len(), 1);
        assert!(failures.is_empty());
    }
}
