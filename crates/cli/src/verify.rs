//! The verify flow.
//!
//! Reads the manifest, checks its self-signature before anything else, then
//! re-hashes the files on disk and verifies every per-file signature. All
//! per-file failures are collected and reported; only manifest-level
//! failures abort early.

use std::{fs, path::Path};

use path_slash::PathBufExt as _;
use signet_crypto::{key_from_bytes, keyid, HashVerifier};
use signet_files::{file_hashes, verify_file_hashes};
use signet_manifest::{read_manifest, Manifest};
use tracing::{error, info, warn};

use crate::{
    common::{count_ending, report_hash_errors, report_success_list},
    exit,
    messages::{USAGE, VERIFY},
    opts::VerifyArgs,
    paths,
};

/// Entry point of the `verify` command.
pub fn handle(args: &VerifyArgs) -> i32 {
    let verification_id = args.verification_id.trim();
    if verification_id.is_empty() {
        error!(code = USAGE + 2, "Verification id must not be empty");
        return exit::USAGE;
    }

    let manifest_name = match paths::manifest_file_name(&args.prefix) {
        Ok(name) => name,
        Err(err) => {
            error!(code = USAGE + 3, "Error in command line: {err}");
            return exit::USAGE;
        }
    };

    do_verification(Path::new(&manifest_name), verification_id)
}

/// Verifies the manifest at `manifest_path` and the files it lists.
pub fn do_verification(manifest_path: &Path, verification_id: &str) -> i32 {
    let manifest = match read_manifest(manifest_path) {
        Ok(manifest) => manifest,
        Err(err) => {
            error!(code = VERIFY, "Could not read manifest file '{}': {err}", manifest_path.display());
            return exit::ERROR;
        }
    };

    let public_key = match manifest.public_key_bytes() {
        Ok(public_key) => public_key,
        Err(err) => {
            error!(code = VERIFY + 1, "Could not decode public key: {err}");
            return exit::ERROR;
        }
    };

    let data_signature = match manifest.data_signature_bytes() {
        Ok(data_signature) => data_signature,
        Err(err) => {
            error!(code = VERIFY + 2, "Could not decode manifest signature: {err}");
            return exit::ERROR;
        }
    };

    let verifier = match HashVerifier::from_public_key(manifest.signature_type, &public_key) {
        Ok(verifier) => verifier,
        Err(err) => {
            error!(code = VERIFY + 3, "Could not create hash verifier: {err}");
            return exit::ERROR;
        }
    };

    let context_key = key_from_bytes(manifest.context_id.as_bytes());

    if !manifest.verify(&verifier, &context_key, &data_signature) {
        error!(
            code = VERIFY + 4,
            "Manifest self-signature mismatch: the manifest has been tampered with or belongs to another context"
        );
        return exit::ERROR;
    }

    let computed_id = keyid::verification_id(
        &manifest.context_id,
        &public_key,
        &manifest.timestamp,
        &manifest.hostname,
    );
    if computed_id != verification_id {
        error!(code = VERIFY + 5, "Verification id does not match the manifest");
        return exit::ERROR;
    }

    info!(code = VERIFY + 6, "Context id         : {}", manifest.context_id);
    info!(code = VERIFY + 7, "Verification id    : {computed_id}");
    info!(code = VERIFY + 8, "Signature timestamp: {}", manifest.timestamp);
    info!(code = VERIFY + 9, "Signature host name: {}", manifest.hostname);

    verify_files(&manifest, &verifier, &context_key)
}

/// Hashes the manifest's files that exist on disk and verifies them.
fn verify_files(manifest: &Manifest, verifier: &HashVerifier, context_key: &[u8]) -> i32 {
    let (present, presence_rc) = existing_files(manifest);

    if present.is_empty() {
        warn!(code = VERIFY + 10, "No files from the manifest are present");
        return exit::WARNING;
    }

    let hashes = file_hashes(&present, context_key);
    if report_hash_errors(&hashes) {
        return exit::ERROR;
    }

    let (mut verified, failures) =
        verify_file_hashes(verifier, &manifest.file_signatures, &hashes);

    report_success_list("Verification", &mut verified);
    for failure in &failures {
        error!(code = VERIFY + 11, "{failure}");
    }

    let rc = if failures.is_empty() { presence_rc } else { exit::ERROR };

    let verified_count = verified.len();
    let verified_ending = count_ending(verified_count);
    match rc {
        exit::OK => {
            info!(
                code = VERIFY + 12,
                "Verification of {verified_count} file{verified_ending} successful"
            );
        }
        exit::WARNING => {
            warn!(
                code = VERIFY + 13,
                "Verification of {verified_count} file{verified_ending} successful and warnings present"
            );
        }
        _ => {
            let failure_count = failures.len();
            let failure_ending = count_ending(failure_count);
            error!(
                code = VERIFY + 14,
                "Verification of {verified_count} file{verified_ending} successful and {failure_count} file{failure_ending} unsuccessful"
            );
        }
    }

    rc
}

/// Resolves the manifest's signature keys to on-disk paths and classifies
/// them. Missing files, directories and unreadable entries degrade the run
/// to a warning; the rest are returned for hashing.
fn existing_files(manifest: &Manifest) -> (Vec<String>, i32) {
    let mut rc = exit::OK;
    let mut present = Vec::with_capacity(manifest.file_signatures.len());

    for key in manifest.file_signatures.keys() {
        let local = std::path::PathBuf::from_slash(key);
        let display = local.display();

        match fs::metadata(&local) {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(code = VERIFY + 15, "'{display}' from the manifest does not exist");
                rc = exit::WARNING;
            }
            Err(err) => {
                warn!(code = VERIFY + 16, "'{display}' from the manifest is not readable: {err}");
                rc = exit::WARNING;
            }
            Ok(metadata) if metadata.is_dir() => {
                warn!(code = VERIFY + 17, "'{display}' from the manifest is a directory");
                rc = exit::WARNING;
            }
            Ok(_) => present.push(local.to_string_lossy().into_owned()),
        }
    }

    (present, rc)
}
