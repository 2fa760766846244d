//! The sign flow.
//!
//! Stretches the context, hashes every selected file in parallel, signs the
//! per-file digests with a freshly generated key, self-signs the manifest
//! and persists it. The signer is destroyed on every exit path; the
//! verification id logged at the end is the value a verifier must quote
//! back.

use std::{
    collections::BTreeMap,
    ops::Deref,
    path::Path,
};

use chrono::Local;
use signet_crypto::{encoding, key_from_bytes, keyid, HashSigner, SignatureScheme};
use signet_files::{file_hashes, sign_file_hashes};
use signet_manifest::{write_manifest, Manifest, FORMAT_V1};
use tracing::{error, info, warn};

use crate::{
    common::{count_ending, report_hash_errors, report_success_list},
    exit,
    messages::{SIGN, USAGE},
    opts::SignArgs,
    paths,
};

/// Timestamp format of the manifest, with an explicit timezone offset.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

/// Destroys the wrapped signer when the scope ends, on every exit path.
struct SignerGuard {
    signer: HashSigner,
}

impl Deref for SignerGuard {
    type Target = HashSigner;

    fn deref(&self) -> &HashSigner {
        &self.signer
    }
}

impl Drop for SignerGuard {
    fn drop(&mut self) {
        self.signer.destroy();
    }
}

/// Entry point of the `sign` command.
pub fn handle(args: &SignArgs) -> i32 {
    if args.context_id.is_empty() {
        error!(code = USAGE + 2, "Context id must not be empty");
        return exit::USAGE;
    }

    let manifest_name = match paths::manifest_file_name(&args.prefix) {
        Ok(name) => name,
        Err(err) => {
            error!(code = USAGE + 3, "Error in command line: {err}");
            return exit::USAGE;
        }
    };

    let files = match paths::collect_sign_files(args, &manifest_name) {
        Ok(files) => files,
        Err(err) => {
            error!(code = SIGN, "Error getting files to sign: {err:#}");
            return exit::ERROR;
        }
    };

    if files.is_empty() {
        warn!(code = SIGN + 1, "No files found to sign");
        return exit::WARNING;
    }

    do_signing(Path::new(&manifest_name), args.algorithm.scheme(), &args.context_id, &files, args.quiet)
}

/// Signs `files` under `context_id` and writes the manifest.
pub fn do_signing(
    manifest_path: &Path,
    scheme: SignatureScheme,
    context_id: &str,
    files: &[String],
    quiet: bool,
) -> i32 {
    let hostname = match hostname::get() {
        Ok(hostname) => hostname.to_string_lossy().into_owned(),
        Err(err) => {
            error!(code = SIGN + 2, "Could not get host name: {err}");
            return exit::ERROR;
        }
    };
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

    let context_key = key_from_bytes(context_id.as_bytes());

    let hashes = file_hashes(files, &context_key);
    if report_hash_errors(&hashes) {
        return exit::ERROR;
    }

    let signer = SignerGuard { signer: HashSigner::generate(scheme) };

    let public_key = match signer.public_key() {
        Ok(public_key) => public_key,
        Err(err) => {
            error!(code = SIGN + 4, "Could not get public key bytes: {err}");
            return exit::ERROR;
        }
    };

    let mut manifest = Manifest {
        format: FORMAT_V1,
        context_id: context_id.to_string(),
        public_key: encoding::encode(&public_key),
        timestamp,
        hostname,
        signature_type: scheme,
        file_signatures: BTreeMap::new(),
        data_signature: String::new(),
    };

    let mut signed_paths = match sign_file_hashes(&signer, &hashes) {
        Ok((file_signatures, signed_paths)) => {
            manifest.file_signatures = file_signatures;
            signed_paths
        }
        Err(err) => {
            error!(code = SIGN + 5, "Could not sign file hashes: {err}");
            return exit::ERROR;
        }
    };

    if let Err(err) = manifest.sign(&signer, &context_key) {
        error!(code = SIGN + 6, "Could not sign manifest data: {err}");
        return exit::ERROR;
    }

    if let Err(err) = write_manifest(manifest_path, &manifest) {
        error!(code = SIGN + 7, "Could not write manifest file '{}': {err}", manifest_path.display());
        return exit::ERROR;
    }

    let verification_id =
        keyid::verification_id(context_id, &public_key, &manifest.timestamp, &manifest.hostname);

    info!(code = SIGN + 8, "Context id         : {context_id}");
    info!(code = SIGN + 9, "Verification id    : {verification_id}");
    info!(code = SIGN + 10, "Signature timestamp: {}", manifest.timestamp);
    info!(code = SIGN + 11, "Signature host name: {}", manifest.hostname);

    report_success_list("Signing", &mut signed_paths);

    let count = signed_paths.len();
    let ending = count_ending(count);
    info!(code = SIGN + 12, "Signature{ending} for {count} file{ending} successfully created");

    if quiet {
        // The one value the verifier needs, even when logging is muted.
        println!("{verification_id}");
    }

    exit::OK
}
