//! Short human-readable identifiers for key material.
//!
//! A key id is a SHAKE-128 hash of the input fenced between two fixed
//! four-byte constants, folded to 16 bytes and rendered as a grouped base32
//! string. The verification id shown at sign time is a key id over the
//! concatenation of context identifier, public key bytes, timestamp and
//! hostname; quoting it back at verify time ties the run to that exact
//! signing event.

use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake128,
};

use crate::encoding;

const BEGIN_FENCE: &[u8] = b"key\x5a";
const END_FENCE: &[u8] = b"\xa5hsh";

/// Folded SHAKE-128 hash of the supplied key bytes.
pub fn key_hash(key: &[u8]) -> [u8; 16] {
    let mut xof = Shake128::default();
    xof.update(BEGIN_FENCE);
    xof.update(key);
    xof.update(END_FENCE);

    let mut raw = [0u8; 32];
    xof.finalize_xof().read(&mut raw);

    let mut folded = [0u8; 16];
    for (i, byte) in folded.iter_mut().enumerate() {
        *byte = raw[i] ^ raw[i + 16];
    }
    folded
}

/// Grouped key id of the supplied key bytes.
pub fn key_id(key: &[u8]) -> String {
    encoding::encode_key(&key_hash(key))
}

/// Verification id binding a signing run to its context, key and metadata.
pub fn verification_id(
    context_id: &str,
    public_key: &[u8],
    timestamp: &str,
    hostname: &str,
) -> String {
    let mut data =
        Vec::with_capacity(context_id.len() + public_key.len() + timestamp.len() + hostname.len());
    data.extend_from_slice(context_id.as_bytes());
    data.extend_from_slice(public_key);
    data.extend_from_slice(timestamp.as_bytes());
    data.extend_from_slice(hostname.as_bytes());

    key_id(&data)
}
