//! Context-key stretcher.
//!
//! Derives the padding key for the [`PaddedHasher`](crate::PaddedHasher)
//! from the raw bytes of a context identifier. The derivation is a SHAKE-256
//! read of `65 + len` bytes, so every context (including the empty one)
//! yields a key of at least 64 bytes, and the key length grows with the
//! identifier.

use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

/// Length of the key derived from an empty context.
const BASE_KEY_LEN: usize = 65;

/// Stretches the raw bytes of a context identifier into a hasher padding key.
///
/// Deterministic function of the input bytes alone; the output is uniform
/// XOF stream and reveals nothing about the context identifier.
pub fn key_from_bytes(context_bytes: &[u8]) -> Vec<u8> {
    let mut xof = Shake256::default();
    xof.update(context_bytes);

    let mut key = vec![0u8; BASE_KEY_LEN + context_bytes.len()];
    xof.finalize_xof().read(&mut key);
    key
}
