//! Canonical position-and-length-tagged hash over the manifest fields.
//!
//! A single padded hasher keyed by the context key absorbs every logical
//! field in the fixed canonical order. Each field is framed as
//! `(position, bytes, length)`: the position is a u32 counter incremented
//! immediately before the field and absorbed in shortest big-endian form, so
//! no field's bytes can be reinterpreted as another's; the trailing length
//! (also shortest big-endian) stops bytes from migrating between adjacent
//! fields. The data signature is excluded — it is the signature over this
//! hash.

use signet_crypto::{
    bytes::{shortest_be_u32, shortest_be_u64},
    PaddedHasher, DIGEST_SIZE,
};

use crate::Manifest;

/// Computes the canonical hash over manifest fields 1–7.
pub fn canonical_hash(manifest: &Manifest, context_key: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut hasher = PaddedHasher::new(context_key);
    let mut position: u32 = 0;

    absorb_field(&mut hasher, &mut position, &[manifest.format]);
    absorb_field(&mut hasher, &mut position, manifest.context_id.as_bytes());
    absorb_field(&mut hasher, &mut position, manifest.public_key.as_bytes());
    absorb_field(&mut hasher, &mut position, manifest.timestamp.as_bytes());
    absorb_field(&mut hasher, &mut position, manifest.hostname.as_bytes());
    absorb_field(&mut hasher, &mut position, &[manifest.signature_type.tag()]);

    // BTreeMap iteration is already the lexicographic key order the
    // canonical form requires; each pair contributes two fields.
    for (path, signature) in &manifest.file_signatures {
        absorb_field(&mut hasher, &mut position, path.as_bytes());
        absorb_field(&mut hasher, &mut position, signature.as_bytes());
    }

    hasher.sum()
}

fn absorb_field(hasher: &mut PaddedHasher, position: &mut u32, bytes: &[u8]) {
    *position += 1;
    hasher.update(&shortest_be_u32(*position));
    hasher.update(bytes);
    hasher.update(&shortest_be_u64(bytes.len() as u64));
}
