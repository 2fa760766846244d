//! SHA3-512 wrapper that frames all caller data between two fixed padding
//! halves.
//!
//! The padding is split in the middle: the first half is absorbed before any
//! caller data (on construction and on every [`reset`](PaddedHasher::reset)),
//! the second half is absorbed when the digest is taken. Keying the padding
//! with the stretched context key binds the context into the initial hash
//! state and rules out length-extension style equivalences between a padded
//! stream and a shorter one.

use sha3::{
    digest::{core_api::BlockSizeUser, Digest},
    Sha3_512,
};

/// Size of the digest produced by the padded hasher, in bytes.
pub const DIGEST_SIZE: usize = 64;

/// A SHA3-512 hasher with fixed pre- and post-padding.
///
/// The byte counter reflects only bytes written by the caller; padding bytes
/// are not counted.
#[derive(Clone)]
pub struct PaddedHasher {
    hasher: Sha3_512,
    padding: Vec<u8>,
    split: usize,
    count: u64,
}

impl PaddedHasher {
    /// Creates a new padded hasher.
    ///
    /// The padding must be at least two bytes; it is split at its midpoint,
    /// with the first half one byte shorter for odd lengths.
    pub fn new(padding: &[u8]) -> Self {
        debug_assert!(padding.len() >= 2);

        let mut hasher = Self {
            hasher: Sha3_512::new(),
            padding: padding.to_vec(),
            split: padding.len() >> 1,
            count: 0,
        };
        hasher.reset();
        hasher
    }

    /// Absorbs caller data and advances the byte counter.
    pub fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.hasher, data);
        self.count += data.len() as u64;
    }

    /// Returns the digest over the pre-padding, the caller data written so
    /// far, and the post-padding.
    ///
    /// Finalization happens on a clone of the inner state, so `sum` is
    /// non-destructive: it can be called repeatedly and the hasher stays
    /// usable for further writes or a [`reset`](Self::reset).
    pub fn sum(&self) -> [u8; DIGEST_SIZE] {
        self.hasher
            .clone()
            .chain_update(&self.padding[self.split..])
            .finalize()
            .into()
    }

    /// Resets the hasher to its post-construction state: empty except for
    /// the absorbed pre-padding, with a zeroed byte counter.
    pub fn reset(&mut self) {
        self.hasher = Sha3_512::new();
        Digest::update(&mut self.hasher, &self.padding[..self.split]);
        self.count = 0;
    }

    /// Size of the produced digest in bytes.
    pub fn size(&self) -> usize {
        <Sha3_512 as Digest>::output_size()
    }

    /// Block size of the underlying hash in bytes.
    pub fn block_size(&self) -> usize {
        <Sha3_512 as BlockSizeUser>::block_size()
    }

    /// Number of caller bytes written since construction or the last reset.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl std::io::Write for PaddedHasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for PaddedHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaddedHasher").field("count", &self.count).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha3::Sha3_512;

    const PADDING: &[u8] = &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06];

    #[test]
    fn matches_plain_sha3_over_framed_input() {
        let mut hasher = PaddedHasher::new(PADDING);
        hasher.update(b"some data");

        let expected: [u8; DIGEST_SIZE] = Sha3_512::new()
            .chain_update([0x01, 0x02, 0x03])
            .chain_update(b"some data")
            .chain_update([0x04, 0x05, 0x06])
            .finalize()
            .into();

        assert_eq!(hasher.sum(), expected);
    }

    #[test]
    fn sum_is_repeatable() {
        let mut hasher = PaddedHasher::new(PADDING);
        hasher.update(b"abc");

        let first = hasher.sum();
        let second = hasher.sum();
        assert_eq!(first, second);

        // Still usable afterwards and reset restores the initial state.
        hasher.reset();
        hasher.update(b"abc");
        assert_eq!(hasher.sum(), first);
    }

    #[test]
    fn counter_tracks_caller_bytes_only() {
        let mut hasher = PaddedHasher::new(PADDING);
        assert_eq!(hasher.count(), 0);

        hasher.update(b"12345");
        hasher.sum();
        assert_eq!(hasher.count(), 5);

        hasher.reset();
        assert_eq!(hasher.count(), 0);
    }

    #[test]
    fn different_padding_different_digest() {
        let mut a = PaddedHasher::new(PADDING);
        let mut b = PaddedHasher::new(&[0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f]);
        a.update(b"same input");
        b.update(b"same input");
        assert_ne!(a.sum(), b.sum());
    }

    #[test]
    fn sizes() {
        let hasher = PaddedHasher::new(PADDING);
        assert_eq!(hasher.size(), DIGEST_SIZE);
        assert_eq!(hasher.block_size(), 72);
    }

    #[test]
    fn write_trait_streams_into_the_hasher() {
        use std::io::Write;

        let mut direct = PaddedHasher::new(PADDING);
        direct.update(b"streamed bytes");

        let mut streamed = PaddedHasher::new(PADDING);
        streamed.write_all(b"streamed bytes").unwrap();

        assert_eq!(direct.sum(), streamed.sum());
        assert_eq!(streamed.count(), 14);
    }
}
