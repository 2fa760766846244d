//! Streaming digest of a single file.

use std::{fs::File, io, path::Path};

use signet_crypto::{bytes::shortest_be_u64, PaddedHasher, DIGEST_SIZE};

/// Computes domain-separated digests of file contents.
///
/// The hasher is keyed by the stretched context key; after the file bytes it
/// absorbs the byte count as its shortest big-endian form, binding the total
/// length into the digest. An empty file thus hashes a single `0x00` trailer
/// and differs from a one-byte file of `0x00`.
pub struct FileHasher {
    hasher: PaddedHasher,
}

impl FileHasher {
    /// Creates a file hasher keyed by the supplied context key.
    pub fn new(context_key: &[u8]) -> Self {
        Self { hasher: PaddedHasher::new(context_key) }
    }

    /// Streams the file at `path` into the hasher and returns its digest.
    pub fn hash_file(&mut self, path: &Path) -> io::Result<[u8; DIGEST_SIZE]> {
        self.hasher.reset();

        let mut file = File::open(path)?;
        io::copy(&mut file, &mut self.hasher)?;

        let trailer = shortest_be_u64(self.hasher.count());
        self.hasher.update(&trailer);

        Ok(self.hasher.sum())
    }
}
