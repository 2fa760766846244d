//! Parallel per-file hashing.
//!
//! One worker thread per input path, a bounded result channel, and a
//! collector that drains the channel until every worker has reported. There
//! is no cancellation: a worker that fails reports its error as that file's
//! result and its peers run to completion.

use std::{
    collections::HashMap,
    io,
    path::Path,
    sync::mpsc,
    thread,
};

use signet_crypto::DIGEST_SIZE;

use crate::hasher::FileHasher;

/// Failure to hash one file.
#[derive(Debug, thiserror::Error)]
#[error("could not get hash of file '{path}': {source}")]
pub struct FileHashError {
    /// The path as passed to [`file_hashes`].
    pub path: String,
    #[source]
    pub source: io::Error,
}

/// The outcome of hashing one file.
#[derive(Debug)]
pub struct HashResult {
    /// The path as passed to [`file_hashes`].
    pub path: String,
    /// The file's digest, or the failure that prevented computing it.
    pub digest: Result<[u8; DIGEST_SIZE], FileHashError>,
}

/// Hashes every path concurrently and returns the results keyed by path.
///
/// Each worker owns its own [`FileHasher`] keyed by the shared context key;
/// the only shared state is the bounded result channel, whose capacity is
/// the host parallelism. The channel closes once every worker has sent its
/// single result, which is what terminates collection. Iteration order of
/// the returned map carries no meaning.
pub fn file_hashes(paths: &[String], context_key: &[u8]) -> HashMap<String, HashResult> {
    let parallelism = thread::available_parallelism().map(usize::from).unwrap_or(1);
    let (sender, receiver) = mpsc::sync_channel::<HashResult>(parallelism);

    let mut results = HashMap::with_capacity(paths.len());
    thread::scope(|scope| {
        for path in paths {
            let sender = sender.clone();
            scope.spawn(move || {
                let mut hasher = FileHasher::new(context_key);
                let digest = hasher
                    .hash_file(Path::new(path))
                    .map_err(|source| FileHashError { path: path.clone(), source });
                // The receiver outlives all workers; a send cannot fail.
                let _ = sender.send(HashResult { path: path.clone(), digest });
            });
        }
        // Only worker clones remain; the channel closes when the last
        // worker has sent.
        drop(sender);

        for result in receiver {
            results.insert(result.path.clone(), result);
        }
    });

    results
}
