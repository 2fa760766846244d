//! File-level plumbing for signet: streaming per-file digests, the parallel
//! hashing pool that computes them, the per-file signature map, and the
//! directory scanner that selects what gets signed.

pub mod hasher;
pub mod pool;
pub mod scanner;
pub mod signatures;

pub use hasher::FileHasher;
pub use pool::{file_hashes, FileHashError, HashResult};
pub use scanner::{scan_current_dir, ScanError, ScanOptions};
pub use signatures::{sign_file_hashes, verify_file_hashes, SignFilesError, VerifyFileError};
