//! Process exit codes.
//!
//! Lower codes never mask higher ones: a run that saw both a warning and an
//! error exits with the error code.

/// Everything succeeded.
pub const OK: i32 = 0;
/// The command line could not be interpreted.
pub const USAGE: i32 = 1;
/// The operation completed with warnings, e.g. listed files were missing.
pub const WARNING: i32 = 2;
/// A cryptographic or I/O failure, or tampering was detected.
pub const ERROR: i32 = 3;
