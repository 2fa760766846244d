//! Cryptographic core for signet.
//!
//! Everything that touches key material or hash state lives here: the keyed
//! [`PaddedHasher`] that underpins both per-file digests and the manifest's
//! canonical hash, the context-key [`stretcher`], the base32 [`encoding`]s
//! used at the text boundary, grouped [`keyid`]s, and the [`HashSigner`] /
//! [`HashVerifier`] pair that abstracts over the two supported signature
//! schemes with destroy-after-use key lifecycle.

pub mod bytes;
pub mod encoding;
pub mod keyid;
pub mod padded;
pub mod sign;
pub mod stretcher;

pub use encoding::EncodingError;
pub use padded::{PaddedHasher, DIGEST_SIZE};
pub use sign::{HashSigner, HashVerifier, KeyError, SignatureScheme, SignerError};
pub use stretcher::key_from_bytes;
