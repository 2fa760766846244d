//! Reading and writing the manifest container.

use std::{fs, io::Write as _, path::Path};

use serde::Serialize as _;

use crate::{Manifest, ManifestError};

/// Upper bound on the size of a manifest container file.
pub const MAX_MANIFEST_SIZE: u64 = 50 * 1024 * 1024;

/// JSON indent of the persisted container.
const INDENT: &[u8] = b"   ";

/// Serializes the manifest to `path` as indented JSON.
///
/// On Unix the file is created readable by the owner only; the manifest
/// carries no secrets, but it should not be modifiable by other users.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    manifest.serialize(&mut serializer)?;
    buffer.push(b'\n');

    let mut open_options = fs::OpenOptions::new();
    open_options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt as _;
        open_options.mode(0o600);
    }

    let mut file = open_options.open(path)?;
    file.write_all(&buffer)?;
    Ok(())
}

/// Reads, parses and validates a manifest from `path`.
///
/// The file size is checked against [`MAX_MANIFEST_SIZE`] before the
/// contents are read; unknown JSON fields and out-of-range tags fail the
/// parse, and [`Manifest::validate`] covers completeness.
pub fn read_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let size = fs::metadata(path)?.len();
    if size > MAX_MANIFEST_SIZE {
        return Err(ManifestError::TooLarge { size, limit: MAX_MANIFEST_SIZE });
    }

    let contents = fs::read(path)?;
    let manifest: Manifest = serde_json::from_slice(&contents)?;
    manifest.validate()?;

    Ok(manifest)
}
