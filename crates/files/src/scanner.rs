//! Directory scanning with include/exclude name patterns.
//!
//! The scanner walks the current directory and selects regular files by
//! name. All configuration travels in a [`ScanOptions`] value that the walk
//! receives by reference; patterns are plain file or directory names,
//! optionally with `*`/`?` wildcards, never paths.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

/// Characters that mark a pattern as a wildcard.
pub const WILDCARD_CHARS: &[char] = &['*', '?'];

/// Returns whether `spec` contains wildcard characters.
pub fn is_wildcard(spec: &str) -> bool {
    spec.contains(WILDCARD_CHARS)
}

/// Scanner configuration, threaded through the walk by reference.
#[derive(Debug, Default, Clone)]
pub struct ScanOptions {
    /// File-name patterns to include; empty means every file.
    pub include_files: Vec<String>,
    /// File-name patterns to exclude.
    pub exclude_files: Vec<String>,
    /// Directory-name patterns to descend into; empty means every directory.
    pub include_dirs: Vec<String>,
    /// Directory-name patterns to skip.
    pub exclude_dirs: Vec<String>,
    /// Whether to descend into subdirectories at all.
    pub recurse: bool,
}

/// Scanner failure.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A pattern does not parse as a glob.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    /// The walk could not read a directory entry.
    #[error("could not scan directory: {0}")]
    Walk(#[from] walkdir::Error),
}

struct NameMatcher {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl NameMatcher {
    fn new(include: &[String], exclude: &[String]) -> Result<Self, ScanError> {
        let include = if include.is_empty() { None } else { Some(build_glob_set(include)?) };
        Ok(Self { include, exclude: build_glob_set(exclude)? })
    }

    fn selects(&self, name: &str) -> bool {
        if self.exclude.is_match(name) {
            return false;
        }
        match &self.include {
            Some(include) => include.is_match(name),
            None => true,
        }
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|source| ScanError::Pattern { pattern: pattern.clone(), source })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ScanError::Pattern { pattern: String::new(), source })
}

/// Walks the current directory and returns the selected file paths,
/// relative and in host form.
pub fn scan_current_dir(options: &ScanOptions) -> Result<Vec<String>, ScanError> {
    scan_dir(Path::new("."), options)
}

/// Walks `root` and returns the selected file paths relative to it.
pub fn scan_dir(root: &Path, options: &ScanOptions) -> Result<Vec<String>, ScanError> {
    let files = NameMatcher::new(&options.include_files, &options.exclude_files)?;
    let dirs = NameMatcher::new(&options.include_dirs, &options.exclude_dirs)?;

    let max_depth = if options.recurse { usize::MAX } else { 1 };
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| {
            // The predicate also sees the walk root; never filter it.
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            dirs.selects(&entry.file_name().to_string_lossy())
        });

    let mut selected = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !files.selects(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let path = entry.path().strip_prefix(root).unwrap_or_else(|_| entry.path());
        selected.push(path.to_string_lossy().into_owned());
    }

    selected.sort_unstable();
    Ok(selected)
}
