//! Assembling the list of files to sign.
//!
//! File specifications come from the command line, an optional listing file
//! and stdin. Specifications with wildcards become include patterns; plain
//! paths must resolve to files inside the current working directory. When no
//! plain paths are given, or any include pattern is present, the current
//! directory is scanned.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{self, BufRead as _, BufReader, Read},
    path::Path,
};

use eyre::{bail, ensure, eyre, Result, WrapErr as _};
use signet_files::{scan_current_dir, scanner::is_wildcard, ScanOptions};

use crate::opts::SignArgs;

/// Marker argument that switches on reading the file list from stdin.
const STDIN_MARKER: &str = "-";

/// Suffix of the manifest file name.
const MANIFEST_SUFFIX: &str = ".json";

/// Builds the manifest file name from its prefix and checks that it is a
/// plain file name in the current directory.
pub fn manifest_file_name(prefix: &str) -> Result<String> {
    let name = format!("{prefix}{MANIFEST_SUFFIX}");
    ensure!(
        !name.contains(['/', '\\']),
        "manifest file name '{name}' must not contain a path separator"
    );
    Ok(name)
}

/// Collects the files a `sign` invocation selects.
///
/// The manifest file itself is always excluded. The returned paths are
/// relative to the current directory and deduplicated.
pub fn collect_sign_files(args: &SignArgs, manifest_name: &str) -> Result<Vec<String>> {
    let mut specs = gather_file_specs(args)?;

    // Wildcard specifications act as include patterns.
    let mut include_files = args.include_files.clone();
    specs.retain(|spec| {
        if is_wildcard(spec) {
            include_files.push(spec.clone());
            false
        } else {
            true
        }
    });

    let mut exclude_files = args.exclude_files.clone();
    exclude_files.push(manifest_name.to_string());

    check_name_patterns("include file", &include_files)?;
    check_name_patterns("exclude file", &exclude_files)?;
    check_name_patterns("include directory", &args.include_dirs)?;
    check_name_patterns("exclude directory", &args.exclude_dirs)?;

    let mut selected = BTreeSet::new();
    for spec in &specs {
        let resolved = resolve_in_current_dir(spec)?;
        if resolved != manifest_name {
            selected.insert(resolved);
        }
    }

    // Scan the current directory when nothing concrete was named or any
    // include pattern widens the selection.
    if selected.is_empty() || !include_files.is_empty() || !args.include_dirs.is_empty() {
        let options = ScanOptions {
            include_files,
            exclude_files,
            include_dirs: args.include_dirs.clone(),
            exclude_dirs: args.exclude_dirs.clone(),
            recurse: args.recurse,
        };
        selected.extend(scan_current_dir(&options)?);
    }

    Ok(selected.into_iter().collect())
}

/// Gathers raw file specifications from arguments, listing file and stdin.
fn gather_file_specs(args: &SignArgs) -> Result<Vec<String>> {
    let mut specs = Vec::new();

    if let Some(from_file) = &args.from_file {
        let file = File::open(from_file)
            .wrap_err_with(|| format!("could not open file list '{from_file}'"))?;
        read_spec_lines(file, &mut specs)?;
    }

    let mut positional = args.files.as_slice();
    let mut read_stdin = args.stdin;
    if positional.first().map(String::as_str) == Some(STDIN_MARKER) {
        read_stdin = true;
        positional = &positional[1..];
    }
    specs.extend(positional.iter().cloned());

    if read_stdin {
        read_spec_lines(io::stdin().lock(), &mut specs)?;
    }

    Ok(specs)
}

fn read_spec_lines(reader: impl Read, specs: &mut Vec<String>) -> Result<()> {
    for line in BufReader::new(reader).lines() {
        let line = line.wrap_err("could not read file list")?;
        let line = line.trim();
        if !line.is_empty() {
            specs.push(line.to_string());
        }
    }
    Ok(())
}

/// Rejects include/exclude patterns that are not plain names.
fn check_name_patterns(kind: &str, patterns: &[String]) -> Result<()> {
    for pattern in patterns {
        ensure!(
            !pattern.contains(['/', '\\']),
            "pattern '{pattern}' in {kind} option must be a file name pattern"
        );
    }
    Ok(())
}

/// Resolves a plain file specification to a path relative to the current
/// directory, rejecting anything that escapes it.
fn resolve_in_current_dir(spec: &str) -> Result<String> {
    let current_dir = dunce::canonicalize(std::env::current_dir()?)?;

    let resolved = dunce::canonicalize(spec)
        .map_err(|_| eyre!("no file found for specification '{spec}'"))?;
    let metadata = std::fs::metadata(&resolved)?;
    if metadata.is_dir() {
        bail!("'{spec}' is a directory");
    }

    let relative = resolved.strip_prefix(&current_dir).map_err(|_| {
        eyre!(
            "file path '{}' is not inside the current directory '{}'",
            resolved.display(),
            current_dir.display()
        )
    })?;

    Ok(relative_to_string(relative))
}

fn relative_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
