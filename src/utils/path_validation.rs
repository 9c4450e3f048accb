//! Path containment checks on canonical paths.
//!
//! Both sides are resolved through the filesystem before comparing, so symlinks
//! and `..` segments cannot make a path appear inside a directory it is not in.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Canonicalizes an existing path.
///
/// # Errors
///
/// Returns an error if the path does not exist or cannot be resolved.
pub fn safe_canonicalize(path: &Path) -> Result<PathBuf> {
    dunce_canonicalize(path).with_context(|| format!("Failed to canonicalize path: {}", path.display()))
}

/// Whether `path` is `boundary` or lies beneath it, compared component-wise
/// after canonicalizing both.
///
/// # Errors
///
/// Returns an error if either path cannot be canonicalized.
pub fn ensure_within_directory(path: &Path, boundary: &Path) -> Result<bool> {
    let canonical_path = safe_canonicalize(path)?;
    let canonical_boundary = safe_canonicalize(boundary)?;

    Ok(canonical_path.starts_with(&canonical_boundary))
}

#[cfg(windows)]
fn dunce_canonicalize(path: &Path) -> std::io::Result<PathBuf> {
    // Strip the verbatim prefix so canonical paths compare equal to user input.
    let canonical = path.canonicalize()?;
    match canonical.to_str().and_then(|s| s.strip_prefix(r"\\?\")) {
        Some(stripped) if !stripped.starts_with("UNC") => Ok(PathBuf::from(stripped)),
        _ => Ok(canonical),
    }
}

#[cfg(not(windows))]
fn dunce_canonicalize(path: &Path) -> std::io::Result<PathBuf> {
    path.canonicalize()
}
