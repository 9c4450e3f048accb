//! Checking that a resolved specification is the one the source tree builds.
//!
//! Two things can go wrong after resolution. The specification might not come
//! from the checked out tree at all (a remote gem of the same name, or a path
//! elsewhere on disk), and the tree might build a different version than the
//! one requested, which happens with gems that derive their version from the
//! environment at build time.

use crate::core::ImportError;
use crate::resolver::{ResolvedSpecification, SpecSource};
use crate::utils::path_validation::ensure_within_directory;
use crate::version::GemVersion;
use std::path::Path;
use tracing::debug;

/// Confirms `spec` originates inside `source_dir` and, if given, has the
/// `expected` version.
///
/// Containment is decided on canonical paths, so symlinks and `..` segments
/// cannot spoof it. Versions compare with RubyGems equality (`1.2 == 1.2.0`).
///
/// # Errors
///
/// - [`ImportError::ProvenanceMismatch`] if the spec is remote, its path does not
///   exist, or it lies outside `source_dir`
/// - [`ImportError::VersionMismatch`] with both versions if they differ
pub fn validate_spec(
    spec: &ResolvedSpecification,
    source_dir: &Path,
    expected: Option<&GemVersion>,
) -> Result<(), ImportError> {
    let mismatch = || ImportError::ProvenanceMismatch {
        name: spec.name.clone(),
        source_dir: source_dir.display().to_string(),
        origin: spec.source.to_string(),
    };

    let SpecSource::Path {
        path,
    } = &spec.source
    else {
        debug!("{} comes from {}, not a local path", spec.full_name(), spec.source);
        return Err(mismatch());
    };

    match ensure_within_directory(path, source_dir) {
        Ok(true) => {}
        Ok(false) => {
            debug!("{} is outside {}", path.display(), source_dir.display());
            return Err(mismatch());
        }
        Err(e) => {
            debug!("Cannot compare {} with {}: {:#}", path.display(), source_dir.display(), e);
            return Err(mismatch());
        }
    }

    if let Some(expected) = expected
        && *expected != spec.version
    {
        return Err(ImportError::VersionMismatch {
            name: spec.name.clone(),
            source_dir: source_dir.display().to_string(),
            expected: expected.to_string(),
            actual: spec.version.to_string(),
        });
    }

    debug!("Validated {} against {}", spec.full_name(), source_dir.display());
    Ok(())
}
