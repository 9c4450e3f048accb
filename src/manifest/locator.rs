//! Locating the manifest that describes a package inside a source tree.
//!
//! The search uses the same glob Bundler's `path` source uses to discover
//! gemspecs (`{,*,*/*}.gemspec`), so the importer sees exactly the files a real
//! `gemspec` declaration would. Anything other than a single match is an error:
//! guessing between two `foo.gemspec` files risks importing the wrong package.

use crate::constants::{DEFAULT_MANIFEST_EXTENSION, DEFAULT_MANIFEST_GLOB};
use crate::core::ImportError;
use crate::pattern::PatternResolver;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Finds `<name>.<extension>` manifests under a source directory.
#[derive(Debug, Clone)]
pub struct ManifestLocator {
    extension: String,
    glob: String,
}

impl ManifestLocator {
    /// A locator for a custom manifest extension and directory glob.
    ///
    /// `glob` is the directory-inclusion part of the pattern; the extension is
    /// appended, so `"{,*,*/*}"` with `"gemspec"` searches `{,*,*/*}.gemspec`.
    pub fn new(extension: impl Into<String>, glob: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            glob: glob.into(),
        }
    }

    /// The file name a manifest for `package_name` must have.
    pub fn target_file_name(&self, package_name: &str) -> String {
        format!("{package_name}.{}", self.extension)
    }

    /// Returns the single manifest for `package_name` under `source_path`.
    ///
    /// # Errors
    ///
    /// - [`ImportError::ManifestNotFound`] when no candidate has the expected name
    /// - [`ImportError::ManifestAmbiguous`] when several do
    /// - [`ImportError::FileSystemError`] when `source_path` cannot be searched
    pub fn locate(&self, package_name: &str, source_path: &Path) -> Result<PathBuf, ImportError> {
        let target = self.target_file_name(package_name);
        let pattern = format!("{}.{}", self.glob, self.extension);

        let candidates = PatternResolver::new().resolve(&pattern, source_path).map_err(|e| {
            ImportError::FileSystemError {
                operation: "manifest search".to_string(),
                path: source_path.display().to_string(),
                reason: format!("{e:#}"),
            }
        })?;

        let matches: Vec<PathBuf> = candidates
            .into_iter()
            .filter(|p| p.file_name().is_some_and(|name| name == target.as_str()))
            .map(|p| source_path.join(p))
            .collect();

        debug!("Found {} candidate(s) for {} in {}", matches.len(), target, source_path.display());

        match matches.as_slice() {
            [] => Err(ImportError::ManifestNotFound {
                target,
                path: source_path.display().to_string(),
            }),
            [single] => Ok(single.clone()),
            _ => Err(ImportError::ManifestAmbiguous {
                target,
                path: source_path.display().to_string(),
                matches: matches.iter().map(|p| p.display().to_string()).collect(),
            }),
        }
    }
}

impl Default for ManifestLocator {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_EXTENSION, DEFAULT_MANIFEST_GLOB)
    }
}

/// Locates `<gem_name>.gemspec` under `path` with Bundler's conventions.
///
/// # Errors
///
/// See [`ManifestLocator::locate`].
pub fn locate_gemspec(gem_name: &str, path: &Path) -> Result<PathBuf, ImportError> {
    ManifestLocator::default().locate(gem_name, path)
}
