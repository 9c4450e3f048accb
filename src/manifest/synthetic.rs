//! The synthetic single-package manifest resolved in place of a project Gemfile.
//!
//! A project's real Gemfile is a poor source of truth for one gem: it carries
//! developer-only declarations, one Gemfile may serve several gemspecs, and some
//! projects have none at all. The importer therefore invents a manifest that
//! declares one remote source and one `gemspec` reference and nothing else.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// The `gemspec name: ..., path: ...` declaration of a synthetic manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GemspecReference {
    /// Package name the gemspec must declare
    pub name: String,
    /// Directory containing the gemspec
    pub path: PathBuf,
}

impl GemspecReference {
    /// Path of the referenced `<name>.<extension>` file.
    pub fn manifest_path(&self, extension: &str) -> PathBuf {
        self.path.join(format!("{}.{extension}", self.name))
    }
}

/// A minimal manifest: one default source, one gemspec reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntheticManifest {
    /// Default remote source URL
    pub source: String,
    /// The single package this manifest resolves
    pub gemspec: GemspecReference,
}

impl SyntheticManifest {
    /// Builds the manifest for `package_name` whose gemspec lives at `manifest_path`.
    pub fn for_gemspec(package_name: &str, manifest_path: &Path, source: &str) -> Self {
        let dir = manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self {
            source: source.to_string(),
            gemspec: GemspecReference {
                name: package_name.to_string(),
                path: dir.to_path_buf(),
            },
        }
    }

    /// Renders the manifest as Gemfile text, for logs and diagnostics.
    pub fn to_gemfile(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "source {:?}", self.source);
        let _ = writeln!(
            out,
            "gemspec name: {:?}, path: {:?}",
            self.gemspec.name,
            self.gemspec.path.display().to_string()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_gemspec_uses_manifest_directory() {
        let manifest = SyntheticManifest::for_gemspec(
            "foo",
            Path::new("/src/foo/foo.gemspec"),
            "https://rubygems.org",
        );
        assert_eq!(manifest.gemspec.path, PathBuf::from("/src/foo"));
        assert_eq!(manifest.gemspec.manifest_path("gemspec"), PathBuf::from("/src/foo/foo.gemspec"));

        let bare = SyntheticManifest::for_gemspec("foo", Path::new("foo.gemspec"), "https://rubygems.org");
        assert_eq!(bare.gemspec.path, PathBuf::from("."));
    }

    #[test]
    fn test_to_gemfile() {
        let manifest = SyntheticManifest::for_gemspec(
            "foo",
            Path::new("/src/foo/foo.gemspec"),
            "https://rubygems.org",
        );
        assert_eq!(
            manifest.to_gemfile(),
            "source \"https://rubygems.org\"\ngemspec name: \"foo\", path: \"/src/foo\"\n"
        );
    }
}
