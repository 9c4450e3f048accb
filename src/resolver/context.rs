//! The isolated resolution context for one gem.

use super::{DependencyResolver, ResolutionRequest, SpecSet};
use crate::config::ImportConfig;
use crate::core::ImportError;
use crate::lockfile::Lockfile;
use crate::manifest::SyntheticManifest;
use std::path::Path;
use tracing::{debug, info};

/// A synthetic single-gem manifest, any lock found beside it, and the resolver
/// that turns them into specifications.
///
/// Building a context does not resolve anything; [`ResolutionContext::specs`]
/// does, and may be called repeatedly with identical results.
#[derive(Debug)]
pub struct ResolutionContext<R> {
    package_name: String,
    request: ResolutionRequest,
    resolver: R,
}

impl<R: DependencyResolver> ResolutionContext<R> {
    /// Builds the context for `package_name` whose gemspec is `manifest_path`.
    ///
    /// The configured lockfile is looked for in the gemspec's directory; when
    /// present its pins are handed to the resolver.
    ///
    /// # Errors
    ///
    /// [`ImportError::LockfileParseError`] or [`ImportError::FileSystemError`] if
    /// an existing lockfile cannot be read.
    pub fn build(
        package_name: &str,
        manifest_path: &Path,
        resolver: R,
        config: &ImportConfig,
    ) -> Result<Self, ImportError> {
        let manifest = SyntheticManifest::for_gemspec(package_name, manifest_path, &config.default_source);
        debug!("Synthetic manifest for {}:\n{}", package_name, manifest.to_gemfile());

        let lock_path = manifest.gemspec.path.join(&config.lockfile_name);
        let lockfile = Lockfile::load_if_exists(&lock_path)?;
        if lockfile.is_some() {
            info!("Using pinned versions from {}", lock_path.display());
        }

        Ok(Self {
            package_name: package_name.to_string(),
            request: ResolutionRequest {
                manifest,
                manifest_extension: config.manifest_extension.clone(),
                lockfile,
            },
            resolver,
        })
    }

    /// Resolves the context into its full set of specifications.
    ///
    /// # Errors
    ///
    /// [`ImportError::ResolutionFailed`] carrying the resolver's diagnostic.
    pub fn specs(&self) -> Result<SpecSet, ImportError> {
        let specs = self.resolver.resolve(&self.request).map_err(|e| ImportError::ResolutionFailed {
            package: self.package_name.clone(),
            message: format!("{e:#}"),
        })?;
        debug!("Resolved {} specification(s) for {}", specs.len(), self.package_name);
        Ok(SpecSet::new(specs))
    }

    /// The synthetic manifest being resolved.
    pub fn manifest(&self) -> &SyntheticManifest {
        &self.request.manifest
    }

    /// The lock consulted, if one was found.
    pub fn lockfile(&self) -> Option<&Lockfile> {
        self.request.lockfile.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{Platform, ResolvedSpecification, SpecSource};
    use crate::version::GemVersion;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct Fixed(Vec<ResolvedSpecification>);

    impl DependencyResolver for Fixed {
        fn resolve(&self, _request: &ResolutionRequest) -> anyhow::Result<Vec<ResolvedSpecification>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl DependencyResolver for Failing {
        fn resolve(&self, _request: &ResolutionRequest) -> anyhow::Result<Vec<ResolvedSpecification>> {
            anyhow::bail!("Could not find gem 'missing (>= 0)'")
        }
    }

    #[test]
    fn test_build_without_lock() {
        let temp = TempDir::new().unwrap();
        let manifest_path = temp.path().join("foo.gemspec");
        let context =
            ResolutionContext::build("foo", &manifest_path, Fixed(Vec::new()), &ImportConfig::default())
                .unwrap();
        assert!(context.lockfile().is_none());
        assert_eq!(context.manifest().gemspec.path, temp.path());
        assert_eq!(context.manifest().source, "https://rubygems.org");
    }

    #[test]
    fn test_build_picks_up_lock() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("Gemfile.lock"),
            "GEM\n  remote: https://rubygems.org/\n  specs:\n    rake (13.0.6)\n",
        )
        .unwrap();
        let context = ResolutionContext::build(
            "foo",
            &temp.path().join("foo.gemspec"),
            Fixed(Vec::new()),
            &ImportConfig::default(),
        )
        .unwrap();
        assert_eq!(context.lockfile().unwrap().specs().count(), 1);
    }

    #[test]
    fn test_malformed_lock_fails_build() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Gemfile.lock"), "GEM\n  specs:\n    rake (13\n").unwrap();
        let err = ResolutionContext::build(
            "foo",
            &temp.path().join("foo.gemspec"),
            Fixed(Vec::new()),
            &ImportConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ImportError::LockfileParseError { .. }));
    }

    #[test]
    fn test_resolver_failure_becomes_resolution_failed() {
        let temp = TempDir::new().unwrap();
        let context = ResolutionContext::build(
            "foo",
            &temp.path().join("foo.gemspec"),
            Failing,
            &ImportConfig::default(),
        )
        .unwrap();
        match context.specs().unwrap_err() {
            ImportError::ResolutionFailed {
                package,
                message,
            } => {
                assert_eq!(package, "foo");
                assert!(message.contains("missing"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_specs_are_sorted() {
        let spec = |name: &str| ResolvedSpecification {
            name: name.to_string(),
            version: GemVersion::parse("1.0").unwrap(),
            platform: Platform::Ruby,
            source: SpecSource::Path {
                path: "/src".into(),
            },
            dependencies: Vec::new(),
        };
        let temp = TempDir::new().unwrap();
        let context = ResolutionContext::build(
            "b",
            &temp.path().join("b.gemspec"),
            Fixed(vec![spec("b"), spec("a")]),
            &ImportConfig::default(),
        )
        .unwrap();
        let names: Vec<String> = context.specs().unwrap().iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
