//! Resolving a single gem in an isolated context.
//!
//! A project's own Gemfile may declare developer-only gems or several unrelated
//! gemspecs. To learn the dependencies of exactly one gem, the importer builds a
//! [`SyntheticManifest`] holding one remote source and one `gemspec` reference,
//! then hands it to a [`DependencyResolver`] together with any `Gemfile.lock`
//! found beside the gemspec.
//!
//! - [`context`] - [`ResolutionContext`], the synthetic manifest plus lock plus resolver
//! - [`local`] - [`LocalResolver`], which resolves from the gemspec and lock alone
//! - [`platform`] - gem platforms and host matching
//!
//! # Resolver Interface
//!
//! Resolvers are injected. Anything that turns a [`ResolutionRequest`] into a list
//! of [`ResolvedSpecification`]s can stand in for [`LocalResolver`]:
//!
//! ```rust,no_run
//! use rubygems_import::resolver::{DependencyResolver, ResolutionRequest, ResolvedSpecification};
//!
//! struct Fixed(Vec<ResolvedSpecification>);
//!
//! impl DependencyResolver for Fixed {
//!     fn resolve(&self, _request: &ResolutionRequest) -> anyhow::Result<Vec<ResolvedSpecification>> {
//!         Ok(self.0.clone())
//!     }
//! }
//! ```

pub mod context;
pub mod local;
pub mod platform;

pub use context::ResolutionContext;
pub use local::LocalResolver;
pub use platform::Platform;

use crate::core::ImportError;
use crate::lockfile::Lockfile;
use crate::manifest::{GemDependency, SyntheticManifest};
use crate::version::GemVersion;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Where a resolved specification comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpecSource {
    /// A directory on the local filesystem
    Path {
        /// Directory containing the gemspec
        path: PathBuf,
    },
    /// A remote gem server or git repository
    Remote {
        /// Source URI as recorded in the lock
        uri: String,
    },
}

impl fmt::Display for SpecSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path {
                path,
            } => write!(f, "source at {}", path.display()),
            Self::Remote {
                uri,
            } => write!(f, "remote {uri}"),
        }
    }
}

/// One gem chosen by a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSpecification {
    /// Gem name
    pub name: String,
    /// Resolved version
    pub version: GemVersion,
    /// Platform the specification targets
    pub platform: Platform,
    /// Origin of the specification
    pub source: SpecSource,
    /// Runtime dependencies the specification declares
    #[serde(skip)]
    pub dependencies: Vec<GemDependency>,
}

impl ResolvedSpecification {
    /// `name-version`, with `-platform` appended for native gems.
    pub fn full_name(&self) -> String {
        match self.platform {
            Platform::Ruby => format!("{}-{}", self.name, self.version),
            ref platform => format!("{}-{}-{}", self.name, self.version, platform),
        }
    }
}

/// Everything a resolver needs to resolve one gem.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    /// The single-gem manifest to resolve
    pub manifest: SyntheticManifest,
    /// Manifest file extension, used to find the referenced gemspec
    pub manifest_extension: String,
    /// Pins from an existing lock, if any
    pub lockfile: Option<Lockfile>,
}

/// A dependency resolution algorithm.
pub trait DependencyResolver {
    /// Resolves the request into the target gem and everything it depends on.
    ///
    /// # Errors
    ///
    /// Any failure to produce a consistent set; callers report it as
    /// [`ImportError::ResolutionFailed`].
    fn resolve(&self, request: &ResolutionRequest) -> anyhow::Result<Vec<ResolvedSpecification>>;
}

/// The resolved specifications of a context, in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SpecSet {
    specs: Vec<ResolvedSpecification>,
}

impl SpecSet {
    /// Sorts by name, then version, then platform.
    pub fn new(mut specs: Vec<ResolvedSpecification>) -> Self {
        specs.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.version.cmp(&b.version))
                .then_with(|| a.platform.cmp(&b.platform))
        });
        specs.dedup();
        Self {
            specs,
        }
    }

    /// Returns the single specification named `name` installable on this host.
    ///
    /// # Errors
    ///
    /// [`ImportError::SpecificationNotFound`] if none matches,
    /// [`ImportError::SpecificationAmbiguous`] if several do.
    pub fn spec_for(&self, name: &str) -> Result<&ResolvedSpecification, ImportError> {
        let candidates: Vec<&ResolvedSpecification> =
            self.specs.iter().filter(|s| s.name == name && s.platform.matches_local()).collect();
        debug!("{} candidate specification(s) for {}", candidates.len(), name);

        match candidates.as_slice() {
            [] => Err(ImportError::SpecificationNotFound {
                name: name.to_string(),
            }),
            [single] => Ok(single),
            _ => Err(ImportError::SpecificationAmbiguous {
                name: name.to_string(),
                candidates: candidates.iter().map(|s| s.full_name()).collect(),
            }),
        }
    }

    /// Iterates in sorted order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedSpecification> {
        self.specs.iter()
    }

    /// Number of specifications.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<'a> IntoIterator for &'a SpecSet {
    type Item = &'a ResolvedSpecification;
    type IntoIter = std::slice::Iter<'a, ResolvedSpecification>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}
