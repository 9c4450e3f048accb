//! Resolution from the gemspec and lockfile alone, without a gem index.

use super::{DependencyResolver, ResolutionRequest, ResolvedSpecification, SpecSource};
use crate::lockfile::{LockSource, LockSourceKind, LockedSpec, Lockfile};
use crate::manifest::{GemDependency, Gemspec};
use crate::version::Requirement;
use anyhow::{Result, bail};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, trace};

/// Resolves the target gem from its gemspec and every runtime dependency from the
/// pins of the lock beside it.
///
/// No network index is consulted, so a dependency the lock does not pin is a
/// resolution failure rather than a fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalResolver;

impl LocalResolver {
    /// Creates a resolver.
    pub const fn new() -> Self {
        Self
    }
}

struct Pending {
    name: String,
    requirement: Requirement,
    required_by: String,
}

impl DependencyResolver for LocalResolver {
    fn resolve(&self, request: &ResolutionRequest) -> Result<Vec<ResolvedSpecification>> {
        let reference = &request.manifest.gemspec;
        let gemspec = Gemspec::load(&reference.manifest_path(&request.manifest_extension))?;
        if gemspec.name != reference.name {
            bail!(
                "The gemspec at {} declares '{}', not '{}'",
                gemspec.path.display(),
                gemspec.name,
                reference.name
            );
        }

        let mut queue: VecDeque<Pending> = gemspec
            .dependencies
            .iter()
            .map(|dep| Pending {
                name: dep.name.clone(),
                requirement: dep.requirement.clone(),
                required_by: gemspec.full_name(),
            })
            .collect();

        let target = ResolvedSpecification {
            name: gemspec.name.clone(),
            version: gemspec.version.clone(),
            platform: gemspec.platform.clone(),
            source: SpecSource::Path {
                path: reference.path.clone(),
            },
            dependencies: gemspec.dependencies.clone(),
        };

        let mut chosen: BTreeMap<String, ResolvedSpecification> = BTreeMap::new();
        while let Some(pending) = queue.pop_front() {
            if pending.name == target.name {
                trace!("Ignoring self dependency of {}", target.name);
                continue;
            }

            if let Some(existing) = chosen.get(&pending.name) {
                if !pending.requirement.is_satisfied_by(&existing.version) {
                    bail!(
                        "{} requires {} ({}), but {} is locked",
                        pending.required_by,
                        pending.name,
                        pending.requirement,
                        existing.full_name()
                    );
                }
                continue;
            }

            let Some(lockfile) = &request.lockfile else {
                bail!(
                    "Could not find gem '{} ({})' required by {}: no lockfile pins it",
                    pending.name,
                    pending.requirement,
                    pending.required_by
                );
            };
            let Some((source, locked)) = pin_for(lockfile, &pending.name) else {
                bail!(
                    "Could not find gem '{} ({})' required by {} in {}",
                    pending.name,
                    pending.requirement,
                    pending.required_by,
                    lockfile.path.display()
                );
            };
            if !pending.requirement.is_satisfied_by(&locked.version) {
                bail!(
                    "{} requires {} ({}), but the lock pins {}",
                    pending.required_by,
                    pending.name,
                    pending.requirement,
                    locked.version
                );
            }

            let resolved = from_locked(lockfile, source, locked);
            debug!("{} -> {} ({})", pending.name, resolved.full_name(), resolved.source);
            queue.extend(resolved.dependencies.iter().map(|dep| Pending {
                name: dep.name.clone(),
                requirement: dep.requirement.clone(),
                required_by: resolved.full_name(),
            }));
            chosen.insert(pending.name, resolved);
        }

        let mut specs = vec![target];
        specs.extend(chosen.into_values());
        Ok(specs)
    }
}

/// The pin for `name` installable on this host: highest version, native
/// builds ahead of pure ruby at the same version.
fn pin_for<'a>(lockfile: &'a Lockfile, name: &str) -> Option<(&'a LockSource, &'a LockedSpec)> {
    lockfile
        .specs()
        .filter(|(_, spec)| spec.name == name && spec.platform.matches_local())
        .max_by(|(_, a), (_, b)| {
            a.version.cmp(&b.version).then_with(|| {
                let native = |s: &LockedSpec| s.platform != super::Platform::Ruby;
                native(a).cmp(&native(b))
            })
        })
}

fn from_locked(lockfile: &Lockfile, source: &LockSource, locked: &LockedSpec) -> ResolvedSpecification {
    let source = match source.kind {
        LockSourceKind::Path => SpecSource::Path {
            path: lockfile.base_dir().join(&source.remote),
        },
        LockSourceKind::Gem | LockSourceKind::Git => SpecSource::Remote {
            uri: source.remote.clone(),
        },
    };
    ResolvedSpecification {
        name: locked.name.clone(),
        version: locked.version.clone(),
        platform: locked.platform.clone(),
        source,
        dependencies: locked
            .dependencies
            .iter()
            .map(|(name, requirement)| GemDependency {
                name: name.clone(),
                requirement: requirement.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::core::ImportError;
    use crate::resolver::ResolutionContext;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_gemspec(dir: &Path, name: &str, version: &str, deps: &[&str]) {
        let mut body = format!(
            "Gem::Specification.new do |s|\n  s.name = \"{name}\"\n  s.version = \"{version}\"\n"
        );
        for dep in deps {
            body.push_str(&format!("  s.add_dependency {dep}\n"));
        }
        body.push_str("end\n");
        fs::write(dir.join(format!("{name}.gemspec")), body).unwrap();
    }

    fn resolve(dir: &Path, name: &str) -> Result<Vec<ResolvedSpecification>, ImportError> {
        let context = ResolutionContext::build(
            name,
            &dir.join(format!("{name}.gemspec")),
            LocalResolver::new(),
            &ImportConfig::default(),
        )?;
        Ok(context.specs()?.iter().cloned().collect())
    }

    #[test]
    fn test_target_without_dependencies() {
        let temp = TempDir::new().unwrap();
        write_gemspec(temp.path(), "foo", "1.2", &[]);

        let specs = resolve(temp.path(), "foo").unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].version.to_string(), "1.2");
        assert_eq!(
            specs[0].source,
            SpecSource::Path {
                path: temp.path().to_path_buf()
            }
        );
    }

    #[test]
    fn test_transitive_pins_from_lock() {
        let temp = TempDir::new().unwrap();
        write_gemspec(temp.path(), "foo", "1.2", &["\"json\", \"~> 2.0\""]);
        fs::write(
            temp.path().join("Gemfile.lock"),
            "PATH\n  remote: .\n  specs:\n    foo (1.2)\n      json (~> 2.0)\n\nGEM\n  remote: https://rubygems.org/\n  specs:\n    json (2.6.3)\n      racc (>= 1.0)\n    racc (1.7.1)\n    unrelated (0.1)\n",
        )
        .unwrap();

        let specs = resolve(temp.path(), "foo").unwrap();
        let names: Vec<String> = specs.iter().map(|s| s.full_name()).collect();
        assert_eq!(names, vec!["foo-1.2", "json-2.6.3", "racc-1.7.1"]);
        assert!(matches!(specs[1].source, SpecSource::Remote { .. }));
    }

    #[test]
    fn test_unpinned_dependency_fails() {
        let temp = TempDir::new().unwrap();
        write_gemspec(temp.path(), "foo", "1.2", &["\"rake\""]);

        let err = resolve(temp.path(), "foo").unwrap_err();
        match err {
            ImportError::ResolutionFailed {
                message,
                ..
            } => assert!(message.contains("rake")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_pin_violating_requirement_fails() {
        let temp = TempDir::new().unwrap();
        write_gemspec(temp.path(), "foo", "1.2", &["\"rake\", \"< 13\""]);
        fs::write(
            temp.path().join("Gemfile.lock"),
            "GEM\n  remote: https://rubygems.org/\n  specs:\n    rake (13.0.6)\n",
        )
        .unwrap();

        let err = resolve(temp.path(), "foo").unwrap_err();
        assert!(matches!(err, ImportError::ResolutionFailed { .. }));
        assert!(err.to_string().contains("13.0.6"));
    }

    #[test]
    fn test_declared_name_must_match() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("foo.gemspec"),
            "Gem::Specification.new do |s|\n  s.name = 'bar'\n  s.version = '1.0'\nend\n",
        )
        .unwrap();
        let err = resolve(temp.path(), "foo").unwrap_err();
        assert!(err.to_string().contains("declares 'bar'"));
    }

    #[test]
    fn test_repeated_resolution_is_identical() {
        let temp = TempDir::new().unwrap();
        write_gemspec(temp.path(), "foo", "1.2", &["\"rake\""]);
        fs::write(
            temp.path().join("Gemfile.lock"),
            "GEM\n  remote: https://rubygems.org/\n  specs:\n    rake (12.3.3)\n    rake (13.0.6)\n",
        )
        .unwrap();

        let first = resolve(temp.path(), "foo").unwrap();
        let second = resolve(temp.path(), "foo").unwrap();
        assert_eq!(first, second);
        assert_eq!(first[1].version.to_string(), "13.0.6");
    }
}
