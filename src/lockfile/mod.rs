//! `Gemfile.lock` parsing.
//!
//! The lock artifact pins the exact versions chosen by an earlier resolution.
//! When one sits next to the gemspec, its pins are preferred over re-resolving so
//! repeated imports of the same tree produce the same result.
//!
//! # Format
//!
//! ```text
//! PATH
//!   remote: .
//!   specs:
//!     foo (1.2)
//!       rake (>= 10)
//!
//! GEM
//!   remote: https://rubygems.org/
//!   specs:
//!     rake (13.0.6)
//!     nokogiri (1.15.0-x86_64-linux)
//!       racc (~> 1.4)
//!
//! PLATFORMS
//!   ruby
//!
//! DEPENDENCIES
//!   foo!
//!
//! BUNDLED WITH
//!    2.4.10
//! ```
//!
//! Sections other than those shown (and `GIT`) are skipped.

use crate::core::ImportError;
use crate::resolver::Platform;
use crate::version::{GemVersion, Requirement};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Which kind of source section a locked spec came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockSourceKind {
    /// `GEM`: a remote gem server
    Gem,
    /// `PATH`: a local directory, relative to the lockfile
    Path,
    /// `GIT`: a git repository
    Git,
}

/// One source section and its locked specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSource {
    /// Section kind
    pub kind: LockSourceKind,
    /// The `remote:` value
    pub remote: String,
    /// Specs locked from this source
    pub specs: Vec<LockedSpec>,
}

/// A gem pinned by the lockfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedSpec {
    /// Gem name
    pub name: String,
    /// Pinned version
    pub version: GemVersion,
    /// Platform the pin applies to
    pub platform: Platform,
    /// Dependencies as recorded under the spec
    pub dependencies: Vec<(String, Requirement)>,
}

/// A parsed lockfile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lockfile {
    /// Path the lockfile was read from
    pub path: PathBuf,
    /// Source sections in file order
    pub sources: Vec<LockSource>,
    /// `PLATFORMS` entries
    pub platforms: Vec<Platform>,
    /// Top-level `DEPENDENCIES` names (`!` suffix removed)
    pub dependencies: Vec<String>,
    /// `BUNDLED WITH` version, if recorded
    pub bundled_with: Option<String>,
}

#[derive(Clone, Copy)]
enum Section {
    Source,
    Platforms,
    Dependencies,
    BundledWith,
    Skipped,
}

impl Lockfile {
    /// Reads the lockfile at `path`, returning `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// [`ImportError::FileSystemError`] if it exists but cannot be read,
    /// [`ImportError::LockfileParseError`] if it is malformed.
    pub fn load_if_exists(path: &Path) -> Result<Option<Self>, ImportError> {
        if !path.is_file() {
            debug!("No lockfile at {}", path.display());
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|e| ImportError::io("read lockfile", path, &e))?;
        Self::parse(&content, path).map(Some)
    }

    /// Parses lockfile text; `path` is recorded and used in errors.
    ///
    /// # Errors
    ///
    /// [`ImportError::LockfileParseError`] for lines that do not fit the format.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ImportError> {
        let mut lockfile = Self {
            path: path.to_path_buf(),
            ..Self::default()
        };
        let mut section = Section::Skipped;

        let err = |line: usize, reason: String| ImportError::LockfileParseError {
            path: path.display().to_string(),
            line,
            reason,
        };

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim_end();
            if line.trim().is_empty() {
                continue;
            }
            let indent = line.len() - line.trim_start().len();
            let text = line.trim_start();

            if indent == 0 {
                section = match text {
                    "GEM" | "PATH" | "GIT" => {
                        let kind = match text {
                            "GEM" => LockSourceKind::Gem,
                            "PATH" => LockSourceKind::Path,
                            _ => LockSourceKind::Git,
                        };
                        lockfile.sources.push(LockSource {
                            kind,
                            remote: String::new(),
                            specs: Vec::new(),
                        });
                        Section::Source
                    }
                    "PLATFORMS" => Section::Platforms,
                    "DEPENDENCIES" => Section::Dependencies,
                    "BUNDLED WITH" => Section::BundledWith,
                    other => {
                        debug!("Skipping lockfile section '{}'", other);
                        Section::Skipped
                    }
                };
                continue;
            }

            match section {
                Section::Source => {
                    let Some(source) = lockfile.sources.last_mut() else {
                        return Err(err(line_no, "entry outside a source section".to_string()));
                    };
                    match indent {
                        2 => {
                            if let Some(remote) = text.strip_prefix("remote:") {
                                source.remote = remote.trim().to_string();
                            }
                        }
                        4 => {
                            let (name, version_text) =
                                split_entry(text).map_err(|reason| err(line_no, reason))?;
                            let version_text = version_text.ok_or_else(|| {
                                err(line_no, format!("locked spec '{name}' has no version"))
                            })?;
                            let (version, platform) = match version_text.split_once('-') {
                                Some((v, p)) => (v, Platform::parse(p)),
                                None => (version_text, Platform::Ruby),
                            };
                            let version = GemVersion::parse(version)
                                .map_err(|e| err(line_no, e.to_string()))?;
                            source.specs.push(LockedSpec {
                                name: name.to_string(),
                                version,
                                platform,
                                dependencies: Vec::new(),
                            });
                        }
                        6 => {
                            let Some(spec) = source.specs.last_mut() else {
                                return Err(err(line_no, "dependency before any locked spec".to_string()));
                            };
                            let (name, requirement) =
                                split_entry(text).map_err(|reason| err(line_no, reason))?;
                            let requirement = match requirement {
                                Some(text) => Requirement::parse(text).map_err(|e| err(line_no, e.to_string()))?,
                                None => Requirement::default_requirement(),
                            };
                            spec.dependencies.push((name.to_string(), requirement));
                        }
                        _ => return Err(err(line_no, format!("unexpected indentation {indent}"))),
                    }
                }
                Section::Platforms => lockfile.platforms.push(Platform::parse(text)),
                Section::Dependencies => {
                    let (name, _) = split_entry(text).map_err(|reason| err(line_no, reason))?;
                    lockfile.dependencies.push(name.trim_end_matches('!').to_string());
                }
                Section::BundledWith => lockfile.bundled_with = Some(text.to_string()),
                Section::Skipped => {}
            }
        }

        if lockfile.sources.iter().any(|s| s.remote.is_empty()) {
            warn!("Lockfile {} has a source section without a remote", path.display());
        }

        Ok(lockfile)
    }

    /// Every locked spec with the source section it came from.
    pub fn specs(&self) -> impl Iterator<Item = (&LockSource, &LockedSpec)> {
        self.sources.iter().flat_map(|source| source.specs.iter().map(move |spec| (source, spec)))
    }

    /// The directory relative `PATH` remotes are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Splits `name (detail)` into its parts.
fn split_entry(text: &str) -> Result<(&str, Option<&str>), String> {
    match text.split_once(" (") {
        Some((name, rest)) => {
            let detail = rest
                .strip_suffix(')')
                .ok_or_else(|| format!("unterminated parenthesis in '{text}'"))?;
            Ok((name, Some(detail)))
        }
        None if text.contains(' ') => Err(format!("unexpected entry '{text}'")),
        None => Ok((text, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = "PATH
  remote: .
  specs:
    foo (1.2)
      rake (>= 10)

GEM
  remote: https://rubygems.org/
  specs:
    nokogiri (1.15.0-x86_64-linux)
      racc (~> 1.4)
    racc (1.7.1)
    rake (13.0.6)

PLATFORMS
  ruby
  x86_64-linux

DEPENDENCIES
  foo!

BUNDLED WITH
   2.4.10
";

    #[test]
    fn test_parse_full_lockfile() {
        let lock = Lockfile::parse(LOCK, Path::new("/src/foo/Gemfile.lock")).unwrap();
        assert_eq!(lock.sources.len(), 2);
        assert_eq!(lock.sources[0].kind, LockSourceKind::Path);
        assert_eq!(lock.sources[0].remote, ".");
        assert_eq!(lock.sources[1].specs.len(), 3);

        let nokogiri = &lock.sources[1].specs[0];
        assert_eq!(nokogiri.version.to_string(), "1.15.0");
        assert_eq!(nokogiri.platform.to_string(), "x86_64-linux");
        assert_eq!(nokogiri.dependencies[0].0, "racc");
        assert_eq!(nokogiri.dependencies[0].1.to_string(), "~> 1.4");

        assert_eq!(lock.platforms.len(), 2);
        assert_eq!(lock.dependencies, vec!["foo"]);
        assert_eq!(lock.bundled_with.as_deref(), Some("2.4.10"));
        assert_eq!(lock.base_dir(), Path::new("/src/foo"));
        assert_eq!(lock.specs().count(), 4);
    }

    #[test]
    fn test_malformed_lines_report_position() {
        let content = "GEM\n  remote: https://rubygems.org/\n  specs:\n    rake (13.0.6\n";
        match Lockfile::parse(content, Path::new("Gemfile.lock")).unwrap_err() {
            ImportError::LockfileParseError {
                line,
                ..
            } => assert_eq!(line, 4),
            other => panic!("unexpected error: {other}"),
        }

        let content = "GEM\n  specs:\n    rake (not.a-version!)\n";
        assert!(Lockfile::parse(content, Path::new("Gemfile.lock")).is_err());
    }

    #[test]
    fn test_unknown_sections_are_skipped() {
        let content = "RUBY VERSION\n   ruby 3.2.2p53\n\nGEM\n  remote: https://rubygems.org/\n  specs:\n    rake (13.0.6)\n";
        let lock = Lockfile::parse(content, Path::new("Gemfile.lock")).unwrap();
        assert_eq!(lock.specs().count(), 1);
    }

    #[test]
    fn test_load_if_exists() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("Gemfile.lock");
        assert!(Lockfile::load_if_exists(&path).unwrap().is_none());
        std::fs::write(&path, LOCK).unwrap();
        assert!(Lockfile::load_if_exists(&path).unwrap().is_some());
    }
}
