//! Static reading of `.gemspec` files.
//!
//! Gemspecs are Ruby programs, but the overwhelming majority follow the
//! `Gem::Specification.new do |s| ... end` template closely enough that the
//! attributes the importer needs can be read without a Ruby interpreter:
//!
//! - `s.name = "foo"`
//! - `s.version = "1.2.3"` or `s.version = Foo::VERSION`, in which case the
//!   constant is looked up in the gem's `lib/` directory
//! - `s.platform = Gem::Platform::RUBY` or a platform string
//! - `s.add_dependency` / `s.add_runtime_dependency` with optional requirements
//!
//! Development dependencies are not read; they never reach a built gem.

use crate::resolver::Platform;
use crate::version::{GemVersion, Requirement};
use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

const STRING_LITERAL: &str =
    r#""(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|%q\{(?P<qb>[^}]*)\}|%q\((?P<qp>[^)]*)\)|%Q\{(?P<qqb>[^}]*)\}"#;

static BLOCK_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Gem::Specification\.new\s*(?:\([^)]*\)\s*)?(?:do|\{)\s*\|\s*(\w+)\s*\|")
        .expect("block variable pattern is valid")
});

static STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(STRING_LITERAL).expect("string literal pattern is valid"));

static VERSION_CONSTANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bVERSION\s*=\s*(?:{STRING_LITERAL})"))
        .expect("version constant pattern is valid")
});

/// A runtime dependency declared by a gemspec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GemDependency {
    /// Dependency gem name
    pub name: String,
    /// Combined requirement, `>= 0` when none was given
    pub requirement: Requirement,
}

/// The attributes of a gemspec the importer cares about.
#[derive(Debug, Clone)]
pub struct Gemspec {
    /// Gem name
    pub name: String,
    /// Gem version
    pub version: GemVersion,
    /// Target platform
    pub platform: Platform,
    /// Runtime dependencies in declaration order
    pub dependencies: Vec<GemDependency>,
    /// File the specification was read from
    pub path: PathBuf,
}

impl Gemspec {
    /// Reads and parses the gemspec at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or a name or version cannot be determined.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read gemspec {}", path.display()))?;
        Self::parse(&content, path)
    }

    /// Parses gemspec source text. `path` is used to locate `lib/` for version
    /// constants and for diagnostics.
    ///
    /// # Errors
    ///
    /// Fails if a name or version cannot be determined, or a version or
    /// requirement is malformed.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let var = BLOCK_VARIABLE
            .captures(content)
            .and_then(|c| c.get(1))
            .map_or_else(|| r"\w+".to_string(), |m| regex::escape(m.as_str()));
        trace!("Reading gemspec {} with block variable '{}'", path.display(), var);

        let attribute = |name: &str| -> Result<Regex> {
            Regex::new(&format!(r"(?m)^\s*{var}\.{name}\s*=\s*(?P<value>.+?)\s*$"))
                .context("Failed to build attribute pattern")
        };

        let name = attribute("name")?
            .captures(content)
            .and_then(|c| first_string(&c["value"]))
            .ok_or_else(|| anyhow!("No name attribute found in {}", path.display()))?;

        let version_expr = attribute("version")?
            .captures(content)
            .map(|c| c["value"].to_string())
            .ok_or_else(|| anyhow!("No version attribute found in {}", path.display()))?;
        let version_text = match first_string(&version_expr) {
            Some(literal) => literal,
            None if version_expr.contains("VERSION") => lookup_version_constant(path)?,
            None => bail!(
                "Cannot evaluate version expression '{version_expr}' in {}",
                path.display()
            ),
        };
        let version = GemVersion::parse(&version_text)
            .with_context(|| format!("Invalid version in {}", path.display()))?;

        let platform = attribute("platform")?
            .captures(content)
            .map_or(Platform::Ruby, |c| parse_platform_expr(&c["value"]));

        let dependency = Regex::new(&format!(
            r"(?m)^\s*{var}\.add_(?:runtime_)?dependency\b\s*\(?\s*(?P<args>.+?)\)?\s*$"
        ))
        .context("Failed to build dependency pattern")?;

        let mut dependencies = Vec::new();
        for caps in dependency.captures_iter(content) {
            let args: Vec<String> = STRING.captures_iter(&caps["args"]).filter_map(|c| literal_of(&c)).collect();
            let Some((dep_name, requirements)) = args.split_first() else {
                debug!("Skipping dependency line without literal name in {}", path.display());
                continue;
            };
            let requirement = Requirement::parse_all(requirements).with_context(|| {
                format!("Invalid requirement for dependency '{dep_name}' in {}", path.display())
            })?;
            dependencies.push(GemDependency {
                name: dep_name.clone(),
                requirement,
            });
        }

        debug!(
            "Read gemspec {}: {} {} ({} runtime dependencies)",
            path.display(),
            name,
            version,
            dependencies.len()
        );

        Ok(Self {
            name,
            version,
            platform,
            dependencies,
            path: path.to_path_buf(),
        })
    }

    /// `name-version`, with `-platform` appended for native gems.
    pub fn full_name(&self) -> String {
        match self.platform {
            Platform::Ruby => format!("{}-{}", self.name, self.version),
            ref platform => format!("{}-{}-{}", self.name, self.version, platform),
        }
    }
}

fn literal_of(caps: &regex::Captures<'_>) -> Option<String> {
    ["dq", "sq", "qb", "qp", "qqb"]
        .iter()
        .find_map(|group| caps.name(group))
        .map(|m| m.as_str().to_string())
}

fn first_string(expr: &str) -> Option<String> {
    STRING.captures(expr).and_then(|c| literal_of(&c))
}

fn parse_platform_expr(expr: &str) -> Platform {
    if let Some(literal) = first_string(expr) {
        return Platform::parse(&literal);
    }
    if expr.contains("Gem::Platform::CURRENT") || expr.contains("Gem::Platform.local") {
        return Platform::local();
    }
    Platform::Ruby
}

/// Finds the value of a `VERSION = "..."` constant in the gem's `lib/` tree.
fn lookup_version_constant(gemspec_path: &Path) -> Result<String> {
    let lib_dir = gemspec_path.parent().unwrap_or_else(|| Path::new(".")).join("lib");
    if !lib_dir.is_dir() {
        bail!("No VERSION constant found, {} is not a directory", lib_dir.display());
    }
    let mut found = BTreeSet::new();

    for entry in WalkDir::new(&lib_dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", lib_dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.path().extension().is_none_or(|ext| ext != "rb") {
            continue;
        }
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };
        for caps in VERSION_CONSTANT.captures_iter(&content) {
            if let Some(value) = literal_of(&caps) {
                trace!("VERSION = {} in {}", value, entry.path().display());
                found.insert(value);
            }
        }
    }

    let mut values = found.into_iter();
    match (values.next(), values.next()) {
        (Some(value), None) => Ok(value),
        (None, _) => bail!("No VERSION constant found under {}", lib_dir.display()),
        (Some(first), Some(second)) => bail!(
            "Conflicting VERSION constants under {} ({first}, {second})",
            lib_dir.display()
        ),
    }
}
