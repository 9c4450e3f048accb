//! Source tree fixtures: gemspecs, version files, and lockfiles on disk.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary gem source checkout.
///
/// ```rust,no_run
/// use rubygems_import::test_utils::GemSourceFixture;
///
/// let fixture = GemSourceFixture::new().unwrap();
/// fixture.gemspec("foo", "1.2", &[("rake", Some(">= 10"))]).unwrap();
/// fixture.lockfile("GEM\n  remote: https://rubygems.org/\n  specs:\n    rake (13.0.6)\n").unwrap();
/// ```
#[derive(Debug)]
pub struct GemSourceFixture {
    temp_dir: TempDir,
}

impl GemSourceFixture {
    /// Creates an empty source tree.
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new().context("Failed to create temp dir")?,
        })
    }

    /// Root of the source tree.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `<name>.gemspec` at the root with literal attributes.
    pub fn gemspec(&self, name: &str, version: &str, deps: &[(&str, Option<&str>)]) -> Result<PathBuf> {
        self.gemspec_in("", name, &format!("{version:?}"), deps)
    }

    /// Writes `<dir>/<name>.gemspec` whose version is the Ruby expression `version_expr`.
    pub fn gemspec_in(
        &self,
        dir: &str,
        name: &str,
        version_expr: &str,
        deps: &[(&str, Option<&str>)],
    ) -> Result<PathBuf> {
        let mut body = format!(
            "# -*- encoding: utf-8 -*-\nGem::Specification.new do |s|\n  s.name        = {name:?}\n  s.version     = {version_expr}\n  s.summary     = \"Fixture gem\"\n  s.files       = Dir[\"lib/**/*.rb\"]\n"
        );
        for (dep, requirement) in deps {
            match requirement {
                Some(req) => body.push_str(&format!("  s.add_dependency {dep:?}, {req:?}\n")),
                None => body.push_str(&format!("  s.add_dependency {dep:?}\n")),
            }
        }
        body.push_str("  s.add_development_dependency \"rspec\", \"~> 3.0\"\nend\n");
        self.write(&Path::new(dir).join(format!("{name}.gemspec")), &body)
    }

    /// Writes `<dir>/lib/<name>/version.rb` defining `VERSION` inside `module_name`.
    ///
    /// `dir` is the gemspec's directory relative to the root; pass `""` for the root.
    pub fn version_file(&self, dir: &str, name: &str, module_name: &str, version: &str) -> Result<PathBuf> {
        self.write(
            &Path::new(dir).join("lib").join(name).join("version.rb"),
            &format!("module {module_name}\n  VERSION = {version:?}\nend\n"),
        )
    }

    /// Writes `Gemfile.lock` at the root.
    pub fn lockfile(&self, content: &str) -> Result<PathBuf> {
        self.write(Path::new("Gemfile.lock"), content)
    }

    /// Writes an arbitrary file relative to the root, creating directories.
    pub fn write(&self, relative: &Path, content: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
