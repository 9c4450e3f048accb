//! Watching build steps for `gem build` and `gem install`.
//!
//! Build definitions sometimes run `gem install` directly, which bypasses the
//! dependency tracking of the build tool, and a component that runs `gem build`
//! is a gem whose dependencies should come from its gemspec. The executor running
//! the steps hands each one to a [`CommandObserver`]; the
//! [`BuildCommandInterceptor`] records what those two commands declare.
//!
//! One interceptor covers one build run. Steps must be observed in execution
//! order, and the state is read out once with [`BuildCommandInterceptor::finish`].
//!
//! ```rust,no_run
//! use rubygems_import::interceptor::{BuildCommandInterceptor, CommandObserver};
//!
//! # fn example() -> Result<(), rubygems_import::core::ImportError> {
//! let mut interceptor = BuildCommandInterceptor::new();
//! interceptor.observe("./configure --prefix=/usr")?;
//! interceptor.observe("gem build foo.gemspec")?;
//! interceptor.observe("gem install bundler --version 2.4.10")?;
//!
//! let build = interceptor.finish();
//! assert_eq!(build.dependencies.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::command::{self, DependencyDeclaration};
use crate::config::ImportConfig;
use crate::core::ImportError;
use crate::constants::DEFAULT_GEM_EXECUTABLES;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Receives build steps from whatever executes them.
pub trait CommandObserver {
    /// Called with each shell command, in execution order.
    ///
    /// # Errors
    ///
    /// Any error aborts the build run.
    fn observe(&mut self, command: &str) -> Result<(), ImportError>;

    /// Called with the arguments of a `gem` step of a build DSL, such as
    /// `"install foo -v 1.0"`.
    ///
    /// # Errors
    ///
    /// Any error aborts the build run.
    fn observe_gem(&mut self, args: &str) -> Result<(), ImportError>;
}

/// What one build run declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterceptedBuild {
    /// Gemspec passed to `gem build`, if the run built a gem
    pub artifact: Option<PathBuf>,
    /// Gems passed to `gem install`, in order
    pub dependencies: Vec<DependencyDeclaration>,
}

/// Records the artifact and install dependencies declared by a build run.
#[derive(Debug, Clone)]
pub struct BuildCommandInterceptor {
    gem_executables: Vec<String>,
    discovered_artifact: Option<PathBuf>,
    dependencies: Vec<DependencyDeclaration>,
}

impl Default for BuildCommandInterceptor {
    fn default() -> Self {
        Self::with_executables(DEFAULT_GEM_EXECUTABLES.iter().copied())
    }
}

impl BuildCommandInterceptor {
    /// An interceptor recognizing the plain `gem` executable.
    pub fn new() -> Self {
        Self::default()
    }

    /// An interceptor recognizing the given executable names.
    pub fn with_executables<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            gem_executables: names.into_iter().map(Into::into).collect(),
            discovered_artifact: None,
            dependencies: Vec::new(),
        }
    }

    /// An interceptor recognizing the configured executable names.
    pub fn from_config(config: &ImportConfig) -> Self {
        Self::with_executables(config.gem_executables.iter().cloned())
    }

    /// The gemspec recorded so far.
    pub fn discovered_artifact(&self) -> Option<&Path> {
        self.discovered_artifact.as_deref()
    }

    /// The install declarations recorded so far.
    pub fn dependencies(&self) -> &[DependencyDeclaration] {
        &self.dependencies
    }

    /// Ends the run and hands back everything recorded.
    pub fn finish(self) -> InterceptedBuild {
        InterceptedBuild {
            artifact: self.discovered_artifact,
            dependencies: self.dependencies,
        }
    }

    /// Whether `command` looks like `gem build` or `gem install` when split
    /// on whitespace alone.
    fn names_packaging_step(&self, command: &str) -> bool {
        let mut words = command.split_whitespace().skip_while(|word| is_env_assignment(word));
        words.next().is_some_and(|exe| self.is_gem_executable(exe))
            && words.next().is_some_and(|verb| matches!(verb, "build" | "install"))
    }

    fn is_gem_executable(&self, word: &str) -> bool {
        Path::new(word)
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.gem_executables.iter().any(|exe| exe == name))
    }

    fn route(&mut self, subcommand: &str, args: &[String]) -> Result<(), ImportError> {
        match subcommand {
            "build" => {
                let gemspec = command::parse_build_command(args)?;
                if let Some(first) = &self.discovered_artifact {
                    return Err(ImportError::MultipleArtifactsDeclared {
                        first: first.display().to_string(),
                        second: gemspec,
                    });
                }
                debug!("Build produces gem from {}", gemspec);
                self.discovered_artifact = Some(PathBuf::from(gemspec));
            }
            "install" => {
                let declarations = command::parse_install_command(args)?;
                debug!("Build installs {} gem(s) directly", declarations.len());
                self.dependencies.extend(declarations);
            }
            other => trace!("Ignoring `gem {}`", other),
        }
        Ok(())
    }
}

fn is_env_assignment(word: &str) -> bool {
    word.split_once('=').is_some_and(|(name, _)| {
        let mut chars = name.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

impl CommandObserver for BuildCommandInterceptor {
    fn observe(&mut self, command: &str) -> Result<(), ImportError> {
        let words = match command::tokenize(command) {
            Ok(words) => words,
            Err(e) if self.names_packaging_step(command) => return Err(e),
            Err(_) => {
                trace!("Passing through unsplittable `{}`", command);
                return Ok(());
            }
        };
        let mut words = words.as_slice();
        while let Some((first, rest)) = words.split_first()
            && is_env_assignment(first)
        {
            words = rest;
        }

        match words {
            [exe, subcommand, args @ ..] if self.is_gem_executable(exe) => self.route(subcommand, args),
            _ => {
                trace!("Passing through `{}`", command);
                Ok(())
            }
        }
    }

    fn observe_gem(&mut self, args: &str) -> Result<(), ImportError> {
        let words = command::tokenize(args)?;
        match words.split_first() {
            Some((subcommand, rest)) => self.route(subcommand, rest),
            None => Ok(()),
        }
    }
}

/// One step of a build script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    /// A shell command
    Command(String),
    /// A `gem` DSL call with its argument string
    Gem(String),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStep {
    command: Option<String>,
    gem: Option<String>,
}

/// An ordered list of build steps, as an executor would run them.
///
/// Scripts are either YAML lists of `command:` / `gem:` mappings (files ending
/// in `.yml` or `.yaml`) or plain text with one shell command per line, where
/// blank lines and `#` comments are skipped.
///
/// ```yaml
/// - command: ./configure
/// - gem: install bundler -v 2.4.10
/// - command: gem build foo.gemspec
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildScript {
    steps: Vec<BuildStep>,
}

impl BuildScript {
    /// A script from explicit steps.
    pub fn new(steps: Vec<BuildStep>) -> Self {
        Self {
            steps,
        }
    }

    /// Reads a script file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid script.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read build script {}", path.display()))?;
        let is_yaml = path.extension().is_some_and(|ext| ext == "yml" || ext == "yaml");
        if is_yaml {
            Self::from_yaml(&content).with_context(|| format!("Invalid build script {}", path.display()))
        } else {
            Ok(Self::from_lines(&content))
        }
    }

    /// Parses the YAML form.
    ///
    /// # Errors
    ///
    /// Fails on invalid YAML or a step with neither or both of `command` and `gem`.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let raw: Vec<RawStep> = serde_yaml::from_str(content).context("Failed to parse YAML build steps")?;
        let steps = raw
            .into_iter()
            .enumerate()
            .map(|(index, step)| match (step.command, step.gem) {
                (Some(command), None) => Ok(BuildStep::Command(command)),
                (None, Some(gem)) => Ok(BuildStep::Gem(gem)),
                _ => Err(anyhow::anyhow!(
                    "Step {} must have exactly one of 'command' or 'gem'",
                    index + 1
                )),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(steps))
    }

    /// Parses the plain text form.
    pub fn from_lines(content: &str) -> Self {
        let steps = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| BuildStep::Command(line.to_string()))
            .collect();
        Self::new(steps)
    }

    /// The steps in order.
    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    /// Feeds every step to `observer` in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// The first error returned by the observer.
    pub fn run<O: CommandObserver + ?Sized>(&self, observer: &mut O) -> Result<(), ImportError> {
        for step in &self.steps {
            match step {
                BuildStep::Command(command) => observer.observe(command)?,
                BuildStep::Gem(args) => observer.observe_gem(args)?,
            }
        }
        Ok(())
    }
}
