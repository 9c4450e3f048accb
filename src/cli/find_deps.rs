//! `find-deps`: resolve one gem from its source tree and report its dependencies.
//!
//! Steps, each of which aborts the run on failure:
//!
//! 1. locate `<gem>.gemspec` under the source directory
//! 2. run the build script, if given, through the interceptor
//! 3. resolve the gem in an isolated context (honoring `Gemfile.lock`)
//! 4. check the resolved gem comes from the source tree with the expected version
//! 5. print or write the report

use crate::config::ImportConfig;
use crate::interceptor::{BuildCommandInterceptor, BuildScript, InterceptedBuild};
use crate::report::DependencyReport;
use crate::resolver::{LocalResolver, ResolutionContext};
use crate::utils::atomic_write;
use crate::validate::validate_spec;
use crate::version::GemVersion;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Report serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

/// Arguments of `find-deps`.
#[derive(Args, Debug)]
pub struct FindDepsCommand {
    /// Directory containing the gem's source
    pub source_dir: PathBuf,

    /// Name of the gem to resolve
    pub gem_name: String,

    /// Version the source tree is expected to produce
    pub version: Option<String>,

    /// Build steps to scan for `gem build` and `gem install`
    #[arg(long, value_name = "FILE")]
    pub build_script: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl FindDepsCommand {
    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Fails if any step fails; see the module documentation.
    pub fn execute(self, config: &ImportConfig) -> Result<()> {
        let report = self.build_report(config)?;
        let rendered = match self.format {
            OutputFormat::Json => report.to_json_pretty()?,
            OutputFormat::Yaml => report.to_yaml()?,
        };

        match &self.output {
            Some(path) => {
                let mut content = rendered;
                if !content.ends_with('\n') {
                    content.push('\n');
                }
                atomic_write(path, content.as_bytes())?;
                info!("Wrote dependency report to {}", path.display());
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }

    /// Produces the report without printing it.
    ///
    /// # Errors
    ///
    /// Fails if any step fails; see the module documentation.
    pub fn build_report(&self, config: &ImportConfig) -> Result<DependencyReport> {
        let expected = self
            .version
            .as_deref()
            .map(GemVersion::parse)
            .transpose()
            .context("Invalid expected version")?;

        let manifest_path = config.locator().locate(&self.gem_name, &self.source_dir)?;
        info!("Found {}", manifest_path.display());

        let intercepted = match &self.build_script {
            Some(script) => run_build_script(script, config)?,
            None => InterceptedBuild::default(),
        };
        if let Some(artifact) = &intercepted.artifact
            && artifact.file_name() != manifest_path.file_name()
        {
            warn!(
                "Build script packages {}, but {} was located for '{}'",
                artifact.display(),
                manifest_path.display(),
                self.gem_name
            );
        }

        let context = ResolutionContext::build(&self.gem_name, &manifest_path, LocalResolver::new(), config)?;
        let specs = context.specs()?;
        let spec = specs.spec_for(&self.gem_name)?;
        validate_spec(spec, &self.source_dir, expected.as_ref())?;
        info!("Resolved {} with {} other gem(s)", spec.full_name(), specs.len() - 1);

        Ok(DependencyReport::from_build(&intercepted, &specs, &self.gem_name))
    }
}

pub(super) fn run_build_script(path: &Path, config: &ImportConfig) -> Result<InterceptedBuild> {
    let script = BuildScript::load(path)?;
    let mut interceptor = BuildCommandInterceptor::from_config(config);
    script
        .run(&mut interceptor)
        .with_context(|| format!("Build script {} was rejected", path.display()))?;
    Ok(interceptor.finish())
}
