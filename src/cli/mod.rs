//! Command-line interface for `rubygems-import`.
//!
//! # Commands
//!
//! - `find-deps` - resolve a gem's dependencies from its source tree and print a report
//! - `intercept` - run a build script through the interceptor and print what it declares
//! - `locate` - print the gemspec for a gem in a source tree
//!
//! # Global Options
//!
//! - `--verbose` - debug output
//! - `--quiet` - errors only
//! - `--config <FILE>` - settings file instead of `~/.rubygems-import/config.toml`
//!
//! # Examples
//!
//! ```bash
//! rubygems-import find-deps ./coderay coderay 1.1.0
//! rubygems-import find-deps ./chef chef --build-script build.yml --format yaml
//! rubygems-import intercept build-steps.txt
//! rubygems-import locate ./chef chef-config
//! ```

mod find_deps;
mod intercept;
mod locate;

pub use find_deps::{FindDepsCommand, OutputFormat};
pub use intercept::InterceptCommand;
pub use locate::LocateCommand;

use crate::config::ImportConfig;
use crate::logging::{Verbosity, init_logging};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level command line.
#[derive(Parser, Debug)]
#[command(
    name = "rubygems-import",
    about = "Extract dependency information from RubyGems source trees and build steps",
    version,
    author
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output. `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to a configuration file.
    ///
    /// Defaults to `~/.rubygems-import/config.toml` when that file exists.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a gem from its source tree and print its dependencies
    FindDeps(FindDepsCommand),

    /// Run a build script through the command interceptor
    Intercept(InterceptCommand),

    /// Print the gemspec describing a gem in a source tree
    Locate(LocateCommand),
}

impl Cli {
    /// The verbosity selected by the flags.
    pub const fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    /// Sets up logging, loads configuration, and runs the subcommand.
    ///
    /// # Errors
    ///
    /// Whatever the subcommand fails with, or a configuration error.
    pub fn execute(self) -> Result<()> {
        init_logging(self.verbosity());
        let config = ImportConfig::load_with_optional(self.config.as_deref())?;
        self.execute_with_config(&config)
    }

    /// Runs the subcommand with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Whatever the subcommand fails with.
    pub fn execute_with_config(self, config: &ImportConfig) -> Result<()> {
        match self.command {
            Commands::FindDeps(cmd) => cmd.execute(config),
            Commands::Intercept(cmd) => cmd.execute(config),
            Commands::Locate(cmd) => cmd.execute(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["rubygems-import", "locate", "src", "foo", "--verbose"]);
        assert_eq!(cli.verbosity(), Verbosity::Verbose);

        let cli = Cli::parse_from(["rubygems-import", "-q", "--config", "c.toml", "locate", "src", "foo"]);
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));

        assert!(Cli::try_parse_from(["rubygems-import", "-q", "-v", "locate", "src", "foo"]).is_err());
    }

    #[test]
    fn test_find_deps_arguments() {
        let cli = Cli::parse_from([
            "rubygems-import",
            "find-deps",
            "/src/foo",
            "foo",
            "1.2",
            "--build-script",
            "build.yml",
            "--format",
            "yaml",
        ]);
        let Commands::FindDeps(cmd) = cli.command else {
            panic!("expected find-deps");
        };
        assert_eq!(cmd.gem_name, "foo");
        assert_eq!(cmd.version.as_deref(), Some("1.2"));
        assert_eq!(cmd.format, OutputFormat::Yaml);
    }
}
