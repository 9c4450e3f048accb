//! rubygems-import - dependency extraction for RubyGems packages
//!
//! An import pipeline that turns upstream software into package definitions needs
//! to know what each RubyGem depends on. Much of that is only implicit: a gemspec
//! buried somewhere in a source checkout, pins in a `Gemfile.lock`, and `gem
//! install` lines in build steps. This crate finds and checks that information
//! for one gem at a time.
//!
//! # Pipeline
//!
//! 1. [`manifest::ManifestLocator`] finds the single `<name>.gemspec` in a source tree
//! 2. [`interceptor::BuildCommandInterceptor`] watches build steps for `gem build`
//!    and `gem install`
//! 3. [`resolver::ResolutionContext`] resolves the gem in isolation, through a
//!    synthetic one-gem manifest and any lock beside the gemspec
//! 4. [`validate::validate_spec`] confirms the result comes from the checked out
//!    tree with the expected version
//! 5. [`report::DependencyReport`] collects build and runtime dependencies
//!
//! ```rust,no_run
//! use rubygems_import::config::ImportConfig;
//! use rubygems_import::resolver::{LocalResolver, ResolutionContext};
//! use rubygems_import::validate::validate_spec;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = ImportConfig::default();
//! let source = Path::new("/src/foo");
//! let gemspec = config.locator().locate("foo", source)?;
//! let context = ResolutionContext::build("foo", &gemspec, LocalResolver::new(), &config)?;
//! let specs = context.specs()?;
//! validate_spec(specs.spec_for("foo")?, source, None)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`cli`] - the `rubygems-import` command line
//! - [`command`] - `gem build` and `gem install` argument parsers
//! - [`config`] - optional TOML settings
//! - [`core`] - error types and user-facing error formatting
//! - [`interceptor`] - build step observation
//! - [`lockfile`] - `Gemfile.lock` reader
//! - [`manifest`] - gemspec location, reading, and the synthetic manifest
//! - [`resolver`] - isolated resolution
//! - [`version`] - RubyGems versions and requirements
//!
//! Nothing here keeps global state; each build run uses its own interceptor and
//! context, so runs for different gems may proceed in parallel.

pub mod cli;
pub mod command;
pub mod config;
pub mod constants;
pub mod core;
pub mod interceptor;
pub mod lockfile;
pub mod logging;
pub mod manifest;
pub mod pattern;
pub mod report;
pub mod resolver;
pub mod utils;
pub mod validate;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
