//! Constants shared across the importer.
//!
//! The defaults mirror what Bundler and RubyGems do, so that an importer left
//! unconfigured sees a source tree the same way `bundle install` would.

/// File extension of a gem manifest.
pub const DEFAULT_MANIFEST_EXTENSION: &str = "gemspec";

/// Directory-inclusion glob used to find manifests (Bundler's `DEFAULT_GLOB`
/// without the extension): the source root and one directory level below it.
pub const DEFAULT_MANIFEST_GLOB: &str = "{,*,*/*}";

/// Remote source declared by the synthetic manifest.
pub const DEFAULT_SOURCE: &str = "https://rubygems.org";

/// Lock artifact consulted next to the manifest.
pub const DEFAULT_LOCKFILE_NAME: &str = "Gemfile.lock";

/// Executable names whose `build`/`install` subcommands are intercepted.
pub const DEFAULT_GEM_EXECUTABLES: &[&str] = &["gem"];

/// Environment variable naming an inherited file descriptor for log output.
pub const LOG_FD_ENV: &str = "MORPH_LOG_FD";

/// Name of the directory holding user configuration, under the home directory.
pub const CONFIG_DIR_NAME: &str = ".rubygems-import";

/// Configuration file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";
