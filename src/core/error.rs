//! Error handling for the RubyGems importer
//!
//! This module provides the error taxonomy of the extraction pass and user-friendly
//! error reporting for the command-line front end. The error system follows two
//! principles:
//! 1. **Strongly-typed errors** so the orchestrator can decide what to do per kind
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`ImportError`] - Enumerated error kinds for every failure of the pass
//! - [`ErrorContext`] - Wrapper that adds details and a suggestion for display
//!
//! # Error Categories
//!
//! - **Manifest discovery**: [`ImportError::ManifestNotFound`], [`ImportError::ManifestAmbiguous`]
//! - **Build commands**: [`ImportError::MalformedBuildCommand`], [`ImportError::MultipleArtifactsDeclared`]
//! - **Resolution**: [`ImportError::ResolutionFailed`], [`ImportError::SpecificationNotFound`],
//!   [`ImportError::SpecificationAmbiguous`], [`ImportError::LockfileParseError`]
//! - **Validation**: [`ImportError::ProvenanceMismatch`], [`ImportError::VersionMismatch`]
//! - **Input syntax**: [`ImportError::InvalidVersion`], [`ImportError::InvalidRequirement`]
//!
//! None of these are retried. The library never terminates the process; whether an
//! error aborts the whole import is decided by the caller.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rubygems_import::core::{ImportError, user_friendly_error};
//!
//! let error = ImportError::ManifestNotFound {
//!     target: "foo.gemspec".to_string(),
//!     path: "/src/foo".to_string(),
//! };
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The error kinds produced by the extraction and validation pass.
///
/// Every variant carries the identifiers needed to act on it: package names,
/// paths, and expected versus actual values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// No manifest with the expected file name exists in the source tree.
    #[error("Did not find any files matching {target} within {path}")]
    ManifestNotFound {
        /// Expected file name, e.g. `foo.gemspec`
        target: String,
        /// Directory that was searched
        path: String,
    },

    /// More than one manifest with the expected file name exists.
    #[error("Multiple files matching {target} found within {path}: {}", .matches.join(", "))]
    ManifestAmbiguous {
        /// Expected file name
        target: String,
        /// Directory that was searched
        path: String,
        /// Every candidate that matched
        matches: Vec<String>,
    },

    /// A `gem build` or `gem install` command line could not be parsed.
    #[error("Invalid `{command}` command line: {reason}")]
    MalformedBuildCommand {
        /// The command text as observed
        command: String,
        /// What was wrong with it
        reason: String,
    },

    /// A second `gem build` was seen in the same build run.
    #[error(
        "More than one `gem build` command was run as part of the build process \
         (first '{first}', then '{second}'); only one gemspec build per package is supported"
    )]
    MultipleArtifactsDeclared {
        /// Artifact recorded by the earlier command
        first: String,
        /// Artifact named by the rejected command
        second: String,
    },

    /// The dependency resolver could not produce a specification set.
    #[error("Failed to resolve dependencies for '{package}': {message}")]
    ResolutionFailed {
        /// Package whose synthetic manifest was resolved
        package: String,
        /// Diagnostic from the underlying resolver
        message: String,
    },

    /// No resolved specification matches the requested name on this platform.
    #[error("No gemspecs found matching '{name}'")]
    SpecificationNotFound {
        /// Requested package name
        name: String,
    },

    /// Several resolved specifications match the requested name on this platform.
    #[error("Unsure which gem to use for '{name}', got {}", .candidates.join(", "))]
    SpecificationAmbiguous {
        /// Requested package name
        name: String,
        /// Full names of every matching specification
        candidates: Vec<String>,
    },

    /// The resolved specification does not come from the expected source tree.
    #[error("Specified gem '{name}' doesn't live in the source in '{source_dir}' (origin: {origin})")]
    ProvenanceMismatch {
        /// Specification name
        name: String,
        /// Source directory the specification was expected to come from
        source_dir: String,
        /// Where the specification actually originates
        origin: String,
    },

    /// The source tree produces a different version than expected.
    #[error(
        "Source in {source_dir} produces {name}-{actual}, but the expected version was {expected}"
    )]
    VersionMismatch {
        /// Specification name
        name: String,
        /// Source directory that was validated
        source_dir: String,
        /// Version the caller asked for
        expected: String,
        /// Version the specification reports
        actual: String,
    },

    /// A version string does not follow RubyGems version syntax.
    #[error("Malformed version number string '{version}': {reason}")]
    InvalidVersion {
        /// The offending text
        version: String,
        /// Why it was rejected
        reason: String,
    },

    /// A requirement string does not follow RubyGems requirement syntax.
    #[error("Illformed requirement '{requirement}': {reason}")]
    InvalidRequirement {
        /// The offending text
        requirement: String,
        /// Why it was rejected
        reason: String,
    },

    /// A lock artifact exists but could not be parsed.
    #[error("Invalid lockfile {path} at line {line}: {reason}")]
    LockfileParseError {
        /// Lockfile path
        path: String,
        /// 1-based line number
        line: usize,
        /// Parse failure description
        reason: String,
    },

    /// A filesystem operation failed.
    #[error("File system error during {operation} on {path}: {reason}")]
    FileSystemError {
        /// Operation being performed
        operation: String,
        /// Path involved
        path: String,
        /// Underlying I/O message
        reason: String,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },
}

impl ImportError {
    /// Builds a [`ImportError::FileSystemError`] from an I/O error.
    pub fn io(operation: &str, path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::FileSystemError {
            operation: operation.to_string(),
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// An [`ImportError`] with optional details and a suggestion for display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ImportError,
    /// Actionable advice for the user
    pub suggestion: Option<String>,
    /// Additional explanation
    pub details: Option<String>,
}

impl ErrorContext {
    /// Creates a context with no details or suggestion.
    #[must_use]
    pub const fn new(error: ImportError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attaches a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attaches details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for CLI display.
///
/// [`ImportError`]s found anywhere in the `anyhow` chain get a tailored
/// suggestion; I/O errors are mapped to [`ImportError::FileSystemError`];
/// anything else is reported with its full context chain as details.
///
/// # Examples
///
/// ```rust,no_run
/// use rubygems_import::core::user_friendly_error;
///
/// let error = anyhow::anyhow!("Something went wrong");
/// let context = user_friendly_error(error);
/// context.display();
/// ```
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(import_error) = error.chain().find_map(|e| e.downcast_ref::<ImportError>()) {
        let ctx = create_error_context(import_error.clone());
        // Keep the outer context messages, they name the package being processed
        if error.downcast_ref::<ImportError>().is_none() && ctx.details.is_none() {
            return ctx.with_details(format!("{error:#}"));
        }
        return ctx;
    }

    if let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<std::io::Error>()) {
        return ErrorContext::new(ImportError::FileSystemError {
            operation: "file access".to_string(),
            path: "unknown".to_string(),
            reason: io_error.to_string(),
        })
        .with_details(format!("{error:#}"))
        .with_suggestion("Check that the file or directory exists and is readable");
    }

    ErrorContext::new(ImportError::ConfigError {
        message: error.to_string(),
    })
    .with_details(format!("{error:#}"))
}

fn create_error_context(error: ImportError) -> ErrorContext {
    match &error {
        ImportError::ManifestNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Check the gem name and that the source checkout contains its .gemspec")
            .with_details("Gemspecs are searched in the source root and one directory below it"),
        ImportError::ManifestAmbiguous { .. } => ErrorContext::new(error)
            .with_suggestion("Point the importer at the subdirectory that holds the intended gemspec"),
        ImportError::MalformedBuildCommand { .. } => ErrorContext::new(error)
            .with_suggestion("Fix the build step so it can be parsed like a `gem` command line"),
        ImportError::MultipleArtifactsDeclared { .. } => ErrorContext::new(error)
            .with_suggestion("Split the software definition so each package builds a single gemspec")
            .with_details("This can't be processed automatically"),
        ImportError::ResolutionFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Commit a Gemfile.lock next to the gemspec that pins every runtime dependency"),
        ImportError::SpecificationNotFound { .. } | ImportError::SpecificationAmbiguous { .. } => {
            ErrorContext::new(error)
                .with_details("Only specifications for the host platform or the generic 'ruby' platform are considered")
        }
        ImportError::ProvenanceMismatch { .. } => ErrorContext::new(error)
            .with_suggestion("Make sure the gemspec is inside the checked out source tree"),
        ImportError::VersionMismatch { .. } => ErrorContext::new(error)
            .with_details("Some gems compute their version from environment variables at build time")
            .with_suggestion("Check out the ref that matches the expected version"),
        ImportError::LockfileParseError { .. } => ErrorContext::new(error)
            .with_suggestion("Regenerate the lockfile with `bundle lock`"),
        ImportError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax of the configuration file"),
        ImportError::InvalidVersion { .. }
        | ImportError::InvalidRequirement { .. }
        | ImportError::FileSystemError { .. } => ErrorContext::new(error),
    }
}
