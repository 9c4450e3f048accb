//! Parsers for the `gem` command lines that carry packaging information.
//!
//! - [`build`] - `gem build <gemspec>`, naming the artifact a build produces
//! - [`install`] - `gem install <name>...`, declaring build-time dependencies
//!
//! Both parsers take the tokens after the subcommand and are stateless. They
//! share an option scanner that knows which RubyGems options take a value, so a
//! value is never mistaken for a positional argument. Tokens after a literal
//! `--` are passthrough build flags and are never parsed.

pub mod build;
pub mod install;

pub use build::parse_build_command;
pub use install::parse_install_command;

use crate::core::ImportError;
use crate::version::Requirement;
use serde::Serialize;
use std::fmt;

/// A dependency named on a `gem install` command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyDeclaration {
    /// Gem name
    pub name: String,
    /// Requirement from `--version` or an inline `name:version`, if any
    pub requirement: Option<Requirement>,
}

impl DependencyDeclaration {
    /// A declaration without a version requirement.
    pub fn unversioned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirement: None,
        }
    }

    /// The requirement, or `>= 0` if none was given.
    pub fn effective_requirement(&self) -> Requirement {
        self.requirement.clone().unwrap_or_else(Requirement::default_requirement)
    }
}

impl fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.requirement {
            Some(requirement) => write!(f, "{} ({requirement})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Splits a command line into words with POSIX shell quoting rules.
///
/// # Errors
///
/// [`ImportError::MalformedBuildCommand`] for unbalanced quotes.
pub fn tokenize(command: &str) -> Result<Vec<String>, ImportError> {
    shell_words::split(command).map_err(|e| ImportError::MalformedBuildCommand {
        command: command.to_string(),
        reason: e.to_string(),
    })
}

/// An option that consumes a value.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ValueOption {
    pub short: Option<char>,
    pub long: &'static str,
}

impl ValueOption {
    pub(crate) const fn long(long: &'static str) -> Self {
        Self {
            short: None,
            long,
        }
    }

    pub(crate) const fn with_short(short: char, long: &'static str) -> Self {
        Self {
            short: Some(short),
            long,
        }
    }
}

/// Options that apply to every `gem` subcommand and take a value.
pub(crate) const COMMON_VALUE_OPTIONS: &[ValueOption] = &[ValueOption::long("config-file")];

/// Positionals and value options found on a command line.
#[derive(Debug, Default)]
pub(crate) struct ScannedArgs {
    pub positionals: Vec<String>,
    /// `(long name, value)` in order of appearance
    pub values: Vec<(&'static str, String)>,
}

impl ScannedArgs {
    /// The last value given for `long`.
    pub fn value(&self, long: &str) -> Option<&str> {
        self.values.iter().rev().find(|(name, _)| *name == long).map(|(_, value)| value.as_str())
    }
}

/// Scans `args` against a table of value-taking options.
///
/// Unknown dash-prefixed tokens are boolean flags. Everything after `--` is
/// dropped.
pub(crate) fn scan_args(
    subcommand: &str,
    args: &[String],
    value_options: &[ValueOption],
) -> Result<ScannedArgs, ImportError> {
    let malformed = |reason: String| ImportError::MalformedBuildCommand {
        command: command_text(subcommand, args),
        reason,
    };
    let find_long = |name: &str| {
        value_options.iter().chain(COMMON_VALUE_OPTIONS).find(|opt| opt.long == name)
    };
    let find_short = |c: char| {
        value_options.iter().chain(COMMON_VALUE_OPTIONS).find(|opt| opt.short == Some(c))
    };

    let mut scanned = ScannedArgs::default();
    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        if token == "--" {
            break;
        }

        if let Some(long) = token.strip_prefix("--") {
            let (name, inline) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            let Some(option) = find_long(name) else {
                continue;
            };
            let value = match inline {
                Some(value) => value.to_string(),
                None => tokens
                    .next()
                    .filter(|next| *next != "--")
                    .cloned()
                    .ok_or_else(|| malformed(format!("option --{name} requires a value")))?,
            };
            scanned.values.push((option.long, value));
            continue;
        }

        if let Some(short) = token.strip_prefix('-').filter(|s| !s.is_empty()) {
            let mut chars = short.chars();
            let Some(option) = chars.next().and_then(find_short) else {
                continue;
            };
            let attached = chars.as_str();
            let value = if attached.is_empty() {
                tokens
                    .next()
                    .filter(|next| *next != "--")
                    .cloned()
                    .ok_or_else(|| malformed(format!("option -{short} requires a value")))?
            } else {
                attached.to_string()
            };
            scanned.values.push((option.long, value));
            continue;
        }

        scanned.positionals.push(token.clone());
    }

    Ok(scanned)
}

/// The command as it would have been typed, for diagnostics.
pub(crate) fn command_text(subcommand: &str, args: &[String]) -> String {
    if args.is_empty() {
        format!("gem {subcommand}")
    } else {
        format!("gem {subcommand} {}", shell_words::join(args))
    }
}
