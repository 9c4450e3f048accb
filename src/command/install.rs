//! `gem install <name>...`.

use super::{DependencyDeclaration, ValueOption, command_text, scan_args};
use crate::core::ImportError;
use crate::version::Requirement;
use tracing::debug;

const INSTALL_VALUE_OPTIONS: &[ValueOption] = &[
    ValueOption::with_short('v', "version"),
    ValueOption::long("platform"),
    ValueOption::with_short('i', "install-dir"),
    ValueOption::with_short('n', "bindir"),
    ValueOption::with_short('s', "source"),
    ValueOption::with_short('p', "http-proxy"),
    ValueOption::with_short('P', "trust-policy"),
    ValueOption::with_short('g', "file"),
    ValueOption::long("build-root"),
];

/// Returns the gems a `gem install` command asks for, in argument order.
///
/// `args` are the tokens after `install`. Names containing `*` install local
/// artifacts and are dropped. A `--version` applies to every name; an inline
/// `name:version` applies to that name alone and wins over `--version`.
/// Duplicates are kept.
///
/// # Errors
///
/// [`ImportError::MalformedBuildCommand`] if a value option has no value or a
/// version requirement cannot be parsed.
pub fn parse_install_command(args: &[String]) -> Result<Vec<DependencyDeclaration>, ImportError> {
    let scanned = scan_args("install", args, INSTALL_VALUE_OPTIONS)?;
    let malformed = |e: ImportError| ImportError::MalformedBuildCommand {
        command: command_text("install", args),
        reason: e.to_string(),
    };

    let shared = scanned.value("version").map(Requirement::parse).transpose().map_err(malformed)?;

    let mut declarations = Vec::new();
    for positional in scanned.positionals {
        if positional.contains('*') {
            debug!("Ignoring wildcard install argument '{}'", positional);
            continue;
        }
        let declaration = match positional.split_once(':') {
            Some((name, version)) => DependencyDeclaration {
                name: name.to_string(),
                requirement: Some(Requirement::parse(version).map_err(malformed)?),
            },
            None => DependencyDeclaration {
                name: positional,
                requirement: shared.clone(),
            },
        };
        declarations.push(declaration);
    }

    Ok(declarations)
}
