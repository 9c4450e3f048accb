//! `gem build <gemspec>`.

use super::{ValueOption, command_text, scan_args};
use crate::core::ImportError;

const BUILD_VALUE_OPTIONS: &[ValueOption] = &[
    ValueOption::long("platform"),
    ValueOption::with_short('o', "output"),
    ValueOption::with_short('C', "directory"),
];

/// Returns the gemspec path a `gem build` command packages, unchanged.
///
/// `args` are the tokens after `build`.
///
/// # Errors
///
/// [`ImportError::MalformedBuildCommand`] unless there is exactly one positional
/// argument, or if a value option is missing its value.
pub fn parse_build_command(args: &[String]) -> Result<String, ImportError> {
    let scanned = scan_args("build", args, BUILD_VALUE_OPTIONS)?;
    match <[String; 1]>::try_from(scanned.positionals) {
        Ok([gemspec]) => Ok(gemspec),
        Err(positionals) => Err(ImportError::MalformedBuildCommand {
            command: command_text("build", args),
            reason: format!("expected exactly one gemspec argument, found {}", positionals.len()),
        }),
    }
}
