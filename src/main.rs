//! `rubygems-import` entry point.
//!
//! Parses the command line, runs the command, and turns any failure into a
//! readable message with exit status 1.

use clap::Parser;
use rubygems_import::cli;
use rubygems_import::core::user_friendly_error;

fn main() {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}
