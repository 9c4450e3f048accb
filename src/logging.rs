//! Log output for the command line tool.
//!
//! The library only emits `tracing` events; this module decides where they go.
//! An import pipeline running this tool as a child process can pass an inherited
//! file descriptor number in `MORPH_LOG_FD`, and logs are appended there without
//! color. Otherwise they go to stderr so stdout stays clean for reports.

use crate::constants::LOG_FD_ENV;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Verbosity chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings and errors
    #[default]
    Normal,
    /// Debug output
    Verbose,
}

impl Verbosity {
    /// From the `--verbose` and `--quiet` flags; verbose wins if both are set.
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => Self::Verbose,
            (false, true) => Self::Quiet,
            (false, false) => Self::Normal,
        }
    }

    /// The filter directive for this verbosity.
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
        }
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides `verbosity` when set. Calling this twice is harmless; the
/// second call is ignored.
pub fn init_logging(verbosity: Verbosity) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(verbosity.directive())
    };

    let (writer, ansi) = match log_fd_writer() {
        Some(writer) => (writer, false),
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .try_init();
}

#[cfg(unix)]
fn log_fd_writer() -> Option<BoxMakeWriter> {
    let value = std::env::var(LOG_FD_ENV).ok()?;
    let fd: u32 = match value.trim().parse() {
        Ok(fd) => fd,
        Err(_) => {
            eprintln!("warning: ignoring {LOG_FD_ENV}={value:?}, not a file descriptor number");
            return None;
        }
    };
    match std::fs::OpenOptions::new().append(true).open(format!("/dev/fd/{fd}")) {
        Ok(file) => Some(BoxMakeWriter::new(std::sync::Mutex::new(file))),
        Err(e) => {
            eprintln!("warning: cannot log to file descriptor {fd}: {e}");
            None
        }
    }
}

#[cfg(not(unix))]
fn log_fd_writer() -> Option<BoxMakeWriter> {
    if std::env::var_os(LOG_FD_ENV).is_some() {
        eprintln!("warning: {LOG_FD_ENV} is only supported on unix");
    }
    None
}
