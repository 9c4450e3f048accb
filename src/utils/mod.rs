//! Filesystem helpers.
//!
//! - [`fs`] - atomic file writes for report output
//! - [`path_validation`] - canonical path containment

pub mod fs;
pub mod path_validation;

pub use fs::atomic_write;
pub use path_validation::{ensure_within_directory, safe_canonicalize};
