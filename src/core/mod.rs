//! Core types for the importer.
//!
//! Holds the error taxonomy shared by every module and the conversion used by the
//! command-line front end to present failures.
//!
//! - [`ImportError`] - Enumerated error kinds of the extraction pass
//! - [`ErrorContext`] - User-facing wrapper with details and suggestions
//! - [`user_friendly_error`] - Convert any `anyhow` error for display

pub mod error;

pub use error::{ErrorContext, ImportError, user_friendly_error};
