//! Package manifests: finding them, reading them, and synthesizing one.
//!
//! - [`locator`] - find the single `<name>.gemspec` in a source tree
//! - [`gemspec`] - static reader for gemspec attributes
//! - [`synthetic`] - the isolated one-package manifest used for resolution

pub mod gemspec;
pub mod locator;
pub mod synthetic;

pub use gemspec::{GemDependency, Gemspec};
pub use locator::{ManifestLocator, locate_gemspec};
pub use synthetic::{GemspecReference, SyntheticManifest};
