//! `intercept`: run a build script through the interceptor.

use super::find_deps::run_build_script;
use crate::config::ImportConfig;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments of `intercept`.
#[derive(Args, Debug)]
pub struct InterceptCommand {
    /// Build script: YAML steps (`.yml`/`.yaml`) or one shell command per line
    pub build_script: PathBuf,
}

impl InterceptCommand {
    /// Prints the artifact and install declarations as JSON.
    ///
    /// # Errors
    ///
    /// Fails if the script cannot be read or a step is rejected.
    pub fn execute(self, config: &ImportConfig) -> Result<()> {
        let intercepted = run_build_script(&self.build_script, config)?;
        let json = serde_json::to_string_pretty(&intercepted).context("Failed to serialize build declarations")?;
        println!("{json}");
        Ok(())
    }
}
