//! `locate`: print the gemspec describing a gem.

use crate::config::ImportConfig;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments of `locate`.
#[derive(Args, Debug)]
pub struct LocateCommand {
    /// Directory containing the gem's source
    pub source_dir: PathBuf,

    /// Gem name
    pub gem_name: String,
}

impl LocateCommand {
    /// Prints the path of the single matching gemspec.
    ///
    /// # Errors
    ///
    /// Fails if there is no match or more than one.
    pub fn execute(self, config: &ImportConfig) -> Result<()> {
        let path = config.locator().locate(&self.gem_name, &self.source_dir)?;
        println!("{}", path.display());
        Ok(())
    }
}
