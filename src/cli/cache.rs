//! `blade clear-cache`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::engine::Blade;

/// Delete compiled templates.
#[derive(Args, Debug)]
pub struct ClearCacheCommand {}

impl ClearCacheCommand {
    pub fn execute(self, blade: &Blade, quiet: bool) -> Result<()> {
        let removed = blade.clear_cache()?;
        if !quiet {
            println!("{} Removed {removed} compiled template(s)", "✓".green());
        }
        Ok(())
    }
}
