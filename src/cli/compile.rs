//! `blade compile`.

use anyhow::Result;
use clap::Args;

use crate::engine::Blade;

/// Print a compiled template.
#[derive(Args, Debug)]
pub struct CompileCommand {
    /// Template name (`home.index`, `home/index`)
    name: String,
}

impl CompileCommand {
    pub fn execute(self, blade: &Blade) -> Result<()> {
        let artifact = blade.compile(&self.name)?;
        tracing::info!(
            "Compiled '{}' ({} compilations this run)",
            self.name,
            blade.compile_count()
        );
        print!("{artifact}");
        Ok(())
    }
}
