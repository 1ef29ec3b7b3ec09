//! Command-line interface for Blade.
//!
//! # Commands
//!
//! - `render <name>` - render a template with data from a file and/or `--var`
//! - `compile <name>` - print the compiled artifact of a template
//! - `clear-cache` - delete every compiled artifact
//!
//! # Global options
//!
//! - `-v/--verbose` - debug logging
//! - `-q/--quiet` - no logging, no status lines
//! - `-c/--config <path>` - configuration file (see [`crate::config`])
//! - `--views <dir>` / `--cache-dir <dir>` - override the configured folders
//!
//! ```bash
//! blade render home.index --data data.json
//! blade --views site/views render pages/about --var title="About us"
//! blade -v compile shared.layout
//! blade clear-cache
//! ```

mod cache;
mod compile;
mod render;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{BladeConfig, expand_path};
use crate::engine::Blade;

/// The `blade` command line.
#[derive(Parser, Debug)]
#[command(
    name = "blade",
    about = "Blade - compile and render Blade templates",
    version,
    long_about = "Blade compiles Blade-style templates (directives, echoes, sections and layouts) into cached artifacts and renders them with JSON, YAML or TOML data."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (same as `RUST_LOG=debug`).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a configuration file (overrides `BLADE_CONFIG` and `./blade.toml`).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Folder holding the templates.
    #[arg(long, global = true, value_name = "DIR")]
    views: Option<PathBuf>,

    /// Folder for compiled templates.
    #[arg(long = "cache-dir", global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template to stdout or a file.
    Render(render::RenderCommand),

    /// Print the compiled form of a template.
    Compile(compile::CompileCommand),

    /// Delete all compiled templates from the cache folder.
    ClearCache(cache::ClearCacheCommand),
}

impl Cli {
    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Returns any configuration, template or I/O error from the command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config()?;
        let blade = Blade::from_config(&config)?;
        tracing::debug!("Using views in {}", config.view_folder.display());

        match self.command {
            Commands::Render(cmd) => cmd.execute(&blade, self.quiet).await,
            Commands::Compile(cmd) => cmd.execute(&blade),
            Commands::ClearCache(cmd) => cmd.execute(&blade, self.quiet),
        }
    }

    /// Load the configuration and apply `--views` / `--cache-dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be found or parsed.
    pub fn build_config(&self) -> Result<BladeConfig> {
        let mut config = BladeConfig::load(self.config.as_deref())?;
        if let Some(views) = &self.views {
            config.view_folder = expand_path(views)?;
        }
        if let Some(cache_dir) = &self.cache_dir {
            config.cache_folder = expand_path(cache_dir)?;
        }
        Ok(config)
    }

    /// Log filter selected by `--verbose` / `--quiet`; `None` means no logging.
    #[must_use]
    pub fn log_filter(&self) -> Option<EnvFilter> {
        if self.quiet {
            None
        } else if self.verbose {
            Some(EnvFilter::new("debug"))
        } else {
            Some(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        }
    }
}

/// Install the stderr tracing subscriber.
pub fn init_logging(filter: Option<EnvFilter>) {
    let Some(filter) = filter else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
