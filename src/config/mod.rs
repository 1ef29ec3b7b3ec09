//! Engine configuration.
//!
//! Settings normally live in a `blade.toml` next to the views:
//!
//! ```toml
//! view_folder = "views"
//! cache_folder = "~/.cache/blade"
//! file_extension = ".blade.html"
//! echo_format = "esc(%s)"
//! cache = "file"          # or "memory"
//! ```
//!
//! # Discovery
//!
//! The first of these that applies is used:
//!
//! 1. an explicit path (the CLI's `--config`)
//! 2. the `BLADE_CONFIG` environment variable
//! 3. `blade.toml` in the current directory, if it exists
//! 4. built-in defaults
//!
//! An explicit or environment path that does not exist is an error; a missing
//! `./blade.toml` is not.
//!
//! # Paths
//!
//! `view_folder` and `cache_folder` go through `shellexpand`, so `~` and
//! `$VAR` work. Relative folders are taken relative to the config file.

mod parser;

pub use parser::parse_config;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_ENV_VAR, DEFAULT_CACHE_FOLDER, DEFAULT_CONFIG_FILE, DEFAULT_ECHO_FORMAT,
    DEFAULT_FILE_EXTENSION, DEFAULT_VIEW_FOLDER,
};
use crate::core::BladeError;

/// Where compiled artifacts are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    /// `.compiled` files in the cache folder
    #[default]
    File,
    /// Process memory; nothing is written to disk
    Memory,
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BladeConfig {
    /// Folder holding the template sources
    pub view_folder: PathBuf,
    /// Folder for compiled artifacts
    pub cache_folder: PathBuf,
    /// Template file extension, including the leading dot
    pub file_extension: String,
    /// Format of `{{ }}` echoes; `%s` is replaced by the expression
    pub echo_format: String,
    /// Artifact store
    pub cache: CacheKind,
}

impl Default for BladeConfig {
    fn default() -> Self {
        Self {
            view_folder: PathBuf::from(DEFAULT_VIEW_FOLDER),
            cache_folder: PathBuf::from(DEFAULT_CACHE_FOLDER),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            echo_format: DEFAULT_ECHO_FORMAT.to_string(),
            cache: CacheKind::File,
        }
    }
}

impl BladeConfig {
    /// Load the configuration following the discovery order.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::ConfigError`] if an explicitly named file is missing
    /// or cannot be read, and [`BladeError::TomlError`] if it is malformed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, BladeError> {
        let env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        let cwd = std::env::current_dir()?;
        match Self::discover(explicit, env, &cwd)? {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Pick the configuration file to use, if any.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::ConfigError`] if `explicit` or `env` names a file
    /// that does not exist.
    pub fn discover(
        explicit: Option<&Path>,
        env: Option<PathBuf>,
        cwd: &Path,
    ) -> Result<Option<PathBuf>, BladeError> {
        let named = explicit.map(Path::to_path_buf).map(|p| (p, "--config")).or_else(|| {
            env.filter(|p| !p.as_os_str().is_empty()).map(|p| (p, CONFIG_ENV_VAR))
        });

        if let Some((path, origin)) = named {
            let path = expand_path(&path)?;
            if !path.is_file() {
                return Err(BladeError::ConfigError {
                    message: format!(
                        "Config file {} (from {origin}) does not exist",
                        path.display()
                    ),
                });
            }
            return Ok(Some(path));
        }

        let local = cwd.join(DEFAULT_CONFIG_FILE);
        Ok(local.is_file().then_some(local))
    }

    /// Load a specific file and resolve its folders.
    ///
    /// # Errors
    ///
    /// See [`parse_config`].
    pub fn load_from(path: &Path) -> Result<Self, BladeError> {
        let mut config: Self = parse_config(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.view_folder = resolve_folder(base, &config.view_folder)?;
        config.cache_folder = resolve_folder(base, &config.cache_folder)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Expand `~` and environment variables in a path.
///
/// # Errors
///
/// Returns [`BladeError::ConfigError`] if a referenced variable is not set.
pub fn expand_path(path: &Path) -> Result<PathBuf, BladeError> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw).map_err(|e| BladeError::ConfigError {
        message: format!("Cannot expand '{raw}': {e}"),
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn resolve_folder(base: &Path, folder: &Path) -> Result<PathBuf, BladeError> {
    let folder = expand_path(folder)?;
    if folder.is_absolute() {
        Ok(folder)
    } else {
        Ok(base.join(folder))
    }
}
