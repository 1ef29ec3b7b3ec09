//! TOML configuration file parsing.

use std::path::Path;

use crate::core::BladeError;

/// Read and deserialize a TOML file.
///
/// # Errors
///
/// Returns [`BladeError::ConfigError`] if the file cannot be read, or
/// [`BladeError::TomlError`] if it is not valid TOML for `T`.
pub fn parse_config<T>(path: &Path) -> Result<T, BladeError>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path).map_err(|e| BladeError::ConfigError {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    Ok(toml::from_str(&content)?)
}
