//! File system helpers for views and compiled artifacts.
//!
//! Artifacts are written with a write-then-rename strategy so a concurrent reader
//! never observes a half-written compiled template.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

/// Ensures a directory exists, creating it and its parents if needed.
///
/// # Errors
///
/// Fails if the directory cannot be created or if `path` exists but is not a
/// directory.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", path.display()),
        ));
    }
    Ok(())
}

/// Atomically writes bytes to a file.
///
/// The content goes to a temporary file in the target directory, is synced to
/// disk, and is then renamed over `path`. Readers see either the old file or the
/// new one, never a partial write.
///
/// # Errors
///
/// Fails if the parent directory cannot be created or any write/rename step fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    ensure_dir(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Atomically writes a string to a file. See [`atomic_write`].
///
/// # Errors
///
/// Same as [`atomic_write`].
pub fn safe_write(path: &Path, content: &str) -> io::Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Returns the last modification time of `path`.
///
/// # Errors
///
/// Fails if the file does not exist or its metadata cannot be read.
pub fn modified_time(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}
