//! Artifact stores.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::constants::ARTIFACT_EXTENSION;
use crate::core::BladeError;
use crate::utils::{ensure_dir, safe_write};

/// First-line marker of a persisted artifact; followed by the source mtime in
/// nanoseconds since the Unix epoch.
const HEADER_PREFIX: &str = "#blade-source-mtime ";

/// A compiled artifact together with the source time it was compiled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    /// Compiled body
    pub body: String,
    /// Modification time of the source at compile time
    pub source_modified: SystemTime,
}

/// Persistence for compiled artifacts.
pub trait ArtifactStore: Send + Sync {
    /// Fetch the artifact stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if an artifact exists but cannot be read.
    fn get(&self, key: &str) -> Result<Option<StoredArtifact>, BladeError>;

    /// Store `body` under `key`, tagged with `source_modified`.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::CacheWriteFailure`] if the artifact cannot be stored.
    fn put(&self, key: &str, body: &str, source_modified: SystemTime) -> Result<(), BladeError>;

    /// Remove all artifacts and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if an artifact cannot be removed.
    fn clear(&self) -> Result<usize, BladeError>;

    /// Short human-readable description of where artifacts go.
    fn describe(&self) -> String;
}

/// Artifacts stored as `<key>.compiled` files in a cache folder.
///
/// Files are written atomically; the first line holds the source timestamp.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    folder: PathBuf,
}

impl FileArtifactStore {
    /// Use `folder` for artifacts, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::CacheWriteFailure`] if the folder cannot be created.
    pub fn new(folder: impl Into<PathBuf>) -> Result<Self, BladeError> {
        let folder = folder.into();
        ensure_dir(&folder).map_err(|e| BladeError::CacheWriteFailure {
            path: folder.display().to_string(),
            reason: format!("unable to create cache folder: {e}"),
        })?;
        Ok(Self { folder })
    }

    /// The cache folder.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Path of the artifact stored under `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.folder.join(format!("{key}.{ARTIFACT_EXTENSION}"))
    }
}

impl ArtifactStore for FileArtifactStore {
    fn get(&self, key: &str) -> Result<Option<StoredArtifact>, BladeError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let (header, body) = content.split_once('\n').unwrap_or((content.as_str(), ""));
        let nanos = header
            .strip_prefix(HEADER_PREFIX)
            .and_then(|n| n.trim().parse::<u64>().ok())
            .ok_or_else(|| BladeError::ArtifactSyntax {
                template: key.to_string(),
                reason: format!("missing timestamp header in {}", path.display()),
            })?;

        Ok(Some(StoredArtifact {
            body: body.to_string(),
            source_modified: UNIX_EPOCH + Duration::from_nanos(nanos),
        }))
    }

    fn put(&self, key: &str, body: &str, source_modified: SystemTime) -> Result<(), BladeError> {
        let path = self.path_for(key);
        let content = format!("{HEADER_PREFIX}{}\n{body}", epoch_nanos(source_modified));
        safe_write(&path, &content).map_err(|e| BladeError::CacheWriteFailure {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn clear(&self) -> Result<usize, BladeError> {
        let folder = glob::Pattern::escape(&self.folder.to_string_lossy());
        let pattern = format!("{folder}/*.{ARTIFACT_EXTENSION}");
        let entries = glob::glob(&pattern).map_err(|e| BladeError::ConfigError {
            message: format!("invalid cache folder pattern '{pattern}': {e}"),
        })?;

        let mut removed = 0;
        for entry in entries.filter_map(Result::ok) {
            fs::remove_file(&entry)?;
            tracing::debug!("Removed {}", entry.display());
            removed += 1;
        }
        Ok(removed)
    }

    fn describe(&self) -> String {
        self.folder.display().to_string()
    }
}

/// Artifacts kept in memory for the life of the process.
///
/// Tracks hits and misses so callers can see how effective the cache is.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: Mutex<HashMap<String, StoredArtifact>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl MemoryArtifactStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `(hits, misses)` since creation or the last clear.
    #[must_use]
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Hit rate as a percentage.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses) = self.stats();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, StoredArtifact>>, BladeError> {
        self.artifacts.lock().map_err(|_| BladeError::CacheWriteFailure {
            path: "memory".to_string(),
            reason: "artifact map lock poisoned".to_string(),
        })
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn get(&self, key: &str) -> Result<Option<StoredArtifact>, BladeError> {
        let artifact = self.lock()?.get(key).cloned();
        let counter = if artifact.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(artifact)
    }

    fn put(&self, key: &str, body: &str, source_modified: SystemTime) -> Result<(), BladeError> {
        self.lock()?.insert(
            key.to_string(),
            StoredArtifact {
                body: body.to_string(),
                source_modified,
            },
        );
        Ok(())
    }

    fn clear(&self) -> Result<usize, BladeError> {
        let removed = {
            let mut artifacts = self.lock()?;
            let count = artifacts.len();
            artifacts.clear();
            count
        };
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        Ok(removed)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

fn epoch_nanos(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
