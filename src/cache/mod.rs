//! Compiled-artifact cache.
//!
//! Compiling a template is far more expensive than executing it, so compiled
//! artifacts are persisted and reused until the template source changes.
//!
//! # Architecture
//!
//! - [`ArtifactStore`] - where artifacts live: [`FileArtifactStore`] (the cache
//!   folder) or [`MemoryArtifactStore`] (process memory)
//! - [`CompilationCache`] - freshness check, compile-on-demand, persistence
//!
//! # Freshness
//!
//! Every artifact records the modification time of the source it was compiled
//! from. An artifact is reused while `source mtime <= recorded mtime` and
//! recompiled otherwise, so touching a view is enough to force a recompile.
//!
//! # Cache keys
//!
//! The key of a template is its dotted name followed by the SHA-256 of that
//! name: `shared.layout__<64 hex chars>`. On disk the key gets the `.compiled`
//! extension.

mod store;

pub use store::{ArtifactStore, FileArtifactStore, MemoryArtifactStore, StoredArtifact};

use std::sync::atomic::{AtomicUsize, Ordering};

use sha2::{Digest, Sha256};

use crate::compiler::Compiler;
use crate::core::BladeError;
use crate::source::{TemplateSource, dotted_name};

/// Cache key for a template name.
///
/// ```rust
/// use blade_cli::cache::artifact_key;
///
/// let key = artifact_key("/shared/layout");
/// assert!(key.starts_with("shared.layout__"));
/// assert_eq!(key, artifact_key("shared.layout"));
/// ```
#[must_use]
pub fn artifact_key(name: &str) -> String {
    let dotted = dotted_name(name);
    let digest = Sha256::digest(dotted.as_bytes());
    format!("{dotted}__{}", hex::encode(digest))
}

/// Compile-on-demand cache in front of an [`ArtifactStore`].
pub struct CompilationCache {
    store: Box<dyn ArtifactStore>,
    compiles: AtomicUsize,
}

impl std::fmt::Debug for CompilationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationCache")
            .field("store", &self.store.describe())
            .field("compiles", &self.compile_count())
            .finish()
    }
}

impl CompilationCache {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Box<dyn ArtifactStore>) -> Self {
        Self {
            store,
            compiles: AtomicUsize::new(0),
        }
    }

    /// Return the compiled artifact for `name`, compiling it first when no
    /// artifact exists or the source is newer than the artifact.
    ///
    /// # Errors
    ///
    /// - [`BladeError::TemplateNotFound`] when `name` has no source
    /// - any compile error
    /// - [`BladeError::CacheWriteFailure`] when the new artifact cannot be stored
    pub fn resolve(
        &self,
        source: &dyn TemplateSource,
        compiler: &Compiler,
        name: &str,
    ) -> Result<String, BladeError> {
        let source_modified = source.modified(name)?;
        let key = artifact_key(name);

        match self.store.get(&key) {
            Ok(Some(artifact)) if source_modified <= artifact.source_modified => {
                tracing::debug!("Reusing compiled '{name}'");
                return Ok(artifact.body);
            }
            Ok(Some(_)) => tracing::debug!("Compiled '{name}' is stale"),
            Ok(None) => tracing::debug!("No compiled artifact for '{name}'"),
            Err(e) => tracing::warn!("Ignoring unreadable artifact for '{name}': {e}"),
        }

        let template = source.read(name)?;
        let body = compiler.compile(&template.text)?;
        self.compiles.fetch_add(1, Ordering::Relaxed);

        self.store.put(&key, &body, template.modified)?;
        tracing::debug!("Compiled '{name}' ({} bytes)", body.len());
        Ok(body)
    }

    /// Number of compilations performed through this cache.
    #[must_use]
    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::Relaxed)
    }

    /// Remove every stored artifact and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an artifact cannot be deleted.
    pub fn clear(&self) -> Result<usize, BladeError> {
        self.store.clear()
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn ArtifactStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests;
