use std::time::{Duration, SystemTime};

use super::*;
use crate::source::MemorySource;

/// Store that never accepts an artifact.
struct ReadOnlyStore;

impl ArtifactStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<StoredArtifact>, BladeError> {
        Ok(None)
    }

    fn put(&self, key: &str, _body: &str, _modified: SystemTime) -> Result<(), BladeError> {
        Err(BladeError::CacheWriteFailure {
            path: key.to_string(),
            reason: "read-only".to_string(),
        })
    }

    fn clear(&self) -> Result<usize, BladeError> {
        Ok(0)
    }

    fn describe(&self) -> String {
        "read-only".to_string()
    }
}

fn cache() -> CompilationCache {
    CompilationCache::new(Box::new(MemoryArtifactStore::new()))
}

#[test]
fn test_fresh_artifact_is_reused() -> anyhow::Result<()> {
    let source = MemorySource::new();
    source.insert("page", "@if(a)x@endif");
    let compiler = Compiler::new();
    let cache = cache();

    let first = cache.resolve(&source, &compiler, "page")?;
    let second = cache.resolve(&source, &compiler, "/page")?;

    assert_eq!(first, "<?rs if(a): ?>x<?rs endif; ?>");
    assert_eq!(first, second);
    assert_eq!(cache.compile_count(), 1);
    Ok(())
}

#[test]
fn test_newer_source_forces_recompile() -> anyhow::Result<()> {
    let source = MemorySource::new();
    let then = SystemTime::now() - Duration::from_secs(60);
    source.insert_at("page", "old", then);
    let compiler = Compiler::new();
    let cache = cache();

    assert_eq!(cache.resolve(&source, &compiler, "page")?, "old");

    // Same timestamp: the stale text in the store still wins.
    source.insert_at("page", "edited in place", then);
    assert_eq!(cache.resolve(&source, &compiler, "page")?, "old");

    source.insert_at("page", "new", then + Duration::from_secs(1));
    assert_eq!(cache.resolve(&source, &compiler, "page")?, "new");
    assert_eq!(cache.compile_count(), 2);
    Ok(())
}

#[test]
fn test_missing_template_is_not_compiled() {
    let source = MemorySource::new();
    let cache = cache();
    let result = cache.resolve(&source, &Compiler::new(), "nope");
    assert!(matches!(result, Err(BladeError::TemplateNotFound { .. })));
    assert_eq!(cache.compile_count(), 0);
}

#[test]
fn test_compile_errors_are_not_stored() -> anyhow::Result<()> {
    let source = MemorySource::new();
    source.insert("page", "@empty");
    let cache = cache();

    let result = cache.resolve(&source, &Compiler::new(), "page");
    assert!(matches!(result, Err(BladeError::UnbalancedDirective { .. })));
    assert_eq!(cache.store().get(&artifact_key("page"))?, None);
    Ok(())
}

#[test]
fn test_failed_store_surfaces_cache_write_failure() {
    let source = MemorySource::new();
    source.insert("page", "{{ x }}");
    let cache = CompilationCache::new(Box::new(ReadOnlyStore));

    let result = cache.resolve(&source, &Compiler::new(), "page");
    assert!(matches!(
        result,
        Err(BladeError::CacheWriteFailure { path, .. }) if path == artifact_key("page")
    ));
    assert_eq!(cache.compile_count(), 1);
}

#[test]
fn test_file_store_write_failure_during_resolve() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let folder = dir.path().join("cache");
    let cache = CompilationCache::new(Box::new(FileArtifactStore::new(&folder)?));
    std::fs::remove_dir(&folder)?;
    std::fs::write(&folder, "not a folder")?;

    let source = MemorySource::new();
    source.insert("page", "text");
    let result = cache.resolve(&source, &Compiler::new(), "page");
    assert!(matches!(result, Err(BladeError::CacheWriteFailure { .. })));
    assert_eq!(cache.compile_count(), 1);
    Ok(())
}

#[test]
fn test_keys_differ_per_template() {
    assert_ne!(artifact_key("a.b"), artifact_key("a.c"));
    assert_eq!(artifact_key("a/b").len(), "a.b__".len() + 64);
}
