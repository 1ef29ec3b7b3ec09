//! The Blade engine.
//!
//! [`Blade`] ties the pieces together: a [`TemplateSource`] for view files, a
//! [`Compiler`] holding the directive registry and extensions, and a
//! [`CompilationCache`] for compiled artifacts. Every call to [`Blade::render`]
//! runs in a fresh [`Session`], so renders never share section state.
//!
//! # Examples
//!
//! ```rust,no_run
//! use blade_cli::engine::Blade;
//! use serde_json::json;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut blade = Blade::new("views", "cache")?;
//! blade.register_directive("upper", |args| format!("<?rs echo {args} | upper ?>"))?;
//!
//! let html = blade.render("home.index", &json!({"title": "Welcome"}))?;
//! println!("{html}");
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cache::{CompilationCache, FileArtifactStore, MemoryArtifactStore};
use crate::compiler::{Compiler, set_extension};
use crate::config::{BladeConfig, CacheKind};
use crate::core::BladeError;
use crate::runtime::value::type_name;
use crate::runtime::{Program, Session, TemplateLoader};
use crate::source::{FileSource, TemplateSource, dotted_name};

/// Template engine: compile on demand, cache by freshness, render.
pub struct Blade {
    compiler: Compiler,
    source: Box<dyn TemplateSource>,
    cache: CompilationCache,
    view_folder: PathBuf,
    file_extension: String,
}

impl std::fmt::Debug for Blade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blade")
            .field("view_folder", &self.view_folder)
            .field("file_extension", &self.file_extension)
            .field("compiler", &self.compiler)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Blade {
    /// Engine reading views from `view_folder` and caching artifacts as files in
    /// `cache_folder`, with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::CacheWriteFailure`] if the cache folder cannot be
    /// created.
    pub fn new(
        view_folder: impl Into<PathBuf>,
        cache_folder: impl Into<PathBuf>,
    ) -> Result<Self, BladeError> {
        let config = BladeConfig {
            view_folder: view_folder.into(),
            cache_folder: cache_folder.into(),
            ..BladeConfig::default()
        };
        Self::from_config(&config)
    }

    /// Engine built from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::CacheWriteFailure`] if a file cache folder cannot be
    /// created.
    pub fn from_config(config: &BladeConfig) -> Result<Self, BladeError> {
        let cache = match config.cache {
            CacheKind::File => {
                CompilationCache::new(Box::new(FileArtifactStore::new(&config.cache_folder)?))
            }
            CacheKind::Memory => CompilationCache::new(Box::new(MemoryArtifactStore::new())),
        };
        let source = FileSource::new(&config.view_folder, &config.file_extension);

        let mut blade = Self::with_parts(Box::new(source), cache);
        blade.view_folder.clone_from(&config.view_folder);
        blade.file_extension.clone_from(&config.file_extension);
        blade.compiler.set_echo_format(&config.echo_format);
        tracing::debug!("Engine ready: {blade:?}");
        Ok(blade)
    }

    /// Engine over an arbitrary source and cache.
    ///
    /// [`Blade::set_view_folder`] and [`Blade::set_file_extension`] switch the
    /// engine back to a [`FileSource`].
    #[must_use]
    pub fn with_parts(source: Box<dyn TemplateSource>, cache: CompilationCache) -> Self {
        let mut compiler = Compiler::new();
        let set = set_extension();
        compiler.add_extension(move |text, compiler| set(text, compiler));
        let defaults = BladeConfig::default();
        Self {
            compiler,
            source,
            cache,
            view_folder: defaults.view_folder,
            file_extension: defaults.file_extension,
        }
    }

    /// Register a custom directive. See [`Compiler::register_directive`].
    ///
    /// Cached artifacts are keyed by template name only, so templates compiled
    /// before this call keep their old output until their source changes or
    /// [`Blade::clear_cache`] runs.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::InvalidDirectiveName`] if `name` is not `\w+`.
    pub fn register_directive<F>(&mut self, name: &str, handler: F) -> Result<(), BladeError>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.compiler.register_directive(name, handler)
    }

    /// Add a whole-text compile extension. See [`Compiler::add_extension`].
    ///
    /// Like [`Blade::register_directive`], this only affects templates compiled
    /// after the call.
    pub fn add_extension<F>(&mut self, extension: F)
    where
        F: Fn(&str, &Compiler) -> String + Send + Sync + 'static,
    {
        self.compiler.add_extension(extension);
    }

    /// Set the `{{ }}` echo format; `%s` stands for the expression.
    ///
    /// Only affects templates compiled after the call; clear the cache to apply
    /// it to existing artifacts.
    pub fn set_echo_format(&mut self, format: impl Into<String>) {
        self.compiler.set_echo_format(format);
    }

    /// Set the template file extension (including the leading dot).
    pub fn set_file_extension(&mut self, extension: impl Into<String>) {
        self.file_extension = extension.into();
        self.source = Box::new(FileSource::new(&self.view_folder, &self.file_extension));
    }

    /// Read views from another folder.
    pub fn set_view_folder(&mut self, folder: impl Into<PathBuf>) {
        self.view_folder = folder.into();
        self.source = Box::new(FileSource::new(&self.view_folder, &self.file_extension));
    }

    /// Store compiled artifacts in another folder, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::CacheWriteFailure`] if the folder cannot be created.
    pub fn set_cache_folder(&mut self, folder: impl Into<PathBuf>) -> Result<(), BladeError> {
        self.cache = CompilationCache::new(Box::new(FileArtifactStore::new(folder)?));
        Ok(())
    }

    /// The view folder.
    #[must_use]
    pub fn view_folder(&self) -> &Path {
        &self.view_folder
    }

    /// The compiler, for inspecting registered directives.
    #[must_use]
    pub const fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Number of compilations performed since the cache was set up.
    #[must_use]
    pub fn compile_count(&self) -> usize {
        self.cache.compile_count()
    }

    /// Render `name` with `data` as its variables.
    ///
    /// `data` must serialize to an object (or unit/`None` for no variables).
    ///
    /// # Errors
    ///
    /// - [`BladeError::InvalidData`] if `data` is not an object
    /// - [`BladeError::TemplateNotFound`] if `name` or a template it uses is missing
    /// - any compile or execution error
    pub fn render<T>(&self, name: &str, data: &T) -> Result<String, BladeError>
    where
        T: Serialize + ?Sized,
    {
        let scope = match serde_json::to_value(data)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(BladeError::InvalidData {
                    reason: format!("expected an object, found {}", type_name(&other)),
                });
            }
        };

        tracing::debug!("Rendering '{name}' with {} variables", scope.len());
        Session::new(self, scope).render(name)
    }

    /// Compiled artifact of `name`, compiling it if the cached one is stale.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::TemplateNotFound`] or any compile/cache error.
    pub fn compile(&self, name: &str) -> Result<String, BladeError> {
        self.cache.resolve(self.source.as_ref(), &self.compiler, name)
    }

    /// Delete every cached artifact; returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an artifact cannot be deleted.
    pub fn clear_cache(&self) -> Result<usize, BladeError> {
        let removed = self.cache.clear()?;
        tracing::info!("Removed {removed} compiled templates");
        Ok(removed)
    }
}

impl TemplateLoader for Blade {
    fn load(&self, name: &str) -> Result<Arc<Program>, BladeError> {
        let artifact = self.compile(name)?;
        Ok(Arc::new(Program::parse(&dotted_name(name), &artifact)?))
    }
}
