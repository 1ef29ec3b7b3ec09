//! Template sources.
//!
//! A [`TemplateSource`] maps logical template names (`home.index`, `home/index`,
//! `/home/index`) to source text and a modification time.
//!
//! - [`FileSource`] - reads `<view folder>/<name with / separators><extension>`
//! - [`MemorySource`] - an in-memory map, mainly for tests and embedding
//!
//! # Name normalization
//!
//! A leading `/` is ignored and `.` and `/` are interchangeable separators, so
//! all three spellings above name the same template. [`dotted_name`] gives the
//! canonical dotted form used for cache keys.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

use strsim::levenshtein;
use walkdir::WalkDir;

use crate::core::BladeError;
use crate::utils::modified_time;

/// Maximum allowed Levenshtein distance as a percentage of the requested name
/// length for "did you mean" suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Source text of one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    /// Template source
    pub text: String,
    /// Last modification time of the source
    pub modified: SystemTime,
}

/// Where template sources come from.
pub trait TemplateSource: Send + Sync {
    /// Read the source text and its modification time.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::TemplateNotFound`] if `name` has no source.
    fn read(&self, name: &str) -> Result<SourceText, BladeError>;

    /// Modification time of the source, without reading it.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::TemplateNotFound`] if `name` has no source.
    fn modified(&self, name: &str) -> Result<SystemTime, BladeError>;

    /// Path (or other locator) the name resolves to, for messages.
    fn resolve_path(&self, name: &str) -> PathBuf;
}

impl<T: TemplateSource + ?Sized> TemplateSource for std::sync::Arc<T> {
    fn read(&self, name: &str) -> Result<SourceText, BladeError> {
        (**self).read(name)
    }

    fn modified(&self, name: &str) -> Result<SystemTime, BladeError> {
        (**self).modified(name)
    }

    fn resolve_path(&self, name: &str) -> PathBuf {
        (**self).resolve_path(name)
    }
}

/// Canonical dotted form of a template name.
///
/// ```rust
/// use blade_cli::source::dotted_name;
///
/// assert_eq!(dotted_name("/shared/layout"), "shared.layout");
/// assert_eq!(dotted_name("home.index"), "home.index");
/// ```
#[must_use]
pub fn dotted_name(name: &str) -> String {
    name.trim_start_matches('/').replace(['/', '\\'], ".")
}

/// Templates stored as files under a view folder.
#[derive(Debug, Clone)]
pub struct FileSource {
    view_folder: PathBuf,
    extension: String,
}

impl FileSource {
    /// Create a source reading `<view_folder>/<name><extension>`.
    #[must_use]
    pub fn new(view_folder: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            view_folder: view_folder.into(),
            extension: extension.into(),
        }
    }

    /// The view folder.
    #[must_use]
    pub fn view_folder(&self) -> &Path {
        &self.view_folder
    }

    /// The template file extension (including the leading dot).
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Dotted names of every template under the view folder, sorted.
    #[must_use]
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(&self.view_folder)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&self.view_folder).ok()?;
                let relative = relative.to_string_lossy().replace('\\', "/");
                let stem = relative.strip_suffix(&self.extension)?;
                Some(dotted_name(stem))
            })
            .collect();
        names.sort();
        names
    }

    fn not_found(&self, name: &str) -> BladeError {
        let wanted = dotted_name(name);
        let mut scored: Vec<(String, usize)> = self
            .template_names()
            .into_iter()
            .map(|candidate| {
                let distance = levenshtein(&wanted, &candidate);
                (candidate, distance)
            })
            .collect();
        scored.sort_by_key(|(_, distance)| *distance);

        let suggestions = scored
            .into_iter()
            .filter(|(_, distance)| *distance <= wanted.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(candidate, _)| candidate)
            .collect();

        BladeError::TemplateNotFound {
            name: name.to_string(),
            path: self.resolve_path(name).display().to_string(),
            suggestions,
        }
    }
}

impl TemplateSource for FileSource {
    fn read(&self, name: &str) -> Result<SourceText, BladeError> {
        let path = self.resolve_path(name);
        if !path.is_file() {
            return Err(self.not_found(name));
        }

        let text = fs::read_to_string(&path)?;
        let modified = modified_time(&path)?;
        tracing::debug!("Read template '{name}' from {}", path.display());
        Ok(SourceText { text, modified })
    }

    fn modified(&self, name: &str) -> Result<SystemTime, BladeError> {
        let path = self.resolve_path(name);
        if !path.is_file() {
            return Err(self.not_found(name));
        }
        Ok(modified_time(&path)?)
    }

    fn resolve_path(&self, name: &str) -> PathBuf {
        let relative =
            name.trim_start_matches('/').replace(['.', '/'], std::path::MAIN_SEPARATOR_STR);
        self.view_folder.join(format!("{relative}{}", self.extension))
    }
}

/// Templates held in memory, keyed by dotted name.
#[derive(Debug, Default)]
pub struct MemorySource {
    templates: RwLock<HashMap<String, SourceText>>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template, stamping it with the current time.
    pub fn insert(&self, name: &str, text: impl Into<String>) {
        self.insert_at(name, text, SystemTime::now());
    }

    /// Add or replace a template with an explicit modification time.
    pub fn insert_at(&self, name: &str, text: impl Into<String>, modified: SystemTime) {
        let entry = SourceText {
            text: text.into(),
            modified,
        };
        if let Ok(mut templates) = self.templates.write() {
            templates.insert(dotted_name(name), entry);
        }
    }

    fn get(&self, name: &str) -> Result<SourceText, BladeError> {
        let templates = self.templates.read().map_err(|_| BladeError::ConfigError {
            message: "template map lock poisoned".to_string(),
        })?;
        let key = dotted_name(name);
        let threshold = key.len() * SIMILARITY_THRESHOLD_PERCENT / 100;
        templates.get(&key).cloned().ok_or_else(|| {
            let suggestions = templates
                .keys()
                .filter(|candidate| levenshtein(&key, candidate) <= threshold)
                .take(3)
                .cloned()
                .collect();
            BladeError::TemplateNotFound {
                name: name.to_string(),
                path: key.clone(),
                suggestions,
            }
        })
    }
}

impl TemplateSource for MemorySource {
    fn read(&self, name: &str) -> Result<SourceText, BladeError> {
        self.get(name)
    }

    fn modified(&self, name: &str) -> Result<SystemTime, BladeError> {
        self.get(name).map(|source| source.modified)
    }

    fn resolve_path(&self, name: &str) -> PathBuf {
        PathBuf::from(dotted_name(name))
    }
}
