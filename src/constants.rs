//! Global constants used throughout the Blade codebase.
//!
//! Defaults for the view/cache layout, the artifact code-island markers and the
//! recursion limits used by the render loop.

/// Default extension appended to logical template names.
pub const DEFAULT_FILE_EXTENSION: &str = ".blade.html";

/// Default folder holding template sources.
pub const DEFAULT_VIEW_FOLDER: &str = "views";

/// Default folder holding compiled artifacts.
pub const DEFAULT_CACHE_FOLDER: &str = "cache";

/// Extension of persisted artifacts inside the cache folder.
pub const ARTIFACT_EXTENSION: &str = "compiled";

/// Default format for `{{ }}` echoes; `%s` is replaced by the expression.
pub const DEFAULT_ECHO_FORMAT: &str = "esc(%s)";

/// The only output charset the escaper supports.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Opening marker of a code island in a compiled artifact.
pub const CODE_OPEN: &str = "<?rs";

/// Closing marker of a code island in a compiled artifact.
pub const CODE_CLOSE: &str = "?>";

/// Name of the block every template's direct output is captured into.
pub const ROOT_BLOCK: &str = "content";

/// Maximum `@include` nesting depth.
///
/// A template that includes itself would otherwise recurse until the stack
/// overflows.
pub const MAX_INCLUDE_DEPTH: usize = 64;

/// Maximum number of templates one render may execute through `@extends`.
pub const MAX_INHERITANCE_DEPTH: usize = 64;

/// Default `@json` encoding depth (PHP's `json_encode` default).
pub const DEFAULT_JSON_DEPTH: usize = 512;

/// Environment variable pointing at a configuration file.
pub const CONFIG_ENV_VAR: &str = "BLADE_CONFIG";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "blade.toml";
