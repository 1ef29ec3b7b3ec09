//! Error handling for Blade
//!
//! This module provides the error type shared by the compiler, the runtime and the
//! engine, plus user-friendly error reporting for the CLI. The error system follows
//! two principles:
//! 1. **Strongly-typed errors** so callers can match on the exact failure
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`BladeError`] - Enumerated error types for every failure in Blade
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! - **Registration**: [`BladeError::InvalidDirectiveName`]
//! - **Lookup**: [`BladeError::TemplateNotFound`]
//! - **Compilation**: [`BladeError::UnbalancedDirective`]
//! - **Execution**: [`BladeError::StackUnderflow`], [`BladeError::UnclosedSection`],
//!   [`BladeError::Expression`], [`BladeError::ArtifactSyntax`], ...
//! - **Persistence**: [`BladeError::CacheWriteFailure`], [`BladeError::IoError`]
//!
//! None of these are retried anywhere: every failure is a deterministic function of
//! template content or configuration.
//!
//! # Examples
//!
//! ```rust,no_run
//! use blade_cli::core::{BladeError, user_friendly_error};
//!
//! fn lookup() -> Result<(), BladeError> {
//!     Err(BladeError::TemplateNotFound {
//!         name: "home.index".to_string(),
//!         path: "views/home/index.blade.html".to_string(),
//!         suggestions: vec!["home.indexes".to_string()],
//!     })
//! }
//!
//! if let Err(e) = lookup() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display(); // Shows colored error with suggestions
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for Blade operations.
///
/// Each variant names one failure mode and carries the template name, expression or
/// path that caused it so the CLI can point the user at the offending source.
#[derive(Error, Debug)]
pub enum BladeError {
    /// A custom directive name does not match `\w+`.
    ///
    /// Raised at registration time; nothing is registered.
    #[error("The directive name [{name}] is not valid. Directive names must only contain alphanumeric characters and underscores")]
    InvalidDirectiveName {
        /// The rejected name
        name: String,
    },

    /// A referenced template has no backing source.
    #[error("View file not found: {path}")]
    TemplateNotFound {
        /// Logical (dotted or slashed) template name
        name: String,
        /// Path the name resolved to
        path: String,
        /// Similar template names that do exist
        suggestions: Vec<String>,
    },

    /// A section was closed while nothing was open.
    #[error("Cannot end a section in '{template}': no section is open")]
    StackUnderflow {
        /// Template that issued the unbalanced close
        template: String,
    },

    /// A template finished executing with a section still open.
    #[error("Section '{section}' opened in '{template}' was never closed")]
    UnclosedSection {
        /// The open section name
        section: String,
        /// Template that left it open
        template: String,
    },

    /// A compiled artifact could not be persisted.
    #[error("Unable to write compiled template to {path}: {reason}")]
    CacheWriteFailure {
        /// Target artifact path (or store key)
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// A paired directive was used out of order (for example `@empty` without `@forelse`).
    #[error("Unbalanced @{directive}: {reason}")]
    UnbalancedDirective {
        /// Directive name without the `@`
        directive: String,
        /// What was wrong
        reason: String,
    },

    /// A compiled artifact is structurally invalid.
    #[error("Invalid compiled template '{template}': {reason}")]
    ArtifactSyntax {
        /// Template the artifact was compiled from
        template: String,
        /// What was wrong
        reason: String,
    },

    /// An embedded expression failed to evaluate.
    #[error("Failed to evaluate expression `{expression}`: {reason}")]
    Expression {
        /// The opaque expression text
        expression: String,
        /// Message from the expression host
        reason: String,
    },

    /// A loop was asked to iterate over a scalar.
    #[error("Cannot iterate over `{expression}` (found {found})")]
    NotIterable {
        /// The collection expression
        expression: String,
        /// JSON type actually found
        found: String,
    },

    /// `@include` recursion went too deep.
    #[error("Include depth limit ({depth}) exceeded while including '{name}'")]
    IncludeDepthExceeded {
        /// Template being included when the limit was hit
        name: String,
        /// The limit
        depth: usize,
    },

    /// The `@extends` chain is too long (usually a cycle).
    #[error("Inheritance chain exceeded {depth} templates while rendering '{name}'")]
    InheritanceDepthExceeded {
        /// Entry template of the render
        name: String,
        /// The limit
        depth: usize,
    },

    /// `@json` data is nested deeper than the requested depth.
    #[error("Maximum JSON depth of {depth} exceeded")]
    JsonDepthExceeded {
        /// The requested depth
        depth: usize,
    },

    /// Render data did not serialize to an object.
    #[error("Invalid view data: {reason}")]
    InvalidData {
        /// What was wrong
        reason: String,
    },

    /// Only UTF-8 output is supported.
    #[error("Unsupported charset: {charset}")]
    UnsupportedCharset {
        /// Requested charset
        charset: String,
    },

    /// Configuration file issues
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Error context wrapper that provides user-friendly error information
///
/// Wraps a [`BladeError`] with an optional suggestion and extra details, the way it
/// is shown to CLI users.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BladeError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`BladeError`]
    #[must_use]
    pub const fn new(error: BladeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`BladeError`] (directly or anywhere in an `anyhow` chain),
/// [`std::io::Error`] and [`toml::de::Error`]; everything else is reported with its
/// full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    // Take ownership of the BladeError when it is the root of the chain
    let error = match error.downcast::<BladeError>() {
        Ok(blade_error) => return create_error_context(blade_error),
        Err(other) => other,
    };

    if let Some(blade_error) = error.chain().find_map(|e| e.downcast_ref::<BladeError>()) {
        let message = chain_message(&error);
        return ErrorContext::new(BladeError::ConfigError {
            message,
        })
        .with_details(blade_error.to_string());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(BladeError::IoError(std::io::Error::new(
                io_error.kind(),
                io_error.to_string(),
            )))
            .with_suggestion("Check permissions on the view and cache folders");
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(BladeError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your blade.toml file");
    }

    ErrorContext::new(BladeError::ConfigError {
        message: chain_message(&error),
    })
}

/// Render an error and its causes as one message
fn chain_message(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

/// Create appropriate [`ErrorContext`] with suggestions for specific Blade errors
fn create_error_context(error: BladeError) -> ErrorContext {
    match &error {
        BladeError::TemplateNotFound {
            name,
            suggestions,
            ..
        } => {
            let details = format!("Template names use '.' or '/' as separators ('{name}')");
            let suggestion = if suggestions.is_empty() {
                "Check the view folder and the configured file extension".to_string()
            } else {
                format!("Did you mean: {}?", suggestions.join(", "))
            };
            ErrorContext::new(error).with_details(details).with_suggestion(suggestion)
        }
        BladeError::InvalidDirectiveName {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use only letters, digits and underscores in directive names"),
        BladeError::StackUnderflow {
            ..
        }
        | BladeError::UnclosedSection {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Pair every @section with exactly one @endsection, @stop, @append, @overwrite or @show",
        ),
        BladeError::UnbalancedDirective {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Each @forelse needs one @empty and one @endforelse, properly nested"),
        BladeError::CacheWriteFailure {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the cache folder exists and is writable")
            .with_details("Without a writable cache every render recompiles its templates"),
        BladeError::Expression {
            ..
        } => ErrorContext::new(error).with_details(
            "Expressions use Tera syntax: variables have no `$` sigil, filters use `|`",
        ),
        BladeError::IncludeDepthExceeded {
            ..
        }
        | BladeError::InheritanceDepthExceeded {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Look for a template that includes or extends itself"),
        _ => ErrorContext::new(error),
    }
}
