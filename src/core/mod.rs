//! Core types for Blade
//!
//! This module holds the error type shared by every layer of the crate and the
//! helpers that turn errors into user-facing reports.
//!
//! # Modules
//!
//! ## `error` - Error Handling
//!
//! - [`BladeError`] - Enumerated error types covering all Blade failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! # Examples
//!
//! ```rust
//! use blade_cli::core::{BladeError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(BladeError::ConfigError { message: "missing view folder".into() }.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.to_string().contains("missing view folder"));
//! }
//! ```

pub mod error;

pub use error::{BladeError, ErrorContext, user_friendly_error};

/// Result alias used by the library layers.
pub type Result<T> = std::result::Result<T, BladeError>;
