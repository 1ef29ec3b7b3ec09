//! Shared utilities
//!
//! # Modules
//!
//! - [`escape`] - HTML escaping of echoed values
//! - [`fs`] - Atomic writes and modification times for views and artifacts

pub mod escape;
pub mod fs;

pub use escape::{escape, escape_with_charset};
pub use fs::{atomic_write, ensure_dir, modified_time, safe_write};
