//! Integration test suite for Blade
//!
//! End-to-end tests over real view folders: the engine API, the file cache and
//! the `blade` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cache_behavior**: freshness checks and the on-disk artifact cache
//! - **cli**: the `blade` binary
//! - **directives**: loops, switch, forelse and custom directives over files
//! - **inheritance**: layouts, sections and includes, including the demo views

mod cache_behavior;
mod cli;
mod directives;
mod inheritance;

use std::path::PathBuf;

/// The demo views shipped under `tests/fixtures/views`.
pub fn fixture_views() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/views")
}
