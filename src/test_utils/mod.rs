//! Test utilities for Blade
//!
//! Helpers shared by unit and integration tests:
//! - [`init_test_logging`] - one-time tracing setup that respects `RUST_LOG`
//! - [`TestViews`] - a temporary view folder and cache folder with an engine on top
//!
//! # Example
//!
//! ```rust,no_run
//! use blade_cli::test_utils::TestViews;
//! use serde_json::json;
//!
//! let views = TestViews::new().unwrap();
//! views.write("greeting", "Hi {{ name }}").unwrap();
//! let blade = views.blade().unwrap();
//! assert_eq!(blade.render("greeting", &json!({"name": "Ana"})).unwrap(), "Hi Ana");
//! ```

pub mod views;

pub use views::{DEMO_VIEWS, TestViews};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Runs once per process. Uses `level` when given, otherwise `RUST_LOG`; with
/// neither, logging stays off.
///
/// ```bash
/// RUST_LOG=blade_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
