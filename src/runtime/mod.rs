//! Artifact execution.
//!
//! Compiled templates are executed by a small interpreter rather than being
//! turned into Rust code. The pieces, leaves first:
//!
//! - [`artifact`] - splits an artifact into literal text and statements
//! - [`program`] - parses statements and builds the block tree
//! - [`expr`] - evaluates opaque expressions with Tera
//! - [`blocks`] - the section capture stack
//! - [`json`] - `@json` output
//! - [`session`] - per-render state and the inheritance fetch loop
//!
//! All mutable render state lives in a [`Session`]; sessions are never shared,
//! so independent renders cannot observe each other's sections.

pub mod artifact;
pub mod blocks;
pub mod expr;
mod interpreter;
pub mod json;
pub mod program;
pub mod session;
pub mod value;

pub use blocks::BlockStack;
pub use expr::Evaluator;
pub use program::Program;
pub use session::{Session, TemplateLoader};
