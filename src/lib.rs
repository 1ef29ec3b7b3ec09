//! Blade - a Blade-style template compiler and renderer
//!
//! Templates are plain text with `@directive(...)` calls, `{{ }}` echoes and
//! `{{-- --}}` comments. Blade compiles each template once into an artifact
//! (text interleaved with `<?rs ... ?>` code islands), caches the artifact by
//! the source's modification time, and executes it to render output.
//!
//! # Architecture Overview
//!
//! ```text
//! source ──► compiler ──► cache ──► runtime ──► text
//!  (views)   (artifact)   (.compiled) (sessions)
//! ```
//!
//! ## Key Features
//!
//! - **Directives**: conditionals, loops, switch, `@forelse`/`@empty`, `@json`,
//!   `@method`, raw `@php` blocks and user-registered directives
//! - **Layouts**: `@extends`, `@section`/`@yield` with append, overwrite and show
//!   semantics, and inline `@include`
//! - **Freshness cache**: artifacts are recompiled only when a view changes
//! - **Isolated renders**: section state lives in a per-render session
//!
//! # Core Modules
//!
//! - [`compiler`] - directive, comment, echo and raw-block passes
//! - [`runtime`] - artifact parsing and execution, sections, `@json`
//! - [`cache`] - artifact stores and the freshness check
//! - [`source`] - template name resolution and loading
//! - [`engine`] - the [`engine::Blade`] facade tying it together
//!
//! ## Supporting Modules
//!
//! - [`cli`] - the `blade` command line
//! - [`config`] - `blade.toml` loading
//! - [`core`] - the error type and user-facing error reports
//! - [`constants`] - defaults and limits
//! - [`utils`] - escaping and file helpers
//!
//! # Template Syntax
//!
//! ```text
//! @extends('shared.layout')
//!
//! @section('body')
//!     {{-- escaped by default --}}
//!     <h1>{{ title }}</h1>
//!     @forelse(posts as post)
//!         <p>{{ loop.iteration }}. {!! post.html !!}</p>
//!     @empty
//!         <p>{{ empty_message or 'Nothing yet' }}</p>
//!     @endforelse
//! @endsection
//! ```
//!
//! Expressions use Tera's expression syntax; variables have no sigil.
//!
//! # Command-Line Usage
//!
//! ```bash
//! blade render home.index --data data.yaml
//! blade compile home.index
//! blade clear-cache
//! ```

pub mod cache;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod constants;
pub mod core;
pub mod engine;
pub mod runtime;
pub mod source;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
