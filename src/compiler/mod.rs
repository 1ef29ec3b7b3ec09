//! Template compiler.
//!
//! Turns Blade template source into an artifact: literal text interleaved with
//! `<?rs ... ?>` code islands that [`crate::runtime`] executes. Compilation is a
//! fixed sequence of whole-text passes:
//!
//! 1. **Statements** - `@directive(...)` calls, via [`matcher`] and [`registry`]
//! 2. **Comments** - `{{-- ... --}}` become inert island comments (line count is kept)
//! 3. **Echoes** - `{{{ }}}`, `{!! !!}` and `{{ }}`, see [`echo`]
//! 4. **Extensions** - caller-registered transforms, in registration order
//! 5. **Raw blocks** - `@php ... @endphp` spans become verbatim code islands
//!
//! Compiling is deterministic: the same source always yields byte-identical
//! output. The switch/case flag and the forelse counter are reset for every
//! call to [`Compiler::compile`].
//!
//! # Examples
//!
//! ```rust
//! use blade_cli::compiler::Compiler;
//!
//! let compiler = Compiler::new();
//! let artifact = compiler.compile("@if(user)Hello {{ user }}@endif").unwrap();
//! assert_eq!(artifact, "<?rs if(user): ?>Hello <?rs echo esc(user) ?><?rs endif; ?>");
//! ```

pub mod directives;
pub mod echo;
pub mod matcher;
pub mod registry;

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

pub use directives::{CompileState, DEFAULT_JSON_FLAGS, compile_builtin};
pub use echo::{compile_echo_defaults, compile_echoes};
pub use matcher::{DirectiveMatch, next_directive, split_arguments, strip_parens};
pub use registry::{Arity, Builtin, DirectiveHandler, DirectiveRegistry};

use crate::constants::{CODE_CLOSE, CODE_OPEN, DEFAULT_ECHO_FORMAT};
use crate::core::BladeError;

/// A whole-text transform run after echoes. It receives the text compiled so far
/// and the compiler running it.
pub type Extension = Arc<dyn Fn(&str, &Compiler) -> String + Send + Sync>;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{--(.*?)--\}\}").expect("valid comment pattern"));

static SET_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@set\(['"](.*?)['"],(.*)\)"#).expect("valid @set pattern")
});

/// The Blade template compiler.
#[derive(Clone)]
pub struct Compiler {
    registry: DirectiveRegistry,
    extensions: Vec<Extension>,
    echo_format: String,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("registry", &self.registry)
            .field("extensions", &self.extensions.len())
            .field("echo_format", &self.echo_format)
            .finish()
    }
}

impl Compiler {
    /// Create a compiler with no custom directives or extensions and the default
    /// (escaping) echo format.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: DirectiveRegistry::new(),
            extensions: Vec::new(),
            echo_format: DEFAULT_ECHO_FORMAT.to_string(),
        }
    }

    /// Register a custom directive. See [`DirectiveRegistry::register`].
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::InvalidDirectiveName`] if `name` is not `\w+`.
    pub fn register_directive<F>(&mut self, name: &str, handler: F) -> Result<(), BladeError>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.registry.register(name, Arc::new(handler))
    }

    /// Append a whole-text transform to the extension pass.
    pub fn add_extension<F>(&mut self, extension: F)
    where
        F: Fn(&str, &Compiler) -> String + Send + Sync + 'static,
    {
        self.extensions.push(Arc::new(extension));
    }

    /// Set the wrapper applied to regular `{{ }}` echoes. `%s` marks the expression.
    pub fn set_echo_format(&mut self, format: impl Into<String>) {
        self.echo_format = format.into();
    }

    /// The current echo format.
    #[must_use]
    pub fn echo_format(&self) -> &str {
        &self.echo_format
    }

    /// The directive registry.
    #[must_use]
    pub fn registry(&self) -> &DirectiveRegistry {
        &self.registry
    }

    /// Compile template source into an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::UnbalancedDirective`] when `@forelse`/`@empty` are not
    /// properly paired.
    pub fn compile(&self, source: &str) -> Result<String, BladeError> {
        let mut state = CompileState::default();

        let text = self.compile_statements(source, &mut state)?;
        if state.empty_counter > 0 {
            return Err(BladeError::UnbalancedDirective {
                directive: "forelse".to_string(),
                reason: format!("{} block(s) never reached @empty", state.empty_counter),
            });
        }

        let text = compile_comments(&text);
        let text = compile_echoes(&text, &self.echo_format);
        let text = self.compile_extensions(text);
        Ok(replace_raw_blocks(&text))
    }

    fn compile_statements(
        &self,
        source: &str,
        state: &mut CompileState,
    ) -> Result<String, BladeError> {
        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;

        while let Some(found) = next_directive(source, cursor) {
            out.push_str(&source[cursor..found.start]);

            if found.escaped {
                out.push_str(&source[found.start..found.end()]);
                cursor = found.end();
                continue;
            }

            let args = found.args.clone().map(|range| &source[range]);
            let mut replacement = None;
            let mut consumed = found.name_end;

            if let Some(builtin) = self.registry.resolve_builtin(found.name) {
                match (builtin.arity(), args) {
                    (Arity::None, _) => {
                        replacement = Some(compile_builtin(builtin, None, state)?);
                    }
                    (Arity::Optional, _) | (Arity::Required, Some(_)) => {
                        replacement = Some(compile_builtin(builtin, args, state)?);
                        consumed = found.end();
                    }
                    (Arity::Required, None) => {}
                }
            }

            if let (Some(handler), Some(raw)) = (self.registry.resolve_custom(found.name), args) {
                let inner = strip_parens(raw).trim();
                if !inner.is_empty() {
                    replacement = Some(handler(inner));
                    consumed = found.end();
                }
            }

            match replacement {
                Some(compiled) => {
                    tracing::trace!("Compiled @{} at byte {}", found.name, found.start);
                    out.push_str(&compiled);
                    cursor = consumed;
                }
                None if self.registry.resolve_builtin(found.name).is_some() => {
                    out.push_str(&source[found.start..found.name_end]);
                    cursor = found.name_end;
                }
                None => {
                    out.push_str(&source[found.start..found.end()]);
                    cursor = found.end();
                }
            }
        }

        out.push_str(&source[cursor..]);
        Ok(out)
    }

    fn compile_extensions(&self, mut text: String) -> String {
        for extension in &self.extensions {
            text = extension(&text, self);
        }
        text
    }
}

/// The `@set('name', expr)` extension: assigns `expr` to `name`.
#[must_use]
pub fn set_extension() -> Extension {
    Arc::new(|text: &str, _: &Compiler| {
        SET_DIRECTIVE.replace_all(text, format!("{CODE_OPEN} $1 =$2; {CODE_CLOSE}")).into_owned()
    })
}

fn compile_comments(text: &str) -> String {
    COMMENT
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!("{CODE_OPEN} /*{}*/ {CODE_CLOSE}", caps[1].replace("*/", "* /"))
        })
        .into_owned()
}

/// Unwrap `@php ... @endphp` spans into verbatim code islands. An `@php` preceded
/// by `@` or followed by a word character does not open a block; an `@php` with
/// no closing `@endphp` is left as is.
fn replace_raw_blocks(text: &str) -> String {
    const OPEN: &str = "@php";
    const CLOSE: &str = "@endphp";

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut search = 0;

    while let Some(offset) = text[search..].find(OPEN) {
        let at = search + offset;
        let body_start = at + OPEN.len();
        search = body_start;

        let escaped = at > 0 && text.as_bytes()[at - 1] == b'@';
        let joined = text
            .as_bytes()
            .get(body_start)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_');
        if escaped || joined {
            continue;
        }

        let Some(close) = text[body_start..].find(CLOSE) else {
            break;
        };
        let body_end = body_start + close;

        out.push_str(&text[cursor..at]);
        out.push_str(CODE_OPEN);
        out.push_str(&text[body_start..body_end]);
        out.push_str(CODE_CLOSE);

        cursor = body_end + CLOSE.len();
        search = cursor;
    }

    out.push_str(&text[cursor..]);
    out
}
