//! Directive registry.
//!
//! Structural directives form a fixed table ([`Builtin`]); user directives are
//! closures registered by name on a [`DirectiveRegistry`] owned by the compiler.
//! A name may be both: the built-in expansion runs first and a custom handler
//! then replaces it whenever the call carries a non-empty argument.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::BladeError;

/// Handler for a custom directive: receives the trimmed argument text (without
/// the enclosing parentheses) and returns the compiled replacement.
pub type DirectiveHandler = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// How a built-in directive treats a following `(...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Never takes arguments; a following `(...)` is left in the output.
    None,
    /// Arguments change the expansion but may be omitted.
    Optional,
    /// Without arguments the text is not treated as a directive at all.
    Required,
}

macro_rules! builtins {
    ($($variant:ident => $name:literal, $arity:ident;)*) => {
        /// The structural directives known to the compiler.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Builtin {
            $($variant,)*
        }

        impl Builtin {
            /// Every built-in directive, in table order.
            pub const ALL: &'static [Builtin] = &[$(Builtin::$variant,)*];

            /// Source name of the directive (without `@`).
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Builtin::$variant => $name,)*
                }
            }

            /// How the directive consumes an argument list.
            #[must_use]
            pub const fn arity(self) -> Arity {
                match self {
                    $(Builtin::$variant => Arity::$arity,)*
                }
            }
        }
    };
}

builtins! {
    If => "if", Required;
    Elseif => "elseif", Required;
    Else => "else", None;
    Endif => "endif", None;
    Unless => "unless", Required;
    Endunless => "endunless", None;
    Isset => "isset", Required;
    Endisset => "endisset", None;
    Switch => "switch", Required;
    Case => "case", Required;
    Default => "default", None;
    Endswitch => "endswitch", None;
    Break => "break", Optional;
    Continue => "continue", Optional;
    Exit => "exit", Optional;
    For => "for", Required;
    Endfor => "endfor", None;
    Foreach => "foreach", Required;
    Endforeach => "endforeach", None;
    Forelse => "forelse", Required;
    Empty => "empty", None;
    Endforelse => "endforelse", None;
    While => "while", Required;
    Endwhile => "endwhile", None;
    Unset => "unset", Required;
    Extends => "extends", Required;
    Include => "include", Required;
    Yield => "yield", Required;
    Section => "section", Required;
    Endsection => "endsection", None;
    Show => "show", None;
    Append => "append", None;
    Stop => "stop", None;
    Overwrite => "overwrite", None;
    Php => "php", Required;
    Endphp => "endphp", None;
    Json => "json", Required;
    Method => "method", Required;
}

impl Builtin {
    /// Look up a built-in by its exact (case-sensitive) name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name())
    }
}

/// Name → handler table for user directives.
///
/// Owned by one [`Compiler`](super::Compiler); registering the same name twice
/// replaces the earlier handler.
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    custom: HashMap<String, DirectiveHandler>,
}

impl DirectiveRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a custom directive.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::InvalidDirectiveName`] unless `name` is one or more
    /// ASCII letters, digits or underscores. Nothing is registered on error.
    pub fn register(&mut self, name: &str, handler: DirectiveHandler) -> Result<(), BladeError> {
        if !is_valid_name(name) {
            return Err(BladeError::InvalidDirectiveName {
                name: name.to_string(),
            });
        }

        if self.custom.insert(name.to_string(), handler).is_some() {
            tracing::debug!("Replaced custom directive @{name}");
        } else {
            tracing::debug!("Registered custom directive @{name}");
        }
        Ok(())
    }

    /// Look up the structural expansion for `name`.
    #[must_use]
    pub fn resolve_builtin(&self, name: &str) -> Option<Builtin> {
        Builtin::from_name(name)
    }

    /// Look up a user-registered handler for `name`.
    #[must_use]
    pub fn resolve_custom(&self, name: &str) -> Option<&DirectiveHandler> {
        self.custom.get(name)
    }

    /// Names of all custom directives, sorted.
    #[must_use]
    pub fn custom_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.custom.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveRegistry").field("custom", &self.custom_names()).finish()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
