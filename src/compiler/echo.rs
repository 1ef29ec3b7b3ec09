//! Echo compilation: `{{{ }}}`, `{!! !!}` and `{{ }}`.
//!
//! A single newline directly after an echo is emitted twice. The executor
//! swallows one newline after every closing `?>`, so doubling it keeps the line
//! the echo sat on.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::constants::{CODE_CLOSE, CODE_OPEN};

static ESCAPED_ECHO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{\{\s*(.+?)\s*\}\}\}(\r?\n)?").expect("valid escaped echo pattern")
});

static RAW_ECHO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{!!\s*(.+?)\s*!!\}(\r?\n)?").expect("valid raw echo pattern")
});

static REGULAR_ECHO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(@)?\{\{\s*(.+?)\s*\}\}(\r?\n)?").expect("valid regular echo pattern")
});

static OR_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(.+?)\s+or\s+(.+?)$").expect("valid default pattern")
});

static VARIABLE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_]\w*(?:\.\w+|\[[^\]]*\])*$").expect("valid variable path pattern")
});

/// Compile all three echo forms in priority order.
///
/// `echo_format` wraps regular `{{ }}` echoes; its first `%s` is replaced by the
/// expression.
#[must_use]
pub fn compile_echoes(text: &str, echo_format: &str) -> String {
    let escaped = ESCAPED_ECHO.replace_all(text, |caps: &Captures<'_>| {
        format!(
            "{CODE_OPEN} echo esc({}) {CODE_CLOSE}{}",
            compile_echo_defaults(&caps[1]),
            doubled_newline(caps.get(2).map(|m| m.as_str()))
        )
    });

    let raw = RAW_ECHO.replace_all(&escaped, |caps: &Captures<'_>| {
        format!(
            "{CODE_OPEN} echo {} {CODE_CLOSE}{}",
            compile_echo_defaults(&caps[1]),
            doubled_newline(caps.get(2).map(|m| m.as_str()))
        )
    });

    REGULAR_ECHO
        .replace_all(&raw, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return caps[0][1..].to_string();
            }
            let expression = compile_echo_defaults(&caps[2]);
            format!(
                "{CODE_OPEN} echo {} {CODE_CLOSE}{}",
                echo_format.replacen("%s", &expression, 1),
                doubled_newline(caps.get(3).map(|m| m.as_str()))
            )
        })
        .into_owned()
}

/// Rewrite `left or right` to a presence-checked fallback when `left` names a
/// variable; any other expression is returned unchanged.
///
/// ```rust
/// use blade_cli::compiler::compile_echo_defaults;
///
/// assert_eq!(compile_echo_defaults("name or 'Guest'"), "name | default(value='Guest')");
/// assert_eq!(compile_echo_defaults("a > 1 or b"), "a > 1 or b");
/// ```
#[must_use]
pub fn compile_echo_defaults(expression: &str) -> String {
    match OR_DEFAULT.captures(expression) {
        Some(caps) if VARIABLE_PATH.is_match(&caps[1]) => {
            format!("{} | default(value={})", &caps[1], &caps[2])
        }
        _ => expression.to_string(),
    }
}

fn doubled_newline(newline: Option<&str>) -> String {
    newline.map(|n| n.repeat(2)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: &str = "esc(%s)";

    #[test]
    fn test_escaped_and_regular_both_escape() {
        assert_eq!(compile_echoes("{{{ name }}}", FORMAT), "<?rs echo esc(name) ?>");
        assert_eq!(compile_echoes("{{ name }}", FORMAT), "<?rs echo esc(name) ?>");
    }

    #[test]
    fn test_raw_echo() {
        assert_eq!(compile_echoes("{!! html !!}", FORMAT), "<?rs echo html ?>");
    }

    #[test]
    fn test_at_sign_keeps_braces() {
        assert_eq!(compile_echoes("@{{ name }}", FORMAT), "{{ name }}");
        assert_eq!(compile_echoes("@{{ name }}\n", FORMAT), "{{ name }}\n");
    }

    #[test]
    fn test_trailing_newline_is_doubled() {
        assert_eq!(compile_echoes("{{ a }}\nnext", FORMAT), "<?rs echo esc(a) ?>\n\nnext");
        assert_eq!(compile_echoes("{!! a !!}\r\n", FORMAT), "<?rs echo a ?>\r\n\r\n");
        assert_eq!(compile_echoes("{{ a }} tail", FORMAT), "<?rs echo esc(a) ?> tail");
    }

    #[test]
    fn test_custom_echo_format() {
        assert_eq!(compile_echoes("{{ title }}", "%s | title"), "<?rs echo title | title ?>");
        assert_eq!(compile_echoes("{{{ title }}}", "%s"), "<?rs echo esc(title) ?>");
    }

    #[test]
    fn test_multiline_expression() {
        assert_eq!(compile_echoes("{{\n  a + b\n}}", FORMAT), "<?rs echo esc(a + b) ?>");
    }

    #[test]
    fn test_echo_defaults() {
        assert_eq!(
            compile_echo_defaults("user.name or 'anon'"),
            "user.name | default(value='anon')"
        );
        assert_eq!(compile_echo_defaults("items[0] or 0"), "items[0] | default(value=0)");
        assert_eq!(compile_echo_defaults("'x' or y"), "'x' or y");
        assert_eq!(compile_echo_defaults("orange"), "orange");
        assert_eq!(
            compile_echoes("{{ title or 'Untitled' }}", FORMAT),
            "<?rs echo esc(title | default(value='Untitled')) ?>"
        );
    }
}
