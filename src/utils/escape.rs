//! HTML escaping for echoed values.
//!
//! Escapes the five characters that matter in HTML text and attribute values:
//! `&`, `<`, `>`, `"` and `'`. Single quotes become `&#039;` and every other
//! character is passed through untouched.

use crate::constants::DEFAULT_CHARSET;
use crate::core::BladeError;

/// Escape `text` for safe inclusion in HTML using the default UTF-8 charset.
///
/// # Examples
///
/// ```rust
/// use blade_cli::utils::escape;
///
/// assert_eq!(escape("<a href='x'>&</a>"), "&lt;a href=&#039;x&#039;&gt;&amp;&lt;/a&gt;");
/// ```
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape `text` for the given output charset.
///
/// Rust strings are always UTF-8, so UTF-8 is the only accepted charset (compared
/// case-insensitively, with or without the dash).
///
/// # Errors
///
/// Returns [`BladeError::UnsupportedCharset`] for any other charset.
pub fn escape_with_charset(text: &str, charset: &str) -> Result<String, BladeError> {
    let normalized = charset.replace('-', "").to_ascii_uppercase();
    if normalized != DEFAULT_CHARSET.replace('-', "") {
        return Err(BladeError::UnsupportedCharset {
            charset: charset.to_string(),
        });
    }
    Ok(escape(text))
}
