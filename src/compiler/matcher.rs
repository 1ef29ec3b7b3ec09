//! Directive scanner.
//!
//! Locates `@name(...)` invocations in raw template text. The argument list is
//! matched by counting parentheses only: quotes and escapes inside the
//! parentheses are not special, so `@if(x == ')')` does not match as intended.
//! An unbalanced argument list is never partially consumed; the directive is
//! then reported without arguments.

use std::ops::Range;

/// One `@name` occurrence in template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch<'a> {
    /// Byte offset of the leading `@`
    pub start: usize,
    /// `true` for `@@name`, which must be emitted literally
    pub escaped: bool,
    /// Directive name (`\w+`)
    pub name: &'a str,
    /// Byte offset just past the name
    pub name_end: usize,
    /// Balanced argument list including its parentheses, if one follows the name
    /// (directly or after spaces/tabs)
    pub args: Option<Range<usize>>,
}

impl DirectiveMatch<'_> {
    /// Byte offset just past the whole match (arguments included when present).
    #[must_use]
    pub fn end(&self) -> usize {
        self.args.as_ref().map_or(self.name_end, |r| r.end)
    }
}

/// Find the next directive at or after byte offset `from`.
///
/// A directive needs a literal `@` that is not preceded by a word character
/// (so `user@example.com` is not a directive), followed by a `\w+` name.
#[must_use]
pub fn next_directive(text: &str, from: usize) -> Option<DirectiveMatch<'_>> {
    let bytes = text.as_bytes();
    let mut i = from;

    while let Some(offset) = text.get(i..)?.find('@') {
        let at = i + offset;
        i = at + 1;

        if at > 0 && is_word_byte(bytes[at - 1]) {
            continue;
        }

        let escaped = bytes.get(at + 1) == Some(&b'@');
        let name_start = if escaped { at + 2 } else { at + 1 };
        let name_len = bytes[name_start.min(bytes.len())..]
            .iter()
            .take_while(|b| is_word_byte(**b))
            .count();
        if name_len == 0 {
            continue;
        }
        let name_end = name_start + name_len;

        let mut j = name_end;
        while j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'\t') {
            j += 1;
        }
        let args = if bytes.get(j) == Some(&b'(') {
            matching_paren(text, j).map(|close| j..close + 1)
        } else {
            None
        };

        return Some(DirectiveMatch {
            start: at,
            escaped,
            name: &text[name_start..name_end],
            name_end,
            args,
        });
    }

    None
}

/// Return the byte offset of the `)` balancing the `(` at `open`.
///
/// Plain depth counting; returns `None` when the text ends first.
#[must_use]
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    for (idx, byte) in bytes.iter().enumerate().skip(open) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip one pair of enclosing parentheses, if the whole text is wrapped in them.
#[must_use]
pub fn strip_parens(args: &str) -> &str {
    let trimmed = args.trim();
    if trimmed.starts_with('(') && matching_paren(trimmed, 0) == Some(trimmed.len() - 1) {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

/// Split an argument list on commas at nesting depth zero.
///
/// Unlike the directive scanner this one understands `'`, `"` and backtick
/// string literals (with backslash escapes), so `'a,b', c` yields two pieces.
/// Every piece is trimmed.
#[must_use]
pub fn split_arguments(args: &str) -> Vec<&str> {
    split_top_level(args, |c| c == ',')
        .into_iter()
        .map(|(piece, _)| piece.trim())
        .collect()
}

/// Split `text` at every character accepted by `is_separator` that sits outside
/// string literals and brackets. Each piece is returned with the separator that
/// ended it (`None` for the tail).
pub(crate) fn split_top_level(
    text: &str,
    is_separator: impl Fn(char) -> bool,
) -> Vec<(&str, Option<char>)> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut piece_start = 0;

    for (idx, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' | '`' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            c if depth <= 0 && is_separator(c) => {
                pieces.push((&text[piece_start..idx], Some(c)));
                piece_start = idx + c.len_utf8();
            }
            _ => {}
        }
    }

    pieces.push((&text[piece_start..], None));
    pieces
}

const fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
