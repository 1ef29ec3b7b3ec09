//! Lexing of compiled artifacts.
//!
//! An artifact is literal text with `<?rs ... ?>` code islands. A closing `?>`
//! inside a string literal or a `/* */` comment does not end the island, and a
//! single newline right after `?>` is not part of the output.

use crate::compiler::matcher::split_top_level;
use crate::constants::{CODE_CLOSE, CODE_OPEN};

/// One lexed piece of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal output
    Text(String),
    /// One statement from a code island, trimmed and without its separator
    Code(String),
}

/// Split an artifact into literal text and individual statements.
///
/// An island left open at the end of the artifact runs to the end of the text.
#[must_use]
pub fn lex(artifact: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = artifact[cursor..].find(CODE_OPEN) {
        let open = cursor + offset;
        if open > cursor {
            segments.push(Segment::Text(artifact[cursor..open].to_string()));
        }

        let body_start = open + CODE_OPEN.len();
        let (body_end, resume) = match find_close(artifact, body_start) {
            Some(close) => (close, swallow_newline(artifact, close + CODE_CLOSE.len())),
            None => (artifact.len(), artifact.len()),
        };

        segments.extend(
            split_statements(&artifact[body_start..body_end])
                .into_iter()
                .map(Segment::Code),
        );
        cursor = resume;
    }

    if cursor < artifact.len() {
        segments.push(Segment::Text(artifact[cursor..].to_string()));
    }
    segments
}

/// Split the body of one island into trimmed, non-empty statements.
///
/// Statements end at `;` or `:` outside strings and brackets; comments are
/// dropped first.
#[must_use]
pub fn split_statements(body: &str) -> Vec<String> {
    let code = strip_comments(body);
    split_top_level(&code, |c| c == ';' || c == ':')
        .into_iter()
        .map(|(statement, _)| statement.trim())
        .filter(|statement| !statement.is_empty())
        .map(str::to_string)
        .collect()
}

/// Byte offset of the `?>` closing the island whose body starts at `from`.
fn find_close(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = from;
    let mut quote: Option<u8> = None;

    while i < bytes.len() {
        let byte = bytes[i];
        if let Some(q) = quote {
            if byte == b'\\' {
                i += 2;
                continue;
            }
            if byte == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match byte {
            b'\'' | b'"' | b'`' => quote = Some(byte),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = text[i + 2..].find("*/").map_or(bytes.len(), |e| i + 2 + e + 2);
                i = end;
                continue;
            }
            b'?' if bytes.get(i + 1) == Some(&b'>') => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn swallow_newline(text: &str, at: usize) -> usize {
    let rest = &text[at..];
    if rest.starts_with("\r\n") {
        at + 2
    } else if rest.starts_with('\n') {
        at + 1
    } else {
        at
    }
}

fn strip_comments(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();
    let mut quote: Option<char> = None;

    while let Some((idx, ch)) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == '\\' {
                if let Some((_, escaped)) = chars.next() {
                    out.push(escaped);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        if ch == '/' && body[idx + 1..].starts_with('*') {
            match body[idx + 2..].find("*/") {
                Some(end) => {
                    let resume = idx + 2 + end + 2;
                    while chars.peek().is_some_and(|(i, _)| *i < resume) {
                        chars.next();
                    }
                    out.push(' ');
                }
                None => break,
            }
            continue;
        }

        if matches!(ch, '\'' | '"' | '`') {
            quote = Some(ch);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> Segment {
        Segment::Code(s.to_string())
    }

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    #[test]
    fn test_lex_text_and_islands() {
        let segments = lex("a<?rs if(x): ?>b<?rs endif; ?>c");
        assert_eq!(segments, vec![text("a"), code("if(x)"), text("b"), code("endif"), text("c")]);
    }

    #[test]
    fn test_newline_after_close_is_swallowed() {
        assert_eq!(lex("<?rs echo x ?>\nnext"), vec![code("echo x"), text("next")]);
        assert_eq!(lex("<?rs echo x ?>\r\n\r\nnext"), vec![code("echo x"), text("\r\nnext")]);
        assert_eq!(lex("<?rs echo x ?> \nnext"), vec![code("echo x"), text(" \nnext")]);
    }

    #[test]
    fn test_multiple_statements() {
        assert_eq!(
            split_statements(" __empty_1 = true; foreach(xs as x): __empty_1 = false; "),
            vec!["__empty_1 = true", "foreach(xs as x)", "__empty_1 = false"]
        );
        assert_eq!(split_statements("for(i = 0; i < 3; i++):"), vec!["for(i = 0; i < 3; i++)"]);
    }

    #[test]
    fn test_quotes_hide_separators_and_close() {
        assert_eq!(lex("<?rs echo 'a;b?>c' ?>"), vec![code("echo 'a;b?>c'")]);
        assert_eq!(split_statements("case 'x:y':"), vec!["case 'x:y'"]);
    }

    #[test]
    fn test_comments_are_inert() {
        assert_eq!(lex("<?rs /* <?rs if(x): ?> */ ?>after"), vec![text("after")]);
        assert_eq!(split_statements("/* don't */ x = 1;"), vec!["x = 1"]);
    }

    #[test]
    fn test_unterminated_island_runs_to_end() {
        assert_eq!(lex("<?rs switch(a):\ncase (1):"), vec![code("switch(a)"), code("case (1)")]);
    }
}
