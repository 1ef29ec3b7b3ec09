//! JSON output for `@json`.
//!
//! Output matches PHP's `json_encode`: `/` is escaped as `\/` and non-ASCII
//! characters as `\uXXXX` unless the matching `JSON_UNESCAPED_*` flag is set,
//! and the `JSON_HEX_*` flags turn HTML-significant characters into `\u` escapes.
//! Values go through `serde_json`'s serializer with a custom formatter deciding
//! how strings are escaped.

use std::io;

use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::ser::{CharEscape, CompactFormatter, Formatter, PrettyFormatter};
use serde_json::{Serializer, Value};

use crate::core::BladeError;

/// `<` and `>` as `\u003C` / `\u003E`
pub const JSON_HEX_TAG: u32 = 1;
/// `&` as `\u0026`
pub const JSON_HEX_AMP: u32 = 2;
/// `'` as `\u0027`
pub const JSON_HEX_APOS: u32 = 4;
/// `"` as `\u0022`
pub const JSON_HEX_QUOT: u32 = 8;
/// Arrays are written as objects keyed by index
pub const JSON_FORCE_OBJECT: u32 = 16;
/// `/` is not escaped
pub const JSON_UNESCAPED_SLASHES: u32 = 64;
/// Indent with four spaces
pub const JSON_PRETTY_PRINT: u32 = 128;
/// Non-ASCII characters are written as is
pub const JSON_UNESCAPED_UNICODE: u32 = 256;

const FLAG_NAMES: &[(&str, u32)] = &[
    ("JSON_HEX_TAG", JSON_HEX_TAG),
    ("JSON_HEX_AMP", JSON_HEX_AMP),
    ("JSON_HEX_APOS", JSON_HEX_APOS),
    ("JSON_HEX_QUOT", JSON_HEX_QUOT),
    ("JSON_FORCE_OBJECT", JSON_FORCE_OBJECT),
    ("JSON_UNESCAPED_SLASHES", JSON_UNESCAPED_SLASHES),
    ("JSON_PRETTY_PRINT", JSON_PRETTY_PRINT),
    ("JSON_UNESCAPED_UNICODE", JSON_UNESCAPED_UNICODE),
];

/// Parse a flag list such as `JSON_PRETTY_PRINT | JSON_HEX_TAG` or `15`.
///
/// Returns `None` if any part is neither a known flag name nor an integer.
#[must_use]
pub fn parse_flags(text: &str) -> Option<u32> {
    text.split('|').map(str::trim).try_fold(0u32, |flags, part| {
        let bits = match part.parse::<u32>() {
            Ok(bits) => bits,
            Err(_) => FLAG_NAMES.iter().find(|(name, _)| *name == part)?.1,
        };
        Some(flags | bits)
    })
}

/// Nesting depth of a value: scalars are 0, each array/object level adds 1.
#[must_use]
pub fn depth_of(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(depth_of).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(depth_of).max().unwrap_or(0),
        _ => 0,
    }
}

/// Encode `value` with the given flags.
///
/// # Errors
///
/// Returns [`BladeError::JsonDepthExceeded`] when `value` nests deeper than
/// `max_depth`, or [`BladeError::JsonError`] if serialization fails.
pub fn encode(value: &Value, flags: u32, max_depth: usize) -> Result<String, BladeError> {
    if depth_of(value) > max_depth {
        return Err(BladeError::JsonDepthExceeded {
            depth: max_depth,
        });
    }

    let bytes = if flags & JSON_PRETTY_PRINT != 0 {
        serialize(value, flags, PrettyFormatter::with_indent(b"    "))?
    } else {
        serialize(value, flags, CompactFormatter)?
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn serialize<F: Formatter>(value: &Value, flags: u32, layout: F) -> Result<Vec<u8>, BladeError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PhpFormatter { layout, flags });
    if flags & JSON_FORCE_OBJECT != 0 {
        ForceObject(value).serialize(&mut serializer)?;
    } else {
        value.serialize(&mut serializer)?;
    }
    Ok(buffer)
}

/// Serializes arrays as objects keyed by index, at every level.
struct ForceObject<'a>(&'a Value);

impl Serialize for ForceObject<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Array(items) => {
                let mut map = serializer.serialize_map(Some(items.len()))?;
                for (index, item) in items.iter().enumerate() {
                    map.serialize_entry(&index.to_string(), &ForceObject(item))?;
                }
                map.end()
            }
            Value::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries {
                    map.serialize_entry(key, &ForceObject(item))?;
                }
                map.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}

/// String escaping with PHP's `json_encode` rules; layout is delegated to the
/// wrapped compact or pretty formatter.
struct PhpFormatter<F> {
    layout: F,
    flags: u32,
}

impl<F> PhpFormatter<F> {
    const fn has(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    fn escape_for(&self, ch: char) -> Option<&'static str> {
        match ch {
            '/' if !self.has(JSON_UNESCAPED_SLASHES) => Some("\\/"),
            '<' if self.has(JSON_HEX_TAG) => Some("\\u003C"),
            '>' if self.has(JSON_HEX_TAG) => Some("\\u003E"),
            '&' if self.has(JSON_HEX_AMP) => Some("\\u0026"),
            '\'' if self.has(JSON_HEX_APOS) => Some("\\u0027"),
            _ => None,
        }
    }
}

impl<F: Formatter> Formatter for PhpFormatter<F> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            let escaped = self.escape_for(ch);
            let needs_unicode = !ch.is_ascii() && !self.has(JSON_UNESCAPED_UNICODE);
            if escaped.is_none() && !needs_unicode {
                continue;
            }

            writer.write_all(fragment[start..index].as_bytes())?;
            start = index + ch.len_utf8();
            if let Some(escaped) = escaped {
                writer.write_all(escaped.as_bytes())?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match char_escape {
            CharEscape::Quote if self.has(JSON_HEX_QUOT) => writer.write_all(b"\\u0022"),
            other => CompactFormatter.write_char_escape(writer, other),
        }
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.layout.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.layout.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.end_object_value(writer)
    }
}
