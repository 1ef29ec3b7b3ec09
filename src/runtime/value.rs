//! Helpers over render-scope values.

use serde_json::Value;

/// Name of the JSON type of `value`, for error messages.
#[must_use]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Truthiness of a value: `null`, `false`, zero, `""`, `"0"` and empty
/// collections are false.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Loose equality used by `switch`: numbers compare numerically with numeric
/// strings, booleans compare by truthiness, and `null` equals every falsy value.
#[must_use]
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match s.trim().parse::<f64>() {
                Ok(parsed) => n.as_f64() == Some(parsed),
                Err(_) => n.to_string() == *s,
            }
        }
        (Value::Bool(b), other) | (other, Value::Bool(b)) => truthy(other) == *b,
        (Value::Null, other) | (other, Value::Null) => !truthy(other),
        _ => left == right,
    }
}

/// Numeric addition that keeps integers as integers.
#[must_use]
pub fn add(left: &Value, right: &Value) -> Option<Value> {
    match (as_integer(left), as_integer(right)) {
        (Some(a), Some(b)) => a.checked_add(b).map(Value::from),
        _ => Some(Value::from(as_number(left)? + as_number(right)?)),
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Null => Some(0),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => value.as_i64(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Negate a number.
#[must_use]
pub fn negate(value: &Value) -> Option<Value> {
    match value.as_i64() {
        Some(n) => n.checked_neg().map(Value::from),
        None => as_number(value).map(|f| Value::from(-f)),
    }
}
