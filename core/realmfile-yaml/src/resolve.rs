//! Implicit typing of plain scalars.

use chrono::{DateTime, Utc};
use realmfile_model::Value;
use uuid::Uuid;

use crate::event::ScalarStyle;

/// Resolve scalar text to a typed value. Quoting pins the scalar to a
/// string; plain text goes through the implicit chain.
pub fn resolve_scalar(text: &str, style: ScalarStyle) -> Value {
    match style {
        ScalarStyle::Plain => resolve_plain(text),
        ScalarStyle::SingleQuoted | ScalarStyle::DoubleQuoted => Value::Str(text.to_owned()),
    }
}

/// The implicit chain: null, bool, int, float, uuid, timestamp, else
/// string. Order matters; every earlier match wins.
pub fn resolve_plain(text: &str) -> Value {
    match text {
        "" | "~" | "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::Int(n);
    }
    if looks_numeric(text) {
        if let Ok(f) = text.parse::<f64>() {
            return Value::Float(f);
        }
    }
    // hyphenated form only; 32-char bare hex stays a string
    if text.len() == 36 {
        if let Ok(u) = Uuid::parse_str(text) {
            return Value::Uuid(u);
        }
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Value::Timestamp(t.with_timezone(&Utc));
    }
    Value::Str(text.to_owned())
}

/// Whether plain `text` would survive a write-read cycle as a string.
/// The writer quotes anything for which this is false.
pub fn plain_stays_string(text: &str) -> bool {
    matches!(resolve_plain(text), Value::Str(_))
}

// Guards the float parse so words like "inf" and "nan" stay strings.
fn looks_numeric(text: &str) -> bool {
    let mut chars = text.chars();
    let leading_ok = matches!(chars.next(), Some(c) if c.is_ascii_digit() || c == '-' || c == '+');
    leading_ok && text.contains(['.', 'e', 'E']) && text.chars().all(|c| !c.is_alphabetic() || c == 'e' || c == 'E')
}
