//! # Python Literals
//!
//! Every user-entered value embedded in generated code goes through here:
//! knowledge entries, beliefs, template/message metadata, JIDs, passwords.

use serde_json::Value;
use std::fmt::Write;

/// Double-quoted Python string literal.
pub fn python_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Number literal; integral values print without a fractional part.
pub fn python_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Structural rendering of a JSON value as a Python literal.
pub fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => python_string(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{}: {}", python_string(key), python_literal(value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Literal for a value typed by a user. Strings holding a JSON array or
/// object are rendered as that structure; other strings stay strings.
pub fn user_value(value: &Value) -> String {
    if let Value::String(text) = value {
        if let Some(parsed) = embedded_json(text) {
            return python_literal(&parsed);
        }
    }
    python_literal(value)
}

/// [`user_value`] for plain text input.
pub fn user_text(text: &str) -> String {
    match embedded_json(text) {
        Some(parsed) => python_literal(&parsed),
        None => python_string(text),
    }
}

fn embedded_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    serde_json::from_str::<Value>(trimmed)
        .ok()
        .filter(|parsed| parsed.is_array() || parsed.is_object())
}
