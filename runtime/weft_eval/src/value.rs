//! Runtime values.
//!
//! Every scalar the runtime handles is one of four kinds. Parsing is applied
//! to any raw text pushed onto a block and never fails: text that does not
//! match a stricter kind is a `Line`.

use std::fmt;

/// A tagged scalar value. Immutable once constructed.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Arbitrary text.
    Line(String),
    /// Parsed from exactly `True` / `False`.
    Bool(bool),
    /// Parsed from all-digit text.
    Int(i64),
    /// Parsed from digit-and-dot text.
    Float(f64),
}

impl Value {
    /// Parse raw text into a value.
    ///
    /// Rule, in order: `Int` if non-empty and all ASCII digits; `Float` if
    /// non-empty digit-and-dot text containing a dot; `Bool` for exactly
    /// `True` / `False`; otherwise `Line`.
    pub fn parse(text: &str) -> Value {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(i) = text.parse::<i64>() {
                return Value::Int(i);
            }
        }
        if !text.is_empty()
            && text.bytes().all(|b| b.is_ascii_digit() || b == b'.')
            && text.contains('.')
        {
            if let Ok(f) = text.parse::<f64>() {
                return Value::Float(f);
            }
        }
        match text {
            "True" => Value::Bool(true),
            "False" => Value::Bool(false),
            _ => Value::Line(text.to_string()),
        }
    }

    /// The bare textual form, without a line terminator.
    ///
    /// Used for `{name}` template substitution. Whole floats keep one
    /// decimal place so they stay floats across a parse round trip.
    pub fn text(&self) -> String {
        match self {
            Value::Line(s) => s.clone(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
        }
    }

    /// Canonical serialization: the textual form plus one `\n` terminator.
    ///
    /// This is the form a value takes when laid down as a prompt line.
    pub fn serialize(&self) -> String {
        let mut s = self.text();
        s.push('\n');
        s
    }

    /// Short tag name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Line(_) => "line",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
