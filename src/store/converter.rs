//! Type converters for query parameter values.
//!
//! # Responsibilities
//! - Turn a decoded query-string value into a typed JSON value
//! - Parse numbers the way browsers' `Number(..)` does
//! - Let applications plug in their own conversions
//! - Render typed values back into query-string text
//!
//! # Design Decisions
//! - The converter is attached per key when the schema is resolved,
//!   never inferred from a value at validation time
//! - Non-finite numbers are rejected: JSON cannot carry them
//! - Integral numbers are stored as integers so `2` round-trips as `"2"`

use std::fmt;
use std::sync::Arc;

use serde_json::{Number, Value};

/// Largest integer magnitude an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Signature of a user-supplied conversion.
pub type ConvertFn = dyn Fn(&str) -> Option<Value> + Send + Sync;

/// A named, application-provided converter.
///
/// Returning `None` marks the raw value as invalid.
#[derive(Clone)]
pub struct CustomConverter {
    name: Arc<str>,
    convert: Arc<ConvertFn>,
}

impl CustomConverter {
    /// Create a converter from a closure.
    pub fn new<F>(name: impl Into<Arc<str>>, convert: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            convert: Arc::new(convert),
        }
    }

    /// Accepts exactly `true` / `false`.
    pub fn boolean() -> Self {
        Self::new("boolean", |raw| match raw {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn convert(&self, raw: &str) -> Option<Value> {
        (self.convert)(raw)
    }
}

impl fmt::Debug for CustomConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomConverter").field(&self.name).finish()
    }
}

// Closures cannot be compared; two converters are the same if they share a name.
impl PartialEq for CustomConverter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// How a key's raw value is converted.
#[derive(Debug, Clone, PartialEq)]
pub enum ConverterKind {
    Number,
    String,
    Custom(CustomConverter),
}

impl ConverterKind {
    /// Converter implied by a plain default literal.
    pub fn infer(default: &Value) -> Self {
        if default.is_number() {
            ConverterKind::Number
        } else {
            ConverterKind::String
        }
    }

    /// Convert an already-decoded value. `None` means conversion failed.
    pub fn convert(&self, decoded: &str) -> Option<Value> {
        match self {
            ConverterKind::Number => parse_js_number(decoded).and_then(number_value),
            ConverterKind::String => Some(Value::String(decoded.to_string())),
            ConverterKind::Custom(custom) => custom.convert(decoded),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, ConverterKind::Number)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, ConverterKind::String)
    }
}

/// Parse a string with the semantics of `Number(..)`.
///
/// Surrounding whitespace is ignored, an empty string is `0`, `0x`/`0o`/`0b`
/// prefixes select a radix and `Infinity` is accepted with an optional sign.
/// Returns `None` where `Number(..)` would yield `NaN`.
pub fn parse_js_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if trimmed.is_empty() {
        return Some(0.0);
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        return u128::from_str_radix(digits, radix).ok().map(|n| n as f64);
    }

    let unsigned = trimmed.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return Some(if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    // Rust's float parser also accepts "inf" and "nan", which Number() does not.
    let numeric_chars = unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !numeric_chars {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Wrap a parsed number as a JSON value, preferring integers.
pub fn number_value(n: f64) -> Option<Value> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        return Some(Value::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number)
}

/// Render a typed value as query-string text. `Null` means "unset".
pub fn query_string_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
