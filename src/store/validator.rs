//! Query parameter validation and rewriting.
//!
//! # Responsibilities
//! - Decode and convert each raw query parameter with its key's converter
//! - Substitute the declared default for values that fail conversion
//! - Reject undeclared keys when the schema asks for it
//! - Produce either the next resolved state or a corrective navigation
//!
//! # Design Decisions
//! - Errors never escape: they are collected per navigation and fixed by
//!   rewriting the URL
//! - The corrective navigation merges with the current query string and
//!   explicitly unsets every key that failed
//! - Values are percent-decoded once more, on top of the router's decoding;
//!   a `%` not followed by two hex digits, or an escape sequence that is not
//!   UTF-8, is a conversion failure
//! - Custom converters extend the Number/String accept rule: any value they
//!   return is accepted, `None` is a failure

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::routing::navigator::{NavigationRequest, QueryParamsHandling};
use crate::routing::snapshot::QueryParams;
use crate::store::converter::query_string_value;
use crate::store::resolver::MergedSchema;
use crate::store::state::ResolvedState;

/// Why a query parameter was rejected.
///
/// The `Display` text is the reason reported for the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ParamError {
    #[error("Invalid number")]
    InvalidNumber,

    #[error("Invalid string")]
    InvalidString,

    #[error("Unknown param")]
    UnknownParam,
}

impl ParamError {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            ParamError::InvalidNumber => "invalid_number",
            ParamError::InvalidString => "invalid_string",
            ParamError::UnknownParam => "unknown_param",
        }
    }

    fn conversion(is_valid_number: bool) -> Self {
        // Names the number check whenever it did not pass, whatever the converter.
        if !is_valid_number {
            ParamError::InvalidNumber
        } else {
            ParamError::InvalidString
        }
    }
}

/// Result of validating one navigation's query string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
    /// Accepted (converted or defaulted) values.
    pub query_params: Map<String, Value>,
    /// Rejected keys.
    pub errors: IndexMap<String, ParamError>,
    /// Defaults of the merged schema.
    pub flat_default_values: Map<String, Value>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Navigation that rewrites the URL: accepted values are kept and every
    /// rejected key is removed.
    pub fn redirect_request(&self, state_url: &str) -> NavigationRequest {
        let mut request = NavigationRequest::new(state_url).handling(QueryParamsHandling::Merge);
        for (key, value) in &self.query_params {
            request
                .query_params
                .insert(key.clone(), query_string_value(value));
        }
        for key in self.errors.keys() {
            request.query_params.insert(key.clone(), None);
        }
        request
    }

    /// Next state: previous values, then defaults, then accepted values.
    pub fn merge_into(&self, previous: &ResolvedState) -> ResolvedState {
        let mut merged = previous.as_map().clone();
        for (key, value) in self.flat_default_values.iter().chain(&self.query_params) {
            merged.insert(key.clone(), value.clone());
        }
        ResolvedState::from(merged)
    }
}

/// Validate raw query parameters against a merged schema.
pub fn validate(schema: &MergedSchema, query_params: &QueryParams) -> ValidationResult {
    let mut result = ValidationResult {
        flat_default_values: schema.flat_default_values().clone(),
        ..ValidationResult::default()
    };

    for (key, raw) in query_params {
        if schema.supports(key) || (!schema.no_query_params() && !schema.remove_unknown()) {
            let converter = schema.converter_for(key);
            let converted = decode_component(raw).and_then(|decoded| converter.convert(&decoded));

            let is_valid_number = converter.is_number() && converted.is_some();
            let is_valid_string = converter.is_string() && converted.as_ref().is_some_and(Value::is_string);
            let is_valid_custom = !converter.is_number() && !converter.is_string() && converted.is_some();

            match converted {
                Some(value) if is_valid_number || is_valid_string || is_valid_custom => {
                    result.query_params.insert(key.clone(), value);
                }
                _ => {
                    if let Some(default) = schema.flat_default(key) {
                        result.query_params.insert(key.clone(), default.clone());
                    }
                    let error = ParamError::conversion(is_valid_number);
                    tracing::debug!(key = %key, value = %raw, reason = %error, "Rejected query parameter");
                    result.errors.insert(key.clone(), error);
                }
            }
        } else if schema.remove_unknown() {
            tracing::debug!(key = %key, "Rejected unknown query parameter");
            result.errors.insert(key.clone(), ParamError::UnknownParam);
        }
    }

    result
}

/// Decode a URI component. `None` on a malformed escape or invalid UTF-8.
fn decode_component(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.iter().enumerate().all(|(i, b)| {
        *b != b'%'
            || (bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    });
    if !well_formed {
        return None;
    }
    percent_decode_str(raw).decode_utf8().ok().map(|decoded| decoded.into_owned())
}
