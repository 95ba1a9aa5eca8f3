//! Schema resolution.
//!
//! # Responsibilities
//! - Pick the leaf route's query parameter declaration
//! - Fold the `default_values` of every ancestor into it (root → leaf)
//! - Derive the per-key converters and flat default values
//!
//! # Design Decisions
//! - Deeper routes override shallower ones on key collisions
//! - Keys keep the position where they were first declared
//! - `no_query_params` is read from the leaf's own declaration only

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::config::schema::{DefaultSpec, QueryParamsConfig};
use crate::routing::snapshot::RouteSnapshot;
use crate::store::converter::ConverterKind;

/// The effective schema of one navigation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedSchema {
    key_type_converter: IndexMap<String, ConverterKind>,
    flat_default_values: Map<String, Value>,
    remove_unknown: bool,
    no_query_params: bool,
}

impl MergedSchema {
    /// Build from already-merged defaults.
    pub fn from_defaults(
        defaults: &IndexMap<String, DefaultSpec>,
        remove_unknown: bool,
        no_query_params: bool,
    ) -> Self {
        let key_type_converter = defaults
            .iter()
            .map(|(key, spec)| (key.clone(), spec.converter()))
            .collect();
        let flat_default_values = defaults
            .iter()
            .map(|(key, spec)| (key.clone(), spec.value().clone()))
            .collect();

        Self {
            key_type_converter,
            flat_default_values,
            remove_unknown,
            no_query_params,
        }
    }

    /// Declared keys, in declaration order.
    pub fn supported_keys(&self) -> impl Iterator<Item = &str> {
        self.key_type_converter.keys().map(String::as_str)
    }

    pub fn supports(&self, key: &str) -> bool {
        self.key_type_converter.contains_key(key)
    }

    /// Converter for a key; undeclared keys are read as strings.
    pub fn converter_for(&self, key: &str) -> ConverterKind {
        self.key_type_converter
            .get(key)
            .cloned()
            .unwrap_or(ConverterKind::String)
    }

    pub fn flat_default(&self, key: &str) -> Option<&Value> {
        self.flat_default_values.get(key)
    }

    pub fn flat_default_values(&self) -> &Map<String, Value> {
        &self.flat_default_values
    }

    pub fn remove_unknown(&self) -> bool {
        self.remove_unknown
    }

    pub fn no_query_params(&self) -> bool {
        self.no_query_params
    }
}

/// Outcome of resolving a leaf route.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The route accepts no query parameters at all.
    ClearQuery,
    /// Validate the query string against this schema.
    Schema(MergedSchema),
}

/// Resolve the effective schema for a leaf snapshot.
pub fn resolve(leaf: &RouteSnapshot) -> Resolution {
    let fallback = QueryParamsConfig::default();
    let declaration = leaf.data().query_params_config.as_ref().unwrap_or(&fallback);

    if declaration.no_query_params {
        return Resolution::ClearQuery;
    }

    let defaults = if declaration.inherit {
        inherited_defaults(leaf, &declaration.default_values)
    } else {
        declaration.default_values.clone()
    };

    Resolution::Schema(MergedSchema::from_defaults(
        &defaults,
        declaration.remove_unknown,
        declaration.no_query_params,
    ))
}

fn inherited_defaults(
    leaf: &RouteSnapshot,
    own: &IndexMap<String, DefaultSpec>,
) -> IndexMap<String, DefaultSpec> {
    // The leaf appears last in path_from_root, so its own values win.
    leaf.path_from_root().fold(own.clone(), |mut acc, route| {
        if let Some(declared) = &route.data().query_params_config {
            for (key, spec) in &declared.default_values {
                acc.insert(key.clone(), spec.clone());
            }
        }
        acc
    })
}
