//! Configuration schema definitions.
//!
//! This module defines the per-route query parameter declarations and the
//! store's own settings. All types derive Serde traits so a route table can
//! be written in a config file; declarations can equally be built in code,
//! which is the only way to attach a custom converter.

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::store::converter::{ConverterKind, CustomConverter};

/// Root configuration for the store and its reference host router.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Reference host router settings.
    pub router: RouterConfig,

    /// Route table, root routes first.
    pub routes: Vec<RouteConfig>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Reference host router configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Capacity of the router event broadcast channel.
    pub event_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            event_capacity: 256,
        }
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RouteConfig {
    /// Path relative to the parent, e.g. `"shop"`, `"items/:id"` or `""`.
    pub path: String,

    /// Metadata attached to the route.
    #[serde(default)]
    pub data: RouteData,

    /// Nested routes.
    #[serde(default)]
    pub children: Vec<RouteConfig>,
}

impl RouteConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: RouteData::default(),
            children: Vec::new(),
        }
    }

    pub fn with_query_params(mut self, config: QueryParamsConfig) -> Self {
        self.data.query_params_config = Some(config);
        self
    }

    pub fn with_child(mut self, child: RouteConfig) -> Self {
        self.children.push(child);
        self
    }
}

/// Route metadata consumed by the store.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteData {
    /// The route's query parameter declaration, if any.
    #[serde(alias = "queryParamsConfig")]
    pub query_params_config: Option<QueryParamsConfig>,
}

/// Per-route query parameter declaration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueryParamsConfig {
    /// Supported keys and their defaults.
    #[serde(alias = "defaultValues")]
    pub default_values: IndexMap<String, DefaultSpec>,

    /// Strip every query parameter from this route's URL.
    #[serde(alias = "noQueryParams")]
    pub no_query_params: bool,

    /// Reject keys that are not declared.
    #[serde(alias = "removeUnknown")]
    pub remove_unknown: bool,

    /// Fold in the defaults declared by ancestor routes.
    pub inherit: bool,
}

impl Default for QueryParamsConfig {
    fn default() -> Self {
        Self {
            default_values: IndexMap::new(),
            no_query_params: false,
            remove_unknown: false,
            inherit: true,
        }
    }
}

impl QueryParamsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a key with its default.
    pub fn with_default(mut self, key: impl Into<String>, spec: impl Into<DefaultSpec>) -> Self {
        self.default_values.insert(key.into(), spec.into());
        self
    }

    pub fn no_query_params(mut self) -> Self {
        self.no_query_params = true;
        self
    }

    pub fn remove_unknown(mut self) -> Self {
        self.remove_unknown = true;
        self
    }

    pub fn without_inheritance(mut self) -> Self {
        self.inherit = false;
        self
    }
}

/// A declared default: either a bare literal or a literal with an explicit converter.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultSpec {
    Plain(Value),
    WithConverter { value: Value, converter: ConverterKind },
}

impl DefaultSpec {
    pub fn plain(value: impl Into<Value>) -> Self {
        DefaultSpec::Plain(value.into())
    }

    pub fn with_converter(value: impl Into<Value>, converter: ConverterKind) -> Self {
        DefaultSpec::WithConverter {
            value: value.into(),
            converter,
        }
    }

    /// The default literal.
    pub fn value(&self) -> &Value {
        match self {
            DefaultSpec::Plain(value) | DefaultSpec::WithConverter { value, .. } => value,
        }
    }

    /// The declared converter, or the one implied by the literal.
    pub fn converter(&self) -> ConverterKind {
        match self {
            DefaultSpec::Plain(value) => ConverterKind::infer(value),
            DefaultSpec::WithConverter { converter, .. } => converter.clone(),
        }
    }
}

impl From<Value> for DefaultSpec {
    fn from(value: Value) -> Self {
        DefaultSpec::Plain(value)
    }
}

impl From<&str> for DefaultSpec {
    fn from(value: &str) -> Self {
        DefaultSpec::Plain(Value::from(value))
    }
}

impl From<i32> for DefaultSpec {
    fn from(value: i32) -> Self {
        DefaultSpec::Plain(Value::from(value))
    }
}

impl From<i64> for DefaultSpec {
    fn from(value: i64) -> Self {
        DefaultSpec::Plain(Value::from(value))
    }
}

impl From<f64> for DefaultSpec {
    fn from(value: f64) -> Self {
        DefaultSpec::Plain(Value::from(value))
    }
}

impl From<bool> for DefaultSpec {
    fn from(value: bool) -> Self {
        DefaultSpec::Plain(Value::from(value))
    }
}

/// Converter names usable from a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterName {
    Number,
    String,
    Boolean,
}

impl From<ConverterName> for ConverterKind {
    fn from(name: ConverterName) -> Self {
        match name {
            ConverterName::Number => ConverterKind::Number,
            ConverterName::String => ConverterKind::String,
            ConverterName::Boolean => ConverterKind::Custom(CustomConverter::boolean()),
        }
    }
}

/// The `{ value, type }` form of a default.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SpecForm {
    value: Value,
    #[serde(default, rename = "type", alias = "typeConvertor")]
    converter: Option<ConverterName>,
}

impl<'de> Deserialize<'de> for DefaultSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        if !raw.as_object().is_some_and(|fields| fields.contains_key("value")) {
            return Ok(DefaultSpec::Plain(raw));
        }

        let form = SpecForm::deserialize(raw).map_err(de::Error::custom)?;
        Ok(match form.converter {
            // `{ value = 1 }` without a converter still infers from the literal.
            None => DefaultSpec::Plain(form.value),
            Some(name) => DefaultSpec::WithConverter {
                value: form.value,
                converter: name.into(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.router.event_capacity, 256);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_query_params_config_defaults() {
        let config = QueryParamsConfig::default();
        assert!(config.inherit);
        assert!(!config.no_query_params);
        assert!(!config.remove_unknown);
        assert!(config.default_values.is_empty());
    }

    #[test]
    fn test_default_spec_forms() {
        let toml_src = r#"
            page = { value = 1 }
            sort = "asc"
            size = { value = "10", type = "number" }
            open = { value = false, type = "boolean" }
        "#;
        let specs: IndexMap<String, DefaultSpec> = toml::from_str(toml_src).unwrap();

        assert_eq!(specs["page"], DefaultSpec::Plain(json!(1)));
        assert_eq!(specs["page"].converter(), ConverterKind::Number);
        assert_eq!(specs["sort"].converter(), ConverterKind::String);
        assert_eq!(specs["size"].converter(), ConverterKind::Number);
        assert_eq!(specs["size"].value(), &json!("10"));
        assert_eq!(
            specs["open"].converter(),
            ConverterKind::Custom(CustomConverter::boolean())
        );
    }

    #[test]
    fn test_unknown_converter_name_rejected() {
        let err = toml::from_str::<IndexMap<String, DefaultSpec>>(r#"open = { value = false, type = "bogus" }"#)
            .unwrap_err();
        assert!(err.to_string().contains("bogus"), "{}", err);
    }

    #[test]
    fn test_unknown_spec_field_rejected() {
        let err = toml::from_str::<IndexMap<String, DefaultSpec>>(r#"page = { value = 1, kind = "number" }"#)
            .unwrap_err();
        assert!(err.to_string().contains("kind"), "{}", err);
    }

    #[test]
    fn test_type_convertor_alias() {
        let specs: IndexMap<String, DefaultSpec> =
            toml::from_str(r#"size = { value = "10", typeConvertor = "number" }"#).unwrap();
        assert_eq!(specs["size"], DefaultSpec::with_converter("10", ConverterKind::Number));
    }

    #[test]
    fn test_camel_case_aliases() {
        let toml_src = r#"
            noQueryParams = true
            removeUnknown = true
            inherit = false
            [defaultValues]
            q = "x"
        "#;
        let config: QueryParamsConfig = toml::from_str(toml_src).unwrap();
        assert!(config.no_query_params);
        assert!(config.remove_unknown);
        assert!(!config.inherit);
        assert_eq!(config.default_values["q"], DefaultSpec::plain("x"));
    }

    #[test]
    fn test_route_builder() {
        let route = RouteConfig::new("shop")
            .with_query_params(QueryParamsConfig::new().with_default("page", 1))
            .with_child(RouteConfig::new("items"));

        assert_eq!(route.children.len(), 1);
        let declared = route.data.query_params_config.unwrap();
        assert_eq!(declared.default_values["page"], DefaultSpec::plain(1));
    }
}
