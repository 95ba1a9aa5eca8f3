//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check declared defaults are usable as query parameter values
//! - Check a declared boolean converter has a boolean default
//!   (a string default with the number converter is allowed)
//! - Detect ambiguous sibling routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: StoreConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::config::schema::{QueryParamsConfig, RouteConfig, StoreConfig};
use crate::store::converter::ConverterKind;

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("router.event_capacity must be greater than zero")]
    ZeroEventCapacity,

    #[error("route '{route}' is declared more than once")]
    DuplicateRoute { route: String },

    #[error("route '{route}': default for '{key}' must be a string, number or boolean")]
    NonScalarDefault { route: String, key: String },

    #[error("route '{route}': default for '{key}' does not match its {converter} converter")]
    ConverterMismatch {
        route: String,
        key: String,
        converter: &'static str,
    },

    #[error("route '{route}' sets no_query_params but declares default values")]
    DefaultsWithoutQueryParams { route: String },
}

/// Validate a loaded configuration.
pub fn validate_config(config: &StoreConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.router.event_capacity == 0 {
        errors.push(ValidationError::ZeroEventCapacity);
    }
    validate_routes(&config.routes, "", &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_routes(routes: &[RouteConfig], parent: &str, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();

    for route in routes {
        let full_path = join_path(parent, &route.path);
        if !seen.insert(route.path.trim_matches('/')) {
            errors.push(ValidationError::DuplicateRoute {
                route: full_path.clone(),
            });
        }
        if let Some(declaration) = &route.data.query_params_config {
            validate_declaration(declaration, &full_path, errors);
        }
        validate_routes(&route.children, &full_path, errors);
    }
}

fn validate_declaration(declaration: &QueryParamsConfig, route: &str, errors: &mut Vec<ValidationError>) {
    if declaration.no_query_params && !declaration.default_values.is_empty() {
        errors.push(ValidationError::DefaultsWithoutQueryParams {
            route: route.to_string(),
        });
    }

    for (key, spec) in &declaration.default_values {
        let value = spec.value();
        if !matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)) {
            errors.push(ValidationError::NonScalarDefault {
                route: route.to_string(),
                key: key.clone(),
            });
            continue;
        }

        let mismatch = match spec.converter() {
            ConverterKind::Custom(custom) if custom.name() == "boolean" && !value.is_boolean() => {
                Some("boolean")
            }
            _ => None,
        };
        if let Some(converter) = mismatch {
            errors.push(ValidationError::ConverterMismatch {
                route: route.to_string(),
                key: key.clone(),
                converter,
            });
        }
    }
}

fn join_path(parent: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    match (parent.is_empty(), path.is_empty()) {
        (true, _) => format!("/{}", path),
        (false, true) => parent.to_string(),
        (false, false) if parent == "/" => format!("/{}", path),
        (false, false) => format!("{}/{}", parent, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DefaultSpec;
    use crate::store::converter::CustomConverter;
    use serde_json::json;

    fn shop_config() -> StoreConfig {
        StoreConfig {
            routes: vec![RouteConfig::new("shop").with_query_params(
                QueryParamsConfig::new()
                    .with_default("page", 1)
                    .with_default("sort", "asc"),
            )],
            ..StoreConfig::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&shop_config()).is_ok());
        assert!(validate_config(&StoreConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = shop_config();
        config.router.event_capacity = 0;
        config.routes.push(RouteConfig::new("/shop"));
        config.routes.push(RouteConfig::new("plain").with_query_params(
            QueryParamsConfig::new()
                .no_query_params()
                .with_default("x", DefaultSpec::Plain(json!(["a"]))),
        ));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroEventCapacity,
                ValidationError::DuplicateRoute {
                    route: "/shop".into()
                },
                ValidationError::DefaultsWithoutQueryParams {
                    route: "/plain".into()
                },
                ValidationError::NonScalarDefault {
                    route: "/plain".into(),
                    key: "x".into()
                },
            ]
        );
    }

    #[test]
    fn test_converter_mismatch_in_child_route() {
        let config = StoreConfig {
            routes: vec![RouteConfig::new("shop").with_child(
                RouteConfig::new("items").with_query_params(
                    QueryParamsConfig::new()
                        .with_default(
                            "open",
                            DefaultSpec::with_converter(
                                "yes",
                                ConverterKind::Custom(CustomConverter::boolean()),
                            ),
                        ),
                ),
            )],
            ..StoreConfig::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "route '/shop/items': default for 'open' does not match its boolean converter"
        );
    }

    #[test]
    fn test_string_default_with_number_converter_allowed() {
        let config = StoreConfig {
            routes: vec![RouteConfig::new("list").with_query_params(
                QueryParamsConfig::new()
                    .with_default("size", DefaultSpec::with_converter("10", ConverterKind::Number)),
            )],
            ..StoreConfig::default()
        };
        assert!(validate_config(&config).is_ok());
    }
}
