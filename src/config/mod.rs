//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → StoreConfig (validated, immutable)
//!     → route table handed to the host router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Route declarations built in code skip the loader entirely

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    DefaultSpec, ObservabilityConfig, QueryParamsConfig, RouteConfig, RouteData, RouterConfig,
    StoreConfig,
};
pub use validation::ValidationError;
