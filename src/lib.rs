//! Query parameter state store for client-side routers.
//!
//! Keeps an application's query-parameter state in step with the URL while
//! the router navigates. Each route declares a schema (defaults, converters,
//! unknown-parameter policy); on every navigation the store merges the
//! schemas along the route ancestry, validates the query string against it,
//! and either publishes the resolved state or rewrites the URL.
//!
//! # Data Flow
//! ```text
//! router events ──▶ store::gate (Event Gate)
//!                      │ leaf route snapshot
//!                      ▼
//!                  store::resolver (merge schemas root → leaf)
//!                      │ MergedSchema + raw query params
//!                      ▼
//!                  store::validator (convert / validate)
//!                      │
//!          ┌───────────┴────────────┐
//!          ▼                        ▼
//!   corrective redirect       publish ResolvedState
//!   (routing::Navigator)      (store::state subscribers)
//! ```

pub mod config;
pub mod observability;
pub mod routing;
pub mod store;

pub use config::schema::{DefaultSpec, QueryParamsConfig, RouteConfig, RouteData, StoreConfig};
pub use routing::{
    MemoryRouter, NavigationRequest, Navigator, QueryParamsHandling, RouteSnapshot, RouterEvent,
    RouterEvents,
};
pub use store::{
    ConverterKind, CustomConverter, ParamError, QueryParamsStore, ResolvedState, StateHandle,
    StateSubscriber,
};
