//! Host router interfaces.
//!
//! # Responsibilities
//! - Describe a navigation request (target path, query patch, handling mode)
//! - Define the two capabilities the store needs from a router:
//!   an event stream and an imperative `navigate`
//!
//! # Design Decisions
//! - Query patches distinguish "set" from "unset" explicitly (`Option`)
//! - `navigate` is fire-and-forget from the store's point of view:
//!   the resulting events come back through the event stream
//! - A request may name the navigation it corrects (`origin`); hosts drop
//!   it once a newer navigation has started

use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::routing::event::{NavigationId, RouterEvent};

/// How a navigation treats the current URL's query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryParamsHandling {
    /// Use only the request's parameters.
    #[default]
    Replace,
    /// Apply the request's parameters on top of the current ones.
    Merge,
    /// Keep the current parameters, ignoring the request's.
    Preserve,
}

/// An imperative navigation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigationRequest {
    /// Target path without query string.
    pub path: String,
    /// Parameters to set (`Some`) or remove (`None`).
    pub query_params: IndexMap<String, Option<String>>,
    pub handling: QueryParamsHandling,
    /// Navigation this request corrects, if any.
    pub origin: Option<NavigationId>,
}

impl NavigationRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), Some(value.into()));
        self
    }

    pub fn unset(mut self, key: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), None);
        self
    }

    pub fn handling(mut self, handling: QueryParamsHandling) -> Self {
        self.handling = handling;
        self
    }

    /// Mark the request as a correction of navigation `id`.
    pub fn correcting(mut self, id: NavigationId) -> Self {
        self.origin = Some(id);
        self
    }
}

/// Errors reported by a host router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("no route matches '{0}'")]
    NoMatch(String),

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Performs navigations.
pub trait Navigator: Send + Sync {
    /// Start a navigation. Returns `false` when the router skipped it:
    /// the target equals the current URL, or `origin` is no longer the
    /// latest navigation.
    fn navigate(&self, request: NavigationRequest) -> Result<bool, RouterError>;
}

/// Source of router lifecycle events.
pub trait RouterEvents: Send + Sync {
    /// Subscribe to every event emitted from now on.
    fn subscribe_events(&self) -> broadcast::Receiver<RouterEvent>;
}
