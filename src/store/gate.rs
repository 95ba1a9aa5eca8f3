//! Navigation event gate and per-navigation state machine.
//!
//! # States
//! - Idle: no navigation in progress (or the last one was cancelled)
//! - AwaitingLeaf: navigation started, waiting for the leaf activation
//! - Resolving: the leaf is being resolved and validated
//! - Redirecting: a corrective navigation was issued, nothing published
//! - Published: the resolved state was published
//!
//! # State Transitions
//! ```text
//! any          → AwaitingLeaf: NavigationStart (state reset, state URL captured)
//! AwaitingLeaf → Resolving:    leaf activation arrived
//! Resolving    → Redirecting:  errors or no_query_params
//! Resolving    → Published:    leaf resolved cleanly
//! any          → Idle:         NavigationCancel / NavigationError
//! ```
//!
//! # Design Decisions
//! - Resolution runs synchronously inside the leaf event, so a later
//!   NavigationStart can never race an in-flight resolution
//! - Corrective navigations carry the id of the navigation they correct;
//!   the host drops them once a newer navigation has started, because the
//!   gate may read events long after the router emitted them
//! - Leaf events outside AwaitingLeaf are dropped: at most one resolution
//!   per navigation
//! - ActivationEnd is excluded; every other event is inspected

use std::sync::Arc;

use indexmap::IndexMap;

use crate::observability::metrics;
use crate::routing::event::{NavigationId, RouterEvent};
use crate::routing::navigator::{NavigationRequest, Navigator};
use crate::routing::snapshot::RouteSnapshot;
use crate::store::resolver::{resolve, Resolution};
use crate::store::state::{ResolvedState, StateHandle, StatePublisher};
use crate::store::validator::{validate, ParamError};

/// Where the current navigation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationPhase {
    #[default]
    Idle,
    AwaitingLeaf,
    Resolving,
    Redirecting,
    Published,
}

/// What handling one event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The event carries nothing of interest.
    Ignored,
    /// A navigation started; state was reset.
    Started { state_url: String },
    /// A non-leaf activation started; subscribers were told to wait.
    Suppressed,
    /// A leaf arrived outside AwaitingLeaf and was dropped.
    Skipped,
    /// The route takes no query parameters; the URL was cleared.
    Cleared(NavigationRequest),
    /// Validation failed; the URL was rewritten.
    Redirected {
        request: NavigationRequest,
        errors: IndexMap<String, ParamError>,
    },
    /// The resolved state was published.
    Published(Arc<ResolvedState>),
}

/// Event Gate → Schema Resolver → Param Validator/Rewriter.
#[derive(Debug)]
pub struct Pipeline {
    state: StateHandle,
    publisher: StatePublisher,
    phase: NavigationPhase,
    navigation: Option<NavigationId>,
    state_url: String,
}

impl Pipeline {
    pub fn new(state: StateHandle, publisher: StatePublisher) -> Self {
        Self {
            state,
            publisher,
            phase: NavigationPhase::Idle,
            navigation: None,
            state_url: String::new(),
        }
    }

    pub fn phase(&self) -> NavigationPhase {
        self.phase
    }

    /// Path of the current navigation, used for corrective redirects.
    pub fn state_url(&self) -> &str {
        &self.state_url
    }

    /// Process one router event.
    pub fn handle(&mut self, event: &RouterEvent, navigator: &dyn Navigator) -> Step {
        match event {
            RouterEvent::ActivationEnd(_) => Step::Ignored,
            RouterEvent::NavigationStart { id, url } => self.start(*id, url),
            RouterEvent::NavigationCancel { id, .. } | RouterEvent::NavigationError { id, .. } => {
                if self.navigation == Some(*id) {
                    tracing::debug!(id, phase = ?self.phase, "Navigation abandoned");
                    self.phase = NavigationPhase::Idle;
                }
                Step::Ignored
            }
            RouterEvent::ActivationStart(snapshot) => {
                self.publisher.suppress();
                if snapshot.is_leaf() {
                    self.on_leaf(snapshot, navigator)
                } else {
                    Step::Suppressed
                }
            }
            other => match other.snapshot() {
                Some(snapshot) if snapshot.is_leaf() => self.on_leaf(snapshot, navigator),
                _ => Step::Ignored,
            },
        }
    }

    fn start(&mut self, id: NavigationId, url: &str) -> Step {
        self.state.reset();
        self.state_url = state_url_of(url).to_string();
        if self.state_url.is_empty() {
            tracing::warn!(id, url = %url, "Navigation URL has no path, redirects will target '/'");
            self.state_url = "/".to_string();
        }
        self.navigation = Some(id);
        self.phase = NavigationPhase::AwaitingLeaf;
        metrics::record_navigation();

        tracing::debug!(id, state_url = %self.state_url, "Navigation started");
        Step::Started {
            state_url: self.state_url.clone(),
        }
    }

    fn on_leaf(&mut self, leaf: &RouteSnapshot, navigator: &dyn Navigator) -> Step {
        if self.phase != NavigationPhase::AwaitingLeaf {
            tracing::debug!(phase = ?self.phase, route = %leaf.url_path(), "Dropping leaf outside navigation");
            return Step::Skipped;
        }
        self.phase = NavigationPhase::Resolving;

        let schema = match resolve(leaf) {
            Resolution::ClearQuery => {
                let request = self.correction(NavigationRequest::new(self.state_url.clone()));
                self.phase = NavigationPhase::Redirecting;
                metrics::record_redirect("no_query_params");
                tracing::info!(state_url = %self.state_url, "Route takes no query parameters, clearing URL");
                self.dispatch(navigator, request.clone());
                return Step::Cleared(request);
            }
            Resolution::Schema(schema) => schema,
        };

        let result = validate(&schema, leaf.query_params());
        if !result.is_valid() {
            let request = self.correction(result.redirect_request(&self.state_url));
            self.phase = NavigationPhase::Redirecting;
            for error in result.errors.values() {
                metrics::record_param_error(*error);
            }
            metrics::record_redirect("invalid_params");
            tracing::info!(
                state_url = %self.state_url,
                errors = ?result.errors,
                "Invalid query parameters, rewriting URL"
            );
            self.dispatch(navigator, request.clone());
            return Step::Redirected {
                request,
                errors: result.errors,
            };
        }

        let next = result.merge_into(&self.state.current());
        let published = self.state.replace(next);
        self.publisher.publish(published.clone());
        self.phase = NavigationPhase::Published;
        metrics::record_published(published.len());

        tracing::debug!(state_url = %self.state_url, keys = published.len(), "Query parameter state published");
        Step::Published(published)
    }

    fn correction(&self, request: NavigationRequest) -> NavigationRequest {
        match self.navigation {
            Some(id) => request.correcting(id),
            None => request,
        }
    }

    fn dispatch(&self, navigator: &dyn Navigator, request: NavigationRequest) {
        match navigator.navigate(request) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(state_url = %self.state_url, "Corrective navigation skipped by the router");
            }
            Err(e) => {
                tracing::error!(state_url = %self.state_url, error = %e, "Corrective navigation failed");
            }
        }
    }
}

/// Longest prefix of `url` that contains no `?`.
pub fn state_url_of(url: &str) -> &str {
    url.split('?').next().unwrap_or_default()
}
