//! In-process reference router.
//!
//! # Responsibilities
//! - Recognize URLs against a compiled route table
//! - Emit the lifecycle events of each navigation, in router order
//! - Apply query parameter handling (replace / merge / preserve)
//! - Track the current URL and navigation history
//!
//! # Design Decisions
//! - Navigations run synchronously: every event of a navigation is sent
//!   before `navigate_by_url` returns
//! - Navigating to the current URL is skipped, so a redirect to the same
//!   URL cannot loop
//! - A correction whose origin is not the latest navigation is skipped, so
//!   a slow consumer cannot override a newer navigation
//! - Navigations are serialized by the state lock; events of two
//!   navigations never interleave

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use url::Url;

use crate::config::schema::{RouteConfig, RouterConfig, StoreConfig};
use crate::routing::event::{NavigationId, RouterEvent};
use crate::routing::matcher::RouteTable;
use crate::routing::navigator::{
    NavigationRequest, Navigator, QueryParamsHandling, RouterError, RouterEvents,
};
use crate::routing::snapshot::{QueryParams, RouteSegment, RouteSnapshot};

const BASE_URL: &str = "http://localhost/";

#[derive(Debug, Default)]
struct RouterState {
    url: String,
    query: QueryParams,
    next_id: NavigationId,
    latest: Option<NavigationId>,
    history: Vec<String>,
}

/// A router that lives entirely in memory.
#[derive(Debug)]
pub struct MemoryRouter {
    table: RouteTable,
    events: broadcast::Sender<RouterEvent>,
    state: Mutex<RouterState>,
}

impl MemoryRouter {
    /// Create a router over a route table.
    pub fn new(routes: &[RouteConfig], config: &RouterConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            table: RouteTable::compile(routes),
            events,
            state: Mutex::new(RouterState {
                next_id: 1,
                ..RouterState::default()
            }),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.routes, &config.router)
    }

    /// The current URL; empty before the first navigation.
    pub fn url(&self) -> String {
        self.lock().url.clone()
    }

    /// Every URL successfully navigated to, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Number of live event subscriptions.
    pub fn receiver_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Navigate to an absolute URL such as `/shop?page=2`.
    pub fn navigate_by_url(&self, url: &str) -> Result<bool, RouterError> {
        let mut state = self.lock();
        self.run(&mut state, url)
    }

    fn run(&self, state: &mut RouterState, url: &str) -> Result<bool, RouterError> {
        let parsed = parse_url(url)?;
        let target = canonical_url(&parsed);
        let query: QueryParams = parsed.query_pairs().into_owned().collect();

        if !state.history.is_empty() && state.url == target {
            tracing::debug!(url = %target, "Skipping navigation to the current URL");
            return Ok(false);
        }

        let id = state.next_id;
        state.next_id += 1;
        state.latest = Some(id);
        self.emit(RouterEvent::NavigationStart {
            id,
            url: target.clone(),
        });

        let Some(recognized) = self.table.recognize(parsed.path()) else {
            let error = RouterError::NoMatch(parsed.path().to_string());
            tracing::warn!(id, url = %target, "Navigation failed: no matching route");
            self.emit(RouterEvent::NavigationError {
                id,
                url: target,
                error: error.to_string(),
            });
            return Err(error);
        };

        let mut segments = vec![RouteSegment::default()];
        segments.extend(recognized);
        let snapshots = RouteSnapshot::chain(segments, query.clone());

        self.emit(RouterEvent::RoutesRecognized { id, url: target.clone() });
        self.emit(RouterEvent::GuardsCheckStart { id, url: target.clone() });
        for pair in snapshots.windows(2) {
            self.emit(RouterEvent::ChildActivationStart(pair[0].clone()));
            self.emit(RouterEvent::ActivationStart(pair[1].clone()));
        }
        self.emit(RouterEvent::GuardsCheckEnd { id, url: target.clone() });
        self.emit(RouterEvent::ResolveStart { id, url: target.clone() });
        self.emit(RouterEvent::ResolveEnd { id, url: target.clone() });
        for pair in snapshots.windows(2).rev() {
            self.emit(RouterEvent::ActivationEnd(pair[1].clone()));
            self.emit(RouterEvent::ChildActivationEnd(pair[0].clone()));
        }

        state.url = target.clone();
        state.query = query;
        state.history.push(target.clone());
        self.emit(RouterEvent::NavigationEnd { id, url: target.clone() });

        tracing::debug!(id, url = %target, "Navigation complete");
        Ok(true)
    }

    fn emit(&self, event: RouterEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for MemoryRouter {
    fn navigate(&self, request: NavigationRequest) -> Result<bool, RouterError> {
        // Held from the origin check until the navigation completes.
        let mut state = self.lock();
        if let Some(origin) = request.origin {
            if state.latest != Some(origin) {
                tracing::debug!(
                    origin,
                    latest = ?state.latest,
                    path = %request.path,
                    "Skipping correction of a superseded navigation"
                );
                return Ok(false);
            }
        }

        let mut params = match request.handling {
            QueryParamsHandling::Replace => QueryParams::new(),
            QueryParamsHandling::Merge | QueryParamsHandling::Preserve => state.query.clone(),
        };

        if request.handling != QueryParamsHandling::Preserve {
            for (key, value) in request.query_params {
                match value {
                    Some(value) => {
                        params.insert(key, value);
                    }
                    None => {
                        params.shift_remove(&key);
                    }
                }
            }
        }

        let url = build_url(&request.path, &params);
        self.run(&mut state, &url)
    }
}

impl RouterEvents for MemoryRouter {
    fn subscribe_events(&self) -> broadcast::Receiver<RouterEvent> {
        self.events.subscribe()
    }
}

fn parse_url(url: &str) -> Result<Url, RouterError> {
    Url::parse(BASE_URL)
        .and_then(|base| base.join(url))
        .map_err(|e| RouterError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

fn canonical_url(parsed: &Url) -> String {
    match parsed.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", parsed.path(), query),
        _ => parsed.path().to_string(),
    }
}

/// Join a path and query parameters into a URL.
pub fn build_url(path: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    format!("{}?{}", path, query)
}
