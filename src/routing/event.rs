//! Router lifecycle events.
//!
//! A navigation emits, in order: `NavigationStart`, `RoutesRecognized`,
//! `GuardsCheckStart`, a `ChildActivationStart`/`ActivationStart` pair per
//! segment (root → leaf), `GuardsCheckEnd`, `ResolveStart`, `ResolveEnd`,
//! an `ActivationEnd`/`ChildActivationEnd` pair per segment (leaf → root)
//! and finally `NavigationEnd`, `NavigationCancel` or `NavigationError`.

use crate::routing::snapshot::RouteSnapshot;

/// Monotonic id of a navigation.
pub type NavigationId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum RouterEvent {
    NavigationStart { id: NavigationId, url: String },
    RoutesRecognized { id: NavigationId, url: String },
    GuardsCheckStart { id: NavigationId, url: String },
    ChildActivationStart(RouteSnapshot),
    ActivationStart(RouteSnapshot),
    GuardsCheckEnd { id: NavigationId, url: String },
    ResolveStart { id: NavigationId, url: String },
    ResolveEnd { id: NavigationId, url: String },
    ActivationEnd(RouteSnapshot),
    ChildActivationEnd(RouteSnapshot),
    NavigationEnd { id: NavigationId, url: String },
    NavigationCancel { id: NavigationId, url: String, reason: String },
    NavigationError { id: NavigationId, url: String, error: String },
}

impl RouterEvent {
    /// The route snapshot carried by activation events.
    pub fn snapshot(&self) -> Option<&RouteSnapshot> {
        match self {
            RouterEvent::ChildActivationStart(snapshot)
            | RouterEvent::ActivationStart(snapshot)
            | RouterEvent::ActivationEnd(snapshot)
            | RouterEvent::ChildActivationEnd(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            RouterEvent::NavigationStart { .. } => "navigation_start",
            RouterEvent::RoutesRecognized { .. } => "routes_recognized",
            RouterEvent::GuardsCheckStart { .. } => "guards_check_start",
            RouterEvent::ChildActivationStart(_) => "child_activation_start",
            RouterEvent::ActivationStart(_) => "activation_start",
            RouterEvent::GuardsCheckEnd { .. } => "guards_check_end",
            RouterEvent::ResolveStart { .. } => "resolve_start",
            RouterEvent::ResolveEnd { .. } => "resolve_end",
            RouterEvent::ActivationEnd(_) => "activation_end",
            RouterEvent::ChildActivationEnd(_) => "child_activation_end",
            RouterEvent::NavigationEnd { .. } => "navigation_end",
            RouterEvent::NavigationCancel { .. } => "navigation_cancel",
            RouterEvent::NavigationError { .. } => "navigation_error",
        }
    }
}
