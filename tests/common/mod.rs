//! Shared utilities for integration testing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use query_params_store::config::{DefaultSpec, QueryParamsConfig, RouteConfig, RouterConfig};
use query_params_store::{
    ConverterKind, CustomConverter, MemoryRouter, QueryParamsStore, ResolvedState, StateSubscriber,
};

pub const WAIT: Duration = Duration::from_secs(2);

/// `/shop` (page, sort) with children `""` and `items/:id` (open, tab),
/// `/strict` (removeUnknown) and `/plain` (noQueryParams).
#[allow(dead_code)]
pub fn routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("shop")
            .with_query_params(
                QueryParamsConfig::new()
                    .with_default("page", DefaultSpec::plain(1))
                    .with_default("sort", "asc"),
            )
            .with_child(RouteConfig::new(""))
            .with_child(
                RouteConfig::new("items/:id").with_query_params(
                    QueryParamsConfig::new()
                        .with_default(
                            "open",
                            DefaultSpec::with_converter(
                                false,
                                ConverterKind::Custom(CustomConverter::boolean()),
                            ),
                        )
                        .with_default("tab", "details"),
                ),
            ),
        RouteConfig::new("strict")
            .with_query_params(QueryParamsConfig::new().with_default("q", "").remove_unknown()),
        RouteConfig::new("plain").with_query_params(QueryParamsConfig::new().no_query_params()),
    ]
}

/// A router over [`routes`] with a store attached to it.
#[allow(dead_code)]
pub fn attached() -> (Arc<MemoryRouter>, QueryParamsStore) {
    let router = Arc::new(MemoryRouter::new(&routes(), &RouterConfig::default()));
    let store = QueryParamsStore::new();
    store.attach(router.clone());
    (router, store)
}

/// Next published state, failing the test after [`WAIT`].
pub async fn next_state(subscriber: &mut StateSubscriber) -> Arc<ResolvedState> {
    tokio::time::timeout(WAIT, subscriber.next())
        .await
        .expect("timed out waiting for a published state")
        .expect("state channel closed")
}

/// Poll `condition` until it holds, failing the test after [`WAIT`].
#[allow(dead_code)]
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Assert that `future` does not complete within a short grace period.
#[allow(dead_code)]
pub async fn assert_pending<F: Future>(future: F) {
    let outcome = tokio::time::timeout(Duration::from_millis(100), future).await;
    assert!(outcome.is_err(), "expected no completion");
}
