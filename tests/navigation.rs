//! End-to-end navigation tests: router events in, resolved state out.

use serde::Deserialize;
use serde_json::json;

use query_params_store::QueryParamsStore;

mod common;

#[tokio::test]
async fn test_defaults_published_for_bare_url() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/shop").unwrap();
    let state = common::next_state(&mut states).await;

    assert_eq!(state.to_value(), json!({"page": 1, "sort": "asc"}));
    assert_eq!(store.current(), state);
}

#[tokio::test]
async fn test_valid_values_are_converted() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/shop?page=3&sort=desc").unwrap();
    let state = common::next_state(&mut states).await;

    assert_eq!(state.get("page"), Some(&json!(3)));
    assert_eq!(state.get("sort"), Some(&json!("desc")));
}

#[tokio::test]
async fn test_invalid_number_rewrites_url_then_publishes() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/shop?page=abc&sort=desc").unwrap();
    let state = common::next_state(&mut states).await;

    assert_eq!(state.to_value(), json!({"page": 1, "sort": "desc"}));
    assert_eq!(router.url(), "/shop?sort=desc");
    assert_eq!(router.history(), vec!["/shop?page=abc&sort=desc", "/shop?sort=desc"]);
}

#[tokio::test]
async fn test_no_query_params_strips_query_without_publishing() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/plain?x=1").unwrap();
    common::wait_until(|| router.url() == "/plain").await;

    common::assert_pending(states.next()).await;
    assert!(store.current().is_empty());
}

#[tokio::test]
async fn test_unknown_params_removed_when_declared_strict() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/strict?q=rust&junk=1").unwrap();
    let state = common::next_state(&mut states).await;

    assert_eq!(state.to_value(), json!({"q": "rust"}));
    assert_eq!(router.url(), "/strict?q=rust");
}

#[tokio::test]
async fn test_unknown_params_pass_through_by_default() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/shop?page=2&ref=mail").unwrap();
    let state = common::next_state(&mut states).await;

    assert_eq!(state.to_value(), json!({"page": 2, "sort": "asc", "ref": "mail"}));
    assert_eq!(router.history().len(), 1);
}

#[tokio::test]
async fn test_leaf_inherits_ancestor_defaults() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/shop/items/7?open=true").unwrap();
    let state = common::next_state(&mut states).await;

    assert_eq!(
        state.to_value(),
        json!({"open": true, "tab": "details", "page": 1, "sort": "asc"})
    );
}

#[tokio::test]
async fn test_custom_converter_failure_redirects() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/shop/items/7?open=maybe&tab=reviews").unwrap();
    let state = common::next_state(&mut states).await;

    assert_eq!(state.get("open"), Some(&json!(false)));
    assert_eq!(state.get("tab"), Some(&json!("reviews")));
    assert_eq!(router.url(), "/shop/items/7?tab=reviews");
}

#[tokio::test]
async fn test_values_decoded_again_after_router() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    // The router decodes %25 to '%'; the store decodes the remaining %20.
    router.navigate_by_url("/shop?sort=a%2520b").unwrap();
    let state = common::next_state(&mut states).await;

    assert_eq!(state.get("sort"), Some(&json!("a b")));
}

#[tokio::test]
async fn test_each_navigation_starts_from_empty_state() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/shop?page=5&ref=mail").unwrap();
    let first = common::next_state(&mut states).await;
    assert_eq!(first.get("ref"), Some(&json!("mail")));

    router.navigate_by_url("/shop?page=6").unwrap();
    let second = common::next_state(&mut states).await;
    assert_eq!(second.to_value(), json!({"page": 6, "sort": "asc"}));
}

#[tokio::test]
async fn test_late_subscriber_receives_latest_state() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/shop?page=8").unwrap();
    let published = common::next_state(&mut states).await;

    let late = store.first_state().await.unwrap();
    assert_eq!(late, published);
}

#[tokio::test]
async fn test_state_deserializes_into_application_type() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Shop {
        page: u32,
        sort: String,
    }

    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/shop?sort=desc").unwrap();
    let state = common::next_state(&mut states).await;

    let shop: Shop = state.to_typed().unwrap();
    assert_eq!(shop, Shop { page: 1, sort: "desc".into() });
}

#[tokio::test]
async fn test_attach_twice_keeps_one_subscription() {
    let (router, store) = common::attached();

    assert!(!store.attach(router.clone()));
    assert_eq!(router.receiver_count(), 1);
}

#[tokio::test]
async fn test_detach_releases_router_subscription() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    assert!(store.detach());
    common::wait_until(|| router.receiver_count() == 0).await;

    router.navigate_by_url("/shop?page=2").unwrap();
    common::assert_pending(states.next()).await;
}

#[tokio::test]
async fn test_subscribers_survive_reattach() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    store.detach();
    assert!(store.attach(router.clone()));

    router.navigate_by_url("/shop?page=9").unwrap();
    let state = common::next_state(&mut states).await;
    assert_eq!(state.get("page"), Some(&json!(9)));
}

#[tokio::test]
async fn test_dropping_store_releases_router_subscription() {
    let (router, store) = common::attached();
    assert_eq!(router.receiver_count(), 1);

    drop(store);
    common::wait_until(|| router.receiver_count() == 0).await;
}

#[tokio::test]
async fn test_two_stores_on_one_router() {
    let (router, first) = common::attached();
    let second = QueryParamsStore::new();
    second.attach(router.clone());

    let mut a = first.subscribe();
    let mut b = second.subscribe();
    router.navigate_by_url("/shop?page=4").unwrap();

    assert_eq!(common::next_state(&mut a).await, common::next_state(&mut b).await);
}

#[tokio::test]
async fn test_newer_navigation_wins_over_stale_correction() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    // Both navigations complete before the store reads any event.
    router.navigate_by_url("/shop?page=abc").unwrap();
    router.navigate_by_url("/strict?q=x").unwrap();

    let state = common::next_state(&mut states).await;
    assert_eq!(state.to_value(), json!({"q": "x"}));
    assert_eq!(router.url(), "/strict?q=x");
    assert_eq!(router.history(), vec!["/shop?page=abc", "/strict?q=x"]);
}

#[tokio::test]
async fn test_state_delivered_before_non_publishing_navigation() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/shop?page=2").unwrap();
    router.navigate_by_url("/plain?x=1").unwrap();

    let state = common::next_state(&mut states).await;
    assert_eq!(state.to_value(), json!({"page": 2, "sort": "asc"}));
    common::wait_until(|| router.url() == "/plain").await;
    common::assert_pending(states.next()).await;
}

#[tokio::test]
async fn test_back_to_back_navigations_publish_in_order() {
    let (router, store) = common::attached();
    let mut states = store.subscribe();

    router.navigate_by_url("/shop?page=2").unwrap();
    router.navigate_by_url("/shop?page=3").unwrap();

    let first = common::next_state(&mut states).await;
    let second = common::next_state(&mut states).await;
    assert_eq!(first.get("page"), Some(&json!(2)));
    assert_eq!(second.get("page"), Some(&json!(3)));
    assert_eq!(store.current(), second);
}

#[tokio::test]
async fn test_first_state_resolves_after_following_navigation() {
    let (router, store) = common::attached();

    router.navigate_by_url("/shop?page=2").unwrap();
    let pending = store.subscribe();
    router.navigate_by_url("/plain").unwrap();

    let state = tokio::time::timeout(common::WAIT, pending.first())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.get("page"), Some(&json!(2)));
}
