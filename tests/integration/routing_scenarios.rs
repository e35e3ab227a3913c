//! End-to-end routing scenarios
//!
//! Tests cover:
//! - Host rule into another container
//! - Unknown host with and without a default container
//! - Host rule to no container
//! - Private tabs
//! - keepOldTabs handling

use super::test_utils::{browser, top_level};
use container_router::coordinator::DisposalOutcome;
use container_router::types::{CookieStoreId, TabId};
use container_router::RoutingAction;

#[tokio::test]
async fn test_host_rule_moves_navigation_into_work_container() {
    let b = browser(
        r#"
[hosts]
"example.com" = "work-container"

[[tabs]]
id = 1
index = 0
cookieStoreId = "personal-container"

[[tabs]]
id = 2
index = 1
active = true
cookieStoreId = "personal-container"
"#,
    );

    let handled = b.router.handle_request(top_level("https://example.com/", 2)).await;
    assert!(handled.response.cancel);

    let (created, disposal) = handled.tasks.expect("redirect launched").join().await;
    let created = created.unwrap();
    assert_eq!(disposal.unwrap(), DisposalOutcome::Removed);

    let (options, _) = b.tabs.created().pop().unwrap();
    assert_eq!(options.index, 2);
    assert_eq!(options.cookie_store_id, Some(CookieStoreId::new("work-container")));
    assert!(options.active);

    let tab = b.tabs.snapshot(created).unwrap();
    assert_eq!(tab.cookie_store_id, CookieStoreId::new("work-container"));
    assert!(b.tabs.snapshot(TabId(2)).is_none());
    assert_eq!(b.tabs.removed(), vec![TabId(2)]);
}

#[tokio::test]
async fn test_unknown_host_without_default_does_nothing() {
    let b = browser(
        r#"
[[tabs]]
id = 1
index = 0
cookieStoreId = "personal-container"
"#,
    );

    let handled = b
        .router
        .handle_request(top_level("https://unknown.example/", 1))
        .await;
    assert!(!handled.response.cancel);
    assert_eq!(handled.action, RoutingAction::None);
    assert!(handled.tasks.is_none());
    assert!(b.tabs.operations().is_empty());
}

#[tokio::test]
async fn test_unknown_host_with_default_container() {
    let b = browser(
        r#"
[preferences]
defaultContainer = true
"defaultContainer.cookieStoreId" = "shopping-container"

[[tabs]]
id = 1
index = 0
cookieStoreId = "personal-container"
"#,
    );

    let handled = b
        .router
        .handle_request(top_level("https://unknown.example/", 1))
        .await;
    assert!(handled.response.cancel);
    let (created, _) = handled.tasks.unwrap().join().await;

    let tab = b.tabs.snapshot(created.unwrap()).unwrap();
    assert_eq!(tab.cookie_store_id, CookieStoreId::new("shopping-container"));
    assert_eq!(b.resolver.calls(), 1);
}

#[tokio::test]
async fn test_no_container_rule_reopens_uncontained_with_opener() {
    let b = browser(
        r#"
[hosts]
"bank.example" = "firefox-default"

[[tabs]]
id = 1
index = 0
cookieStoreId = "shopping-container"

[[tabs]]
id = 2
index = 1
openerTabId = 1
cookieStoreId = "shopping-container"
"#,
    );

    let handled = b.router.handle_request(top_level("https://bank.example/", 2)).await;
    assert!(handled.response.cancel);
    match &handled.action {
        RoutingAction::Redirect(plan) => assert_eq!(plan.target, None),
        RoutingAction::None => panic!("expected a redirect"),
    }

    let (created, _) = handled.tasks.unwrap().join().await;
    let tab = b.tabs.snapshot(created.unwrap()).unwrap();
    assert!(tab.cookie_store_id.is_no_container());
    assert_eq!(tab.opener_tab_id, Some(TabId(1)));

    let (options, _) = b.tabs.created().pop().unwrap();
    assert_eq!(options.cookie_store_id, None);
    assert_eq!(options.opener_tab_id, None);
}

#[tokio::test]
async fn test_private_tab_is_left_alone() {
    let b = browser(
        r#"
[hosts]
"example.com" = "work-container"

[[tabs]]
id = 1
index = 0
incognito = true
cookieStoreId = "firefox-private"
"#,
    );

    let response = b.router.on_before_request(top_level("https://example.com/", 1)).await;
    assert!(!response.cancel);
    assert!(b.tabs.operations().is_empty());
}

#[tokio::test]
async fn test_keep_old_tabs_preference_keeps_source() {
    let b = browser(
        r#"
[hosts]
"example.com" = "work-container"

[preferences]
keepOldTabs = true

[[tabs]]
id = 1
index = 0
cookieStoreId = "personal-container"
"#,
    );

    let handled = b.router.handle_request(top_level("https://example.com/", 1)).await;
    let (_, disposal) = handled.tasks.unwrap().join().await;
    assert_eq!(disposal.unwrap(), DisposalOutcome::Kept);
    assert!(b.tabs.snapshot(TabId(1)).is_some());
    assert_eq!(b.tabs.all().len(), 2);
}

#[tokio::test]
async fn test_keep_old_tabs_read_failure_removes_source() {
    let b = browser(
        r#"
[hosts]
"example.com" = "work-container"

[preferences]
keepOldTabs = true

[[tabs]]
id = 1
index = 0
cookieStoreId = "personal-container"
"#,
    );
    b.preferences.fail_key("keepOldTabs");

    let handled = b.router.handle_request(top_level("https://example.com/", 1)).await;
    let (_, disposal) = handled.tasks.unwrap().join().await;
    assert_eq!(disposal.unwrap(), DisposalOutcome::Removed);
    assert_eq!(b.tabs.removed(), vec![TabId(1)]);
}
