//! Event adapter behavior
//!
//! Tests cover:
//! - Sub-frame and tab-less requests pass through untouched
//! - Tab updates without a URL change are ignored
//! - Tab updates with a URL are evaluated like navigations
//! - Lookup failures fail open
//! - Concurrent navigations on different tabs

use super::test_utils::{browser, top_level};
use container_router::coordinator::RedirectEvent;
use container_router::profile::SimulatedBrowser;
use container_router::types::TabId;
use container_router::{RequestDetails, TabChangeInfo};

const PROFILE: &str = r#"
[hosts]
"example.com" = "work-container"

[[tabs]]
id = 1
index = 0
cookieStoreId = "personal-container"

[[tabs]]
id = 2
index = 1
cookieStoreId = "shopping-container"
"#;

#[tokio::test]
async fn test_sub_frames_are_ignored() {
    let b = browser(PROFILE);
    let response = b
        .router
        .on_before_request(RequestDetails {
            url: "https://example.com/".to_string(),
            tab_id: TabId(1),
            frame_id: 7,
        })
        .await;
    assert!(!response.cancel);
    assert_eq!(b.policies.calls(), 0);
}

#[tokio::test]
async fn test_requests_without_tab_are_ignored() {
    let b = browser(PROFILE);
    let response = b
        .router
        .on_before_request(top_level("https://example.com/", -1))
        .await;
    assert!(!response.cancel);
    assert_eq!(b.policies.calls(), 0);
}

#[tokio::test]
async fn test_tab_update_without_url_is_ignored() {
    let b = browser(PROFILE);
    assert!(b
        .router
        .on_tab_updated(TabId(1), TabChangeInfo::default())
        .is_none());
}

#[tokio::test]
async fn test_tab_update_with_url_is_routed() {
    let b = browser(PROFILE);
    let mut events = b.router.subscribe();

    let handle = b
        .router
        .on_tab_updated(
            TabId(1),
            TabChangeInfo {
                url: Some("https://example.com/path".to_string()),
            },
        )
        .expect("url change is evaluated");
    let handled = handle.await.unwrap();
    assert!(handled.response.cancel);
    let (created, _) = handled.tasks.unwrap().join().await;

    let created = created.unwrap();
    let mut saw_created = false;
    while let Ok(event) = events.try_recv() {
        if let RedirectEvent::TabCreated { created: id, .. } = event {
            saw_created = id == created;
        }
    }
    assert!(saw_created);
}

#[tokio::test]
async fn test_lookup_failure_lets_navigation_through() {
    let b = browser(PROFILE);
    b.identities.fail_with("identity service unavailable");

    let handled = b.router.handle_request(top_level("https://example.com/", 1)).await;
    assert!(!handled.response.cancel);
    assert!(handled.tasks.is_none());
    assert!(b.tabs.operations().is_empty());
}

#[tokio::test]
async fn test_any_failed_lookup_lets_navigation_through() {
    let profile = format!(
        "{}\n{}",
        r#"
[preferences]
defaultContainer = true
"defaultContainer.cookieStoreId" = "work-container"
"#,
        PROFILE
    );
    let cases: [(&str, &str, fn(&SimulatedBrowser)); 5] = [
        ("policy store", "https://example.com/", |b| {
            b.policies.fail_with("policy store offline")
        }),
        ("preference store", "https://example.com/", |b| {
            b.preferences.fail_with("preference store offline")
        }),
        ("identity registry", "https://example.com/", |b| {
            b.identities.fail_with("identity registry offline")
        }),
        ("tab state", "https://example.com/", |b| {
            b.tabs.fail_with("tabs offline")
        }),
        ("default resolver", "https://unknown.example/", |b| {
            b.resolver.fail_with("resolver offline")
        }),
    ];

    for (name, url, inject) in cases {
        let b = browser(&profile);
        inject(&b);

        let response = b.router.on_before_request(top_level(url, 1)).await;
        assert!(!response.cancel, "{} failure must not cancel", name);
        assert_eq!(serde_json::to_value(response).unwrap(), serde_json::json!({}));
        assert!(b.tabs.created().is_empty(), "{} failure created a tab", name);
        assert!(b.tabs.removed().is_empty(), "{} failure removed a tab", name);
    }
}

#[tokio::test]
async fn test_vanished_tab_lets_navigation_through() {
    let b = browser(PROFILE);
    let response = b
        .router
        .on_before_request(top_level("https://example.com/", 99))
        .await;
    assert!(!response.cancel);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_navigations_on_different_tabs() {
    let b = browser(PROFILE);
    let router = b.router.clone();

    let (first, second) = tokio::join!(
        router.handle_request(top_level("https://example.com/", 1)),
        router.handle_request(top_level("https://example.com/", 2)),
    );
    assert!(first.response.cancel);
    assert!(second.response.cancel);

    let (a, _) = first.tasks.unwrap().join().await;
    let (c, _) = second.tasks.unwrap().join().await;
    assert_ne!(a.unwrap(), c.unwrap());

    let mut removed = b.tabs.removed();
    removed.sort();
    assert_eq!(removed, vec![TabId(1), TabId(2)]);
    assert!(b
        .tabs
        .all()
        .iter()
        .all(|tab| tab.cookie_store_id.as_str() == "work-container"));
}
