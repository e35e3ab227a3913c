//! Self-redirect suppression
//!
//! The navigation a created tab reports for its own URL must not be redirected
//! again, and only that one navigation is trusted.

use super::test_utils::{browser, top_level};
use container_router::types::TabId;
use container_router::RoutingAction;

const PROFILE: &str = r#"
[hosts]
"example.com" = "work-container"
"shop.example" = "shopping-container"

[[tabs]]
id = 1
index = 0
cookieStoreId = "personal-container"
"#;

#[tokio::test]
async fn test_created_tab_first_navigation_is_trusted() {
    let b = browser(PROFILE);

    let handled = b.router.handle_request(top_level("https://example.com/", 1)).await;
    let (created, _) = handled.tasks.unwrap().join().await;
    let created = created.unwrap();
    assert!(b.router.engine().tracker().contains(created));

    let lookups_before = b.tabs.calls();
    let echo = b
        .router
        .handle_request(top_level("https://example.com/", created.0))
        .await;
    assert!(!echo.response.cancel);
    assert_eq!(echo.action, RoutingAction::None);
    assert_eq!(b.tabs.calls(), lookups_before);
    assert!(!b.router.engine().tracker().contains(created));
    assert_eq!(b.tabs.created().len(), 1);
}

#[tokio::test]
async fn test_created_tab_later_navigation_is_evaluated() {
    let b = browser(PROFILE);

    let handled = b.router.handle_request(top_level("https://example.com/", 1)).await;
    let (created, _) = handled.tasks.unwrap().join().await;
    let created = created.unwrap();

    let next = b
        .router
        .handle_request(top_level("https://shop.example/", created.0))
        .await;
    assert!(next.response.cancel);
    let (second, _) = next.tasks.unwrap().join().await;
    assert_ne!(second.unwrap(), created);
    assert!(b.tabs.snapshot(created).is_none());
    assert_eq!(b.tabs.removed(), vec![TabId(1), created]);
}
