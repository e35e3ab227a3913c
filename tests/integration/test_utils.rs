//! Shared helpers: build a simulated browser from a profile snippet.

use container_router::config::RouterConfig;
use container_router::profile::{RoutingProfile, SimulatedBrowser};
use container_router::RequestDetails;
use container_router::types::TabId;

/// Identities used by every scenario; tab and host sections are appended per test
pub const BASE_PROFILE: &str = r#"
[[identities]]
cookieStoreId = "work-container"
name = "Work"

[[identities]]
cookieStoreId = "personal-container"
name = "Personal"

[[identities]]
cookieStoreId = "shopping-container"
name = "Shopping"
"#;

pub fn browser(extra: &str) -> SimulatedBrowser {
    let text = format!("{}\n{}", BASE_PROFILE, extra);
    RoutingProfile::from_toml_str(&text)
        .expect("valid profile")
        .into_browser(&RouterConfig::default())
}

pub fn top_level(url: &str, tab: i64) -> RequestDetails {
    RequestDetails {
        url: url.to_string(),
        tab_id: TabId(tab),
        frame_id: 0,
    }
}
