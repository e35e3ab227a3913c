//! Core value types shared by the engine, the coordinator, and the adapters.
//!
//! Field names serialize in the browser's camelCase so tab snapshots and
//! identities read the same way in profiles as they do in the browser API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Browser tab identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl TabId {
    /// Id the browser reports for requests with no associated tab
    pub const NONE: TabId = TabId(-1);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cookie store id of the no-container identity
pub const NO_CONTAINER_ID: &str = "firefox-default";

/// Opaque identifier of an isolated browsing context
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieStoreId(String);

impl CookieStoreId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The sentinel "not isolated" context
    pub fn no_container() -> Self {
        Self(NO_CONTAINER_ID.to_string())
    }

    pub fn is_no_container(&self) -> bool {
        self.0 == NO_CONTAINER_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CookieStoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CookieStoreId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CookieStoreId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A top-level navigation as seen by the decision engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    pub url: String,
    pub tab_id: TabId,
    pub frame_id: i64,
}

/// Point-in-time view of a browser tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    pub id: TabId,
    pub index: u32,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub incognito: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opener_tab_id: Option<TabId>,
    #[serde(default = "CookieStoreId::no_container")]
    pub cookie_store_id: CookieStoreId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A container identity known to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub cookie_store_id: CookieStoreId,
    pub name: String,
}

impl Identity {
    pub fn new(cookie_store_id: impl Into<CookieStoreId>, name: impl Into<String>) -> Self {
        Self {
            cookie_store_id: cookie_store_id.into(),
            name: name.into(),
        }
    }

    /// The sentinel identity representing "no container"
    pub fn no_container() -> Self {
        Self::new(CookieStoreId::no_container(), "No Container")
    }

    pub fn is_no_container(&self) -> bool {
        self.cookie_store_id.is_no_container()
    }
}

/// A learned host → container rule, resolved by the policy store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPolicyEntry {
    pub cookie_store_id: CookieStoreId,
}

/// Options for creating a tab
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTabOptions {
    pub url: String,
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_store_id: Option<CookieStoreId>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opener_tab_id: Option<TabId>,
}

/// Partial update applied to an existing tab
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTabOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opener_tab_id: Option<TabId>,
}
