//! Collaborator ports
//!
//! The router never owns browser state. Host rules, preferences, identities, and
//! tabs are reached through these traits so the decision logic can run against
//! the real browser or against the in-memory implementations in [`crate::memory`].

use crate::error::RouterError;
use crate::preferences::{DefaultContainerPreferences, PreferenceValue, Preferences};
use crate::types::{
    CreateTabOptions, HostPolicyEntry, Identity, TabId, TabSnapshot, UpdateTabOptions,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves a URL to a previously learned host rule
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn get(&self, url: &str) -> Result<Option<HostPolicyEntry>, RouterError>;
}

/// User preference storage
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// All stored preferences, overlaid on defaults when `include_defaults` is set
    async fn get_all(&self, include_defaults: bool) -> Result<Preferences, RouterError>;

    /// A single preference value
    async fn get(&self, key: &str) -> Result<PreferenceValue, RouterError>;
}

/// Enumerates container identities
///
/// Implementations must always include the no-container identity.
#[async_trait]
pub trait IdentityRegistry: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Identity>, RouterError>;
}

/// Tab query and mutation primitives
#[async_trait]
pub trait TabState: Send + Sync {
    async fn get(&self, tab_id: TabId) -> Result<TabSnapshot, RouterError>;

    async fn create(&self, options: CreateTabOptions) -> Result<TabSnapshot, RouterError>;

    async fn update(&self, tab_id: TabId, options: UpdateTabOptions) -> Result<(), RouterError>;

    async fn remove(&self, tab_id: TabId) -> Result<(), RouterError>;
}

/// Computes the fallback container for URLs without a host rule
#[async_trait]
pub trait DefaultContainerResolver: Send + Sync {
    async fn build(
        &self,
        preferences: &DefaultContainerPreferences,
        url: &str,
    ) -> Result<Identity, RouterError>;
}

/// The full set of collaborators, shared by the engine and the coordinator
#[derive(Clone)]
pub struct Collaborators {
    pub policies: Arc<dyn PolicyStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub identities: Arc<dyn IdentityRegistry>,
    pub tabs: Arc<dyn TabState>,
    pub default_resolver: Arc<dyn DefaultContainerResolver>,
}
