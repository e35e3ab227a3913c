//! Routing profiles
//!
//! A profile is a TOML description of browser state: container identities,
//! host rules, preferences and open tabs. Loading one yields a
//! [`SimulatedBrowser`] whose in-memory collaborators back a fully wired
//! [`Router`].
//!
//! ```toml
//! [[identities]]
//! cookieStoreId = "work"
//! name = "Work"
//!
//! [hosts]
//! "example.com" = "work"
//!
//! [preferences]
//! keepOldTabs = false
//!
//! [[tabs]]
//! id = 3
//! index = 0
//! cookieStoreId = "personal"
//! ```

use crate::adapters::Router;
use crate::collaborators::Collaborators;
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::memory::{
    MemoryIdentityRegistry, MemoryPolicyStore, MemoryPreferenceStore, MemoryTabs,
    StaticDefaultResolver,
};
use crate::preferences::Preferences;
use crate::types::{CookieStoreId, Identity, TabSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingProfile {
    #[serde(default)]
    pub identities: Vec<Identity>,

    /// host → cookie store id
    #[serde(default)]
    pub hosts: BTreeMap<String, CookieStoreId>,

    #[serde(default)]
    pub preferences: Preferences,

    #[serde(default)]
    pub tabs: Vec<TabSnapshot>,
}

impl RoutingProfile {
    pub fn load(path: &Path) -> Result<Self, RouterError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, RouterError> {
        let profile: RoutingProfile = toml::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), RouterError> {
        let mut seen = HashSet::new();
        for tab in &self.tabs {
            if tab.id.0 < 0 {
                return Err(RouterError::ConfigError(format!(
                    "Tab id {} must not be negative",
                    tab.id
                )));
            }
            if !seen.insert(tab.id) {
                return Err(RouterError::ConfigError(format!(
                    "Duplicate tab id {}",
                    tab.id
                )));
            }
        }
        if let Some(host) = self.hosts.keys().find(|host| host.trim().is_empty()) {
            return Err(RouterError::ConfigError(format!(
                "Invalid host rule key '{}'",
                host
            )));
        }
        Ok(())
    }

    /// Build the in-memory browser and a router over it
    pub fn into_browser(self, config: &RouterConfig) -> SimulatedBrowser {
        let policies = Arc::new(MemoryPolicyStore::new());
        for (host, container) in &self.hosts {
            policies.insert(host, container.clone());
        }
        let preferences = Arc::new(MemoryPreferenceStore::new(self.preferences));
        let identities = Arc::new(MemoryIdentityRegistry::new(self.identities));
        let tabs = Arc::new(MemoryTabs::new(self.tabs));
        let resolver = Arc::new(StaticDefaultResolver::new());

        let collaborators = Collaborators {
            policies: policies.clone(),
            preferences: preferences.clone(),
            identities: identities.clone(),
            tabs: tabs.clone(),
            default_resolver: resolver.clone(),
        };
        let router = Arc::new(Router::new(collaborators, config));

        SimulatedBrowser {
            policies,
            preferences,
            identities,
            tabs,
            resolver,
            router,
        }
    }
}

/// In-memory browser state plus the router wired over it
pub struct SimulatedBrowser {
    pub policies: Arc<MemoryPolicyStore>,
    pub preferences: Arc<MemoryPreferenceStore>,
    pub identities: Arc<MemoryIdentityRegistry>,
    pub tabs: Arc<MemoryTabs>,
    pub resolver: Arc<StaticDefaultResolver>,
    pub router: Arc<Router>,
}
