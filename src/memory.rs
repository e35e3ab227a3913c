//! In-memory collaborators
//!
//! A small simulated browser: host rules keyed by exact host, a preference map,
//! a fixed identity list and a tab strip. Every collaborator counts its calls and
//! can be switched into a failing state so the fail-open and fail-safe paths can
//! be exercised.

use crate::collaborators::{
    DefaultContainerResolver, IdentityRegistry, PolicyStore, PreferenceStore, TabState,
};
use crate::error::RouterError;
use crate::preferences::{DefaultContainerPreferences, PreferenceValue, Preferences};
use crate::types::{
    CookieStoreId, CreateTabOptions, HostPolicyEntry, Identity, TabId, TabSnapshot,
    UpdateTabOptions,
};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use tracing::trace;
use url::Url;

/// Call counter plus an optional injected failure
#[derive(Debug, Default)]
struct Probe {
    calls: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl Probe {
    fn enter(&self, collaborator: &'static str) -> Result<(), RouterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().as_ref() {
            Some(reason) => Err(RouterError::lookup(collaborator, reason.clone())),
            None => Ok(()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn set_failure(&self, reason: Option<String>) {
        *self.failure.lock() = reason;
    }
}

/// Lower-cased host of `url`, if it has one
pub fn host_of(url: &str) -> Result<Option<String>, RouterError> {
    let parsed = Url::parse(url).map_err(|e| RouterError::InvalidUrl(format!("{}: {}", url, e)))?;
    Ok(parsed.host_str().map(|host| host.to_ascii_lowercase()))
}

/// Host rules matched by exact host name
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    rules: RwLock<HashMap<String, HostPolicyEntry>>,
    probe: Probe,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, host: &str, cookie_store_id: impl Into<CookieStoreId>) {
        self.rules.write().insert(
            host.to_ascii_lowercase(),
            HostPolicyEntry {
                cookie_store_id: cookie_store_id.into(),
            },
        );
    }

    pub fn calls(&self) -> usize {
        self.probe.calls()
    }

    pub fn fail_with(&self, reason: impl Into<String>) {
        self.probe.set_failure(Some(reason.into()));
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn get(&self, url: &str) -> Result<Option<HostPolicyEntry>, RouterError> {
        self.probe.enter("policy store")?;
        let Some(host) = host_of(url)? else {
            return Ok(None);
        };
        let entry = self.rules.read().get(&host).cloned();
        trace!(host = %host, matched = entry.is_some(), "Host rule lookup");
        Ok(entry)
    }
}

/// Preference map with per-key failure injection for single reads
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<Preferences>,
    failing_keys: Mutex<HashSet<String>>,
    probe: Probe,
}

impl MemoryPreferenceStore {
    pub fn new(values: Preferences) -> Self {
        Self {
            values: RwLock::new(values),
            ..Self::default()
        }
    }

    pub fn set(&self, key: &str, value: serde_json::Value) {
        self.values.write().set(key, value);
    }

    pub fn calls(&self) -> usize {
        self.probe.calls()
    }

    /// Make `get_all` fail
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.probe.set_failure(Some(reason.into()));
    }

    /// Make single-key reads of `key` fail
    pub fn fail_key(&self, key: &str) {
        self.failing_keys.lock().insert(key.to_string());
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get_all(&self, include_defaults: bool) -> Result<Preferences, RouterError> {
        self.probe.enter("preference store")?;
        let values = self.values.read();
        Ok(if include_defaults {
            values.with_defaults()
        } else {
            values.clone()
        })
    }

    async fn get(&self, key: &str) -> Result<PreferenceValue, RouterError> {
        if self.failing_keys.lock().contains(key) {
            return Err(RouterError::lookup(
                "preference store",
                format!("read of '{}' failed", key),
            ));
        }
        Ok(PreferenceValue {
            value: self.values.read().get(key).cloned(),
        })
    }
}

/// Fixed identity list that always contains the no-container identity
#[derive(Debug, Default)]
pub struct MemoryIdentityRegistry {
    identities: Vec<Identity>,
    probe: Probe,
}

impl MemoryIdentityRegistry {
    pub fn new(identities: impl IntoIterator<Item = Identity>) -> Self {
        let mut all: Vec<Identity> = identities.into_iter().collect();
        if !all.iter().any(Identity::is_no_container) {
            all.insert(0, Identity::no_container());
        }
        Self {
            identities: all,
            probe: Probe::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.probe.calls()
    }

    pub fn fail_with(&self, reason: impl Into<String>) {
        self.probe.set_failure(Some(reason.into()));
    }
}

#[async_trait]
impl IdentityRegistry for MemoryIdentityRegistry {
    async fn get_all(&self) -> Result<Vec<Identity>, RouterError> {
        self.probe.enter("identity registry")?;
        Ok(self.identities.clone())
    }
}

/// Mutation recorded by [`MemoryTabs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabOperation {
    Created(CreateTabOptions, TabId),
    Updated(TabId, UpdateTabOptions),
    Removed(TabId),
}

/// A single-window tab strip
///
/// Mirrors the browser's behavior of placing a tab created with an opener but no
/// explicit container into the opener's container.
#[derive(Debug)]
pub struct MemoryTabs {
    tabs: RwLock<BTreeMap<TabId, TabSnapshot>>,
    operations: Mutex<Vec<TabOperation>>,
    next_id: AtomicI64,
    probe: Probe,
}

impl MemoryTabs {
    pub fn new(tabs: impl IntoIterator<Item = TabSnapshot>) -> Self {
        let tabs: BTreeMap<TabId, TabSnapshot> =
            tabs.into_iter().map(|tab| (tab.id, tab)).collect();
        let next_id = tabs.keys().map(|id| id.0 + 1).max().unwrap_or(1).max(1);
        Self {
            tabs: RwLock::new(tabs),
            operations: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(next_id),
            probe: Probe::default(),
        }
    }

    /// Snapshot of every open tab, ordered by strip index
    pub fn all(&self) -> Vec<TabSnapshot> {
        let mut tabs: Vec<TabSnapshot> = self.tabs.read().values().cloned().collect();
        tabs.sort_by_key(|tab| tab.index);
        tabs
    }

    pub fn snapshot(&self, tab_id: TabId) -> Option<TabSnapshot> {
        self.tabs.read().get(&tab_id).cloned()
    }

    pub fn operations(&self) -> Vec<TabOperation> {
        self.operations.lock().clone()
    }

    pub fn removed(&self) -> Vec<TabId> {
        self.operations
            .lock()
            .iter()
            .filter_map(|op| match op {
                TabOperation::Removed(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> Vec<(CreateTabOptions, TabId)> {
        self.operations
            .lock()
            .iter()
            .filter_map(|op| match op {
                TabOperation::Created(options, id) => Some((options.clone(), *id)),
                _ => None,
            })
            .collect()
    }

    /// Number of `get` calls served
    pub fn calls(&self) -> usize {
        self.probe.calls()
    }

    /// Make `get` fail
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.probe.set_failure(Some(reason.into()));
    }
}

#[async_trait]
impl TabState for MemoryTabs {
    async fn get(&self, tab_id: TabId) -> Result<TabSnapshot, RouterError> {
        self.probe.enter("tab state")?;
        self.snapshot(tab_id).ok_or(RouterError::TabNotFound(tab_id))
    }

    async fn create(&self, options: CreateTabOptions) -> Result<TabSnapshot, RouterError> {
        let mut tabs = self.tabs.write();

        let cookie_store_id = match (&options.cookie_store_id, options.opener_tab_id) {
            (Some(id), _) => id.clone(),
            (None, Some(opener)) => tabs
                .get(&opener)
                .map(|tab| tab.cookie_store_id.clone())
                .unwrap_or_else(CookieStoreId::no_container),
            (None, None) => CookieStoreId::no_container(),
        };

        let index = options.index.min(tabs.len() as u32);
        for tab in tabs.values_mut() {
            if tab.index >= index {
                tab.index = tab.index.saturating_add(1);
            }
        }

        let id = TabId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let created = TabSnapshot {
            id,
            index,
            active: options.active,
            incognito: false,
            opener_tab_id: options.opener_tab_id,
            cookie_store_id,
            url: Some(options.url.clone()),
        };
        tabs.insert(id, created.clone());
        self.operations
            .lock()
            .push(TabOperation::Created(options, id));
        Ok(created)
    }

    async fn update(&self, tab_id: TabId, options: UpdateTabOptions) -> Result<(), RouterError> {
        let mut tabs = self.tabs.write();
        let tab = tabs
            .get_mut(&tab_id)
            .ok_or(RouterError::TabNotFound(tab_id))?;
        if let Some(opener) = options.opener_tab_id {
            tab.opener_tab_id = Some(opener);
        }
        self.operations
            .lock()
            .push(TabOperation::Updated(tab_id, options));
        Ok(())
    }

    async fn remove(&self, tab_id: TabId) -> Result<(), RouterError> {
        let mut tabs = self.tabs.write();
        let removed = tabs
            .remove(&tab_id)
            .ok_or(RouterError::TabNotFound(tab_id))?;
        for tab in tabs.values_mut() {
            if tab.index > removed.index {
                tab.index -= 1;
            }
        }
        self.operations.lock().push(TabOperation::Removed(tab_id));
        Ok(())
    }
}

pub const KEY_DEFAULT_COOKIE_STORE_ID: &str = "defaultContainer.cookieStoreId";
pub const KEY_DEFAULT_CONTAINER_NAME: &str = "defaultContainer.containerName";

/// Resolves the default container from `defaultContainer.cookieStoreId`
///
/// Never creates containers; falls back to no container when unset.
#[derive(Debug, Default)]
pub struct StaticDefaultResolver {
    probe: Probe,
}

impl StaticDefaultResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.probe.calls()
    }

    pub fn fail_with(&self, reason: impl Into<String>) {
        self.probe.set_failure(Some(reason.into()));
    }
}

#[async_trait]
impl DefaultContainerResolver for StaticDefaultResolver {
    async fn build(
        &self,
        preferences: &DefaultContainerPreferences,
        _url: &str,
    ) -> Result<Identity, RouterError> {
        self.probe.enter("default container resolver")?;
        let Some(id) = preferences.get_str(KEY_DEFAULT_COOKIE_STORE_ID) else {
            return Ok(Identity::no_container());
        };
        let name = preferences
            .get_str(KEY_DEFAULT_CONTAINER_NAME)
            .unwrap_or(id)
            .to_string();
        Ok(Identity::new(id, name))
    }
}
