//! Typed view over the flat preference mapping.
//!
//! Preferences arrive as loose key → JSON value pairs. The router only reads two
//! concerns from them: whether source tabs are kept after a redirect, and the
//! `defaultContainer*` group handed to the default-container resolver.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

pub const KEY_KEEP_OLD_TABS: &str = "keepOldTabs";
pub const KEY_DEFAULT_CONTAINER: &str = "defaultContainer";

/// Result of a single-key preference read
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreferenceValue {
    pub value: Option<Value>,
}

/// Explicit tri-state for the `keepOldTabs` preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepOldTabs {
    Unset,
    Disabled,
    Enabled,
}

impl KeepOldTabs {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => KeepOldTabs::Unset,
            Some(Value::Bool(true)) => KeepOldTabs::Enabled,
            Some(Value::Bool(false)) => KeepOldTabs::Disabled,
            Some(other) => {
                warn!(value = %other, "Ignoring non-boolean keepOldTabs preference");
                KeepOldTabs::Unset
            }
        }
    }

    /// Source tabs are removed unless the user explicitly keeps them
    pub fn removes_source(self) -> bool {
        !matches!(self, KeepOldTabs::Enabled)
    }
}

/// The `defaultContainer*` preference group, present only when enabled
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultContainerPreferences(BTreeMap<String, Value>);

impl DefaultContainerPreferences {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

/// Flat preference mapping as returned by the preference store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences(BTreeMap<String, Value>);

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in defaults for every preference the router recognizes
    pub fn defaults() -> Self {
        let mut prefs = Self::new();
        prefs.set(KEY_KEEP_OLD_TABS, Value::Bool(false));
        prefs.set(KEY_DEFAULT_CONTAINER, Value::Bool(false));
        prefs
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Overlay `self` on top of the built-in defaults
    pub fn with_defaults(&self) -> Self {
        let mut merged = Self::defaults();
        merged.0.extend(self.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    pub fn keep_old_tabs(&self) -> KeepOldTabs {
        KeepOldTabs::from_value(self.get(KEY_KEEP_OLD_TABS))
    }

    /// The default-container group, or `None` when the fallback is not enabled
    pub fn default_container(&self) -> Option<DefaultContainerPreferences> {
        match self.get(KEY_DEFAULT_CONTAINER) {
            Some(Value::Bool(true)) => Some(DefaultContainerPreferences(
                self.0
                    .iter()
                    .filter(|(key, _)| key.starts_with(KEY_DEFAULT_CONTAINER))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )),
            _ => None,
        }
    }
}

impl FromIterator<(String, Value)> for Preferences {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keep_old_tabs_tri_state() {
        assert_eq!(KeepOldTabs::from_value(None), KeepOldTabs::Unset);
        assert_eq!(KeepOldTabs::from_value(Some(&json!(true))), KeepOldTabs::Enabled);
        assert_eq!(KeepOldTabs::from_value(Some(&json!(false))), KeepOldTabs::Disabled);
        assert_eq!(KeepOldTabs::from_value(Some(&json!("yes"))), KeepOldTabs::Unset);

        assert!(KeepOldTabs::Unset.removes_source());
        assert!(KeepOldTabs::Disabled.removes_source());
        assert!(!KeepOldTabs::Enabled.removes_source());
    }

    #[test]
    fn test_default_container_group_requires_enable_flag() {
        let mut prefs = Preferences::new();
        prefs.set("defaultContainer.containerName", json!("{domain}"));
        assert!(prefs.default_container().is_none());

        prefs.set(KEY_DEFAULT_CONTAINER, json!(true));
        prefs.set(KEY_KEEP_OLD_TABS, json!(true));
        let group = prefs.default_container().unwrap();
        assert_eq!(group.get(KEY_DEFAULT_CONTAINER), Some(&json!(true)));
        assert_eq!(group.get_str("defaultContainer.containerName"), Some("{domain}"));
        assert!(group.get(KEY_KEEP_OLD_TABS).is_none());
    }

    #[test]
    fn test_with_defaults_keeps_stored_values() {
        let mut prefs = Preferences::new();
        prefs.set(KEY_KEEP_OLD_TABS, json!(true));
        let merged = prefs.with_defaults();
        assert_eq!(merged.keep_old_tabs(), KeepOldTabs::Enabled);
        assert_eq!(merged.get(KEY_DEFAULT_CONTAINER), Some(&json!(false)));
    }
}
