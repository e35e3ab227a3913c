//! Routing Decision Engine
//!
//! Given a navigation (`url`, `tab_id`) the engine decides whether the URL must be
//! re-opened in another container. Three policy sources feed the decision:
//!
//! - the host rule learned for the URL, if any
//! - the default-container fallback, when enabled in preferences
//! - the container the tab currently lives in
//!
//! All four lookups (host rule, preferences, identities, tab snapshot) are issued
//! concurrently and joined. A failed lookup fails the whole decision; the engine
//! never decides on partial data.

use crate::collaborators::Collaborators;
use crate::config::RoutingConfig;
use crate::error::RouterError;
use crate::preferences::Preferences;
use crate::tracker::{InFlightCheck, InFlightTracker};
use crate::types::{CookieStoreId, HostPolicyEntry, Identity, TabId, TabSnapshot};
use std::sync::Arc;
use tracing::{debug, trace};

/// Why a redirect was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// Host rule names a container other than the tab's
    HostRule,
    /// Host rule says "no container" and the tab is contained
    LeaveContainer,
    /// No host rule; the default container differs from the tab's
    DefaultContainer,
}

/// Everything the coordinator needs to re-open a navigation elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPlan {
    pub url: String,
    pub insert_index: u32,
    pub source_tab_id: TabId,
    pub opener_tab_id: Option<TabId>,
    /// `None` opens the tab without an explicit container
    pub target: Option<CookieStoreId>,
    pub reason: RedirectReason,
}

impl RedirectPlan {
    fn from_tab(
        url: &str,
        tab: &TabSnapshot,
        target: Option<CookieStoreId>,
        reason: RedirectReason,
    ) -> Self {
        Self {
            url: url.to_string(),
            insert_index: tab.index.saturating_add(1),
            source_tab_id: tab.id,
            opener_tab_id: tab.opener_tab_id,
            target,
            reason,
        }
    }
}

/// Result of a routing decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingAction {
    None,
    Redirect(RedirectPlan),
}

impl RoutingAction {
    pub fn is_redirect(&self) -> bool {
        matches!(self, RoutingAction::Redirect(_))
    }
}

pub struct RoutingEngine {
    collaborators: Collaborators,
    tracker: Arc<InFlightTracker>,
    ignored_schemes: Vec<String>,
}

impl RoutingEngine {
    pub fn new(
        collaborators: Collaborators,
        tracker: Arc<InFlightTracker>,
        config: &RoutingConfig,
    ) -> Self {
        Self {
            collaborators,
            tracker,
            ignored_schemes: config.ignored_schemes.clone(),
        }
    }

    pub fn tracker(&self) -> &Arc<InFlightTracker> {
        &self.tracker
    }

    /// True for browser-internal URLs that are never routed
    pub fn is_ignored_url(&self, url: &str) -> bool {
        match url.split_once(':') {
            Some((scheme, _)) => self
                .ignored_schemes
                .iter()
                .any(|ignored| ignored.eq_ignore_ascii_case(scheme)),
            None => false,
        }
    }

    /// Decide what to do with a navigation of `tab_id` to `url`
    pub async fn decide(&self, url: &str, tab_id: TabId) -> Result<RoutingAction, RouterError> {
        if self.is_ignored_url(url) {
            trace!(url, "Ignoring internal URL");
            return Ok(RoutingAction::None);
        }

        if self.tracker.check(tab_id, url) == InFlightCheck::Suppressed {
            debug!(tab_id = %tab_id, url, "Navigation caused by our own redirect");
            return Ok(RoutingAction::None);
        }

        let c = &self.collaborators;
        let (host_rule, preferences, identities, tab) = futures::try_join!(
            c.policies.get(url),
            c.preferences.get_all(true),
            c.identities.get_all(),
            c.tabs.get(tab_id),
        )?;

        if tab.incognito {
            trace!(tab_id = %tab_id, "Private tabs are never routed");
            return Ok(RoutingAction::None);
        }

        let action = match host_rule {
            Some(rule) => evaluate_host_rule(url, &tab, &rule, &identities),
            None => self.evaluate_fallback(url, &tab, &preferences).await?,
        };

        match &action {
            RoutingAction::Redirect(plan) => debug!(
                url,
                tab_id = %tab_id,
                from = %tab.cookie_store_id,
                container = plan.target.as_ref().map(CookieStoreId::as_str).unwrap_or("<none>"),
                reason = ?plan.reason,
                "Redirecting navigation"
            ),
            RoutingAction::None => trace!(url, tab_id = %tab_id, "No routing needed"),
        }
        Ok(action)
    }

    async fn evaluate_fallback(
        &self,
        url: &str,
        tab: &TabSnapshot,
        preferences: &Preferences,
    ) -> Result<RoutingAction, RouterError> {
        let Some(group) = preferences.default_container() else {
            return Ok(RoutingAction::None);
        };
        let default = self
            .collaborators
            .default_resolver
            .build(&group, url)
            .await?;
        debug!(url, container = %default.cookie_store_id, name = %default.name, "Resolved default container");
        Ok(evaluate_default_container(
            url,
            tab,
            &default.cookie_store_id,
        ))
    }
}

/// Apply a host rule to the tab's current container
///
/// A rule naming a container the identity set doesn't know is still compared by
/// raw id; only the sentinel classification needs the identity set.
pub fn evaluate_host_rule(
    url: &str,
    tab: &TabSnapshot,
    rule: &HostPolicyEntry,
    identities: &[Identity],
) -> RoutingAction {
    let host = &rule.cookie_store_id;
    let current = &tab.cookie_store_id;

    if host.is_no_container() {
        let tab_is_contained = identities
            .iter()
            .any(|identity| &identity.cookie_store_id == current && !identity.is_no_container());
        if tab_is_contained {
            return RoutingAction::Redirect(RedirectPlan::from_tab(
                url,
                tab,
                None,
                RedirectReason::LeaveContainer,
            ));
        }
        return RoutingAction::None;
    }

    if host != current {
        return RoutingAction::Redirect(RedirectPlan::from_tab(
            url,
            tab,
            Some(host.clone()),
            RedirectReason::HostRule,
        ));
    }

    RoutingAction::None
}

/// Redirect to the default container `default` iff the tab is elsewhere
///
/// "Leave a container for a no-container default" and "containers differ" both
/// reduce to `current != default`.
pub fn evaluate_default_container(
    url: &str,
    tab: &TabSnapshot,
    default: &CookieStoreId,
) -> RoutingAction {
    if &tab.cookie_store_id == default {
        return RoutingAction::None;
    }
    RoutingAction::Redirect(RedirectPlan::from_tab(
        url,
        tab,
        Some(default.clone()),
        RedirectReason::DefaultContainer,
    ))
}
