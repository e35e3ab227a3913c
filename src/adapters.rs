//! Event adapters
//!
//! Entry points wired to the browser's navigation and tab-update notifications.
//! `on_before_request` answers with the blocking response that cancels the
//! original navigation whenever a redirect was launched.

use crate::collaborators::Collaborators;
use crate::config::RouterConfig;
use crate::coordinator::{RedirectEvent, RedirectTasks, TabCreationCoordinator};
use crate::engine::{RoutingAction, RoutingEngine};
use crate::error::RouterError;
use crate::tracker::InFlightTracker;
use crate::types::{NavigationEvent, TabId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Details of an intercepted request, as delivered by the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub url: String,
    pub tab_id: TabId,
    pub frame_id: i64,
}

impl From<RequestDetails> for NavigationEvent {
    fn from(details: RequestDetails) -> Self {
        NavigationEvent {
            url: details.url,
            tab_id: details.tab_id,
            frame_id: details.frame_id,
        }
    }
}

/// Tab update notification payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabChangeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Answer to a blocking request listener
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingResponse {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cancel: bool,
}

impl BlockingResponse {
    pub fn cancel() -> Self {
        Self { cancel: true }
    }

    pub fn proceed() -> Self {
        Self { cancel: false }
    }
}

/// What handling a navigation produced
pub struct HandledNavigation {
    pub response: BlockingResponse,
    pub action: RoutingAction,
    /// Present when a redirect was launched
    pub tasks: Option<RedirectTasks>,
}

impl HandledNavigation {
    fn passed_through() -> Self {
        Self {
            response: BlockingResponse::proceed(),
            action: RoutingAction::None,
            tasks: None,
        }
    }
}

/// The routing system wired together: engine, coordinator and shared tracker
pub struct Router {
    engine: RoutingEngine,
    coordinator: TabCreationCoordinator,
}

impl Router {
    pub fn new(collaborators: Collaborators, config: &RouterConfig) -> Self {
        let tracker = Arc::new(InFlightTracker::from_config(&config.tracker));
        let coordinator = TabCreationCoordinator::new(&collaborators, tracker.clone());
        let engine = RoutingEngine::new(collaborators, tracker, &config.routing);
        Self {
            engine,
            coordinator,
        }
    }

    pub fn engine(&self) -> &RoutingEngine {
        &self.engine
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RedirectEvent> {
        self.coordinator.subscribe()
    }

    /// Blocking navigation listener
    ///
    /// Resolves once every lookup for the decision has settled. The redirect
    /// itself keeps running in the background.
    pub async fn on_before_request(&self, details: RequestDetails) -> BlockingResponse {
        self.handle_request(details).await.response
    }

    /// Like [`Router::on_before_request`] but hands back the decision and the
    /// redirect task handles
    pub async fn handle_request(&self, details: RequestDetails) -> HandledNavigation {
        let event = NavigationEvent::from(details);
        if event.frame_id != 0 || event.tab_id.is_none() {
            return HandledNavigation::passed_through();
        }
        self.handle(&event.url, event.tab_id).await
    }

    /// Tab update listener; fire-and-forget
    ///
    /// Returns the handle of the spawned evaluation, or `None` when the update
    /// carried no URL change. Must be called from within a tokio runtime.
    pub fn on_tab_updated(
        self: &Arc<Self>,
        tab_id: TabId,
        change: TabChangeInfo,
    ) -> Option<JoinHandle<HandledNavigation>> {
        let url = change.url?;
        let router = Arc::clone(self);
        Some(tokio::spawn(async move { router.handle(&url, tab_id).await }))
    }

    async fn handle(&self, url: &str, tab_id: TabId) -> HandledNavigation {
        let action = match self.engine.decide(url, tab_id).await {
            Ok(action) => action,
            Err(err) => {
                self.report_failure(url, tab_id, &err);
                return HandledNavigation::passed_through();
            }
        };

        let tasks = match &action {
            RoutingAction::Redirect(plan) => Some(self.coordinator.execute(plan.clone())),
            RoutingAction::None => None,
        };
        let response = if tasks.is_some() {
            BlockingResponse::cancel()
        } else {
            BlockingResponse::proceed()
        };
        HandledNavigation {
            response,
            action,
            tasks,
        }
    }

    fn report_failure(&self, url: &str, tab_id: TabId, err: &RouterError) {
        match err {
            RouterError::TabNotFound(_) => {
                debug!(url, tab_id = %tab_id, error = %err, "Tab vanished before routing")
            }
            _ => warn!(url, tab_id = %tab_id, error = %err, "Routing decision failed, letting navigation through"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_response_serialization() {
        assert_eq!(serde_json::to_string(&BlockingResponse::proceed()).unwrap(), "{}");
        assert_eq!(
            serde_json::to_string(&BlockingResponse::cancel()).unwrap(),
            r#"{"cancel":true}"#
        );
    }

    #[test]
    fn test_request_details_from_browser_json() {
        let details: RequestDetails =
            serde_json::from_str(r#"{"url":"https://a.example/","tabId":-1,"frameId":0}"#)
                .unwrap();
        assert!(details.tab_id.is_none());
        let event = NavigationEvent::from(details);
        assert_eq!(event.frame_id, 0);
    }
}
