//! Tab Creation Coordinator
//!
//! Carries out a [`RedirectPlan`]: opens the replacement tab in the target
//! container and disposes of the source tab. Creation and disposal run as two
//! spawned tasks so neither waits on the other; both only start acting once the
//! source tab snapshot has been read. Progress is published as [`RedirectEvent`]s.

use crate::collaborators::{Collaborators, PreferenceStore, TabState};
use crate::engine::RedirectPlan;
use crate::error::RouterError;
use crate::preferences::{KeepOldTabs, KEY_KEEP_OLD_TABS};
use crate::tracker::InFlightTracker;
use crate::types::{CookieStoreId, CreateTabOptions, TabId, UpdateTabOptions};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Step of a redirect that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectStage {
    SourceLookup,
    Create,
    OpenerUpdate,
    Removal,
}

/// Observable progress of a redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectEvent {
    TabCreated {
        source: TabId,
        created: TabId,
        url: String,
        container: Option<CookieStoreId>,
    },
    OpenerLinked {
        tab: TabId,
        opener: TabId,
    },
    SourceRemoved {
        tab: TabId,
    },
    SourceKept {
        tab: TabId,
    },
    Failed {
        source: TabId,
        stage: RedirectStage,
        reason: String,
    },
}

/// What happened to the source tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposalOutcome {
    Removed,
    Kept,
    /// The source snapshot could not be read, so nothing was touched
    Skipped,
}

/// Handles to the two tasks launched for one redirect
pub struct RedirectTasks {
    pub creation: JoinHandle<Result<TabId, RouterError>>,
    pub disposal: JoinHandle<Result<DisposalOutcome, RouterError>>,
}

impl RedirectTasks {
    /// Wait for both tasks
    pub async fn join(
        self,
    ) -> (
        Result<TabId, RouterError>,
        Result<DisposalOutcome, RouterError>,
    ) {
        let (creation, disposal) = tokio::join!(self.creation, self.disposal);
        (flatten(creation), flatten(disposal))
    }
}

fn flatten<T>(
    joined: Result<Result<T, RouterError>, tokio::task::JoinError>,
) -> Result<T, RouterError> {
    joined.map_err(|e| RouterError::TaskFailed(e.to_string()))?
}

pub struct TabCreationCoordinator {
    tabs: Arc<dyn TabState>,
    preferences: Arc<dyn PreferenceStore>,
    tracker: Arc<InFlightTracker>,
    events: broadcast::Sender<RedirectEvent>,
}

impl TabCreationCoordinator {
    pub fn new(collaborators: &Collaborators, tracker: Arc<InFlightTracker>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            tabs: collaborators.tabs.clone(),
            preferences: collaborators.preferences.clone(),
            tracker,
            events,
        }
    }

    /// Subscribe to redirect progress events
    pub fn subscribe(&self) -> broadcast::Receiver<RedirectEvent> {
        self.events.subscribe()
    }

    /// Launch creation and disposal for `plan`
    ///
    /// Must be called from within a tokio runtime.
    pub fn execute(&self, plan: RedirectPlan) -> RedirectTasks {
        let (source_ready, source_seen) = oneshot::channel::<()>();
        let source = plan.source_tab_id;

        let creation = tokio::spawn(create_replacement(
            self.tabs.clone(),
            self.tracker.clone(),
            self.events.clone(),
            plan,
            source_ready,
        ));
        let disposal = tokio::spawn(dispose_source(
            self.tabs.clone(),
            self.preferences.clone(),
            self.events.clone(),
            source,
            source_seen,
        ));

        RedirectTasks { creation, disposal }
    }
}

fn emit(events: &broadcast::Sender<RedirectEvent>, event: RedirectEvent) {
    // No subscribers is fine
    let _ = events.send(event);
}

fn fail(
    events: &broadcast::Sender<RedirectEvent>,
    source: TabId,
    stage: RedirectStage,
    err: &RouterError,
) {
    warn!(source_tab = %source, ?stage, error = %err, "Redirect step failed");
    emit(
        events,
        RedirectEvent::Failed {
            source,
            stage,
            reason: err.to_string(),
        },
    );
}

async fn create_replacement(
    tabs: Arc<dyn TabState>,
    tracker: Arc<InFlightTracker>,
    events: broadcast::Sender<RedirectEvent>,
    plan: RedirectPlan,
    source_ready: oneshot::Sender<()>,
) -> Result<TabId, RouterError> {
    let source = match tabs.get(plan.source_tab_id).await {
        Ok(tab) => tab,
        Err(err) => {
            fail(&events, plan.source_tab_id, RedirectStage::SourceLookup, &err);
            return Err(err);
        }
    };
    let _ = source_ready.send(());

    // An opener without a container would pull the new tab into the opener's
    // container, so it is only set up front when the container is explicit.
    let options = CreateTabOptions {
        url: plan.url.clone(),
        index: plan.insert_index,
        cookie_store_id: plan.target.clone(),
        active: source.active,
        opener_tab_id: plan.target.as_ref().and(plan.opener_tab_id),
    };

    let created = match tabs.create(options).await {
        Ok(tab) => tab,
        Err(err) => {
            fail(&events, plan.source_tab_id, RedirectStage::Create, &err);
            return Err(err);
        }
    };
    tracker.record(created.id, plan.url.clone());

    info!(
        source_tab = %plan.source_tab_id,
        created_tab = %created.id,
        container = %created.cookie_store_id,
        url = %plan.url,
        "Opened redirected tab"
    );
    emit(
        &events,
        RedirectEvent::TabCreated {
            source: plan.source_tab_id,
            created: created.id,
            url: plan.url.clone(),
            container: plan.target.clone(),
        },
    );

    if plan.target.is_none() {
        if let Some(opener) = plan.opener_tab_id {
            let update = UpdateTabOptions {
                opener_tab_id: Some(opener),
            };
            match tabs.update(created.id, update).await {
                Ok(()) => emit(
                    &events,
                    RedirectEvent::OpenerLinked {
                        tab: created.id,
                        opener,
                    },
                ),
                Err(err) => fail(&events, plan.source_tab_id, RedirectStage::OpenerUpdate, &err),
            }
        }
    }

    Ok(created.id)
}

async fn dispose_source(
    tabs: Arc<dyn TabState>,
    preferences: Arc<dyn PreferenceStore>,
    events: broadcast::Sender<RedirectEvent>,
    source: TabId,
    source_seen: oneshot::Receiver<()>,
) -> Result<DisposalOutcome, RouterError> {
    if source_seen.await.is_err() {
        debug!(source_tab = %source, "Source tab unavailable, leaving it alone");
        return Ok(DisposalOutcome::Skipped);
    }

    let keep = match preferences.get(KEY_KEEP_OLD_TABS).await {
        Ok(pref) => KeepOldTabs::from_value(pref.value.as_ref()),
        Err(err) => {
            warn!(error = %err, "keepOldTabs lookup failed, removing source tab");
            KeepOldTabs::Unset
        }
    };

    if !keep.removes_source() {
        debug!(source_tab = %source, "Keeping source tab");
        emit(&events, RedirectEvent::SourceKept { tab: source });
        return Ok(DisposalOutcome::Kept);
    }

    if let Err(err) = tabs.remove(source).await {
        fail(&events, source, RedirectStage::Removal, &err);
        return Err(err);
    }
    debug!(source_tab = %source, "Removed source tab");
    emit(&events, RedirectEvent::SourceRemoved { tab: source });
    Ok(DisposalOutcome::Removed)
}
