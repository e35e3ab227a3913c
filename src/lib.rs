//! container-router: Host to Container Routing
//!
//! Decides, per browser navigation, whether the destination should be re-opened
//! in a different container (isolated cookie store) than the navigating tab's,
//! and carries that redirect out without looping on its own navigations.

pub mod adapters;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod logging;
pub mod memory;
pub mod preferences;
pub mod profile;
pub mod tracker;
pub mod types;

pub use adapters::{BlockingResponse, RequestDetails, Router, TabChangeInfo};
pub use engine::{RedirectPlan, RoutingAction, RoutingEngine};
pub use error::RouterError;
