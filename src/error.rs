//! Error types for the container routing system.

use crate::types::TabId;
use thiserror::Error;

/// Errors raised while deciding or executing a routing action
#[derive(Debug, Error)]
pub enum RouterError {
    /// A collaborator call rejected. Decisions are never made on partial data.
    #[error("{collaborator} lookup failed: {reason}")]
    Lookup {
        collaborator: &'static str,
        reason: String,
    },

    #[error("Tab not found: {0}")]
    TabNotFound(TabId),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Redirect task failed: {0}")]
    TaskFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RouterError {
    /// Build a lookup failure for the named collaborator
    pub fn lookup(collaborator: &'static str, reason: impl Into<String>) -> Self {
        RouterError::Lookup {
            collaborator,
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for RouterError {
    fn from(err: config::ConfigError) -> Self {
        RouterError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for RouterError {
    fn from(err: toml::de::Error) -> Self {
        RouterError::ConfigError(err.to_string())
    }
}
