//! Configuration System
//!
//! Layered runtime configuration for the router: built-in defaults, a global
//! file under the user's config directory, workspace files, then
//! `CONTAINER_ROUTER__*` environment overrides. Tests included.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Decision engine settings
    #[serde(default)]
    pub routing: RoutingConfig,

    /// In-flight redirect tracker bounds
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Decision engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// URL schemes that are never routed (browser-internal pages)
    #[serde(default = "default_ignored_schemes")]
    pub ignored_schemes: Vec<String>,
}

fn default_ignored_schemes() -> Vec<String> {
    vec!["about".to_string(), "moz-extension".to_string()]
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            ignored_schemes: default_ignored_schemes(),
        }
    }
}

/// In-flight tracker bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Maximum number of pending entries
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Seconds after which an unconsumed entry is dropped
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_capacity() -> usize {
    256
}

fn default_ttl_secs() -> u64 {
    30
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Routing(String),
    Tracker(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Routing(msg) => write!(f, "Routing: {}", msg),
            ValidationError::Tracker(msg) => write!(f, "Tracker: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), String> {
        for scheme in &self.ignored_schemes {
            if !is_valid_scheme(scheme) {
                return Err(format!("Invalid URL scheme '{}'", scheme));
            }
        }
        Ok(())
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than zero".to_string());
        }
        if self.ttl_secs == 0 {
            return Err("ttl_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl RouterConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.routing.validate() {
            errors.push(ValidationError::Routing(e));
        }
        if let Err(e) = self.tracker.validate() {
            errors.push(ValidationError::Tracker(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
