//! Config loading facade: assembles sources in precedence order and deserializes.

use super::merge::merge_policy;
use super::sources::{env_vars, global_file, workspace_file};
use super::RouterConfig;
use crate::error::RouterError;
use config::File;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, workspace
    /// `config/config.toml`, workspace `config/{env}.toml`, environment.
    pub fn load(workspace_root: &Path) -> Result<RouterConfig, RouterError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = env_vars::add_to_builder(builder);

        let config: RouterConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            ignored_schemes = ?config.routing.ignored_schemes,
            tracker_capacity = config.tracker.capacity,
            "Loaded router configuration"
        );
        Ok(config)
    }

    /// Load configuration from a single file on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<RouterConfig, RouterError> {
        if !path.exists() {
            return Err(RouterError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}
