//! CLI route: single route table and run context.

use crate::adapters::RequestDetails;
use crate::cli::parse::{Commands, NavigationArgs};
use crate::cli::presentation::{format_action, format_config_report, format_navigation};
use crate::config::{ConfigLoader, RouterConfig};
use crate::error::RouterError;
use crate::profile::{RoutingProfile, SimulatedBrowser};
use crate::types::TabId;
use std::path::PathBuf;
use tracing::info;

/// Runtime context for CLI execution: workspace and loaded configuration.
pub struct RunContext {
    config: RouterConfig,
    workspace_root: PathBuf,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, RouterError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self {
            config,
            workspace_root,
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    fn browser(&self, nav: &NavigationArgs) -> Result<SimulatedBrowser, RouterError> {
        let path = if nav.profile.is_absolute() {
            nav.profile.clone()
        } else {
            self.workspace_root.join(&nav.profile)
        };
        info!(profile = %path.display(), "Loading routing profile");
        Ok(RoutingProfile::load(&path)?.into_browser(&self.config))
    }

    pub async fn execute(&self, command: &Commands) -> Result<String, RouterError> {
        match command {
            Commands::Decide { nav } => {
                let browser = self.browser(nav)?;
                let action = browser
                    .router
                    .engine()
                    .decide(&nav.url, TabId(nav.tab))
                    .await?;
                Ok(format_action(&action))
            }
            Commands::Navigate { nav, frame, format } => {
                let browser = self.browser(nav)?;
                let handled = browser
                    .router
                    .handle_request(RequestDetails {
                        url: nav.url.clone(),
                        tab_id: TabId(nav.tab),
                        frame_id: *frame,
                    })
                    .await;

                let (created, disposal) = match handled.tasks {
                    Some(tasks) => {
                        let (created, disposal) = tasks.join().await;
                        (Some(created?), Some(disposal?))
                    }
                    None => (None, None),
                };

                Ok(format_navigation(
                    *format,
                    handled.response,
                    &handled.action,
                    created,
                    disposal,
                    &browser.tabs.all(),
                ))
            }
            Commands::CheckConfig => {
                let result = self.config.validate();
                let report = format_config_report(&self.config, &result);
                match result {
                    Ok(()) => Ok(report),
                    Err(_) => Err(RouterError::ConfigError(report)),
                }
            }
        }
    }
}
