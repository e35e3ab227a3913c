//! CLI presentation: text and JSON formatting of routing results.

use crate::adapters::BlockingResponse;
use crate::cli::parse::OutputFormat;
use crate::config::{RouterConfig, ValidationError};
use crate::coordinator::DisposalOutcome;
use crate::engine::RoutingAction;
use crate::types::{TabId, TabSnapshot};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

fn format_section_heading(title: &str) -> String {
    title.bold().to_string()
}

/// One line describing a routing action
pub fn format_action(action: &RoutingAction) -> String {
    match action {
        RoutingAction::None => format!("{} leave navigation alone", "none".dimmed()),
        RoutingAction::Redirect(plan) => {
            let target = plan
                .target
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "<no container>".to_string());
            let opener = plan
                .opener_tab_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            format!(
                "{} {} -> {} (reason: {:?}, index: {}, opener: {})",
                "redirect".green().bold(),
                plan.url,
                target,
                plan.reason,
                plan.insert_index,
                opener
            )
        }
    }
}

/// Tab strip as a table
pub fn format_tabs(tabs: &[TabSnapshot]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Tabs")));
    if tabs.is_empty() {
        out.push_str("No open tabs.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Index", "Container", "Active", "Opener", "URL"]);
    for tab in tabs {
        table.add_row(vec![
            tab.id.to_string(),
            tab.index.to_string(),
            tab.cookie_store_id.to_string(),
            if tab.active { "yes" } else { "no" }.to_string(),
            tab.opener_tab_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            tab.url.clone().unwrap_or_default(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Result of a full navigation run
pub fn format_navigation(
    format: OutputFormat,
    response: BlockingResponse,
    action: &RoutingAction,
    created: Option<TabId>,
    disposal: Option<DisposalOutcome>,
    tabs: &[TabSnapshot],
) -> String {
    if format == OutputFormat::Json {
        let value = json!({
            "response": response,
            "redirected": action.is_redirect(),
            "created_tab": created,
            "source_tab": disposal.map(|d| format!("{:?}", d).to_lowercase()),
            "tabs": tabs,
        });
        return serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    }

    let mut out = String::new();
    let verdict = if response.cancel {
        "cancel".red().bold().to_string()
    } else {
        "proceed".green().to_string()
    };
    out.push_str(&format!("Original navigation: {}\n", verdict));
    out.push_str(&format!("Action: {}\n", format_action(action)));
    if let Some(created) = created {
        out.push_str(&format!("Created tab: {}\n", created));
    }
    if let Some(disposal) = disposal {
        out.push_str(&format!("Source tab: {:?}\n", disposal));
    }
    out.push('\n');
    out.push_str(&format_tabs(tabs));
    out
}

/// Config check summary
pub fn format_config_report(
    config: &RouterConfig,
    result: &Result<(), Vec<ValidationError>>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Configuration")));
    out.push_str(&format!(
        "Ignored schemes: {}\n",
        config.routing.ignored_schemes.join(", ")
    ));
    out.push_str(&format!(
        "Tracker: capacity {}, ttl {}s\n",
        config.tracker.capacity, config.tracker.ttl_secs
    ));
    out.push_str(&format!(
        "Logging: {} ({}, {})\n\n",
        config.logging.level, config.logging.format, config.logging.output
    ));
    match result {
        Ok(()) => out.push_str(&format!("{}\n", "Configuration is valid.".green())),
        Err(errors) => {
            out.push_str(&format!("{}\n", "Configuration is invalid:".red()));
            for error in errors {
                out.push_str(&format!("  - {}\n", error));
            }
        }
    }
    out
}
