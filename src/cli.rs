//! CLI domain: parse, route and presentation only.
//! Routing decisions stay in the engine; the CLI drives it against a profile.

mod parse;
mod presentation;
mod route;

pub use parse::{Cli, Commands, NavigationArgs, OutputFormat};
pub use presentation::{format_action, format_config_report, format_navigation, format_tabs};
pub use route::RunContext;
