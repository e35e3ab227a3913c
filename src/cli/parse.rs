//! CLI parse: clap types for container-router. No behavior; definitions only.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// container-router CLI - evaluate host to container routing against a profile
#[derive(Parser)]
#[command(name = "container-router")]
#[command(about = "Route browser navigations into the container their host belongs to")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,
}

/// Rendering of command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Clone)]
pub struct NavigationArgs {
    /// Routing profile (TOML) describing identities, host rules, preferences and tabs
    #[arg(long)]
    pub profile: PathBuf,

    /// Navigating tab id
    #[arg(long)]
    pub tab: i64,

    /// Destination URL
    #[arg(long)]
    pub url: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the routing action for a navigation without touching tabs
    Decide {
        #[command(flatten)]
        nav: NavigationArgs,
    },
    /// Run a navigation through the request listener and show the resulting tabs
    Navigate {
        #[command(flatten)]
        nav: NavigationArgs,

        /// Frame id of the request (0 = top-level)
        #[arg(long, default_value = "0")]
        frame: i64,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Load and validate configuration
    CheckConfig,
}
