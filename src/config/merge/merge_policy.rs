//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("routing.ignored_schemes", vec!["about", "moz-extension"])?
        .set_default("tracker.capacity", 256_i64)?
        .set_default("tracker.ttl_secs", 30_i64)
}
