//! Loading the missile configuration from JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use seeker_core::config::MissileConfig;

/// Load and validate a config file. `None` gives the defaults.
pub fn load_config(path: Option<&Path>) -> Result<MissileConfig> {
    let Some(path) = path else {
        return Ok(MissileConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config =
        parse_config(&text).with_context(|| format!("invalid config {}", path.display()))?;
    info!(path = %path.display(), missiles = config.missile_count, "config loaded");
    Ok(config)
}

/// Parse and validate a JSON config. Missing keys take their defaults.
pub fn parse_config(text: &str) -> Result<MissileConfig> {
    let config: MissileConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}
