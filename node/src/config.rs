//! Node configuration loading.

use anyhow::{Context, Result};
use std::path::Path;
use tracelink_config::NodeConfig;

/// Loads configuration from a TOML file, or defaults when no path is given
pub fn load(path: Option<&Path>) -> Result<NodeConfig> {
    match path {
        None => Ok(NodeConfig::default()),
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", path.display()))
        }
    }
}
