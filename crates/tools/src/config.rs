//! Configuration file handling for LinkLab tools

use anyhow::{Context, Result};
use linklab_core::config::LinkConfig;
use std::path::Path;

/// Load a pipeline configuration from a TOML file.
pub fn load_link_config(path: &Path) -> Result<LinkConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: LinkConfig =
        toml::from_str(&content).context("Failed to parse config file")?;

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {:?}", path))?;

    Ok(config)
}

/// Save a pipeline configuration to a TOML file.
pub fn save_link_config(config: &LinkConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}
