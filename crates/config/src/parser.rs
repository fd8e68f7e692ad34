//! Config file loading and generation

use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Load, substitute, and parse the config file at `path`
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BridgeConfig> {
    let path = path.as_ref();
    info!(?path, "Loading configuration");

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {path:?}"))?;
    debug!(bytes = content.len(), "read config file");

    let substituted = substitution::substitute_env_vars(&content)?;

    let config: BridgeConfig =
        serde_yaml::from_str(&substituted).context("Failed to parse YAML configuration")?;

    info!("Configuration loaded");
    Ok(config)
}

/// Write `config` as YAML to `path`
pub fn save_config<P: AsRef<Path>>(config: &BridgeConfig, path: P) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    fs::write(path.as_ref(), yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
    Ok(())
}

/// A complete default configuration, suitable for `init`
pub fn generate_default_config() -> BridgeConfig {
    BridgeConfig {
        bridge: BridgeInfo {
            name: "AttestBridge".to_string(),
            description: "HTTP facade over instrumented app targets".to_string(),
            version: "1.0.0".to_string(),
        },
        gateway: GatewaySection::default(),
        targets: TargetsSection {
            script_path: default_script_path(),
            business: default_business_target(),
            personal: default_personal_target(),
        },
        observability: ObservabilitySection::default(),
    }
}
