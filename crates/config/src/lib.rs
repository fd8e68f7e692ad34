//! Configuration for AttestBridge
//!
//! The bridge is configured from a single YAML file with environment
//! variable substitution. [`parser::load_config`] reads and parses,
//! [`validator::validate_config`] produces a report of errors and
//! warnings, [`defaults`] holds the generated-config defaults.

use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    pub bridge: BridgeInfo,
    #[serde(default)]
    pub gateway: GatewaySection,
    pub targets: TargetsSection,
    #[serde(default)]
    pub observability: ObservabilitySection,
}

/// Service metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
}

/// HTTP surface settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewaySection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Bounded wait for target replies, in seconds. Absent by default:
    /// requests wait forever.
    #[serde(default)]
    pub response_timeout_seconds: Option<u64>,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_gateway_port(),
            response_timeout_seconds: None,
        }
    }
}

/// Attached-target settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetsSection {
    /// Agent script shipped to each target on attach
    #[serde(default = "default_script_path")]
    pub script_path: String,
    #[serde(default = "default_business_target")]
    pub business: TargetSection,
    #[serde(default = "default_personal_target")]
    pub personal: TargetSection,
}

/// One attached target
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetSection {
    /// Device-side endpoint, `host:port`
    pub endpoint: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Logging/metrics settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ObservabilitySection {
    /// Prometheus exporter port; no exporter when absent
    #[serde(default)]
    pub metrics_port: Option<u16>,
}
