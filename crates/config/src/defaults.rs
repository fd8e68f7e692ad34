//! Default values for generated configuration

use crate::TargetSection;

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_gateway_port() -> u16 {
    8080
}

pub fn default_script_path() -> String {
    "agent/agent.js".to_string()
}

pub fn default_enabled() -> bool {
    true
}

/// Fixed per-identity device ports: personal on 1119, business on 1120.
pub fn default_personal_target() -> TargetSection {
    TargetSection {
        endpoint: "127.0.0.1:1119".to_string(),
        enabled: true,
    }
}

pub fn default_business_target() -> TargetSection {
    TargetSection {
        endpoint: "127.0.0.1:1120".to_string(),
        enabled: true,
    }
}
