//! Configuration validation
//!
//! Produces a report instead of failing on the first problem so `validate`
//! can show everything at once.

use crate::BridgeConfig;
use regex::Regex;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Bridge name is required")]
    MissingBridgeName,

    #[error("Invalid version format: {0}. Must be in format X.Y.Z (e.g., 1.0.0)")]
    InvalidVersionFormat(String),

    #[error("Gateway port must be non-zero")]
    InvalidGatewayPort,

    #[error("response_timeout_seconds must be a positive integer when set")]
    InvalidResponseTimeout,

    #[error("Agent script path is required")]
    MissingScriptPath,

    #[error("Target {target}: invalid endpoint '{endpoint}', expected host:port")]
    InvalidEndpoint { target: String, endpoint: String },

    #[error("At least one target must be enabled")]
    NoEnabledTargets,

    #[error("Unresolved environment variable placeholder in '{field}'")]
    UnresolvedEnvVar { field: String },
}

/// A non-fatal finding
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

/// A field left at its built-in default
#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

/// Everything the validator found
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn warn(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            field: field.into(),
            message: message.into(),
        });
    }

    fn default_applied(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.defaults_applied.push(DefaultApplied {
            field: field.into(),
            value: value.into(),
        });
    }
}

/// Validate `config`, collecting every error and warning
pub fn validate_config(config: &BridgeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.bridge.name.trim().is_empty() {
        report.errors.push(ValidationError::MissingBridgeName);
    }

    let version_pattern = Regex::new(r"^\d+\.\d+\.\d+$").expect("static pattern");
    if !version_pattern.is_match(&config.bridge.version) {
        report
            .errors
            .push(ValidationError::InvalidVersionFormat(config.bridge.version.clone()));
    }

    if config.gateway.port == 0 {
        report.errors.push(ValidationError::InvalidGatewayPort);
    }

    // Values still at their built-in defaults are reported, not flagged.
    if config.gateway.host == crate::default_host() {
        report.default_applied("gateway.host", &config.gateway.host);
    }
    if config.gateway.port == crate::default_gateway_port() {
        report.default_applied("gateway.port", config.gateway.port.to_string());
    }

    if config.gateway.response_timeout_seconds == Some(0) {
        report.errors.push(ValidationError::InvalidResponseTimeout);
    }
    if config.gateway.response_timeout_seconds.is_none() {
        report.warn(
            "gateway.response_timeout_seconds",
            "no response timeout configured; requests wait forever for target replies",
        );
    }

    validate_targets(config, &mut report);

    if let Some(port) = config.observability.metrics_port {
        if port == 0 {
            report.warn("observability.metrics_port", "metrics port 0 binds an ephemeral port");
        }
    }

    report
}

fn validate_targets(config: &BridgeConfig, report: &mut ValidationReport) {
    let targets = &config.targets;

    if targets.script_path.trim().is_empty() {
        report.errors.push(ValidationError::MissingScriptPath);
    } else if crate::has_unresolved_env_vars(&targets.script_path) {
        report.errors.push(ValidationError::UnresolvedEnvVar {
            field: "targets.script_path".to_string(),
        });
    } else if !Path::new(&targets.script_path).exists() {
        report.warn(
            "targets.script_path",
            format!("agent script '{}' not found on disk", targets.script_path),
        );
    }

    for (name, target) in [("business", &targets.business), ("personal", &targets.personal)] {
        if crate::has_unresolved_env_vars(&target.endpoint) {
            report.errors.push(ValidationError::UnresolvedEnvVar {
                field: format!("targets.{name}.endpoint"),
            });
        } else if target.endpoint.parse::<SocketAddr>().is_err() {
            report.errors.push(ValidationError::InvalidEndpoint {
                target: name.to_string(),
                endpoint: target.endpoint.clone(),
            });
        }
        if !target.enabled {
            report.warn(
                format!("targets.{name}"),
                "target disabled; requests routed to it will never complete",
            );
        }
    }

    if !targets.business.enabled && !targets.personal.enabled {
        report.errors.push(ValidationError::NoEnabledTargets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::generate_default_config;

    #[test]
    fn default_config_is_valid() {
        let report = validate_config(&generate_default_config());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        // Default carries the no-timeout warning.
        assert!(!report.warnings.is_empty());
        assert!(report
            .defaults_applied
            .iter()
            .any(|d| d.field == "gateway.port"));
    }

    #[test]
    fn bad_version_and_empty_name_are_errors() {
        let mut config = generate_default_config();
        config.bridge.name = "  ".to_string();
        config.bridge.version = "one".to_string();
        let report = validate_config(&config);
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn malformed_endpoint_is_an_error() {
        let mut config = generate_default_config();
        config.targets.business.endpoint = "not-an-endpoint".to_string();
        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidEndpoint { target, .. } if target == "business")));
    }

    #[test]
    fn all_targets_disabled_is_an_error() {
        let mut config = generate_default_config();
        config.targets.business.enabled = false;
        config.targets.personal.enabled = false;
        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::NoEnabledTargets)));
    }

    #[test]
    fn zero_timeout_is_an_error() {
        let mut config = generate_default_config();
        config.gateway.response_timeout_seconds = Some(0);
        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidResponseTimeout)));
    }

    #[test]
    fn unresolved_placeholder_is_an_error() {
        let mut config = generate_default_config();
        config.targets.personal.endpoint = "${DEVICE_HOST}:1119".to_string();
        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnresolvedEnvVar { .. })));
    }
}
