//! Environment variable substitution
//!
//! Config files may reference environment variables as `${VAR}` or `$VAR`.
//! Unset variables are left in place for the validator to flag.

use anyhow::Result;
use regex::{Captures, Regex};
use std::env;
use tracing::{debug, warn};

fn placeholder_pattern() -> Regex {
    // Both ${VAR} and bare $VAR forms.
    Regex::new(r"\$\{(\w+)\}|\$(\w+)").expect("static pattern")
}

/// Replace every resolvable placeholder in `content`
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let pattern = placeholder_pattern();
    let substituted = pattern.replace_all(content, |caps: &Captures<'_>| {
        let var_name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        match env::var(var_name) {
            Ok(value) => {
                debug!(var = var_name, "substituted environment variable");
                value
            }
            Err(_) => {
                warn!(var = var_name, "environment variable not set; leaving placeholder");
                caps[0].to_string()
            }
        }
    });
    Ok(substituted.into_owned())
}

/// True when `content` still contains unresolved placeholders
pub fn has_unresolved_env_vars(content: &str) -> bool {
    placeholder_pattern().is_match(content)
}
