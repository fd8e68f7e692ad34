//! Shared domain types for AttestBridge
//!
//! The bridge talks to exactly two instrumented target processes, one per
//! installed app identity. [`TargetKind`] names them and is used for target
//! selection, logging, and health reporting.

use serde::{Deserialize, Serialize};

/// Identity of an attached target process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// The business app identity
    Business,
    /// The personal app identity
    Personal,
}

impl TargetKind {
    /// Map the caller-supplied `business` flag to a target
    pub fn from_flag(business: bool) -> Self {
        if business {
            Self::Business
        } else {
            Self::Personal
        }
    }

    /// Stable lowercase name, used in logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Personal => "personal",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_selects_target() {
        assert_eq!(TargetKind::from_flag(true), TargetKind::Business);
        assert_eq!(TargetKind::from_flag(false), TargetKind::Personal);
    }

    #[test]
    fn display_matches_str() {
        assert_eq!(TargetKind::Business.to_string(), "business");
        assert_eq!(TargetKind::Personal.to_string(), "personal");
    }
}
