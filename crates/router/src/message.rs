//! Wire message model
//!
//! Outbound messages are posted to an attached target; inbound frames come
//! back asynchronously and are matched to pending requests by the
//! dispatcher. Field names follow the target-side agent contract
//! (camelCase on the wire).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The three request kinds the bridge understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Identity assertion (integrity token)
    Gpia,
    /// Key-attestation certificate
    Cert,
    /// Installed package metadata
    Info,
}

impl RequestKind {
    /// Stable lowercase name, matching the `caller` tag on inbound frames
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpia => "gpia",
            Self::Cert => "cert",
            Self::Info => "info",
        }
    }

    /// Parse a `caller` tag from an inbound payload
    pub fn from_caller(caller: &str) -> Option<Self> {
        match caller {
            "gpia" => Some(Self::Gpia),
            "cert" => Some(Self::Cert),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message posted to an attached target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    /// Request an integrity token for the given authorization key
    Gpia {
        #[serde(rename = "authKey")]
        auth_key: String,
    },
    /// Request a signed certificate over the combined payload
    Cert { data: String },
    /// Request package metadata, correlated by a generated id
    Info { id: String },
}

/// Raw inbound frame from an attached target
///
/// Frames are loosely shaped on purpose: classification tolerates missing
/// fields and drops what it cannot place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    /// Top-level frame type; `"error"` marks a failed gpia/cert request
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Kind-specific payload carrying the `caller` tag and correlation field
    #[serde(default)]
    pub payload: Option<Value>,
    /// Top-level error description, used when the payload carries none
    #[serde(default)]
    pub description: Option<String>,
}

/// In-band failure reported by a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetError {
    pub description: String,
}

impl TargetError {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl std::fmt::Display for TargetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description)
    }
}

/// What a waiting request eventually receives: the kind-specific success
/// projection, or the target's in-band error
pub type Reply<T> = Result<T, TargetError>;

/// Success projection for an identity-assertion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReply {
    pub token: String,
}

/// Success projection for a certificate request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateReply {
    pub signature: String,
    pub certificate: String,
}

/// Success projection for a package-info request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfoReply {
    pub package_name: String,
    pub version: String,
    pub apk_sha256: String,
    pub apk_shatr: String,
    pub apk_size: u64,
    pub classes_md5: String,
    pub secret_key: String,
    pub signature: String,
    pub signature_sha1: String,
}
