//! Probe error types

use common::TargetKind;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to reach target {kind} at {endpoint}: {source}")]
    Connect {
        kind: TargetKind,
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("Target {kind} is disconnected")]
    Disconnected { kind: TargetKind },

    #[error("Failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to read agent script {path}: {source}")]
    Script {
        path: String,
        #[source]
        source: io::Error,
    },
}
