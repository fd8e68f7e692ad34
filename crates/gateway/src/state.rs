//! Shared application state
//!
//! Built once at startup and handed to every handler as `Arc<AppState>`.
//! The pending tables and the attachment pool live exactly as long as the
//! process.

use probe::AttachmentPool;
use router::Tables;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// State shared across all request handlers
pub struct AppState {
    /// Pending-request tables, one per request kind
    pub tables: Arc<Tables>,
    /// The two target attachments
    pub targets: AttachmentPool,
    /// Bounded wait for target replies; `None` means wait forever
    pub response_timeout: Option<Duration>,
    /// Service name reported by `/health`
    pub service_name: String,
    /// Service version reported by `/health`
    pub service_version: String,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        service_name: impl Into<String>,
        service_version: impl Into<String>,
        tables: Arc<Tables>,
        targets: AttachmentPool,
        response_timeout: Option<Duration>,
    ) -> Self {
        Self {
            tables,
            targets,
            response_timeout,
            service_name: service_name.into(),
            service_version: service_version.into(),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
