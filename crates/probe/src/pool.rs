//! Attachment pool and target selection
//!
//! The pool owns the two attachment handles for the process lifetime and
//! maps the caller-supplied `business` flag to one of them. There is no
//! load balancing and no failover; a request routed to a missing or dead
//! target simply never gets a reply.

use crate::traits::TargetTransport;
use common::TargetKind;
use serde::Serialize;
use std::sync::Arc;

/// Holds up to one attachment per target identity
#[derive(Default)]
pub struct AttachmentPool {
    business: Option<Arc<dyn TargetTransport>>,
    personal: Option<Arc<dyn TargetTransport>>,
}

/// Health-reporting view of one attachment slot
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentStatus {
    pub target: TargetKind,
    pub attached: bool,
    pub connected: bool,
}

impl AttachmentPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a transport in the slot matching its kind, replacing any
    /// previous attachment for that identity
    pub fn attach(&mut self, transport: Arc<dyn TargetTransport>) {
        match transport.kind() {
            TargetKind::Business => self.business = Some(transport),
            TargetKind::Personal => self.personal = Some(transport),
        }
    }

    /// The attachment for `kind`, if any
    pub fn get(&self, kind: TargetKind) -> Option<&Arc<dyn TargetTransport>> {
        match kind {
            TargetKind::Business => self.business.as_ref(),
            TargetKind::Personal => self.personal.as_ref(),
        }
    }

    /// Route by the caller-supplied `business` flag
    pub fn select(&self, business: bool) -> Option<&Arc<dyn TargetTransport>> {
        self.get(TargetKind::from_flag(business))
    }

    /// Status of both slots, attached or not
    pub fn statuses(&self) -> Vec<AttachmentStatus> {
        [TargetKind::Business, TargetKind::Personal]
            .into_iter()
            .map(|kind| {
                let transport = self.get(kind);
                AttachmentStatus {
                    target: kind,
                    attached: transport.is_some(),
                    connected: transport.is_some_and(|t| t.is_connected()),
                }
            })
            .collect()
    }
}
