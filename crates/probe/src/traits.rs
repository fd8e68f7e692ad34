//! Transport interface for attached targets

use crate::error::ProbeError;
use common::TargetKind;
use router::OutboundMessage;

/// One attached target process.
///
/// Posting is fire-and-forget: the message is queued for delivery and the
/// call returns without awaiting any acknowledgment. Inbound frames never
/// flow through this trait; each transport forwards them to the dispatcher
/// channel it was given at attach time.
pub trait TargetTransport: Send + Sync {
    /// Which of the two target identities this transport serves
    fn kind(&self) -> TargetKind;

    /// Whether the underlying connection is still believed alive
    fn is_connected(&self) -> bool;

    /// Queue a message for delivery to the target.
    ///
    /// # Errors
    ///
    /// Fails when the connection is known dead. Callers treat this as
    /// advisory: the request keeps waiting on its slot either way.
    fn post(&self, message: &OutboundMessage) -> Result<(), ProbeError>;
}
