//! In-process transport over tokio channels
//!
//! Used by tests and embedders: the far end of the outbound queue plays the
//! role of the device-side agent. Inbound frames are injected directly on
//! the dispatcher channel by whoever drives the fake agent.

use crate::error::ProbeError;
use crate::traits::TargetTransport;
use common::TargetKind;
use router::OutboundMessage;
use tokio::sync::mpsc;

/// Transport whose "device" is an in-process channel consumer
pub struct ChannelTransport {
    kind: TargetKind,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
}

impl ChannelTransport {
    /// Create the transport plus the receiver a fake agent drains
    pub fn new(kind: TargetKind) -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                kind,
                outbound: tx,
            },
            rx,
        )
    }
}

impl TargetTransport for ChannelTransport {
    fn kind(&self) -> TargetKind {
        self.kind
    }

    fn is_connected(&self) -> bool {
        !self.outbound.is_closed()
    }

    fn post(&self, message: &OutboundMessage) -> Result<(), ProbeError> {
        self.outbound
            .send(message.clone())
            .map_err(|_| ProbeError::Disconnected { kind: self.kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn posted_messages_reach_the_consumer() {
        let (transport, mut rx) = ChannelTransport::new(TargetKind::Personal);
        assert!(transport.is_connected());

        let message = OutboundMessage::Gpia {
            auth_key: "abc".into(),
        };
        transport.post(&message).unwrap();
        assert_eq!(rx.recv().await, Some(message));
    }

    #[tokio::test]
    async fn post_after_consumer_drop_fails() {
        let (transport, rx) = ChannelTransport::new(TargetKind::Business);
        drop(rx);
        assert!(!transport.is_connected());
        let result = transport.post(&OutboundMessage::Info { id: "AAAAA".into() });
        assert!(result.is_err());
    }
}
