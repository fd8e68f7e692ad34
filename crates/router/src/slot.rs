//! Single-assignment response slot
//!
//! One request handler blocks on one slot until the dispatcher resolves it.
//! Backed by a oneshot channel; the sender half lives inside the owning
//! [`PendingTable`](crate::table::PendingTable) entry.

use std::time::Duration;
use tokio::sync::oneshot;

/// The receiving half of a pending request.
///
/// A slot resolves at most once. If its table entry is overwritten by a
/// newer registration under the same key before a reply arrives, the
/// displaced waiter is orphaned and suspends forever; there is no timeout
/// unless the caller opts into [`wait_timeout`](Self::wait_timeout).
#[derive(Debug)]
pub struct ResponseSlot<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> ResponseSlot<T> {
    pub(crate) fn new(rx: oneshot::Receiver<T>) -> Self {
        Self { rx }
    }

    /// Suspend until the slot is resolved.
    ///
    /// An orphaned slot (its table entry was replaced) never resolves;
    /// the wait then never returns.
    pub async fn wait(self) -> T {
        match self.rx.await {
            Ok(value) => value,
            // The producing side was dropped: this waiter was displaced by
            // a newer registration under the same key. The displaced waiter
            // keeps waiting for a reply that cannot arrive.
            Err(_) => std::future::pending().await,
        }
    }

    /// Bounded variant of [`wait`](Self::wait); `None` on expiry.
    pub async fn wait_timeout(self, timeout: Duration) -> Option<T> {
        tokio::time::timeout(timeout, self.wait()).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn resolved_slot_returns_the_value() {
        let (tx, rx) = oneshot::channel();
        let slot = ResponseSlot::new(rx);
        tx.send(7).unwrap();
        assert_eq!(slot.wait().await, 7);
    }

    #[tokio::test]
    async fn orphaned_slot_never_returns() {
        let (tx, rx) = oneshot::channel::<u32>();
        let slot = ResponseSlot::new(rx);
        drop(tx);
        assert_eq!(slot.wait_timeout(Duration::from_millis(20)).await, None);
    }

    #[tokio::test]
    async fn wait_timeout_returns_value_when_resolved_in_time() {
        let (tx, rx) = oneshot::channel();
        let slot = ResponseSlot::new(rx);
        tx.send("ok").unwrap();
        assert_eq!(slot.wait_timeout(Duration::from_secs(1)).await, Some("ok"));
    }
}
