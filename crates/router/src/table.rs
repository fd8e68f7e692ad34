//! Pending-request table
//!
//! One table per request kind maps correlation keys to outstanding response
//! slots. All mutation happens under the table's own lock; tables never
//! lock each other.

use crate::message::RequestKind;
use crate::slot::ResponseSlot;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::oneshot;
use tracing::{debug, warn};

enum Entry<T> {
    Waiting(oneshot::Sender<T>),
    Delivered,
}

/// Map from correlation key to outstanding response slot.
///
/// Lives for the whole process. Entries are replaced by re-registration
/// under the same key and flipped to a delivered marker on resolution;
/// they are never collected, so the map grows unless keys repeat.
pub struct PendingTable<T> {
    kind: RequestKind,
    entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T: Send> PendingTable<T> {
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The request kind this table serves
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Register a slot under `key`, returning the half the caller waits on.
    ///
    /// A registration under a key that is already pending displaces the
    /// previous slot: its waiter is orphaned and the new slot receives the
    /// eventual reply. Last registration wins.
    pub fn register(&self, key: impl Into<String>) -> ResponseSlot<T> {
        let key = key.into();
        let (tx, rx) = oneshot::channel();
        let previous = self.entries.lock().insert(key.clone(), Entry::Waiting(tx));
        if matches!(previous, Some(Entry::Waiting(_))) {
            warn!(
                kind = %self.kind,
                key,
                "displaced a pending request registered under the same key"
            );
        }
        ResponseSlot::new(rx)
    }

    /// Resolve the slot registered under `key` with `value`.
    ///
    /// Returns `false` without side effects when no pending slot matches:
    /// late, duplicate, and never-registered keys are dropped. The lock is
    /// held only for the lookup; delivery happens outside it.
    pub fn resolve(&self, key: &str, value: T) -> bool {
        let waiting = {
            let mut entries = self.entries.lock();
            match entries.get_mut(key) {
                None => None,
                Some(entry) => match std::mem::replace(entry, Entry::Delivered) {
                    Entry::Waiting(tx) => Some(tx),
                    Entry::Delivered => {
                        warn!(kind = %self.kind, key, "duplicate reply for key; dropping");
                        return false;
                    }
                },
            }
        };

        match waiting {
            Some(tx) => {
                if tx.send(value).is_err() {
                    // The waiter gave up (bounded wait) between lookup and
                    // delivery; the entry still counts as delivered.
                    debug!(kind = %self.kind, key, "waiter gone before delivery");
                }
                true
            }
            None => {
                warn!(kind = %self.kind, key, "no pending request for key; dropping reply");
                false
            }
        }
    }

    /// Drop the entry under `key`, if any.
    ///
    /// Only the opt-in bounded-wait path evicts; the default configuration
    /// never calls this.
    pub fn evict(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Number of entries currently held (pending and delivered)
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn table() -> PendingTable<u32> {
        PendingTable::new(RequestKind::Gpia)
    }

    #[tokio::test]
    async fn resolve_then_wait_returns_the_value_once() {
        let table = table();
        let slot = table.register("k1");
        assert!(table.resolve("k1", 42));
        assert_eq!(slot.wait().await, 42);
        // The delivered entry stays in the table.
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn resolve_unknown_key_is_a_noop() {
        let table = table();
        let _slot = table.register("known");
        assert!(!table.resolve("unknown", 1));
        // The other entry is untouched.
        assert!(table.resolve("known", 2));
    }

    #[test]
    fn duplicate_resolve_is_dropped() {
        let table = table();
        let _slot = table.register("k1");
        assert!(table.resolve("k1", 1));
        assert!(!table.resolve("k1", 2));
    }

    #[tokio::test]
    async fn re_registration_displaces_the_earlier_slot() {
        let table = Arc::new(table());
        let first = table.register("shared");
        let second = table.register("shared");

        assert!(table.resolve("shared", 9));

        // Exactly one of the two slots receives the reply: the later
        // registration. The displaced waiter never resolves.
        assert_eq!(second.wait_timeout(Duration::from_millis(50)).await, Some(9));
        assert_eq!(first.wait_timeout(Duration::from_millis(50)).await, None);
    }

    #[tokio::test]
    async fn concurrent_registrations_leave_exactly_one_resolvable() {
        let table = Arc::new(table());
        let t1 = Arc::clone(&table);
        let t2 = Arc::clone(&table);
        let s1 = tokio::spawn(async move { t1.register("race") });
        let s2 = tokio::spawn(async move { t2.register("race") });
        let s1 = s1.await.unwrap();
        let s2 = s2.await.unwrap();

        assert!(table.resolve("race", 5));

        let r1 = s1.wait_timeout(Duration::from_millis(50)).await;
        let r2 = s2.wait_timeout(Duration::from_millis(50)).await;
        let resolved = [r1, r2].iter().filter(|r| r.is_some()).count();
        assert_eq!(resolved, 1, "a single matching reply unblocks exactly one waiter");
    }

    #[test]
    fn evict_removes_the_entry() {
        let table = table();
        let _slot = table.register("k1");
        assert!(table.evict("k1"));
        assert!(!table.evict("k1"));
        assert!(table.is_empty());
        assert!(!table.resolve("k1", 1));
    }
}
