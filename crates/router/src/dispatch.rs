//! Inbound message dispatch
//!
//! Every attached source forwards its inbound frames onto one channel; a
//! single dispatcher task consumes it, classifies each frame by the
//! `caller` tag, extracts the kind's correlation field, and resolves the
//! matching pending-table entry. Frames that cannot be placed (unknown
//! caller, missing correlation field, no matching pending request) are
//! logged and dropped; nothing is ever surfaced to a waiting caller for
//! them.

use crate::message::{
    CertificateReply, InboundMessage, IntegrityReply, PackageInfoReply, Reply, RequestKind,
    TargetError,
};
use crate::table::PendingTable;
use common::TargetKind;
use metrics::counter;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DISPATCHED: &str = "router_messages_dispatched_total";
const DROPPED: &str = "router_messages_dropped_total";

/// An inbound frame tagged with the source it arrived from
#[derive(Debug)]
pub struct SourceMessage {
    pub source: TargetKind,
    pub message: InboundMessage,
}

/// The three pending-request tables, one per request kind.
///
/// Constructed once at startup and shared by the dispatcher and the
/// request handlers for the process lifetime.
pub struct Tables {
    pub gpia: PendingTable<Reply<IntegrityReply>>,
    pub cert: PendingTable<Reply<CertificateReply>>,
    pub info: PendingTable<Reply<PackageInfoReply>>,
}

impl Tables {
    pub fn new() -> Self {
        Self {
            gpia: PendingTable::new(RequestKind::Gpia),
            cert: PendingTable::new(RequestKind::Cert),
            info: PendingTable::new(RequestKind::Info),
        }
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumes inbound frames and resolves pending requests.
///
/// Sources run their own listener tasks and only push onto the channel;
/// per-table mutual exclusion is the sole guard the tables need, the
/// dispatcher itself holds no further state.
pub struct Dispatcher {
    tables: Arc<Tables>,
    inbound: mpsc::UnboundedReceiver<SourceMessage>,
}

impl Dispatcher {
    /// Create a dispatcher over `tables`, returning the sender handed to
    /// every attached source.
    pub fn new(tables: Arc<Tables>) -> (Self, mpsc::UnboundedSender<SourceMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tables,
                inbound: rx,
            },
            tx,
        )
    }

    /// Run until shutdown is signalled or every source sender is gone.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("dispatcher running");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                next = self.inbound.recv() => match next {
                    Some(incoming) => self.dispatch(incoming),
                    None => break,
                },
            }
        }
        info!("dispatcher stopped");
    }

    /// Classify one inbound frame and resolve the matching table entry.
    pub fn dispatch(&self, incoming: SourceMessage) {
        let SourceMessage { source, message } = incoming;
        let payload = message
            .payload
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()));

        let caller = payload.get("caller").and_then(Value::as_str);
        let Some(kind) = caller.and_then(RequestKind::from_caller) else {
            counter!(DROPPED, "reason" => "unknown_caller").increment(1);
            warn!(%source, caller, "inbound message with unknown caller; ignoring");
            return;
        };

        // gpia and cert flag errors on the frame itself; info flags them
        // inside the payload.
        match kind {
            RequestKind::Gpia => {
                let failed = message.kind.as_deref() == Some("error");
                self.resolve_keyed(&self.tables.gpia, source, "authKey", failed, &message, &payload);
            }
            RequestKind::Cert => {
                let failed = message.kind.as_deref() == Some("error");
                self.resolve_keyed(&self.tables.cert, source, "authKey", failed, &message, &payload);
            }
            RequestKind::Info => {
                let failed = payload.get("type").and_then(Value::as_str) == Some("error");
                self.resolve_keyed(&self.tables.info, source, "id", failed, &message, &payload);
            }
        }
    }

    fn resolve_keyed<T: DeserializeOwned + Send>(
        &self,
        table: &PendingTable<Reply<T>>,
        source: TargetKind,
        key_field: &'static str,
        failed: bool,
        message: &InboundMessage,
        payload: &Value,
    ) {
        let Some(key) = payload.get(key_field).and_then(Value::as_str) else {
            counter!(DROPPED, "reason" => "missing_key").increment(1);
            warn!(
                %source,
                kind = %table.kind(),
                key_field,
                "inbound message without correlation field; ignoring"
            );
            return;
        };

        let outcome: Reply<T> = if failed {
            Err(TargetError::new(error_description(message, payload)))
        } else {
            match serde_json::from_value(payload.clone()) {
                Ok(reply) => Ok(reply),
                Err(e) => {
                    warn!(%source, kind = %table.kind(), key, %e, "malformed success payload");
                    Err(TargetError::new(format!(
                        "Malformed {} payload: {e}",
                        table.kind()
                    )))
                }
            }
        };

        if table.resolve(key, outcome) {
            counter!(DISPATCHED, "kind" => table.kind().as_str()).increment(1);
            debug!(%source, kind = %table.kind(), key, "resolved pending request");
        } else {
            counter!(DROPPED, "reason" => "unmatched_key").increment(1);
        }
    }
}

/// `payload.description`, else the frame-level description, else a fixed
/// fallback
fn error_description(message: &InboundMessage, payload: &Value) -> String {
    payload
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| message.description.clone())
        .unwrap_or_else(|| "Unknown error".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::time::Duration;

    fn frame(value: Value) -> InboundMessage {
        serde_json::from_value(value).unwrap()
    }

    fn dispatcher() -> (Dispatcher, Arc<Tables>) {
        let tables = Arc::new(Tables::new());
        let (dispatcher, _tx) = Dispatcher::new(Arc::clone(&tables));
        (dispatcher, tables)
    }

    #[tokio::test]
    async fn gpia_success_resolves_the_waiting_slot() {
        let (dispatcher, tables) = dispatcher();
        let slot = tables.gpia.register("abc");

        dispatcher.dispatch(SourceMessage {
            source: TargetKind::Personal,
            message: frame(json!({
                "type": "send",
                "payload": {"caller": "gpia", "authKey": "abc", "token": "T1"},
            })),
        });

        let reply = slot.wait().await;
        assert_eq!(reply, Ok(IntegrityReply { token: "T1".into() }));
    }

    #[tokio::test]
    async fn gpia_error_carries_the_frame_description() {
        let (dispatcher, tables) = dispatcher();
        let slot = tables.gpia.register("abc");

        dispatcher.dispatch(SourceMessage {
            source: TargetKind::Personal,
            message: frame(json!({
                "type": "error",
                "payload": {"caller": "gpia", "authKey": "abc"},
                "description": "denied",
            })),
        });

        assert_eq!(slot.wait().await, Err(TargetError::new("denied")));
    }

    #[tokio::test]
    async fn payload_description_wins_over_frame_description() {
        let (dispatcher, tables) = dispatcher();
        let slot = tables.cert.register("k");

        dispatcher.dispatch(SourceMessage {
            source: TargetKind::Business,
            message: frame(json!({
                "type": "error",
                "payload": {"caller": "cert", "authKey": "k", "description": "inner"},
                "description": "outer",
            })),
        });

        assert_eq!(slot.wait().await, Err(TargetError::new("inner")));
    }

    #[tokio::test]
    async fn error_description_falls_back_to_fixed_text() {
        let (dispatcher, tables) = dispatcher();
        let slot = tables.gpia.register("abc");

        dispatcher.dispatch(SourceMessage {
            source: TargetKind::Personal,
            message: frame(json!({
                "type": "error",
                "payload": {"caller": "gpia", "authKey": "abc"},
            })),
        });

        assert_eq!(slot.wait().await, Err(TargetError::new("Unknown error")));
    }

    #[tokio::test]
    async fn info_error_flag_lives_in_the_payload() {
        let (dispatcher, tables) = dispatcher();
        let slot = tables.info.register("A1B2C");

        dispatcher.dispatch(SourceMessage {
            source: TargetKind::Business,
            message: frame(json!({
                "type": "send",
                "payload": {
                    "caller": "info",
                    "id": "A1B2C",
                    "type": "error",
                    "description": "incomplete apk data",
                },
            })),
        });

        assert_eq!(
            slot.wait().await,
            Err(TargetError::new("incomplete apk data"))
        );
    }

    #[tokio::test]
    async fn info_success_projects_the_package_fields() {
        let (dispatcher, tables) = dispatcher();
        let slot = tables.info.register("A1B2C");

        dispatcher.dispatch(SourceMessage {
            source: TargetKind::Business,
            message: frame(json!({
                "type": "send",
                "payload": {
                    "caller": "info",
                    "id": "A1B2C",
                    "type": "success",
                    "packageName": "com.example",
                    "version": "2.24.1",
                    "apkSha256": "c2hh",
                    "apkShatr": "dHI=",
                    "apkSize": 4096,
                    "classesMd5": "bWQ1",
                    "secretKey": "a2V5",
                    "signature": "c2ln",
                    "signatureSha1": "c2hhMQ==",
                },
            })),
        });

        let reply = slot.wait().await.unwrap();
        assert_eq!(reply.package_name, "com.example");
        assert_eq!(reply.apk_size, 4096);
    }

    #[tokio::test]
    async fn unknown_caller_is_ignored() {
        let (dispatcher, tables) = dispatcher();
        let slot = tables.gpia.register("abc");

        dispatcher.dispatch(SourceMessage {
            source: TargetKind::Personal,
            message: frame(json!({
                "type": "send",
                "payload": {"caller": "bogus", "authKey": "abc"},
            })),
        });

        assert_eq!(slot.wait_timeout(Duration::from_millis(20)).await, None);
    }

    #[tokio::test]
    async fn missing_correlation_field_is_ignored() {
        let (dispatcher, tables) = dispatcher();
        let slot = tables.info.register("A1B2C");

        dispatcher.dispatch(SourceMessage {
            source: TargetKind::Business,
            message: frame(json!({
                "type": "send",
                "payload": {"caller": "info", "token": "oops"},
            })),
        });

        assert_eq!(slot.wait_timeout(Duration::from_millis(20)).await, None);
    }

    #[tokio::test]
    async fn non_matching_key_never_cross_resolves() {
        let (dispatcher, tables) = dispatcher();
        let slot = tables.info.register("AAAAA");

        dispatcher.dispatch(SourceMessage {
            source: TargetKind::Business,
            message: frame(json!({
                "type": "send",
                "payload": {"caller": "info", "id": "ZZZZZ", "type": "success"},
            })),
        });

        assert_eq!(slot.wait_timeout(Duration::from_millis(20)).await, None);
    }

    #[tokio::test]
    async fn malformed_success_payload_becomes_an_in_band_error() {
        let (dispatcher, tables) = dispatcher();
        let slot = tables.gpia.register("abc");

        // A success frame without the token field cannot be projected.
        dispatcher.dispatch(SourceMessage {
            source: TargetKind::Personal,
            message: frame(json!({
                "type": "send",
                "payload": {"caller": "gpia", "authKey": "abc"},
            })),
        });

        assert_matches!(slot.wait().await, Err(TargetError { .. }));
    }

    #[tokio::test]
    async fn run_consumes_frames_from_the_channel() {
        let tables = Arc::new(Tables::new());
        let (dispatcher, tx) = Dispatcher::new(Arc::clone(&tables));
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(dispatcher.run(shutdown.clone()));

        let slot = tables.gpia.register("abc");
        tx.send(SourceMessage {
            source: TargetKind::Personal,
            message: frame(json!({
                "type": "send",
                "payload": {"caller": "gpia", "authKey": "abc", "token": "T9"},
            })),
        })
        .unwrap();

        assert_eq!(
            slot.wait_timeout(Duration::from_secs(1)).await,
            Some(Ok(IntegrityReply { token: "T9".into() }))
        );

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn run_stops_when_all_senders_drop() {
        let tables = Arc::new(Tables::new());
        let (dispatcher, tx) = Dispatcher::new(tables);
        let handle = tokio::spawn(dispatcher.run(CancellationToken::new()));
        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("dispatcher should stop once every source is gone")
            .unwrap();
    }
}
