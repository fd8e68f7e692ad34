//! Correlation router core for AttestBridge
//!
//! The bridge exposes synchronous HTTP endpoints backed by instrumented
//! target processes that answer only through asynchronous, unordered
//! messages. This crate is the part that makes that work:
//!
//! - [`ResponseSlot`] - single-assignment cell one request waits on
//! - [`PendingTable`] - per-request-kind map from correlation key to slot
//! - [`Dispatcher`] - classifies every inbound message and resolves the
//!   matching slot
//! - [`key`] - random correlation key generation for kinds without a
//!   natural identity
//!
//! One [`PendingTable`] exists per request kind and lives for the whole
//! process. Tables are independent; no cross-table locking ever happens.

pub mod dispatch;
pub mod key;
pub mod message;
pub mod slot;
pub mod table;

pub use dispatch::{Dispatcher, SourceMessage, Tables};
pub use message::{
    CertificateReply, InboundMessage, IntegrityReply, OutboundMessage, PackageInfoReply,
    Reply, RequestKind, TargetError,
};
pub use slot::ResponseSlot;
pub use table::PendingTable;
