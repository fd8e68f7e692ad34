//! Attached-target transports for AttestBridge
//!
//! An attached target is an external instrumented process that receives
//! outbound request messages and emits inbound reply frames, asynchronously
//! and in no particular order. This crate owns that boundary:
//!
//! - [`TargetTransport`] - the transport interface: fire-and-forget posts,
//!   inbound frames delivered to the dispatcher channel
//! - [`TcpTransport`] - newline-delimited JSON over a TCP connection to the
//!   device-side endpoint
//! - [`ChannelTransport`] - in-process transport for tests and embedders
//! - [`AttachmentPool`] - holds the two attachments and selects one per
//!   request
//!
//! Delivery is not guaranteed: a post to a dead target is logged and the
//! pending request simply keeps waiting.

pub mod channel;
pub mod error;
pub mod pool;
pub mod script;
pub mod tcp;
pub mod traits;

pub use channel::ChannelTransport;
pub use error::ProbeError;
pub use pool::{AttachmentPool, AttachmentStatus};
pub use script::load_script;
pub use tcp::TcpTransport;
pub use traits::TargetTransport;
