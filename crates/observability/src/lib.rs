//! Observability infrastructure for AttestBridge
//!
//! This crate provides:
//! - Structured logging via tracing
//! - An optional Prometheus metrics exporter
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("attbx", LogFormat::Pretty)?;
//! observability::init_metrics(9090)?; // optional
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::init_metrics;
