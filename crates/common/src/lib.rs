//! Common types and utilities for AttestBridge
//!
//! This crate provides the shared pieces used across all AttestBridge
//! crates.
//!
//! # Modules
//!
//! - [`error`] - Common error types
//! - [`types`] - Shared domain types (target identity)
//! - [`b64`] - Base64 payload helpers

pub mod b64;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::TargetKind;
