//! Core types for the Latchkey door access controller.
//!
//! This crate defines the canonical card identifier type ([`CardUid`]) with
//! its raw-byte encoding rules, the constants shared across the workspace
//! (store geometry, timing, the special master/reset cards and the factory
//! provisioning list), and the core error type.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::CardUid;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
