//! Persistent card identifier store for the Latchkey access controller.
//!
//! This crate owns all card persistence: a fixed-capacity table of up to 50
//! canonical identifiers in a 601-byte non-volatile image, behind the
//! [`CardStore`] API.
//!
//! # Crash consistency
//!
//! There is no transaction layer; the write ordering inside
//! [`CardStore::insert`] substitutes for one. Slot bytes are persisted
//! before the incremented count, so an observer — including the same
//! controller after a crash or reset — never sees a count that references
//! an unwritten slot. The worst a badly timed power loss can do is lose the
//! insert in flight.
//!
//! # Fail-safe recovery
//!
//! A corrupt count header is clamped to zero on [`CardStore::load`] (every
//! card locked out until re-enrollment) and a corrupt slot is treated as a
//! non-match; both are logged, neither trusts garbage data.
//!
//! # Modules
//!
//! - [`store`] — the [`CardStore`] itself
//! - [`layout`] — the binary record format, encoded/decoded at the storage
//!   boundary
//! - [`provision`] — idempotent factory seeding applied at boot

pub mod error;
pub mod layout;
pub mod provision;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use provision::SeedReport;
pub use store::CardStore;
