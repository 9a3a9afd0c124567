//! Access-control state machine for the Latchkey door controller.
//!
//! This crate contains the control loop: debounced reader polling,
//! master/reset card handling, single-shot enrollment and relay actuation,
//! all driven through the hardware trait seams and the persistent card
//! store.
//!
//! # Examples
//!
//! ```
//! use latchkey_controller::{Controller, ControllerConfig, ScanOutcome};
//! use latchkey_core::constants::STORE_IMAGE_LEN;
//! use latchkey_hardware::{MemoryNvram, MockReader, MockRelay};
//! use latchkey_store::CardStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (reader, handle) = MockReader::new();
//!     let (relay, _observer) = MockRelay::new();
//!     let mut store = CardStore::new(MemoryNvram::new(STORE_IMAGE_LEN))?;
//!     store.load()?;
//!
//!     let mut controller =
//!         Controller::new(reader, relay, store, ControllerConfig::new()?);
//!
//!     // Nothing in the field yet
//!     assert_eq!(controller.step().await?, ScanOutcome::NoCard);
//!
//!     // An unknown card is denied
//!     handle.present_card(vec![0x0B, 0xAD, 0xC0, 0xDE]).await?;
//!     assert!(matches!(controller.step().await?, ScanOutcome::Denied(_)));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;

pub use config::ControllerConfig;
pub use controller::{
    CardClass, Controller, ControllerError, ControllerExit, ControllerResult, EnrollRefusal,
    ScanOutcome,
};
