//! Hardware abstraction layer for the Latchkey access controller.
//!
//! This crate defines trait seams for the controller's three hardware
//! collaborators and ships the implementations that exist without physical
//! hardware:
//!
//! - [`CardReader`] — contactless reader, polled non-blocking once per
//!   control-loop iteration, with a boot-time init probe.
//! - [`Relay`] — the door actuator.
//! - [`Nvram`] — byte-addressable non-volatile memory holding the card
//!   table; synchronous and durable.
//!
//! Reader and relay operations are async using native `async fn` in traits
//! (Edition 2024 RPITIT); they are consumed through generic type parameters,
//! not trait objects.
//!
//! # Implementations
//!
//! [`MockReader`] and [`MockRelay`] are channel-driven mocks with control
//! handles for tests and the demo binary. [`MemoryNvram`] (with optional
//! write-endurance modelling) and the file-backed [`FileNvram`] cover the
//! storage capability.
//!
//! # Examples
//!
//! ```
//! use latchkey_hardware::{CardReader, MockReader, Relay, MockRelay};
//!
//! #[tokio::main]
//! async fn main() -> latchkey_hardware::Result<()> {
//!     let (mut reader, handle) = MockReader::new();
//!     let (mut relay, _observer) = MockRelay::new();
//!
//!     reader.init().await?;
//!     handle.present_card(vec![0x4A, 0x9F, 0x4D, 0x99]).await?;
//!
//!     if reader.try_read_uid().await?.is_some() {
//!         relay.set_energized(true).await?;
//!         relay.set_energized(false).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod mock;
pub mod nvram;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use mock::{MockReader, MockReaderHandle, MockRelay, MockRelayHandle};
pub use nvram::{FileNvram, MemoryNvram};
pub use traits::{CardRead, CardReader, Nvram, Relay};
pub use types::ReaderInfo;
