//! Mock device implementations for development and testing.
//!
//! Each mock comes as a `(device, handle)` pair: the device half implements
//! the hardware trait and is handed to the controller; the handle half stays
//! with the test or the demo harness and drives or observes the device.

mod reader;
mod relay;

pub use reader::{MockReader, MockReaderHandle};
pub use relay::{MockRelay, MockRelayHandle};
