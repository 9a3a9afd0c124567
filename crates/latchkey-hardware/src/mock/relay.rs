//! Mock relay implementation for testing and development.

use crate::{Result, traits::Relay};
use tokio::sync::mpsc;
use tracing::debug;

/// Mock door relay.
///
/// Every energize/de-energize transition is recorded and observable through
/// the paired [`MockRelayHandle`], so tests can assert on pulse patterns
/// and grant timing.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::{MockRelay, Relay};
///
/// #[tokio::main]
/// async fn main() -> latchkey_hardware::Result<()> {
///     let (mut relay, mut handle) = MockRelay::new();
///
///     relay.set_energized(true).await?;
///     relay.set_energized(false).await?;
///
///     assert_eq!(handle.drain(), vec![true, false]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockRelay {
    event_tx: mpsc::UnboundedSender<bool>,
    energized: bool,
}

impl MockRelay {
    /// Create a new mock relay, initially de-energized.
    pub fn new() -> (Self, MockRelayHandle) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let relay = Self {
            event_tx,
            energized: false,
        };

        (relay, MockRelayHandle { event_rx })
    }

    /// Current coil state.
    pub fn is_energized(&self) -> bool {
        self.energized
    }
}

impl Relay for MockRelay {
    async fn set_energized(&mut self, on: bool) -> Result<()> {
        debug!(energized = on, "mock relay transition");
        self.energized = on;
        // A dropped handle just means nobody is observing transitions.
        let _ = self.event_tx.send(on);
        Ok(())
    }
}

/// Handle observing a mock relay's transitions.
#[derive(Debug)]
pub struct MockRelayHandle {
    event_rx: mpsc::UnboundedReceiver<bool>,
}

impl MockRelayHandle {
    /// Drain all transitions recorded since the last call, in order.
    ///
    /// Each entry is the coil state after the transition.
    pub fn drain(&mut self) -> Vec<bool> {
        let mut transitions = Vec::new();
        while let Ok(state) = self.event_rx.try_recv() {
            transitions.push(state);
        }
        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_relay_records_transitions() {
        let (mut relay, mut handle) = MockRelay::new();
        assert!(!relay.is_energized());

        relay.set_energized(true).await.unwrap();
        assert!(relay.is_energized());
        relay.set_energized(false).await.unwrap();
        relay.set_energized(true).await.unwrap();

        assert_eq!(handle.drain(), vec![true, false, true]);
        assert_eq!(handle.drain(), Vec::<bool>::new());
    }

    #[tokio::test]
    async fn test_mock_relay_works_without_observer() {
        let (mut relay, handle) = MockRelay::new();
        drop(handle);

        assert!(relay.set_energized(true).await.is_ok());
    }
}
