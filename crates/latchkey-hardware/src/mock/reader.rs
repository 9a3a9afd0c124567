//! Mock card reader implementation for testing and development.
//!
//! This module provides a simulated contactless reader that can be
//! controlled programmatically without physical hardware.

use crate::{
    Result,
    traits::{CardRead, CardReader},
    types::ReaderInfo,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// Mock contactless card reader.
///
/// The reader consumes card presentations injected through its
/// [`MockReaderHandle`]; `try_read_uid` is non-blocking and reports one
/// queued presentation per call.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::{CardReader, MockReader};
///
/// #[tokio::main]
/// async fn main() -> latchkey_hardware::Result<()> {
///     let (mut reader, handle) = MockReader::new();
///     reader.init().await?;
///
///     handle.present_card(vec![0x4A, 0x9F, 0x4D, 0x99]).await?;
///
///     let read = reader.try_read_uid().await?.unwrap();
///     assert_eq!(read.uid_hex(), "4A9F4D99");
///
///     // Field is empty again
///     assert!(reader.try_read_uid().await?.is_none());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockReader {
    /// Channel receiver for presented cards
    event_rx: mpsc::Receiver<CardRead>,

    /// Device name
    name: String,

    /// Simulate a dead reader at init time
    fail_init: Arc<AtomicBool>,
}

impl MockReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockReader, MockReaderHandle) where the handle
    /// can be used to simulate card presentations.
    pub fn new() -> (Self, MockReaderHandle) {
        Self::with_name("Mock card reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let fail_init = Arc::new(AtomicBool::new(false));

        let reader = Self {
            event_rx,
            name,
            fail_init: Arc::clone(&fail_init),
        };

        let handle = MockReaderHandle {
            event_tx,
            fail_init,
        };

        (reader, handle)
    }
}

impl CardReader for MockReader {
    async fn init(&mut self) -> Result<ReaderInfo> {
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(crate::HardwareError::initialization_failed(
                "reader did not respond to firmware probe",
            ));
        }
        Ok(
            ReaderInfo::new(self.name.clone(), vec!["ISO14443A".to_string()])
                .with_firmware_version("mock"),
        )
    }

    async fn try_read_uid(&mut self) -> Result<Option<CardRead>> {
        match self.event_rx.try_recv() {
            Ok(read) => {
                debug!(uid = %read.uid_hex(), "mock reader returning card");
                Ok(Some(read))
            }
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(
                crate::HardwareError::disconnected("mock reader event channel closed"),
            ),
        }
    }
}

/// Handle for controlling a mock card reader.
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    event_tx: mpsc::Sender<CardRead>,
    fail_init: Arc<AtomicBool>,
}

impl MockReaderHandle {
    /// Present a card to the reader.
    ///
    /// The raw bytes are validated the way a real reader driver would
    /// (4-10 bytes per ISO 14443) before being queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID bytes are invalid or the reader has
    /// been dropped.
    pub async fn present_card(&self, uid: Vec<u8>) -> Result<()> {
        let read = CardRead::new(uid)?;
        self.event_tx
            .send(read)
            .await
            .map_err(|_| crate::HardwareError::disconnected("mock reader event channel closed"))
    }

    /// Make the next `init` call fail, simulating a dead reader at boot.
    pub fn set_init_failure(&self, fail: bool) {
        self.fail_init.store(fail, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_reader_present_and_read() {
        let (mut reader, handle) = MockReader::new();

        handle
            .present_card(vec![0x4A, 0x9F, 0x4D, 0x99])
            .await
            .unwrap();

        let read = reader.try_read_uid().await.unwrap().unwrap();
        assert_eq!(read.uid_hex(), "4A9F4D99");
    }

    #[tokio::test]
    async fn test_mock_reader_empty_field_is_none() {
        let (mut reader, _handle) = MockReader::new();
        assert!(reader.try_read_uid().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_reader_queues_presentations_in_order() {
        let (mut reader, handle) = MockReader::new();

        handle.present_card(vec![0x01, 0x02, 0x03, 0x04]).await.unwrap();
        handle.present_card(vec![0x05, 0x06, 0x07, 0x08]).await.unwrap();

        let first = reader.try_read_uid().await.unwrap().unwrap();
        let second = reader.try_read_uid().await.unwrap().unwrap();
        assert_eq!(first.uid_hex(), "01020304");
        assert_eq!(second.uid_hex(), "05060708");
    }

    #[tokio::test]
    async fn test_mock_reader_rejects_invalid_uid() {
        let (_reader, handle) = MockReader::new();
        assert!(handle.present_card(vec![0x01]).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_reader_init_failure() {
        let (mut reader, handle) = MockReader::new();

        handle.set_init_failure(true);
        let result = reader.init().await;
        assert!(matches!(
            result,
            Err(crate::HardwareError::InitializationFailed { .. })
        ));

        handle.set_init_failure(false);
        let info = reader.init().await.unwrap();
        assert_eq!(info.name, "Mock card reader");
    }

    #[tokio::test]
    async fn test_mock_reader_disconnected_after_handle_drop() {
        let (mut reader, handle) = MockReader::new();
        drop(handle);

        let result = reader.try_read_uid().await;
        assert!(matches!(
            result,
            Err(crate::HardwareError::Disconnected { .. })
        ));
    }
}
