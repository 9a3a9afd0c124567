//! Hardware capability trait definitions.
//!
//! This module defines the contract between the access controller and its
//! three hardware collaborators: the contactless card reader, the door
//! relay, and the byte-addressable non-volatile memory holding the card
//! table. The traits enable substitution between mock implementations (for
//! development and testing) and real drivers.
//!
//! Reader and relay traits use native `async fn` methods (Edition 2024
//! RPITIT); the [`Nvram`] trait is synchronous because the storage
//! capability is synchronous byte access.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::ReaderInfo;
use latchkey_core::constants::{MAX_RAW_UID_LEN, MIN_RAW_UID_LEN};

/// A single card presentation captured by a reader.
///
/// Carries the raw UID bytes exactly as the reader returned them, plus a
/// capture timestamp. Canonical encoding happens later, at the controller.
#[derive(Debug, Clone)]
pub struct CardRead {
    /// Card unique identifier (4-10 bytes).
    pub uid: Vec<u8>,

    /// Timestamp when the card was read.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl CardRead {
    /// Create a new card read with the current timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is not within the valid range
    /// of 4-10 bytes as specified by ISO 14443.
    ///
    /// # Examples
    ///
    /// ```
    /// use latchkey_hardware::CardRead;
    ///
    /// let read = CardRead::new(vec![0x4A, 0x9F, 0x4D, 0x99]).unwrap();
    /// assert_eq!(read.uid_hex(), "4A9F4D99");
    /// ```
    pub fn new(uid: Vec<u8>) -> Result<Self> {
        let len = uid.len();
        if !(MIN_RAW_UID_LEN..=MAX_RAW_UID_LEN).contains(&len) {
            return Err(crate::HardwareError::invalid_data(format!(
                "Card UID length must be between {MIN_RAW_UID_LEN} and {MAX_RAW_UID_LEN} bytes, got {len}"
            )));
        }
        Ok(Self {
            uid,
            timestamp: chrono::Utc::now(),
        })
    }

    /// Get the raw UID as a zero-padded hexadecimal string.
    ///
    /// This is the diagnostic rendering of the raw bytes; it is *not* the
    /// canonical identifier, which drops per-byte leading zeros.
    pub fn uid_hex(&self) -> String {
        self.uid
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Contactless card reader abstraction.
///
/// The reader is polled once per control-loop iteration; [`try_read_uid`]
/// never blocks waiting for a card.
///
/// This trait is not object-safe (`async fn` methods return opaque
/// futures); consume it through generic type parameters:
///
/// ```no_run
/// use latchkey_hardware::{CardReader, Result};
///
/// async fn poll_once<R: CardReader>(reader: &mut R) -> Result<()> {
///     if let Some(read) = reader.try_read_uid().await? {
///         println!("card present: {}", read.uid_hex());
///     }
///     Ok(())
/// }
/// ```
///
/// [`try_read_uid`]: CardReader::try_read_uid
pub trait CardReader: Send + Sync {
    /// Probe and initialize the reader.
    ///
    /// Called once at boot, before the control loop starts. Returns reader
    /// metadata for the boot diagnostic.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` if the reader does not
    /// respond to the probe. This is fatal: the controller must not start
    /// without a working reader.
    async fn init(&mut self) -> Result<ReaderInfo>;

    /// Attempt to read a present card's identifier.
    ///
    /// Non-blocking: returns `Ok(None)` immediately when no card is in the
    /// reader's field.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected or a communication
    /// error occurs.
    async fn try_read_uid(&mut self) -> Result<Option<CardRead>>;
}

/// Door relay abstraction.
pub trait Relay: Send + Sync {
    /// Energize or de-energize the relay.
    ///
    /// # Errors
    ///
    /// Returns an error if the actuator cannot be driven.
    async fn set_energized(&mut self, on: bool) -> Result<()>;
}

/// Byte-addressable non-volatile memory abstraction.
///
/// Models an EEPROM-like part: durable, synchronous single-byte access,
/// with an implementation-defined write-endurance limit per cell. The card
/// store is the only consumer and the only mutator.
pub trait Nvram: Send + Sync {
    /// Total capacity in bytes.
    fn capacity(&self) -> usize;

    /// Read the byte at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::OutOfBounds` if `offset` is past the
    /// capacity.
    fn read_byte(&self, offset: usize) -> Result<u8>;

    /// Write one byte at `offset`, durably.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::OutOfBounds` for invalid offsets, or an
    /// implementation-specific error if the write cannot be made durable.
    fn write_byte(&mut self, offset: usize, value: u8) -> Result<()>;

    /// Fill `buf` from consecutive bytes starting at `offset`.
    fn read_into(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = self.read_byte(offset + i)?;
        }
        Ok(())
    }

    /// Write `bytes` to consecutive offsets starting at `offset`.
    fn write_all_at(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        for (i, byte) in bytes.iter().enumerate() {
            self.write_byte(offset + i, *byte)?;
        }
        Ok(())
    }
}

impl<T: Nvram + ?Sized> Nvram for Box<T> {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read_byte(&self, offset: usize) -> Result<u8> {
        (**self).read_byte(offset)
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<()> {
        (**self).write_byte(offset, value)
    }
}
