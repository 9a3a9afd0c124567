//! Binary record format of the persisted card table.
//!
//! The image is a count header followed by fixed-width identifier slots:
//!
//! ```text
//! offset 0               : count (0-50)
//! offset 1 + i*12 .. +12 : slot i
//! ```
//!
//! A slot holds the canonical identifier's ASCII bytes followed by `0x00`
//! padding up to the 12-byte width; no separator or terminator is stored.
//! Encoding and decoding happen only here, at the storage boundary.

use crate::error::{StoreError, StoreResult};
use latchkey_core::{
    CardUid,
    constants::{HEADER_LEN, UID_SLOT_LEN},
};

/// Byte offset of slot `index`.
pub const fn slot_offset(index: usize) -> usize {
    HEADER_LEN + index * UID_SLOT_LEN
}

/// Encode an identifier into its fixed-width slot representation.
pub fn encode_slot(uid: &CardUid) -> [u8; UID_SLOT_LEN] {
    let mut slot = [0u8; UID_SLOT_LEN];
    slot[..uid.as_str().len()].copy_from_slice(uid.as_str().as_bytes());
    slot
}

/// Decode a slot read back from storage.
///
/// The identifier ends at the first `0x00` padding byte (or fills the whole
/// slot). The decoded text is re-validated as a canonical identifier, so
/// garbage in a live slot surfaces as [`StoreError::CorruptSlot`] instead of
/// leaking into comparisons.
pub fn decode_slot(index: usize, slot: &[u8; UID_SLOT_LEN]) -> StoreResult<CardUid> {
    let end = slot.iter().position(|b| *b == 0).unwrap_or(UID_SLOT_LEN);
    let text =
        std::str::from_utf8(&slot[..end]).map_err(|_| StoreError::CorruptSlot { index })?;
    CardUid::parse(text).map_err(|_| StoreError::CorruptSlot { index })
}
