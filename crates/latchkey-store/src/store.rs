//! Persistent identifier store.

use crate::error::{StoreError, StoreResult};
use crate::layout;
use latchkey_core::{
    CardUid,
    constants::{COUNT_OFFSET, MAX_CARDS, STORE_IMAGE_LEN, UID_SLOT_LEN},
};
use latchkey_hardware::Nvram;
use tracing::warn;

/// Append-style fixed-capacity table of canonical card identifiers backed
/// by byte-addressable non-volatile memory.
///
/// The store exclusively owns all access to the card region of the backing
/// memory. The persisted count is the single source of truth for how many
/// slots are valid: it is the first thing read at boot ([`load`]) and the
/// last thing written after a successful [`insert`]. A power loss between
/// writing a slot and updating the count therefore leaves the store
/// consistent at the pre-insert count — at worst a lost insert, never a
/// corrupt read.
///
/// [`load`]: CardStore::load
/// [`insert`]: CardStore::insert
///
/// # Examples
///
/// ```
/// use latchkey_core::{CardUid, constants::STORE_IMAGE_LEN};
/// use latchkey_hardware::MemoryNvram;
/// use latchkey_store::CardStore;
///
/// # fn main() -> Result<(), latchkey_store::StoreError> {
/// let mut store = CardStore::new(MemoryNvram::new(STORE_IMAGE_LEN))?;
/// store.load()?;
///
/// let uid = CardUid::parse("A1B2C3D4E5F6").unwrap();
/// store.insert(&uid)?;
/// assert!(store.contains(&uid)?);
/// assert_eq!(store.count(), 1);
/// # Ok(())
/// # }
/// ```
pub struct CardStore<M: Nvram> {
    nvm: M,
    count: u8,
}

impl<M: Nvram> CardStore<M> {
    /// Create a store over the given backing memory.
    ///
    /// The in-memory count starts at zero; call [`load`](CardStore::load)
    /// before anything else to pick up the persisted count.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ImageTooSmall` if the memory cannot hold the
    /// full 601-byte image.
    pub fn new(nvm: M) -> StoreResult<Self> {
        if nvm.capacity() < STORE_IMAGE_LEN {
            return Err(StoreError::ImageTooSmall {
                capacity: nvm.capacity(),
                required: STORE_IMAGE_LEN,
            });
        }
        Ok(Self { nvm, count: 0 })
    }

    /// Read the persisted count header.
    ///
    /// An out-of-range header indicates corruption and is recovered by
    /// treating the store as empty: locking every card out is safer than
    /// trusting garbage slot data. The recovery is logged, never silent.
    ///
    /// # Errors
    ///
    /// Propagates backing-memory faults.
    pub fn load(&mut self) -> StoreResult<u8> {
        let raw = self.nvm.read_byte(COUNT_OFFSET)?;
        self.count = match Self::decode_count(raw) {
            Ok(count) => count,
            Err(StoreError::CorruptHeader { found, capacity }) => {
                warn!(found, capacity, "corrupt card count header, treating store as empty");
                0
            }
            Err(e) => return Err(e),
        };
        Ok(self.count)
    }

    fn decode_count(raw: u8) -> StoreResult<u8> {
        if raw as usize > MAX_CARDS {
            return Err(StoreError::CorruptHeader {
                found: raw,
                capacity: MAX_CARDS,
            });
        }
        Ok(raw)
    }

    /// Number of valid identifiers.
    pub fn count(&self) -> usize {
        self.count as usize
    }

    /// Whether the store holds `MAX_CARDS` identifiers.
    pub fn is_full(&self) -> bool {
        self.count() == MAX_CARDS
    }

    /// Check whether `uid` is stored.
    ///
    /// Linear scan over the valid range; O(count) with count ≤ 50. A slot
    /// that fails to decode is logged and treated as a non-match — one bad
    /// cell must not take scanning down for every card.
    ///
    /// # Errors
    ///
    /// Propagates backing-memory faults.
    pub fn contains(&self, uid: &CardUid) -> StoreResult<bool> {
        for index in 0..self.count() {
            match self.read_slot(index) {
                Ok(stored) => {
                    if stored == *uid {
                        return Ok(true);
                    }
                }
                Err(StoreError::CorruptSlot { .. }) => {
                    warn!(index, "undecodable identifier slot, treating as no match");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }

    /// Insert `uid` at the end of the table and persist it.
    ///
    /// The slot bytes are written before the incremented count; this
    /// ordering is the crash-consistency invariant of the store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateCard` if the identifier is already
    /// stored and `StoreError::StoreFull` at capacity; both leave the store
    /// unchanged. Backing-memory faults propagate.
    pub fn insert(&mut self, uid: &CardUid) -> StoreResult<()> {
        if self.contains(uid)? {
            return Err(StoreError::DuplicateCard(uid.clone()));
        }
        if self.is_full() {
            return Err(StoreError::StoreFull {
                capacity: MAX_CARDS,
            });
        }

        let slot = layout::encode_slot(uid);
        self.nvm
            .write_all_at(layout::slot_offset(self.count()), &slot)?;
        let next = self.count + 1;
        self.nvm.write_byte(COUNT_OFFSET, next)?;
        self.count = next;
        Ok(())
    }

    /// Wipe the store by persisting a zero count.
    ///
    /// Stale slots past index zero are invalidated by the count, not
    /// erased; this keeps the wipe to a single cell write.
    ///
    /// # Errors
    ///
    /// Propagates backing-memory faults.
    pub fn reset(&mut self) -> StoreResult<()> {
        self.nvm.write_byte(COUNT_OFFSET, 0)?;
        self.count = 0;
        Ok(())
    }

    /// Decoded listing of all stored identifiers, in insertion order.
    ///
    /// Corrupt slots are skipped with a warning, mirroring
    /// [`contains`](CardStore::contains).
    ///
    /// # Errors
    ///
    /// Propagates backing-memory faults.
    pub fn cards(&self) -> StoreResult<Vec<CardUid>> {
        let mut cards = Vec::with_capacity(self.count());
        for index in 0..self.count() {
            match self.read_slot(index) {
                Ok(uid) => cards.push(uid),
                Err(StoreError::CorruptSlot { .. }) => {
                    warn!(index, "undecodable identifier slot, omitting from listing");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(cards)
    }

    /// Give the backing memory back, consuming the store.
    pub fn into_inner(self) -> M {
        self.nvm
    }

    fn read_slot(&self, index: usize) -> StoreResult<CardUid> {
        let mut slot = [0u8; UID_SLOT_LEN];
        self.nvm.read_into(layout::slot_offset(index), &mut slot)?;
        layout::decode_slot(index, &slot)
    }
}
