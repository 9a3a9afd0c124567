use latchkey_core::CardUid;
use latchkey_hardware::HardwareError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Attempted insert of an identifier that is already stored.
    /// Recovered locally; the store is unchanged.
    #[error("card {0} is already stored")]
    DuplicateCard(CardUid),

    /// The store holds the maximum number of identifiers.
    /// Recovered locally; the insert is refused.
    #[error("card store is full ({capacity} cards)")]
    StoreFull { capacity: usize },

    /// The persisted count header is out of range.
    /// Recovered on load by treating the store as empty.
    #[error("corrupt count header: {found} exceeds capacity {capacity}")]
    CorruptHeader { found: u8, capacity: usize },

    /// A slot inside the valid range does not decode to an identifier.
    #[error("corrupt identifier slot at index {index}")]
    CorruptSlot { index: usize },

    /// The backing memory is smaller than the store image.
    #[error("storage capacity {capacity} bytes is below the {required} byte image")]
    ImageTooSmall { capacity: usize, required: usize },

    #[error(transparent)]
    Nvm(#[from] HardwareError),
}
