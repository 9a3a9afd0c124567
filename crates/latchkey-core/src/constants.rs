//! Shared constants for the Latchkey access controller.
//!
//! Everything with a cross-crate meaning lives here: the geometry of the
//! persisted card table, the controller's timing windows, the special
//! master/reset card identifiers, and the factory provisioning list.
//!
//! # Persisted image layout
//!
//! ```text
//! offset 0               : card count (0-50)
//! offset 1 + i*12 .. +12 : slot i, canonical UID bytes padded with 0x00
//! ```
//!
//! The count is the single source of truth for how many slots are valid;
//! slots past the count are stale and never consulted.

// ============================================================================
// Store geometry
// ============================================================================

/// Maximum number of authorized cards the store can hold.
pub const MAX_CARDS: usize = 50;

/// Fixed width of one identifier slot in bytes.
///
/// Canonical identifiers are 1-12 uppercase hexadecimal characters; shorter
/// identifiers are zero-padded on disk to this width.
pub const UID_SLOT_LEN: usize = 12;

/// Offset of the count header.
pub const COUNT_OFFSET: usize = 0;

/// Bytes reserved for the header before the first slot.
pub const HEADER_LEN: usize = 1;

/// Total size of the persisted image in bytes.
///
/// ```
/// use latchkey_core::constants::STORE_IMAGE_LEN;
///
/// assert_eq!(STORE_IMAGE_LEN, 601);
/// ```
pub const STORE_IMAGE_LEN: usize = HEADER_LEN + MAX_CARDS * UID_SLOT_LEN;

// ============================================================================
// Raw card reads
// ============================================================================

/// Minimum raw UID length in bytes (per ISO 14443).
pub const MIN_RAW_UID_LEN: usize = 4;

/// Maximum raw UID length in bytes (per ISO 14443).
pub const MAX_RAW_UID_LEN: usize = 10;

// ============================================================================
// Controller timing
// ============================================================================

/// Debounce window in milliseconds.
///
/// A physically presented card is read many times per second; reads arriving
/// within this window of the last accepted read are discarded so one
/// presentation produces one state transition.
pub const DEBOUNCE_WINDOW_MS: u64 = 3000;

/// How long the relay stays energized after a successful authorization,
/// in milliseconds.
pub const GRANT_DURATION_MS: u64 = 3000;

/// Number of short relay pulses acknowledging the master card.
pub const MASTER_PULSE_COUNT: u32 = 3;

/// Energized phase of one master-acknowledge pulse, in milliseconds.
pub const MASTER_PULSE_ON_MS: u64 = 250;

/// Gap between master-acknowledge pulses, in milliseconds.
pub const MASTER_PULSE_OFF_MS: u64 = 250;

/// Default reader polling interval of the control loop, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// ============================================================================
// Special cards
// ============================================================================

/// Canonical UID of the master card.
///
/// Presenting it arms single-shot enrollment: the next non-special card read
/// is added to the store instead of checked against it. Never stored, never
/// checked against the store.
pub const MASTER_UID: &str = "D3EC2B28";

/// Canonical UID of the reset card.
///
/// Presenting it wipes the card store and restarts the controller,
/// regardless of the current mode. Never stored, never checked against
/// the store.
pub const RESET_UID: &str = "B2C82C1B";

// ============================================================================
// Factory provisioning
// ============================================================================

/// Canonical UIDs seeded into the store on every boot.
///
/// Seeding is idempotent: identifiers already present are skipped, so the
/// list can be applied unconditionally at startup.
pub const FACTORY_UIDS: &[&str] = &[
    "4A9F4D99",
    "3AE0D799",
    "5A920999",
    "638B272D",
    "E3825718",
    "43355D2D",
    "5A688A99",
    "5A4F2199",
    "335C3F2D",
    "F35A172D",
    "3AE2B199",
    "73368713",
    "4A1D1F99",
    "DA8E7A99",
    "139D452D",
    "4A230B99",
    "DA1AF899",
    "3AF29E99",
    "5A368E99",
    "4AD6B399",
    "DA113999",
    "DA82B199",
    "DAEA6D99",
    "D3E3252D",
    "4A27F599",
    "DA092899",
    "83D8332D",
    "5A1C0B99",
    "5A90E899",
    "DA995199",
    "F3CC2A2D",
];
