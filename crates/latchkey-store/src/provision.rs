//! Factory provisioning.
//!
//! On every boot a fixed list of factory card identifiers is applied to the
//! store. Seeding is idempotent: identifiers already present are skipped,
//! and a full store is reported but does not abort the remaining attempts.

use crate::error::{StoreError, StoreResult};
use crate::store::CardStore;
use latchkey_core::{CardUid, constants::FACTORY_UIDS};
use latchkey_hardware::Nvram;
use tracing::{info, warn};

/// Outcome of one seeding pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Identifiers newly written to the store.
    pub inserted: usize,

    /// Identifiers that were already stored.
    pub already_present: usize,

    /// Identifiers refused because the store was full.
    pub rejected: usize,
}

/// Parse the built-in factory list.
///
/// # Errors
///
/// Returns a codec error if a list entry is not a canonical identifier.
pub fn factory_cards() -> latchkey_core::Result<Vec<CardUid>> {
    FACTORY_UIDS.iter().map(|uid| CardUid::parse(uid)).collect()
}

/// Ensure every identifier in `factory` is present in the store.
///
/// Applies the list in order. Safe to run on every boot: a second pass over
/// the same list is a no-op. A full store is best-effort — the refusal is
/// logged and counted, and the remaining entries are still attempted.
///
/// # Errors
///
/// Propagates backing-memory faults; local refusals (duplicate, capacity)
/// are handled here.
pub fn seed<M: Nvram>(store: &mut CardStore<M>, factory: &[CardUid]) -> StoreResult<SeedReport> {
    let mut report = SeedReport::default();
    for uid in factory {
        if store.contains(uid)? {
            report.already_present += 1;
            continue;
        }
        match store.insert(uid) {
            Ok(()) => {
                info!(%uid, "factory card stored");
                report.inserted += 1;
            }
            Err(StoreError::StoreFull { .. }) => {
                warn!(%uid, "card store full, factory card skipped");
                report.rejected += 1;
            }
            Err(e) => return Err(e),
        }
    }
    info!(
        inserted = report.inserted,
        already_present = report.already_present,
        rejected = report.rejected,
        "factory provisioning complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::constants::{MAX_CARDS, STORE_IMAGE_LEN};
    use latchkey_hardware::MemoryNvram;

    fn empty_store() -> CardStore<MemoryNvram> {
        let mut store = CardStore::new(MemoryNvram::new(STORE_IMAGE_LEN)).unwrap();
        store.load().unwrap();
        store
    }

    #[test]
    fn test_factory_list_parses() {
        let cards = factory_cards().unwrap();
        assert_eq!(cards.len(), FACTORY_UIDS.len());
    }

    #[test]
    fn test_seed_empty_store() {
        let mut store = empty_store();
        let factory = factory_cards().unwrap();

        let report = seed(&mut store, &factory).unwrap();

        assert_eq!(report.inserted, factory.len());
        assert_eq!(report.already_present, 0);
        assert_eq!(report.rejected, 0);
        assert_eq!(store.count(), factory.len());
        for uid in &factory {
            assert!(store.contains(uid).unwrap());
        }
    }

    #[test]
    fn test_seed_is_idempotent() {
        let mut store = empty_store();
        let factory = factory_cards().unwrap();

        seed(&mut store, &factory).unwrap();
        let listing = store.cards().unwrap();

        let report = seed(&mut store, &factory).unwrap();

        assert_eq!(report.inserted, 0);
        assert_eq!(report.already_present, factory.len());
        assert_eq!(store.count(), factory.len());
        assert_eq!(store.cards().unwrap(), listing);
    }

    #[test]
    fn test_seed_best_effort_when_full() {
        let mut store = empty_store();
        // Leave room for one card only.
        for n in 0..MAX_CARDS - 1 {
            store
                .insert(&CardUid::parse(&format!("{n:08X}")).unwrap())
                .unwrap();
        }

        let factory = factory_cards().unwrap();
        let report = seed(&mut store, &factory[..3]).unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.rejected, 2);
        assert!(store.is_full());
        assert!(store.contains(&factory[0]).unwrap());
        assert!(!store.contains(&factory[1]).unwrap());
    }
}
