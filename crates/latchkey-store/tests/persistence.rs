//! Durability and crash-consistency tests for the card store.

use latchkey_core::{
    CardUid,
    constants::{COUNT_OFFSET, STORE_IMAGE_LEN},
};
use latchkey_hardware::{FileNvram, HardwareError, MemoryNvram, Nvram};
use latchkey_store::{CardStore, StoreError, provision};

fn uid(text: &str) -> CardUid {
    CardUid::parse(text).unwrap()
}

/// Backing memory that fails every write to the count header after an
/// initial grace period, simulating power loss between the slot write and
/// the count write.
struct HeaderFailNvram {
    inner: MemoryNvram,
    header_writes_allowed: usize,
}

impl HeaderFailNvram {
    fn new(inner: MemoryNvram, header_writes_allowed: usize) -> Self {
        Self {
            inner,
            header_writes_allowed,
        }
    }
}

impl Nvram for HeaderFailNvram {
    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn read_byte(&self, offset: usize) -> latchkey_hardware::Result<u8> {
        self.inner.read_byte(offset)
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> latchkey_hardware::Result<()> {
        if offset == COUNT_OFFSET {
            if self.header_writes_allowed == 0 {
                return Err(HardwareError::disconnected("power lost mid-insert"));
            }
            self.header_writes_allowed -= 1;
        }
        self.inner.write_byte(offset, value)
    }
}

#[test]
fn power_loss_between_slot_and_count_loses_only_the_insert() {
    let mut store = CardStore::new(MemoryNvram::new(STORE_IMAGE_LEN)).unwrap();
    store.load().unwrap();
    store.insert(&uid("4A9F4D99")).unwrap();

    // The next insert's slot write lands but its count write dies.
    let mut store =
        CardStore::new(HeaderFailNvram::new(store.into_inner(), 0)).unwrap();
    store.load().unwrap();

    let result = store.insert(&uid("3AE0D799"));
    assert!(matches!(result, Err(StoreError::Nvm(_))));

    // Reboot on the surviving image: the pre-insert state is intact and the
    // half-written slot is invisible.
    let image = store.into_inner().inner.snapshot();
    let mut rebooted = CardStore::new(MemoryNvram::from_image(image)).unwrap();
    assert_eq!(rebooted.load().unwrap(), 1);
    assert!(rebooted.contains(&uid("4A9F4D99")).unwrap());
    assert!(!rebooted.contains(&uid("3AE0D799")).unwrap());
}

#[test]
fn file_image_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.bin");

    {
        let mut store =
            CardStore::new(FileNvram::open(&path, STORE_IMAGE_LEN).unwrap()).unwrap();
        store.load().unwrap();
        store.insert(&uid("A1B2C3D4E5F6")).unwrap();
        store.insert(&uid("4A9F4D99")).unwrap();
    }

    let mut store = CardStore::new(FileNvram::open(&path, STORE_IMAGE_LEN).unwrap()).unwrap();
    assert_eq!(store.load().unwrap(), 2);
    assert!(store.contains(&uid("A1B2C3D4E5F6")).unwrap());
    assert!(store.contains(&uid("4A9F4D99")).unwrap());
}

#[test]
fn reset_then_reopen_shows_empty_store_with_stale_slots() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.bin");

    {
        let mut store =
            CardStore::new(FileNvram::open(&path, STORE_IMAGE_LEN).unwrap()).unwrap();
        store.load().unwrap();
        store.insert(&uid("A1B2C3D4E5F6")).unwrap();
        store.reset().unwrap();
    }

    let store = {
        let mut store =
            CardStore::new(FileNvram::open(&path, STORE_IMAGE_LEN).unwrap()).unwrap();
        assert_eq!(store.load().unwrap(), 0);
        store
    };
    // The slot bytes are still on disk but never consulted.
    assert!(!store.contains(&uid("A1B2C3D4E5F6")).unwrap());
    assert!(store.cards().unwrap().is_empty());
}

#[test]
fn seeding_twice_across_reboots_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.bin");
    let factory = provision::factory_cards().unwrap();

    let first_boot = {
        let mut store =
            CardStore::new(FileNvram::open(&path, STORE_IMAGE_LEN).unwrap()).unwrap();
        store.load().unwrap();
        provision::seed(&mut store, &factory).unwrap();
        store.cards().unwrap()
    };

    let mut store = CardStore::new(FileNvram::open(&path, STORE_IMAGE_LEN).unwrap()).unwrap();
    store.load().unwrap();
    let report = provision::seed(&mut store, &factory).unwrap();

    assert_eq!(report.inserted, 0);
    assert_eq!(report.already_present, factory.len());
    assert_eq!(store.cards().unwrap(), first_boot);
}
