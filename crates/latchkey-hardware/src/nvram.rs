//! Non-volatile memory implementations.
//!
//! Two [`Nvram`] backends: an in-memory image for tests and ephemeral runs,
//! and a file-backed image giving the demo binary real durability across
//! restarts.

use crate::error::{HardwareError, Result};
use crate::traits::Nvram;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// In-memory non-volatile memory image.
///
/// Tracks per-cell write counts and can enforce a write-endurance limit the
/// way a real EEPROM part does, so tests can exercise endurance exhaustion.
/// Default construction is unbounded.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::{MemoryNvram, Nvram};
///
/// let mut nvm = MemoryNvram::new(601);
/// nvm.write_byte(0, 7).unwrap();
/// assert_eq!(nvm.read_byte(0).unwrap(), 7);
/// assert_eq!(nvm.write_count(0), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryNvram {
    bytes: Vec<u8>,
    write_counts: Vec<u32>,
    endurance: Option<u32>,
}

impl MemoryNvram {
    /// Create a zero-filled image of `capacity` bytes with unbounded
    /// endurance.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
            write_counts: vec![0; capacity],
            endurance: None,
        }
    }

    /// Create a zero-filled image that fails writes to any cell written
    /// more than `limit` times.
    pub fn with_endurance(capacity: usize, limit: u32) -> Self {
        Self {
            endurance: Some(limit),
            ..Self::new(capacity)
        }
    }

    /// Restore an image from a previously captured snapshot.
    pub fn from_image(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self {
            bytes,
            write_counts: vec![0; len],
            endurance: None,
        }
    }

    /// Copy of the current image contents.
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Number of writes the cell at `offset` has received, or `None` when
    /// the offset is out of bounds.
    pub fn write_count(&self, offset: usize) -> Option<u32> {
        self.write_counts.get(offset).copied()
    }

    fn check_bounds(&self, offset: usize) -> Result<()> {
        if offset >= self.bytes.len() {
            return Err(HardwareError::out_of_bounds(offset, self.bytes.len()));
        }
        Ok(())
    }
}

impl Nvram for MemoryNvram {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read_byte(&self, offset: usize) -> Result<u8> {
        self.check_bounds(offset)?;
        Ok(self.bytes[offset])
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<()> {
        self.check_bounds(offset)?;
        let writes = self.write_counts[offset] + 1;
        if let Some(limit) = self.endurance
            && writes > limit
        {
            return Err(HardwareError::EnduranceExhausted { offset, writes });
        }
        self.write_counts[offset] = writes;
        self.bytes[offset] = value;
        Ok(())
    }
}

/// File-backed non-volatile memory image.
///
/// The whole image is read into memory at open; writes go through to the
/// file and are synced before returning, so a completed `write_byte` is
/// durable across power loss.
#[derive(Debug)]
pub struct FileNvram {
    file: File,
    cache: Vec<u8>,
}

impl FileNvram {
    /// Open (or create) an image file of exactly `capacity` bytes.
    ///
    /// A missing or short file is zero-extended to `capacity`; an oversized
    /// file keeps only the first `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened, sized or read.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.set_len(capacity as u64)?;

        let mut cache = vec![0; capacity];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut cache)?;

        Ok(Self { file, cache })
    }

    fn check_bounds(&self, offset: usize) -> Result<()> {
        if offset >= self.cache.len() {
            return Err(HardwareError::out_of_bounds(offset, self.cache.len()));
        }
        Ok(())
    }
}

impl Nvram for FileNvram {
    fn capacity(&self) -> usize {
        self.cache.len()
    }

    fn read_byte(&self, offset: usize) -> Result<u8> {
        self.check_bounds(offset)?;
        Ok(self.cache[offset])
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<()> {
        self.check_bounds(offset)?;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(&[value])?;
        self.file.sync_data()?;
        self.cache[offset] = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_nvram_read_write() {
        let mut nvm = MemoryNvram::new(16);
        assert_eq!(nvm.capacity(), 16);
        assert_eq!(nvm.read_byte(3).unwrap(), 0);

        nvm.write_byte(3, 0xAB).unwrap();
        assert_eq!(nvm.read_byte(3).unwrap(), 0xAB);
    }

    #[test]
    fn test_memory_nvram_out_of_bounds() {
        let mut nvm = MemoryNvram::new(8);
        assert!(matches!(
            nvm.read_byte(8),
            Err(HardwareError::OutOfBounds { offset: 8, .. })
        ));
        assert!(nvm.write_byte(9, 0).is_err());
    }

    #[test]
    fn test_memory_nvram_bulk_helpers() {
        let mut nvm = MemoryNvram::new(16);
        nvm.write_all_at(4, b"CARD").unwrap();

        let mut buf = [0u8; 4];
        nvm.read_into(4, &mut buf).unwrap();
        assert_eq!(&buf, b"CARD");
    }

    #[test]
    fn test_memory_nvram_endurance_exhaustion() {
        let mut nvm = MemoryNvram::with_endurance(4, 2);
        nvm.write_byte(0, 1).unwrap();
        nvm.write_byte(0, 2).unwrap();

        let result = nvm.write_byte(0, 3);
        assert!(matches!(
            result,
            Err(HardwareError::EnduranceExhausted {
                offset: 0,
                writes: 3
            })
        ));

        // Other cells are unaffected.
        nvm.write_byte(1, 1).unwrap();
        assert_eq!(nvm.write_count(0), Some(2));
    }

    #[test]
    fn test_memory_nvram_snapshot_roundtrip() {
        let mut nvm = MemoryNvram::new(8);
        nvm.write_byte(0, 42).unwrap();

        let restored = MemoryNvram::from_image(nvm.snapshot());
        assert_eq!(restored.read_byte(0).unwrap(), 42);
        assert_eq!(restored.write_count(0), Some(0));
    }

    #[test]
    fn test_file_nvram_durability() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.bin");

        {
            let mut nvm = FileNvram::open(&path, 32).unwrap();
            nvm.write_byte(0, 3).unwrap();
            nvm.write_all_at(1, b"4A9F4D99").unwrap();
        }

        let reopened = FileNvram::open(&path, 32).unwrap();
        assert_eq!(reopened.read_byte(0).unwrap(), 3);
        let mut buf = [0u8; 8];
        reopened.read_into(1, &mut buf).unwrap();
        assert_eq!(&buf, b"4A9F4D99");
    }

    #[test]
    fn test_file_nvram_zero_extends_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let nvm = FileNvram::open(dir.path().join("fresh.bin"), 16).unwrap();
        assert_eq!(nvm.capacity(), 16);
        assert_eq!(nvm.read_byte(15).unwrap(), 0);
    }
}
