//! Shared table of opened sysfs `value` descriptors
//!
//! One slot per native GPIO number (256 slots). Descriptors are opened by
//! the sysfs layer (interrupt registration or sysfs-mode setup) and shared
//! with the dispatch layer so sysfs-numbering reads and writes reuse them.
//!
//! Slots are written under their own lock only at registration time; during
//! steady state each interrupt thread only touches its own slot, matching
//! the thread-confinement model of the original `sysFds` array. Reads use
//! `read_at` so a concurrent poller and a `digital_read` never race on the
//! shared file offset.

use std::fs::File;
use std::io::Write;
use std::os::unix::fs::FileExt;
use std::sync::{Arc, Mutex};

use crate::types::Level;

/// Number of descriptor slots, indexed by native GPIO number.
pub const SYSFS_PINS: usize = 256;

/// Process-wide table of per-pin sysfs `value` descriptors.
pub struct SysfsTable {
    slots: Vec<Mutex<Option<Arc<File>>>>,
}

impl SysfsTable {
    /// Create an empty table with all slots unopened.
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(SYSFS_PINS);
        for _ in 0..SYSFS_PINS {
            slots.push(Mutex::new(None));
        }
        SysfsTable { slots }
    }

    /// Whether a descriptor is open for `pin`.
    pub fn is_open(&self, pin: u32) -> bool {
        self.get(pin).is_some()
    }

    /// The cached descriptor for `pin`, if any.
    pub fn get(&self, pin: u32) -> Option<Arc<File>> {
        let slot = self.slots.get(pin as usize)?;
        slot.lock().unwrap().clone()
    }

    /// Cache `file` for `pin`, returning the shared handle. If the slot is
    /// already open the existing descriptor is kept and returned, so a
    /// second setup never re-opens.
    pub fn insert(&self, pin: u32, file: File) -> Option<Arc<File>> {
        let slot = self.slots.get(pin as usize)?;
        let mut guard = slot.lock().unwrap();
        if guard.is_none() {
            *guard = Some(Arc::new(file));
        }
        guard.clone()
    }

    /// Reset `pin` to unopened (after an interrupt stop), so a future open
    /// starts cleanly.
    pub fn clear(&self, pin: u32) {
        if let Some(slot) = self.slots.get(pin as usize) {
            *slot.lock().unwrap() = None;
        }
    }

    /// Read the current level through the cached descriptor. `None` when the
    /// slot is unopened or the read fails (best-effort, like the C hot path).
    pub fn read_level(&self, pin: u32) -> Option<Level> {
        let file = self.get(pin)?;
        let mut buf = [0u8; 1];
        file.read_at(&mut buf, 0).ok()?;
        Some(if buf[0] == b'0' { Level::Low } else { Level::High })
    }

    /// Write a level through the cached descriptor. Silently ignored when
    /// the slot is unopened; write errors are best-effort.
    pub fn write_level(&self, pin: u32, level: Level) {
        if let Some(file) = self.get(pin) {
            let data: &[u8] = match level {
                Level::Low => b"0\n",
                Level::High => b"1\n",
            };
            if let Err(e) = (&*file).write_all(data) {
                log::trace!("sysfs write on gpio{pin} failed: {e}");
            }
        }
    }
}

impl Default for SysfsTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom};

    fn temp_value_file(content: &[u8]) -> File {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "pinwire-sysfs-table-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        let mut f = File::options()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        f.write_all(content).unwrap();
        f.seek(SeekFrom::Start(0)).unwrap();
        f
    }

    #[test]
    fn unopened_slot_reads_none() {
        let t = SysfsTable::new();
        assert!(!t.is_open(3));
        assert_eq!(t.read_level(3), None);
    }

    #[test]
    fn insert_keeps_existing_descriptor() {
        let t = SysfsTable::new();
        let first = t.insert(7, temp_value_file(b"0\n")).unwrap();
        let second = t.insert(7, temp_value_file(b"1\n")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn read_level_parses_ascii() {
        let t = SysfsTable::new();
        t.insert(9, temp_value_file(b"1\n"));
        assert_eq!(t.read_level(9), Some(Level::High));
    }

    #[test]
    fn write_level_appends_ascii_digit() {
        let t = SysfsTable::new();
        t.insert(11, temp_value_file(b""));
        t.write_level(11, Level::High);
        let file = t.get(11).unwrap();
        let mut buf = [0u8; 2];
        file.read_at(&mut buf, 0).unwrap();
        assert_eq!(&buf, b"1\n");
    }

    #[test]
    fn clear_resets_slot() {
        let t = SysfsTable::new();
        t.insert(5, temp_value_file(b"0\n"));
        assert!(t.is_open(5));
        t.clear(5);
        assert!(!t.is_open(5));
    }
}
