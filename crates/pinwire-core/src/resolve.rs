//! Pin-numbering resolver
//!
//! Translates an abstract pin number into the native GPIO number of the
//! active board, honoring the numbering mode fixed at setup. Resolution is
//! pure: the per-board tables are immutable after setup, so resolving the
//! same pin twice always yields the same answer.

use crate::driver::PinDriver;
use crate::sysfs_table::SysfsTable;
use crate::types::NumberingMode;

/// Highest abstract pin number the logical and physical tables cover.
pub const TABLE_PINS: u32 = 64;

/// Resolve `pin` to a native GPIO number, or `None` for out-of-range or
/// unmapped pins (the caller then no-ops, per the lenient wiringPi
/// contract).
pub fn resolve(
    mode: NumberingMode,
    pin: u32,
    driver: &dyn PinDriver,
    sysfs: &SysfsTable,
) -> Option<u32> {
    match mode {
        NumberingMode::Native => Some(pin),
        NumberingMode::Sysfs => {
            if sysfs.is_open(pin) {
                Some(pin)
            } else {
                None
            }
        }
        NumberingMode::Logical => {
            if pin < TABLE_PINS {
                driver.logical_to_native(pin)
            } else {
                None
            }
        }
        NumberingMode::Physical => {
            if pin < TABLE_PINS {
                driver.phys_to_native(pin)
            } else {
                None
            }
        }
    }
}

/// Look up a signed 64-entry pin table, mapping `-1` entries to `None`.
/// Board crates store their tables in the C layout and funnel lookups
/// through this.
pub fn table_lookup(table: &[i32; 64], pin: u32) -> Option<u32> {
    let entry = *table.get(pin as usize)?;
    u32::try_from(entry).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoardModel, Level, Pull};

    struct TableDriver {
        logical: [i32; 64],
    }

    impl PinDriver for TableDriver {
        fn model(&self) -> BoardModel {
            BoardModel::Dummy
        }
        fn pin_base(&self) -> u32 {
            0
        }
        fn logical_to_native(&self, pin: u32) -> Option<u32> {
            table_lookup(&self.logical, pin)
        }
        fn phys_to_native(&self, _pin: u32) -> Option<u32> {
            None
        }
        fn is_valid(&self, _gpio: u32) -> bool {
            true
        }
        fn set_direction(&self, _gpio: u32, _output: bool) {}
        fn digital_read(&self, _gpio: u32) -> Level {
            Level::Low
        }
        fn digital_write(&self, _gpio: u32, _level: Level) {}
        fn pull_control(&self, _gpio: u32, _pull: Pull) {}
        fn get_alt(&self, _gpio: u32) -> i32 {
            -1
        }
    }

    fn driver() -> TableDriver {
        let mut logical = [-1i32; 64];
        logical[0] = 120;
        logical[7] = 127;
        TableDriver { logical }
    }

    #[test]
    fn native_is_identity() {
        let d = driver();
        let t = SysfsTable::new();
        assert_eq!(resolve(NumberingMode::Native, 4711, &d, &t), Some(4711));
    }

    #[test]
    fn logical_uses_table_and_maps_unused_to_none() {
        let d = driver();
        let t = SysfsTable::new();
        assert_eq!(resolve(NumberingMode::Logical, 0, &d, &t), Some(120));
        assert_eq!(resolve(NumberingMode::Logical, 1, &d, &t), None);
        assert_eq!(resolve(NumberingMode::Logical, 64, &d, &t), None);
    }

    #[test]
    fn sysfs_requires_open_descriptor() {
        let d = driver();
        let t = SysfsTable::new();
        assert_eq!(resolve(NumberingMode::Sysfs, 5, &d, &t), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let d = driver();
        let t = SysfsTable::new();
        let a = resolve(NumberingMode::Logical, 7, &d, &t);
        let b = resolve(NumberingMode::Logical, 7, &d, &t);
        assert_eq!(a, b);
        assert_eq!(a, Some(127));
    }

    #[test]
    fn table_lookup_rejects_negative_and_oob() {
        let mut table = [-1i32; 64];
        table[3] = 42;
        assert_eq!(table_lookup(&table, 3), Some(42));
        assert_eq!(table_lookup(&table, 4), None);
        assert_eq!(table_lookup(&table, 64), None);
    }
}
