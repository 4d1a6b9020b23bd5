//! In-memory board emulator
//!
//! A [`PinDriver`] with no hardware behind it: 64 virtual pins whose mode,
//! level, pull and drive strength live in a mutex-guarded array. Logical
//! numbering is the identity map and the physical header is the usual
//! 40-pin layout with power pins unmapped, so resolver behavior matches a
//! real board.
//!
//! Used by the test suites and by the CLI's `--board dummy` for trying
//! commands on a machine without GPIO hardware.

use std::sync::{Arc, Mutex};

use pinwire_core::types::{BoardModel, Level, Pull};
use pinwire_core::PinDriver;

/// Number of virtual pins.
pub const DUMMY_PINS: u32 = 64;

#[derive(Clone, Copy)]
struct PinState {
    output: bool,
    level: Level,
    pull: Pull,
    drive: u32,
}

impl Default for PinState {
    fn default() -> Self {
        PinState {
            output: false,
            level: Level::Low,
            pull: Pull::Off,
            drive: 0,
        }
    }
}

/// Virtual board holding all pin state in memory.
pub struct DummyDriver {
    pins: Mutex<[PinState; DUMMY_PINS as usize]>,
}

/// Physical header positions 1..=40 that carry a GPIO on the virtual
/// board; power and ground positions map to nothing.
const PHYS_GPIO: [i32; 64] = [
    -1, // no physical pin 0
    -1, -1, 2, -1, 3, -1, 4, 14, -1, 15, // 1..10
    17, 18, 27, -1, 22, 23, -1, 24, 10, -1, // 11..20
    9, 25, 11, 8, -1, 7, 0, 1, 5, -1, // 21..30
    6, 12, 13, -1, 19, 16, 26, 20, -1, 21, // 31..40
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1,
];

impl DummyDriver {
    /// Fresh board with every pin an input at low, pulls off.
    pub fn new() -> Self {
        DummyDriver {
            pins: Mutex::new([PinState::default(); DUMMY_PINS as usize]),
        }
    }

    fn with_pin<R>(&self, gpio: u32, f: impl FnOnce(&mut PinState) -> R) -> Option<R> {
        let mut pins = self.pins.lock().unwrap();
        pins.get_mut(gpio as usize).map(f)
    }

    /// Force a pin's input level from a test harness, as if external
    /// hardware drove it.
    pub fn inject_level(&self, gpio: u32, level: Level) {
        self.with_pin(gpio, |p| p.level = level);
    }
}

impl Default for DummyDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PinDriver for DummyDriver {
    fn model(&self) -> BoardModel {
        BoardModel::Dummy
    }

    fn pin_base(&self) -> u32 {
        0
    }

    fn logical_to_native(&self, pin: u32) -> Option<u32> {
        (pin < DUMMY_PINS).then_some(pin)
    }

    fn phys_to_native(&self, pin: u32) -> Option<u32> {
        pinwire_core::resolve::table_lookup(&PHYS_GPIO, pin)
    }

    fn is_valid(&self, gpio: u32) -> bool {
        gpio < DUMMY_PINS
    }

    fn set_direction(&self, gpio: u32, output: bool) {
        self.with_pin(gpio, |p| {
            p.output = output;
            if !output {
                // Released pins float to their pull state.
                p.level = match p.pull {
                    Pull::Up => Level::High,
                    Pull::Down | Pull::Off => Level::Low,
                };
            }
        });
        log::trace!("dummy: gpio{gpio} -> {}", if output { "out" } else { "in" });
    }

    fn digital_read(&self, gpio: u32) -> Level {
        self.with_pin(gpio, |p| p.level).unwrap_or(Level::Low)
    }

    fn digital_write(&self, gpio: u32, level: Level) {
        self.with_pin(gpio, |p| {
            if p.output {
                p.level = level;
            }
        });
    }

    fn pull_control(&self, gpio: u32, pull: Pull) {
        self.with_pin(gpio, |p| {
            p.pull = pull;
            if !p.output {
                p.level = match pull {
                    Pull::Up => Level::High,
                    Pull::Down | Pull::Off => Level::Low,
                };
            }
        });
    }

    fn get_alt(&self, gpio: u32) -> i32 {
        self.with_pin(gpio, |p| i32::from(p.output)).unwrap_or(-1)
    }

    fn get_pull(&self, gpio: u32) -> i32 {
        self.with_pin(gpio, |p| p.pull.code()).unwrap_or(-1)
    }

    fn set_pad_drive(&self, gpio: u32, value: u32) {
        self.with_pin(gpio, |p| p.drive = value & 0x3);
    }

    fn get_pad_drive(&self, gpio: u32) -> i32 {
        self.with_pin(gpio, |p| p.drive as i32).unwrap_or(-1)
    }

    fn digital_read_byte(&self) -> u32 {
        let pins = self.pins.lock().unwrap();
        let mut value = 0u32;
        for bit in 0..8 {
            value |= pins[bit].level.as_bit() << bit;
        }
        value
    }

    fn digital_write_byte(&self, value: u8) {
        let mut pins = self.pins.lock().unwrap();
        for bit in 0..8 {
            if pins[bit].output {
                pins[bit].level = Level::from_bit(u32::from(value >> bit) & 1);
            }
        }
    }
}

/// The virtual board as a shared driver handle.
pub fn driver() -> Arc<dyn PinDriver> {
    Arc::new(DummyDriver::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_only_sticks_in_output_mode() {
        let d = DummyDriver::new();
        d.digital_write(5, Level::High);
        assert_eq!(d.digital_read(5), Level::Low);

        d.set_direction(5, true);
        d.digital_write(5, Level::High);
        assert_eq!(d.digital_read(5), Level::High);
    }

    #[test]
    fn input_follows_pull() {
        let d = DummyDriver::new();
        d.pull_control(3, Pull::Up);
        assert_eq!(d.digital_read(3), Level::High);
        assert_eq!(d.get_pull(3), Pull::Up.code());

        d.pull_control(3, Pull::Down);
        assert_eq!(d.digital_read(3), Level::Low);
    }

    #[test]
    fn switching_to_input_releases_driven_level() {
        let d = DummyDriver::new();
        d.set_direction(9, true);
        d.digital_write(9, Level::High);
        d.set_direction(9, false);
        assert_eq!(d.digital_read(9), Level::Low);
    }

    #[test]
    fn out_of_range_pins_are_inert() {
        let d = DummyDriver::new();
        assert!(!d.is_valid(DUMMY_PINS));
        d.set_direction(200, true);
        d.digital_write(200, Level::High);
        assert_eq!(d.digital_read(200), Level::Low);
        assert_eq!(d.get_alt(200), -1);
    }

    #[test]
    fn physical_header_skips_power_pins() {
        let d = DummyDriver::new();
        assert_eq!(d.phys_to_native(1), None);
        assert_eq!(d.phys_to_native(3), Some(2));
        assert_eq!(d.phys_to_native(40), Some(21));
    }

    #[test]
    fn byte_port_covers_low_eight_pins() {
        let d = DummyDriver::new();
        for pin in 0..8 {
            d.set_direction(pin, true);
        }
        d.digital_write_byte(0xA5);
        assert_eq!(d.digital_read_byte(), 0xA5);
    }
}
