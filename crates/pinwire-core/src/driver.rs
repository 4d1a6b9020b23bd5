//! Board backend trait
//!
//! One implementation exists per supported SoC/board. All methods take the
//! *native* GPIO number; abstract-number resolution happens in
//! [`Gpio`](crate::Gpio) before a driver is ever called.
//!
//! Drivers never fail at operation time: an invalid pin or an operation the
//! board cannot perform is a silent no-op returning a sentinel (`Level::Low`,
//! `-1`, `0`). Callers must treat sentinels as "operation had no effect",
//! not as a hardware-confirmed value. Construction is the only fallible step.

use crate::types::{BoardModel, Level, Pull};

/// A board backend: register-level pin control for one SoC, keyed by native
/// GPIO number.
pub trait PinDriver: Send + Sync {
    /// The board this driver was built for.
    fn model(&self) -> BoardModel;

    /// First native GPIO number of the board's on-chip range.
    fn pin_base(&self) -> u32;

    /// Map a wiringPi logical number (0..63) to a native GPIO number.
    fn logical_to_native(&self, pin: u32) -> Option<u32>;

    /// Map a physical header (silkscreen) pin number to a native GPIO number.
    fn phys_to_native(&self, pin: u32) -> Option<u32>;

    /// Whether `gpio` is a native pin this board can drive.
    fn is_valid(&self, gpio: u32) -> bool;

    /// Configure a pin as plain input or output.
    ///
    /// Soft-PWM/soft-tone modes never reach the driver; the dispatch layer
    /// handles them and only asks the driver for `Output` here.
    fn set_direction(&self, gpio: u32, output: bool);

    /// Read the level of a pin. Invalid pins read as `Low`.
    fn digital_read(&self, gpio: u32) -> Level;

    /// Drive a pin. Invalid pins are ignored.
    fn digital_write(&self, gpio: u32, level: Level);

    /// Configure the pad's pull resistor. Pins in fixed always-on domains
    /// may legitimately ignore this.
    fn pull_control(&self, gpio: u32, pull: Pull);

    /// Encoded pin function for diagnostics: 0 = input, 1 = output,
    /// 2+ = alternate function N-1, -1 = unknown. The encoding is
    /// board-specific; do not compare across boards.
    fn get_alt(&self, gpio: u32) -> i32;

    /// Encoded pull state (wiringPi codes: 0 = off, 1 = down, 2 = up),
    /// or -1 where the board cannot report it.
    fn get_pull(&self, _gpio: u32) -> i32 {
        -1
    }

    /// Set pad drive strength (0..3). No-op on boards without the register.
    fn set_pad_drive(&self, _gpio: u32, _value: u32) {}

    /// Read pad drive strength, -1 where unsupported.
    fn get_pad_drive(&self, _gpio: u32) -> i32 {
        -1
    }

    /// Read an on-board ADC channel. Takes the *abstract* pin number, not a
    /// native GPIO: ADC inputs are dedicated pads with no GPIO number.
    /// -1 where the board has no ADC wired here.
    fn analog_read(&self, _pin: u32) -> i32 {
        -1
    }

    /// The kernel sysfs GPIO number for a native pin. Identity on boards
    /// whose kernel numbering matches the native numbering.
    fn sysfs_number(&self, gpio: u32) -> u32 {
        gpio
    }

    /// Read eight consecutive logical pins as one byte. Sentinel `u32::MAX`
    /// where the board does not implement the byte port.
    fn digital_read_byte(&self) -> u32 {
        u32::MAX
    }

    /// Write eight consecutive logical pins from one byte. No-op by default.
    fn digital_write_byte(&self, _value: u8) {}
}
