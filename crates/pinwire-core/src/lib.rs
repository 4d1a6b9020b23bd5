//! pinwire-core - pin addressing, dispatch and extension nodes
//!
//! This crate is the board-independent heart of pinwire. It resolves an
//! abstract pin number (wiringPi-style logical, physical header, native SoC
//! or sysfs numbering) to the native GPIO number a board backend understands,
//! routes every pin operation either to the active [`PinDriver`] or to an
//! [extension node](PinNode) owning that pin range, and hosts the software
//! PWM / tone emulators used when a pin has no hardware PWM channel.
//!
//! Board backends (Amlogic VIM boards, Rockchip Edge) live in their own
//! crates and plug in through the [`PinDriver`] trait; off-chip expanders
//! (I2C/SPI GPIO expanders, ADCs) plug in through [`PinNode`].
//!
//! # Example
//!
//! ```ignore
//! use pinwire_core::{Gpio, Level, NumberingMode, PinMode};
//!
//! let gpio = Gpio::new(driver, NumberingMode::Logical);
//! gpio.pin_mode(1, PinMode::Output);
//! gpio.digital_write(1, Level::High);
//! assert_eq!(gpio.digital_read(1), Level::High);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod detect;
pub mod driver;
pub mod error;
pub mod gpio;
pub mod registry;
pub mod resolve;
pub mod setup;
pub mod softpwm;
pub mod softtone;
pub mod sysfs_table;
pub mod types;

pub use driver::PinDriver;
pub use error::{Error, Result};
pub use gpio::Gpio;
pub use registry::{NodeRegistry, PinNode, EXTENSION_PIN_BASE};
pub use setup::{setup_with, try_gpio};
pub use sysfs_table::SysfsTable;
pub use types::{BoardModel, Edge, Level, NumberingMode, PinMode, Pull};
