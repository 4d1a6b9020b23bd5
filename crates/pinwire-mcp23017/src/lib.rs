//! MCP23017 16-bit I2C GPIO expander
//!
//! Implements [`PinNode`] for the Microchip MCP23017, mapping the node's
//! sixteen virtual pins onto the chip's A and B ports. Direction and pull
//! registers are read-modify-written; output levels go through a cached
//! copy of the output latches so a write never needs a bus read first.
//!
//! Register access failures degrade to the node contract's no-op behavior
//! (reads come back low) with a warning, matching how on-board pins treat
//! invalid operations.

use std::io;
use std::path::Path;

use pinwire_core::types::{Level, PinMode, Pull};
use pinwire_core::PinNode;
use thiserror::Error;

pub mod i2c;

pub use i2c::{I2cDev, RegBus};

/// Pins on the expander.
pub const MCP23017_PINS: u32 = 16;

// Register map in IOCON.BANK=0 (interleaved) layout.
const IODIRA: u8 = 0x00;
const IODIRB: u8 = 0x01;
const IOCON: u8 = 0x0A;
const GPPUA: u8 = 0x0C;
const GPPUB: u8 = 0x0D;
const GPIOA: u8 = 0x12;
const GPIOB: u8 = 0x13;
const OLATA: u8 = 0x14;
const OLATB: u8 = 0x15;

/// IOCON.SEQOP: disable sequential addressing, keep BANK=0.
const IOCON_INIT: u8 = 0x20;

/// Setup failures. Operation-time errors are logged, not returned, per the
/// node contract.
#[derive(Debug, Error)]
pub enum Mcp23017Error {
    /// The i2c-dev adapter could not be opened or addressed.
    #[error("mcp23017 at {address:#04x}: cannot open I2C device: {source}")]
    Open {
        /// Slave address on the bus
        address: u16,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// Initial register configuration failed, likely a missing chip.
    #[error("mcp23017 at {address:#04x}: no response during init: {source}")]
    Init {
        /// Slave address on the bus
        address: u16,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// One MCP23017 claiming sixteen virtual pins from `pin_base`.
pub struct Mcp23017 {
    pin_base: u32,
    bus: Box<dyn RegBus>,
    /// Cached OLATA/OLATB, kept in step with every write.
    olat: [u8; 2],
}

impl Mcp23017 {
    /// Bring up the chip on an already-open bus and read the latch state.
    pub fn new(mut bus: Box<dyn RegBus>, pin_base: u32, address: u16) -> Result<Self, Mcp23017Error> {
        let init = (|| {
            bus.write_reg(IOCON, IOCON_INIT)?;
            Ok([bus.read_reg(OLATA)?, bus.read_reg(OLATB)?])
        })();
        let olat = init.map_err(|source| Mcp23017Error::Init { address, source })?;
        Ok(Mcp23017 { pin_base, bus, olat })
    }

    /// Open `device` (`/dev/i2c-N`), address the chip and bring it up.
    pub fn open(
        device: impl AsRef<Path>,
        address: u16,
        pin_base: u32,
    ) -> Result<Self, Mcp23017Error> {
        let dev = I2cDev::open(device, address)
            .map_err(|source| Mcp23017Error::Open { address, source })?;
        Self::new(Box::new(dev), pin_base, address)
    }

    /// Chip-local index and bank (0 = A, 1 = B) for an absolute pin, or
    /// `None` outside our range.
    fn split(&self, pin: u32) -> Option<(usize, u8)> {
        let local = pin.checked_sub(self.pin_base)?;
        if local >= MCP23017_PINS {
            return None;
        }
        Some(((local / 8) as usize, 1 << (local % 8)))
    }

    fn update_reg(&mut self, reg: u8, mask: u8, set: bool) {
        let result = self.bus.read_reg(reg).and_then(|old| {
            let new = if set { old | mask } else { old & !mask };
            self.bus.write_reg(reg, new)
        });
        if let Err(e) = result {
            log::warn!("mcp23017: register {reg:#04x} update failed: {e}");
        }
    }
}

impl PinNode for Mcp23017 {
    fn pin_base(&self) -> u32 {
        self.pin_base
    }

    fn num_pins(&self) -> u32 {
        MCP23017_PINS
    }

    fn pin_mode(&mut self, pin: u32, mode: PinMode) {
        let Some((bank, mask)) = self.split(pin) else {
            return;
        };
        let reg = if bank == 0 { IODIRA } else { IODIRB };
        match mode {
            // IODIR bit set means input.
            PinMode::Input => self.update_reg(reg, mask, true),
            PinMode::Output => self.update_reg(reg, mask, false),
            PinMode::SoftPwm | PinMode::SoftTone => {}
        }
    }

    fn pull_control(&mut self, pin: u32, pull: Pull) {
        let Some((bank, mask)) = self.split(pin) else {
            return;
        };
        let reg = if bank == 0 { GPPUA } else { GPPUB };
        self.update_reg(reg, mask, pull == Pull::Up);
    }

    fn digital_read(&mut self, pin: u32) -> Level {
        let Some((bank, mask)) = self.split(pin) else {
            return Level::Low;
        };
        let reg = if bank == 0 { GPIOA } else { GPIOB };
        match self.bus.read_reg(reg) {
            Ok(value) => Level::from_bit(u32::from(value & mask)),
            Err(e) => {
                log::warn!("mcp23017: port read failed: {e}");
                Level::Low
            }
        }
    }

    fn digital_write(&mut self, pin: u32, level: Level) {
        let Some((bank, mask)) = self.split(pin) else {
            return;
        };
        let old = self.olat[bank];
        let new = match level {
            Level::High => old | mask,
            Level::Low => old & !mask,
        };
        let reg = if bank == 0 { GPIOA } else { GPIOB };
        match self.bus.write_reg(reg, new) {
            Ok(()) => self.olat[bank] = new,
            Err(e) => log::warn!("mcp23017: port write failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// 256-register file standing in for the chip.
    #[derive(Clone, Default)]
    struct FakeBus {
        regs: Arc<Mutex<HashMap<u8, u8>>>,
    }

    impl FakeBus {
        fn get(&self, reg: u8) -> u8 {
            *self.regs.lock().unwrap().get(&reg).unwrap_or(&0)
        }
        fn set(&self, reg: u8, value: u8) {
            self.regs.lock().unwrap().insert(reg, value);
        }
    }

    impl RegBus for FakeBus {
        fn read_reg(&mut self, reg: u8) -> io::Result<u8> {
            Ok(self.get(reg))
        }
        fn write_reg(&mut self, reg: u8, value: u8) -> io::Result<()> {
            self.set(reg, value);
            Ok(())
        }
    }

    fn chip(bus: &FakeBus) -> Mcp23017 {
        Mcp23017::new(Box::new(bus.clone()), 64, 0x20).unwrap()
    }

    #[test]
    fn init_configures_iocon_and_caches_latches() {
        let bus = FakeBus::default();
        bus.set(OLATA, 0x0F);
        bus.set(OLATB, 0xF0);
        let node = chip(&bus);
        assert_eq!(bus.get(IOCON), IOCON_INIT);
        assert_eq!(node.olat, [0x0F, 0xF0]);
    }

    #[test]
    fn pin_mode_touches_only_the_right_iodir_bit() {
        let bus = FakeBus::default();
        bus.set(IODIRA, 0xFF);
        bus.set(IODIRB, 0xFF);
        let mut node = chip(&bus);

        node.pin_mode(64, PinMode::Output); // A0
        assert_eq!(bus.get(IODIRA), 0xFE);

        node.pin_mode(64 + 9, PinMode::Output); // B1
        assert_eq!(bus.get(IODIRB), 0xFD);

        node.pin_mode(64 + 9, PinMode::Input);
        assert_eq!(bus.get(IODIRB), 0xFF);
    }

    #[test]
    fn writes_go_through_the_latch_cache() {
        let bus = FakeBus::default();
        let mut node = chip(&bus);

        node.digital_write(64 + 3, Level::High);
        assert_eq!(bus.get(GPIOA), 0x08);
        node.digital_write(64 + 12, Level::High);
        assert_eq!(bus.get(GPIOB), 0x10);
        node.digital_write(64 + 3, Level::Low);
        assert_eq!(bus.get(GPIOA), 0x00);
        // Bank B latch untouched by the bank A write.
        assert_eq!(node.olat, [0x00, 0x10]);
    }

    #[test]
    fn reads_mask_the_port_register() {
        let bus = FakeBus::default();
        bus.set(GPIOB, 0b0000_0100);
        let mut node = chip(&bus);
        assert_eq!(node.digital_read(64 + 10), Level::High);
        assert_eq!(node.digital_read(64 + 11), Level::Low);
    }

    #[test]
    fn pull_up_sets_gppu_bit_and_others_clear_it() {
        let bus = FakeBus::default();
        let mut node = chip(&bus);
        node.pull_control(64 + 5, Pull::Up);
        assert_eq!(bus.get(GPPUA), 0x20);
        node.pull_control(64 + 5, Pull::Off);
        assert_eq!(bus.get(GPPUA), 0x00);
    }

    #[test]
    fn out_of_range_pins_are_ignored() {
        let bus = FakeBus::default();
        let mut node = chip(&bus);
        node.digital_write(63, Level::High);
        node.digital_write(64 + 16, Level::High);
        assert_eq!(bus.get(GPIOA), 0);
        assert_eq!(bus.get(GPIOB), 0);
        assert_eq!(node.digital_read(63), Level::Low);
    }
}
