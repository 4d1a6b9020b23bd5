//! Board backends for the Amlogic-based Khadas VIM family
//!
//! The three VIM boards share one register scheme: two MMIO windows (the
//! peripheral GPIO block and the always-on domain), per-bank function/output/
//! input/pull registers with one bit per pad, and a bank-local bit shift.
//! What differs is the window addresses, the bank layout, the native pin
//! ranges and how the pin-mux state is read back. This crate captures the
//! shared machinery in [`AmlogicDriver`] and per-board modules supply the
//! constants.
//!
//! Native pin numbering follows the vendor convention: VIM1 pins live at
//! 100+, VIM2 at 200+, VIM3 at 300+.

#![warn(rust_2018_idioms)]

use std::sync::Arc;

use pinwire_core::types::{BoardModel, Level, Pull};
use pinwire_core::{resolve::table_lookup, Error, PinDriver, Result};
use pinwire_mmio::{open_mem_device, RegWindow};

pub mod vim1;
pub mod vim2;
pub mod vim3;

/// Which MMIO window a bank's registers live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    /// The main peripheral GPIO block.
    Periphs,
    /// The always-on power domain block.
    Ao,
}

/// Register layout of one GPIO bank. All register fields are word offsets
/// within the bank's window, matching the datasheet listings.
struct Bank {
    /// First native pin of the bank (inclusive).
    start: u32,
    /// Last native pin of the bank (inclusive).
    end: u32,
    window: Window,
    /// Function select: bit set = input, cleared = output.
    fsel: usize,
    /// Output level register.
    outp: usize,
    /// Input level register.
    inp: usize,
    /// Pull enable register; `None` where the domain has no pull control.
    puen: Option<usize>,
    /// Pull direction register (set = up).
    pupd: Option<usize>,
    /// Added to the bank-local index to get the register bit.
    shift_bias: u32,
    /// Extra shift for output bits only. The VIM1/VIM2 AO domain packs
    /// outputs into bits [25:16] of the shared fsel/output register.
    out_shift_bias: u32,
    /// Pad drive-strength register (2 bits per pad), VIM3 only.
    ds: Option<usize>,
    /// Mux readback registers (one 4-bit field per pad), VIM3 only:
    /// first for bank-local pads 0..7, second for pads 8..15.
    mux: [Option<usize>; 2],
}

impl Bank {
    fn contains(&self, gpio: u32) -> bool {
        (self.start..=self.end).contains(&gpio)
    }

    fn shift(&self, gpio: u32) -> u32 {
        gpio - self.start + self.shift_bias
    }
}

/// One mux-register probe for reading back a pad's alternate function on
/// boards without 4-bit mux fields (VIM1/VIM2): if `bit` of `reg` is set,
/// the pad is in function `mode`.
struct AltProbe {
    gpio: u32,
    window: Window,
    reg: usize,
    bit: u32,
    mode: i32,
}

/// How a board reports the current pin function.
enum AltReadback {
    /// Scan a probe table (VIM1/VIM2).
    Probe(&'static [AltProbe]),
    /// Read the 4-bit mux field from the bank's mux register (VIM3).
    MuxField,
}

/// Immutable per-board description supplied by the `vim1`/`vim2`/`vim3`
/// modules.
struct BoardDesc {
    model: BoardModel,
    pin_base: u32,
    periphs_base: u64,
    ao_base: u64,
    banks: &'static [Bank],
    pin_to_gpio: &'static [i32; 64],
    phy_to_gpio: &'static [i32; 64],
    alt: AltReadback,
}

/// Shared driver for the VIM family.
pub struct AmlogicDriver {
    desc: BoardDesc,
    periphs: RegWindow,
    ao: RegWindow,
}

const WINDOW_SIZE: usize = 0x1000;

impl AmlogicDriver {
    fn open(desc: BoardDesc) -> Result<Self> {
        let backend = |e: pinwire_mmio::MmioError| Error::Backend(Box::new(e));
        let file = open_mem_device().map_err(backend)?;
        let periphs = RegWindow::map_with(&file, desc.periphs_base, WINDOW_SIZE).map_err(backend)?;
        let ao = RegWindow::map_with(&file, desc.ao_base, WINDOW_SIZE).map_err(backend)?;
        log::debug!("{} GPIO windows mapped", desc.model);
        Ok(AmlogicDriver { desc, periphs, ao })
    }

    fn bank(&self, gpio: u32) -> Option<&Bank> {
        self.desc.banks.iter().find(|b| b.contains(gpio))
    }

    fn window(&self, w: Window) -> &RegWindow {
        match w {
            Window::Periphs => &self.periphs,
            Window::Ao => &self.ao,
        }
    }

    /// Read back the 4-bit mux field for a pad (VIM3 scheme); `None` when
    /// the bank has no mux register for that half.
    fn mux_field(&self, bank: &Bank, shift: u32) -> Option<u32> {
        let reg = bank.mux[(shift / 8) as usize % 2]?;
        let field = shift % 8;
        Some((self.window(bank.window).read(reg) >> (field * 4)) & 0xF)
    }
}

impl PinDriver for AmlogicDriver {
    fn model(&self) -> BoardModel {
        self.desc.model
    }

    fn pin_base(&self) -> u32 {
        self.desc.pin_base
    }

    fn logical_to_native(&self, pin: u32) -> Option<u32> {
        table_lookup(self.desc.pin_to_gpio, pin)
    }

    fn phys_to_native(&self, pin: u32) -> Option<u32> {
        table_lookup(self.desc.phy_to_gpio, pin)
    }

    fn is_valid(&self, gpio: u32) -> bool {
        self.bank(gpio).is_some()
    }

    fn set_direction(&self, gpio: u32, output: bool) {
        let Some(bank) = self.bank(gpio) else { return };
        let w = self.window(bank.window);
        if output {
            w.clear_bit(bank.fsel, bank.shift(gpio));
        } else {
            w.set_bit(bank.fsel, bank.shift(gpio));
        }
    }

    fn digital_read(&self, gpio: u32) -> Level {
        let Some(bank) = self.bank(gpio) else {
            return Level::Low;
        };
        let value = self.window(bank.window).read(bank.inp);
        Level::from_bit(value & (1 << bank.shift(gpio)))
    }

    fn digital_write(&self, gpio: u32, level: Level) {
        let Some(bank) = self.bank(gpio) else { return };
        let w = self.window(bank.window);
        let bit = bank.shift(gpio) + bank.out_shift_bias;
        match level {
            Level::High => w.set_bit(bank.outp, bit),
            Level::Low => w.clear_bit(bank.outp, bit),
        }
    }

    fn pull_control(&self, gpio: u32, pull: Pull) {
        let Some(bank) = self.bank(gpio) else { return };
        // The VIM1/VIM2 always-on domain has fixed pulls.
        let (Some(puen), Some(pupd)) = (bank.puen, bank.pupd) else {
            return;
        };
        let w = self.window(bank.window);
        let shift = bank.shift(gpio);
        match pull {
            Pull::Off => w.clear_bit(puen, shift),
            Pull::Up => {
                w.set_bit(puen, shift);
                w.set_bit(pupd, shift);
            }
            Pull::Down => {
                w.set_bit(puen, shift);
                w.clear_bit(pupd, shift);
            }
        }
    }

    fn get_alt(&self, gpio: u32) -> i32 {
        let Some(bank) = self.bank(gpio) else { return -1 };
        let shift = bank.shift(gpio);

        let mode = match self.desc.alt {
            AltReadback::Probe(probes) => probes
                .iter()
                .find(|p| p.gpio == gpio && self.window(p.window).read(p.reg) & (1 << p.bit) != 0)
                .map_or(0, |p| p.mode),
            AltReadback::MuxField => self.mux_field(bank, shift).unwrap_or(0) as i32,
        };

        if mode != 0 {
            mode + 1
        } else if self.window(bank.window).read(bank.fsel) & (1 << shift) != 0 {
            0
        } else {
            1
        }
    }

    fn get_pull(&self, gpio: u32) -> i32 {
        let Some(bank) = self.bank(gpio) else { return -1 };
        let (Some(puen), Some(pupd)) = (bank.puen, bank.pupd) else {
            return 0;
        };
        let w = self.window(bank.window);
        let shift = bank.shift(gpio);
        if w.read(puen) & (1 << shift) == 0 {
            0
        } else if w.read(pupd) & (1 << shift) != 0 {
            Pull::Up.code()
        } else {
            Pull::Down.code()
        }
    }

    fn set_pad_drive(&self, gpio: u32, value: u32) {
        let Some(bank) = self.bank(gpio) else { return };
        let Some(ds) = bank.ds else { return };
        if value > 3 {
            log::warn!("pad drive {value} out of range (0..=3), ignored");
            return;
        }
        let shift = bank.shift(gpio) * 2;
        self.window(bank.window).update(ds, 0b11 << shift, value << shift);
    }

    fn get_pad_drive(&self, gpio: u32) -> i32 {
        let Some(bank) = self.bank(gpio) else { return -1 };
        let Some(ds) = bank.ds else { return -1 };
        let shift = bank.shift(gpio) * 2;
        ((self.window(bank.window).read(ds) >> shift) & 0b11) as i32
    }
}

/// Build the driver for `model`, mapping its register windows.
pub fn driver_for(model: BoardModel) -> Result<Arc<dyn PinDriver>> {
    let desc = match model {
        BoardModel::Vim1 => vim1::describe(),
        BoardModel::Vim2 => vim2::describe(),
        BoardModel::Vim3 => vim3::describe(),
        other => return Err(Error::UnsupportedBoard(other)),
    };
    Ok(Arc::new(AmlogicDriver::open(desc)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descs() -> Vec<BoardDesc> {
        vec![vim1::describe(), vim2::describe(), vim3::describe()]
    }

    #[test]
    fn banks_are_disjoint_and_within_the_board_range() {
        for desc in descs() {
            for (i, a) in desc.banks.iter().enumerate() {
                assert!(a.start <= a.end);
                assert!(a.start >= desc.pin_base, "{}: bank below pin base", desc.model);
                for b in &desc.banks[i + 1..] {
                    assert!(
                        a.end < b.start || b.end < a.start,
                        "{}: overlapping banks",
                        desc.model
                    );
                }
            }
        }
    }

    #[test]
    fn every_mapped_pin_lands_in_a_bank() {
        for desc in descs() {
            for table in [desc.pin_to_gpio, desc.phy_to_gpio] {
                for &entry in table.iter() {
                    if entry < 0 {
                        continue;
                    }
                    let gpio = entry as u32;
                    assert!(
                        desc.banks.iter().any(|b| b.contains(gpio)),
                        "{}: native {gpio} outside every bank",
                        desc.model
                    );
                }
            }
        }
    }

    #[test]
    fn probe_tables_reference_bank_pins() {
        for desc in descs() {
            if let AltReadback::Probe(probes) = desc.alt {
                for p in probes {
                    assert!(
                        desc.banks.iter().any(|b| b.contains(p.gpio)),
                        "{}: probe for {} outside every bank",
                        desc.model,
                        p.gpio
                    );
                    assert!(p.mode >= 2, "{}: probe mode below ALT range", desc.model);
                }
            }
        }
    }

    #[test]
    fn vim_logical_tables_match_vendor_wiring() {
        // Spot checks against the vendor pin maps. The physical tables keep
        // the vendor's interleaved two-column layout, so header pin 29 sits
        // at index 18 and header pin 13 at index 25.
        let v1 = vim1::describe();
        assert_eq!(v1.pin_to_gpio[1], 175); // GPIODV_26
        assert_eq!(v1.pin_to_gpio[5], 123); // GPIOH_7
        assert_eq!(v1.phy_to_gpio[18], 123); // header 29, GPIOH_7

        let v2 = vim2::describe();
        assert_eq!(v2.pin_to_gpio[0], 270); // GPIODV_21
        assert_eq!(v2.pin_to_gpio[25], 230); // GPIOAO_0

        let v3 = vim3::describe();
        assert_eq!(v3.pin_to_gpio[4], 300); // GPIOA_0
        assert_eq!(v3.pin_to_gpio[25], 350); // GPIOAO_0
        assert_eq!(v3.phy_to_gpio[25], 360); // header 13, GPIOAO_10
    }
}
