//! Board backend for the Khadas Edge (Rockchip RK3399)
//!
//! The RK3399 splits GPIO control across three register families:
//!
//! * five GPIO banks (DR data, DDR direction, EXT level readback), 32 pins
//!   per bank, native pin = bank * 32 + index;
//! * two GRF blocks (PMUGRF for banks 0/1, GRF for banks 2..4) holding the
//!   2-bit iomux and pull fields, written through the upper-half-word
//!   write-mask idiom;
//! * two CRU blocks gating each bank's clock, which must be enabled around
//!   every register access.
//!
//! The kernel numbers these pins at 1000+, so sysfs exports add that offset
//! while the register math uses the bare native number.

#![warn(rust_2018_idioms)]

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use pinwire_core::types::{BoardModel, Level, Pull};
use pinwire_core::{resolve::table_lookup, Error, PinDriver, Result};
use pinwire_mmio::{open_mem_device, RegWindow};

const GPIO_BANK_BASES: [u64; 5] = [
    0xFF72_0000, // GPIO0
    0xFF73_0000, // GPIO1
    0xFF78_0000, // GPIO2
    0xFF78_8000, // GPIO3
    0xFF79_0000, // GPIO4
];

const PMUGRF_BASE: u64 = 0xFF32_0000;
const GRF_BASE: u64 = 0xFF77_0000;
const PMUCRU_BASE: u64 = 0xFF75_0000;
const CRU_BASE: u64 = 0xFF76_0000;

// Word offsets within a GPIO bank window.
const GPIO_DR: usize = 0x00; // data register
const GPIO_DDR: usize = 0x01; // direction, 1 = output
const GPIO_EXT: usize = 0x14; // external level readback

// Byte offsets of the iomux/pull groups inside each GRF window.
const PMUGRF_IOMUX: u32 = 0x0000;
const PMUGRF_PUPD: u32 = 0x0040;
const GRF_IOMUX: u32 = 0xE000;
const GRF_PUPD: u32 = 0xE040;

// Word offsets of the GPIO clock gates.
const PMUCRU_GPIO_CLK: usize = 0x0104 >> 2;
const CRU_GPIO_CLK: usize = 0x037C >> 2;

const WINDOW_SIZE: usize = 0x1000;
const GRF_WINDOW_SIZE: usize = 0xF000;

/// Offset between native pin numbers and the kernel's sysfs numbering.
pub const SYSFS_PIN_OFFSET: u32 = 1000;

static PIN_TO_GPIO: [i32; 64] = [
    // wiringPi logical number to native gpio number
    120, 121, //  0 |  1 :            GPIO3_D0 | GPIO3_D1
    122, 123, //  2 |  3 :            GPIO3_D2 | GPIO3_D3
    124, 125, //  4 |  5 :            GPIO3_D4 | GPIO3_D5
    126, 127, //  6 |  7 :            GPIO3_D6 | GPIO3_D7
     64,  65, //  8 |  9 : (GPIO2_A0) I2C2_SDA | I2C2_SCL (GPIO2_A1)
     50, 128, // 10 | 11 :  (GPIO1_C2) SPI3_CS | I2S_CLK (GPIO4_A0)
     47,  48, // 12 | 13 : (GPIO1_B7) SPI3_TXD | SPI3_RXD (GPIO1_C0)
     49,  -1, // 14 | 15 : (GPIO1_C1) SPI3_CLK | UART_TX
     -1, 112, // 16 | 17 :              UART_RX | SPDIF_TX (GPIO3_C0)
     -1,  -1, // 18 | 19 :
     -1,  -1, // 20 | 21 :
     -1,  -1, // 22 | 23 :
     -1,  -1, // 24 | 25 :                      | ADC_IN2
     -1,  -1, // 26 | 27 :
     -1,  -1, // 28 | 29 :                      | ADC_IN3
     -1,  -1, // 30 | 31 :
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 32..47
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 48..63
];

static PHY_TO_GPIO: [i32; 64] = [
    // physical header pin number to native gpio number
     -1,      //  0
     -1, -1,  //  1 | 21 :                 5V | GND
     -1, 48,  //  2 | 22 :                 5V | SPI3_RXD (GPIO1_C0)
     -1, 47,  //  3 | 23 :           HOST1_DM | SPI3_TXD (GPIO1_B7)
     -1, -1,  //  4 | 24 :           HOST1_DP | GND
     -1, 65,  //  5 | 25 :                GND | I2C2_SCL (GPIO2_A1)
     -1, 64,  //  6 | 26 :               3.3V | I2C2_SDA (GPIO2_A0)
     -1, -1,  //  7 | 27 :           MCU_NRST | 3.3V
     -1, -1,  //  8 | 28 :           MCU_SWIM | GND
     -1, 120, //  9 | 29 :                GND | I2S0_SCLK (GPIO3_D0)
     -1, 128, // 10 | 30 :            ADC_IN2 | I2S_CLK (GPIO4_A0)
     -1, 127, // 11 | 31 :               1.8V | I2S0_SDO0 (GPIO3_D7)
     -1, 122, // 12 | 32 :            ADC_IN3 | I2S0_LRCK_TX (GPIO3_D2)
    112, 123, // 13 | 33 : (GPIO3_C0) SPDIF_TX | I2S0_SDI0 (GPIO3_D3)
     -1, -1,  // 14 | 34 :                GND | GND
     50, 126, // 15 | 35 :  (GPIO1_C2) SPI3_CS | I2S0_SDI3SDO1 (GPIO3_D6)
     49, 125, // 16 | 36 : (GPIO1_C1) SPI3_CLK | I2S0_SDI2SDO2 (GPIO3_D5)
     -1, 124, // 17 | 37 :                GND | I2S0_SDI1SDO3 (GPIO3_D4)
     -1, 121, // 18 | 38 :            UART_RX | I2S0_LRCK_RX (GPIO3_D1)
     -1, -1,  // 19 | 39 :            UART_TX | MCU_PA1
     -1, -1,  // 20 | 40 :               3.3V | GND
    -1, -1, -1, -1, -1, -1, -1, -1, // 41..48
    -1, -1, -1, -1, -1, -1, -1, -1, // 49..56
    -1, -1, -1, -1, -1, -1, -1, // 57..63
];

// SAR ADC channels routed to the header (raw-value sysfs nodes).
const ADC_NODES: [&str; 2] = [
    "/sys/devices/platform/ff100000.saradc/iio:device0/in_voltage2_raw",
    "/sys/devices/platform/ff100000.saradc/iio:device0/in_voltage3_raw",
];

/// Board backend for the Khadas Edge.
pub struct EdgeDriver {
    banks: [RegWindow; 5],
    pmugrf: RegWindow,
    grf: RegWindow,
    pmucru: RegWindow,
    cru: RegWindow,
    adc: [Option<Mutex<File>>; 2],
}

fn bank_of(gpio: u32) -> usize {
    (gpio / 32) as usize
}

fn shift_of(gpio: u32) -> u32 {
    gpio % 32
}

/// Bit index within the pin's 8-pad GRF group.
fn grf_shift(gpio: u32) -> u32 {
    gpio % 8
}

/// Word offset of the pin's iomux/pull register relative to the group base.
fn grf_group_word(gpio: u32) -> usize {
    let bank = gpio / 32;
    let group = (gpio % 32) / 8;
    let bank_in_block = if bank > 1 { bank - 2 } else { bank };
    ((0x10 * bank_in_block + 0x4 * group) >> 2) as usize
}

impl EdgeDriver {
    /// Map every register window and open the ADC nodes.
    pub fn open() -> Result<Self> {
        let backend = |e: pinwire_mmio::MmioError| Error::Backend(Box::new(e));
        let file = open_mem_device().map_err(backend)?;
        let map = |base, size| RegWindow::map_with(&file, base, size).map_err(backend);

        let banks = [
            map(GPIO_BANK_BASES[0], WINDOW_SIZE)?,
            map(GPIO_BANK_BASES[1], WINDOW_SIZE)?,
            map(GPIO_BANK_BASES[2], WINDOW_SIZE)?,
            map(GPIO_BANK_BASES[3], WINDOW_SIZE)?,
            map(GPIO_BANK_BASES[4], WINDOW_SIZE)?,
        ];
        let driver = EdgeDriver {
            banks,
            pmugrf: map(PMUGRF_BASE, GRF_WINDOW_SIZE)?,
            grf: map(GRF_BASE, GRF_WINDOW_SIZE)?,
            pmucru: map(PMUCRU_BASE, WINDOW_SIZE)?,
            cru: map(CRU_BASE, WINDOW_SIZE)?,
            adc: open_adc_nodes(),
        };
        log::debug!("edge register windows mapped");
        Ok(driver)
    }

    /// Gate the pin's bank clock on or off. The CRU registers use the
    /// upper-half-word write mask, so no read-modify-write race exists.
    fn set_clock(&self, gpio: u32, enable: bool) {
        let bank = bank_of(gpio) as u32;
        let shift = if bank < 2 { bank + 2 } else { bank + 1 };
        let (cru, reg) = if bank < 2 {
            (&self.pmucru, PMUCRU_GPIO_CLK)
        } else {
            (&self.cru, CRU_GPIO_CLK)
        };
        // Gate bit set = clock disabled.
        let mut target = 1 << (shift + 16);
        if !enable {
            target |= 1 << shift;
        }
        cru.write(reg, target);
    }

    /// The GRF window and group register for a pin, given the byte offset
    /// of the register family (iomux or pull) in each block.
    fn grf_reg(&self, gpio: u32, pmu_offset: u32, grf_offset: u32) -> (&RegWindow, usize) {
        if bank_of(gpio) < 2 {
            (&self.pmugrf, (pmu_offset >> 2) as usize + grf_group_word(gpio))
        } else {
            (&self.grf, (grf_offset >> 2) as usize + grf_group_word(gpio))
        }
    }

    /// Route the pad to its GPIO function (iomux field 0b00).
    fn set_iomux_gpio(&self, gpio: u32) {
        let (grf, reg) = self.grf_reg(gpio, PMUGRF_IOMUX, GRF_IOMUX);
        let shift = grf_shift(gpio) * 2;
        let mask = (0b11 << (shift + 16)) as u32;
        grf.write(reg, mask); // write-mask set, field bits zero = GPIO
    }

    fn read_iomux(&self, gpio: u32) -> u32 {
        let (grf, reg) = self.grf_reg(gpio, PMUGRF_IOMUX, GRF_IOMUX);
        (grf.read(reg) >> (grf_shift(gpio) * 2)) & 0b11
    }

    fn write_pull_field(&self, gpio: u32, field: u32) {
        let (grf, reg) = self.grf_reg(gpio, PMUGRF_PUPD, GRF_PUPD);
        let shift = grf_shift(gpio) * 2;
        grf.write(reg, (0b11 << (shift + 16)) | (field << shift));
    }

    /// Pull field encoding for a pin. Most pads use 01 = up, 10 = down;
    /// GPIO2 groups C/D have the two codes swapped.
    fn pull_field(gpio: u32, pull: Pull) -> u32 {
        let inverted = bank_of(gpio) == 2 && (gpio % 32) / 8 >= 2;
        match (pull, inverted) {
            (Pull::Off, _) => 0b00,
            (Pull::Up, false) | (Pull::Down, true) => 0b01,
            (Pull::Down, false) | (Pull::Up, true) => 0b10,
        }
    }

    fn read_adc_raw(&self, channel: usize) -> i32 {
        let Some(node) = self.adc.get(channel).and_then(|n| n.as_ref()) else {
            return 0;
        };
        let mut file = node.lock().unwrap();
        let mut buf = String::new();
        use std::io::Seek;
        if file.seek(std::io::SeekFrom::Start(0)).is_err() {
            return -1;
        }
        match file.read_to_string(&mut buf) {
            Ok(_) => buf.trim().parse().unwrap_or(-1),
            Err(e) => {
                log::warn!("adc channel {channel} read failed: {e}");
                -1
            }
        }
    }
}

fn open_adc_nodes() -> [Option<Mutex<File>>; 2] {
    let open = |path: &str| match File::open(PathBuf::from(path)) {
        Ok(f) => Some(Mutex::new(f)),
        Err(e) => {
            log::debug!("adc node {path} unavailable: {e}");
            None
        }
    };
    [open(ADC_NODES[0]), open(ADC_NODES[1])]
}

impl PinDriver for EdgeDriver {
    fn model(&self) -> BoardModel {
        BoardModel::Edge
    }

    fn pin_base(&self) -> u32 {
        SYSFS_PIN_OFFSET
    }

    fn logical_to_native(&self, pin: u32) -> Option<u32> {
        table_lookup(&PIN_TO_GPIO, pin)
    }

    fn phys_to_native(&self, pin: u32) -> Option<u32> {
        table_lookup(&PHY_TO_GPIO, pin)
    }

    fn is_valid(&self, gpio: u32) -> bool {
        gpio < 160
    }

    fn set_direction(&self, gpio: u32, output: bool) {
        if !self.is_valid(gpio) {
            return;
        }
        self.set_clock(gpio, true);
        self.set_iomux_gpio(gpio);
        let ddr = &self.banks[bank_of(gpio)];
        if output {
            ddr.set_bit(GPIO_DDR, shift_of(gpio));
        } else {
            ddr.clear_bit(GPIO_DDR, shift_of(gpio));
        }
        self.set_clock(gpio, false);
    }

    fn digital_read(&self, gpio: u32) -> Level {
        if !self.is_valid(gpio) {
            return Level::Low;
        }
        self.set_clock(gpio, true);
        let value = self.banks[bank_of(gpio)].read(GPIO_EXT);
        self.set_clock(gpio, false);
        Level::from_bit(value & (1 << shift_of(gpio)))
    }

    fn digital_write(&self, gpio: u32, level: Level) {
        if !self.is_valid(gpio) {
            return;
        }
        self.set_clock(gpio, true);
        let bank = &self.banks[bank_of(gpio)];
        match level {
            Level::High => bank.set_bit(GPIO_DR, shift_of(gpio)),
            Level::Low => bank.clear_bit(GPIO_DR, shift_of(gpio)),
        }
        self.set_clock(gpio, false);
    }

    fn pull_control(&self, gpio: u32, pull: Pull) {
        if !self.is_valid(gpio) {
            return;
        }
        self.set_clock(gpio, true);
        self.write_pull_field(gpio, Self::pull_field(gpio, pull));
        self.set_clock(gpio, false);
    }

    fn get_alt(&self, gpio: u32) -> i32 {
        if !self.is_valid(gpio) {
            return -1;
        }
        self.set_clock(gpio, true);
        let iomux = self.read_iomux(gpio);
        let ret = if iomux == 0 {
            // GPIO function: report the direction.
            let ddr = self.banks[bank_of(gpio)].read(GPIO_DDR);
            if ddr & (1 << shift_of(gpio)) != 0 {
                1
            } else {
                0
            }
        } else {
            // Function 1..3 maps onto ALT2..ALT4.
            iomux as i32 + 1
        };
        self.set_clock(gpio, false);
        ret
    }

    fn get_pull(&self, gpio: u32) -> i32 {
        if !self.is_valid(gpio) {
            return -1;
        }
        self.set_clock(gpio, true);
        let (grf, reg) = self.grf_reg(gpio, PMUGRF_PUPD, GRF_PUPD);
        let field = (grf.read(reg) >> (grf_shift(gpio) * 2)) & 0b11;
        self.set_clock(gpio, false);
        match (Self::pull_field(gpio, Pull::Up) == field, field) {
            (_, 0b00) => Pull::Off.code(),
            (true, _) => Pull::Up.code(),
            _ => Pull::Down.code(),
        }
    }

    fn analog_read(&self, pin: u32) -> i32 {
        // wiringPi channels 0/1, or their header pins 25/29.
        match pin {
            0 | 25 => self.read_adc_raw(0),
            1 | 29 => self.read_adc_raw(1),
            _ => 0,
        }
    }

    /// Logical pins 0..7 sit on GPIO3_D0..D7, so the byte port is the top
    /// byte of bank 3.
    fn digital_read_byte(&self) -> u32 {
        self.set_clock(96, true);
        let value = self.banks[3].read(GPIO_EXT);
        self.set_clock(96, false);
        (value >> 24) & 0xFF
    }

    fn digital_write_byte(&self, value: u8) {
        self.set_clock(96, true);
        self.banks[3].update(GPIO_DR, 0xFF00_0000, (value as u32) << 24);
        self.set_clock(96, false);
    }

    fn sysfs_number(&self, gpio: u32) -> u32 {
        gpio + SYSFS_PIN_OFFSET
    }
}

/// Build the Edge driver.
pub fn driver() -> Result<Arc<dyn PinDriver>> {
    Ok(Arc::new(EdgeDriver::open()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_and_shift_decomposition() {
        assert_eq!(bank_of(120), 3);
        assert_eq!(shift_of(120), 24); // GPIO3_D0
        assert_eq!(bank_of(50), 1);
        assert_eq!(shift_of(50), 18); // GPIO1_C2
        assert_eq!(grf_shift(50), 2);
    }

    #[test]
    fn grf_group_offsets() {
        // GPIO1_C2 (50): bank 1, group C -> 0x10 * 1 + 4 * 2 = 0x18.
        assert_eq!(grf_group_word(50), 0x18 >> 2);
        // GPIO3_D0 (120): bank 3 -> block-relative bank 1, group D.
        assert_eq!(grf_group_word(120), (0x10 + 0xC) >> 2);
        // GPIO2_A0 (64): first register of the GRF block.
        assert_eq!(grf_group_word(64), 0);
    }

    #[test]
    fn pull_field_inversion_on_bank2_upper_groups() {
        // GPIO2_A0: normal encoding.
        assert_eq!(EdgeDriver::pull_field(64, Pull::Up), 0b01);
        assert_eq!(EdgeDriver::pull_field(64, Pull::Down), 0b10);
        // GPIO2_C0 (80): groups C/D are swapped.
        assert_eq!(EdgeDriver::pull_field(80, Pull::Up), 0b10);
        assert_eq!(EdgeDriver::pull_field(80, Pull::Down), 0b01);
        // Off is 00 everywhere.
        assert_eq!(EdgeDriver::pull_field(80, Pull::Off), 0b00);
    }

    #[test]
    fn logical_table_matches_vendor_wiring() {
        assert_eq!(table_lookup(&PIN_TO_GPIO, 0), Some(120));
        assert_eq!(table_lookup(&PIN_TO_GPIO, 7), Some(127));
        assert_eq!(table_lookup(&PIN_TO_GPIO, 10), Some(50));
        assert_eq!(table_lookup(&PIN_TO_GPIO, 15), None);
        // The physical table keeps the vendor's interleaved two-column
        // layout, so SPDIF_TX (GPIO3_C0) sits at index 25.
        assert_eq!(table_lookup(&PHY_TO_GPIO, 25), Some(112));
        assert_eq!(table_lookup(&PHY_TO_GPIO, 26), Some(123));
    }
}
