//! The `readall` header table
//!
//! Prints both rows of the 40-pin header side by side, classic wiringPi
//! style: logical number, native GPIO, current function and level for each
//! position, power/ground positions left blank.

use pinwire_core::{Gpio, PinDriver};

use crate::commands::alt_name;

const HEADER_PINS: u32 = 40;

const BORDER: &str = " +-----+------+------+----+----++----+----+------+------+-----+";
const TITLES: &str = " | wPi | GPIO | Mode | V  | Physical | V  | Mode | GPIO | wPi |";

/// Reverse-map a native GPIO number to its wiringPi logical number.
fn native_to_logical(driver: &dyn PinDriver, gpio: u32) -> Option<u32> {
    (0..64).find(|&l| driver.logical_to_native(l) == Some(gpio))
}

struct PinCells {
    wpi: String,
    gpio: String,
    mode: String,
    value: String,
}

fn cells(driver: &dyn PinDriver, phys: u32) -> PinCells {
    match driver.phys_to_native(phys) {
        Some(gpio) => PinCells {
            wpi: native_to_logical(driver, gpio)
                .map(|l| l.to_string())
                .unwrap_or_default(),
            gpio: gpio.to_string(),
            mode: alt_name(driver.get_alt(gpio)),
            value: driver.digital_read(gpio).to_string(),
        },
        None => PinCells {
            wpi: String::new(),
            gpio: String::new(),
            mode: String::new(),
            value: String::new(),
        },
    }
}

/// One table row covering physical pins `phys` (odd, left) and `phys + 1`.
fn format_row(driver: &dyn PinDriver, phys: u32) -> String {
    let l = cells(driver, phys);
    let r = cells(driver, phys + 1);
    format!(
        " | {:>3} | {:>4} | {:>4} | {:>2} | {:>2} || {:<2} | {:<2} | {:<4} | {:<4} | {:<3} |",
        l.wpi,
        l.gpio,
        l.mode,
        l.value,
        phys,
        phys + 1,
        r.value,
        r.mode,
        r.gpio,
        r.wpi,
    )
}

pub fn run_readall(gpio: &Gpio) {
    let driver = gpio.driver().as_ref();
    println!("{BORDER}");
    println!("{TITLES}");
    println!("{BORDER}");
    for phys in (1..HEADER_PINS).step_by(2) {
        println!("{}", format_row(driver, phys));
    }
    println!("{BORDER}");
    println!("{TITLES}");
    println!("{BORDER}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinwire_core::types::{Level, PinMode, NumberingMode};
    use pinwire_dummy::DummyDriver;

    #[test]
    fn power_pins_render_blank() {
        let driver = DummyDriver::new();
        let row = format_row(&driver, 1);
        // Physical 1 is 3.3V, physical 2 is 5V; no numbers on either side.
        assert!(row.contains("|  1 || 2 "));
        assert!(!row.contains("ALT"));
        assert!(!row.contains("IN"));
    }

    #[test]
    fn mapped_pin_shows_mode_and_level() {
        let gpio = Gpio::new(pinwire_dummy::driver(), NumberingMode::Physical);
        gpio.pin_mode(7, PinMode::Output);
        gpio.digital_write(7, Level::High);

        let row = format_row(gpio.driver().as_ref(), 7);
        assert!(row.contains("OUT"));
        assert!(row.contains('1'));
    }

    #[test]
    fn logical_numbers_come_from_reverse_lookup() {
        let driver = DummyDriver::new();
        // Dummy logical numbering is the identity, physical 3 is native 2.
        assert_eq!(native_to_logical(&driver, 2), Some(2));
        let row = format_row(&driver, 3);
        assert!(row.starts_with(" |   2 |    2 |"));
    }
}
