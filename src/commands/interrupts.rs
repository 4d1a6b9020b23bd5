//! Sysfs-facing commands: exports, edge, wfi

use std::time::Duration;

use pinwire_core::types::{Edge, NumberingMode};
use pinwire_core::Gpio;
use pinwire_sysfs::{IsrRegistry, SysfsGpio};

use crate::cli::EdgeArg;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Kernel sysfs number for an abstract pin. In sysfs numbering mode the pin
/// already is one; otherwise resolve to native and let the board translate.
fn sysfs_pin(gpio: &Gpio, pin: u32) -> Result<u32, String> {
    if gpio.numbering() == NumberingMode::Sysfs {
        return Ok(pin);
    }
    match gpio.to_native(pin) {
        Some(native) => Ok(gpio.driver().sysfs_number(native)),
        None => Err(format!("pin {pin} does not map to a GPIO on this board")),
    }
}

fn to_edge(edge: EdgeArg) -> Option<Edge> {
    match edge {
        EdgeArg::Rising => Some(Edge::Rising),
        EdgeArg::Falling => Some(Edge::Falling),
        EdgeArg::Both => Some(Edge::Both),
        EdgeArg::None => None,
    }
}

pub fn run_exports(sysfs: &SysfsGpio) {
    let pins = sysfs.exported_pins();
    if pins.is_empty() {
        println!("No GPIO pins exported");
        return;
    }
    println!("GPIO pins exported:");
    for pin in pins {
        let direction = sysfs.read_attr(pin, "direction").unwrap_or_default();
        let value = sysfs.read_attr(pin, "value").unwrap_or_default();
        let edge = sysfs.read_attr(pin, "edge").unwrap_or_default();
        println!("  {pin:4}: {direction:4} {value} {edge}");
    }
}

pub fn run_edge(gpio: &Gpio, sysfs: &SysfsGpio, pin: u32, edge: EdgeArg) -> CmdResult {
    let sys = sysfs_pin(gpio, pin)?;
    sysfs.export(sys)?;
    sysfs.set_direction(sys, false)?;
    match to_edge(edge) {
        Some(edge) => sysfs.set_edge(sys, edge)?,
        None => sysfs.clear_edge(sys)?,
    }
    Ok(())
}

pub fn run_wfi(
    gpio: &Gpio,
    registry: &IsrRegistry,
    pin: u32,
    edge: EdgeArg,
    timeout_ms: Option<u64>,
) -> CmdResult {
    let sys = sysfs_pin(gpio, pin)?;
    // `none` means the edge attribute is already configured.
    let edge = to_edge(edge).unwrap_or(Edge::Setup);
    let timeout = timeout_ms.map(Duration::from_millis);

    log::debug!("waiting for interrupt on gpio{sys}");
    match registry.wait_for_interrupt(sys, edge, timeout)? {
        Some(level) => println!("{level}"),
        None => {
            println!("timed out");
            std::process::exit(2);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sysfs_mode_passes_pins_through() {
        let gpio = Gpio::new(pinwire_dummy::driver(), NumberingMode::Sysfs);
        assert_eq!(sysfs_pin(&gpio, 433), Ok(433));
    }

    #[test]
    fn logical_mode_resolves_before_translating() {
        let gpio = Gpio::new(pinwire_dummy::driver(), NumberingMode::Logical);
        // Dummy logical numbering is the identity with identity sysfs numbers.
        assert_eq!(sysfs_pin(&gpio, 7), Ok(7));
        assert!(sysfs_pin(&gpio, 99).is_err());
    }
}
