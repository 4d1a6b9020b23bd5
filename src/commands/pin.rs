//! Single-pin commands: mode, read, write, toggle, alt, pull, pwm, aread

use pinwire_core::types::{Level, PinMode, Pull};
use pinwire_core::Gpio;

use crate::cli::ModeArg;
use crate::commands::{alt_name, pull_name};

pub fn run_mode(gpio: &Gpio, pin: u32, mode: ModeArg) {
    match mode {
        ModeArg::In => gpio.pin_mode(pin, PinMode::Input),
        ModeArg::Out => gpio.pin_mode(pin, PinMode::Output),
        ModeArg::Pwm => gpio.pin_mode(pin, PinMode::SoftPwm),
        ModeArg::Tone => gpio.pin_mode(pin, PinMode::SoftTone),
        ModeArg::Up => gpio.pull_control(pin, Pull::Up),
        ModeArg::Down => gpio.pull_control(pin, Pull::Down),
        ModeArg::Tri => gpio.pull_control(pin, Pull::Off),
    }
}

pub fn run_read(gpio: &Gpio, pin: u32) {
    println!("{}", gpio.digital_read(pin));
}

pub fn run_write(gpio: &Gpio, pin: u32, value: u8) {
    gpio.digital_write(pin, Level::from_bit(u32::from(value)));
}

pub fn run_toggle(gpio: &Gpio, pin: u32) {
    println!("{}", gpio.toggle(pin));
}

pub fn run_alt(gpio: &Gpio, pin: u32) {
    println!("{}", alt_name(gpio.get_alt(pin)));
}

pub fn run_pull(gpio: &Gpio, pin: u32) {
    println!("{}", pull_name(gpio.get_pull(pin)));
}

pub fn run_pwm(gpio: &Gpio, pin: u32, value: u32) {
    gpio.pwm_write(pin, value as i32);
}

pub fn run_aread(gpio: &Gpio, pin: u32) {
    println!("{}", gpio.analog_read(pin));
}
