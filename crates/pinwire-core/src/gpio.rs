//! Pin operation dispatch
//!
//! [`Gpio`] is the facade every pin operation goes through. For each call it
//! first asks the extension-node registry whether a registered node owns the
//! pin; if so the node handles it with the absolute pin number. Otherwise the
//! pin is resolved through the numbering mode to a native GPIO number and the
//! board backend takes over. Pins nobody owns and numbers that do not resolve
//! are silent no-ops with sentinel results, matching the classic wiringPi
//! contract.
//!
//! In sysfs numbering mode, digital reads and writes go through the cached
//! `value` descriptors instead of the memory-mapped backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::driver::PinDriver;
use crate::error::Result;
use crate::registry::{NodeRegistry, PinNode};
use crate::resolve::resolve;
use crate::softpwm::{SoftPwm, DEFAULT_RANGE};
use crate::softtone::SoftTone;
use crate::sysfs_table::SysfsTable;
use crate::types::{Level, NumberingMode, PinMode, Pull};

/// Dispatch facade over one board backend, a node registry and the soft
/// PWM/tone workers. The numbering mode is fixed for the instance's lifetime.
pub struct Gpio {
    mode: NumberingMode,
    driver: Arc<dyn PinDriver>,
    nodes: Mutex<NodeRegistry>,
    sysfs: Arc<SysfsTable>,
    soft_pwms: Mutex<HashMap<u32, SoftPwm>>,
    soft_tones: Mutex<HashMap<u32, SoftTone>>,
}

impl Gpio {
    /// Wrap a board backend with a fresh node registry and sysfs table.
    pub fn new(driver: Arc<dyn PinDriver>, mode: NumberingMode) -> Self {
        Self::with_sysfs(driver, mode, Arc::new(SysfsTable::new()))
    }

    /// Like [`Gpio::new`] but sharing an existing sysfs descriptor table
    /// (the interrupt subsystem and sysfs numbering mode use the same one).
    pub fn with_sysfs(
        driver: Arc<dyn PinDriver>,
        mode: NumberingMode,
        sysfs: Arc<SysfsTable>,
    ) -> Self {
        Gpio {
            mode,
            driver,
            nodes: Mutex::new(NodeRegistry::new()),
            sysfs,
            soft_pwms: Mutex::new(HashMap::new()),
            soft_tones: Mutex::new(HashMap::new()),
        }
    }

    /// The numbering mode fixed at construction.
    pub fn numbering(&self) -> NumberingMode {
        self.mode
    }

    /// The active board backend.
    pub fn driver(&self) -> &Arc<dyn PinDriver> {
        &self.driver
    }

    /// The shared sysfs descriptor table.
    pub fn sysfs(&self) -> &Arc<SysfsTable> {
        &self.sysfs
    }

    /// Register an extension node; its pin range becomes owned by the node
    /// for every subsequent operation.
    pub fn register_node(&self, node: Box<dyn PinNode>) -> Result<()> {
        self.nodes.lock().unwrap().insert(node)
    }

    /// Registered extension ranges, sorted by base.
    pub fn node_ranges(&self) -> Vec<(u32, u32)> {
        self.nodes.lock().unwrap().ranges()
    }

    /// Resolve an abstract pin to the board's native GPIO number, bypassing
    /// the node registry. `None` means the pin does not map on this board.
    pub fn to_native(&self, pin: u32) -> Option<u32> {
        resolve(self.mode, pin, self.driver.as_ref(), &self.sysfs)
    }

    /// Configure a pin. `SoftPwm`/`SoftTone` spawn (or retune) the worker
    /// thread for the pin; switching back to `Input`/`Output` stops it.
    pub fn pin_mode(&self, pin: u32, mode: PinMode) {
        {
            let mut nodes = self.nodes.lock().unwrap();
            if let Some(node) = nodes.find(pin) {
                node.pin_mode(pin, mode);
                return;
            }
        }
        if self.mode == NumberingMode::Sysfs {
            // Direction is fixed at export time in sysfs mode.
            return;
        }
        let Some(gpio) = self.to_native(pin) else { return };
        match mode {
            PinMode::Input => {
                self.stop_soft_workers(gpio);
                self.driver.set_direction(gpio, false);
            }
            PinMode::Output => {
                self.stop_soft_workers(gpio);
                self.driver.set_direction(gpio, true);
            }
            PinMode::SoftPwm => self.soft_pwm_create(pin, 0, DEFAULT_RANGE),
            PinMode::SoftTone => self.soft_tone_create(pin),
        }
    }

    /// Read a pin. Unmapped pins read as `Low`.
    pub fn digital_read(&self, pin: u32) -> Level {
        {
            let mut nodes = self.nodes.lock().unwrap();
            if let Some(node) = nodes.find(pin) {
                return node.digital_read(pin);
            }
        }
        if self.mode == NumberingMode::Sysfs {
            return self.sysfs.read_level(pin).unwrap_or(Level::Low);
        }
        match self.to_native(pin) {
            Some(gpio) => self.driver.digital_read(gpio),
            None => Level::Low,
        }
    }

    /// Drive a pin. Unmapped pins are ignored.
    pub fn digital_write(&self, pin: u32, level: Level) {
        {
            let mut nodes = self.nodes.lock().unwrap();
            if let Some(node) = nodes.find(pin) {
                node.digital_write(pin, level);
                return;
            }
        }
        if self.mode == NumberingMode::Sysfs {
            self.sysfs.write_level(pin, level);
            return;
        }
        if let Some(gpio) = self.to_native(pin) {
            self.driver.digital_write(gpio, level);
        }
    }

    /// Invert a pin's current level.
    pub fn toggle(&self, pin: u32) -> Level {
        let next = self.digital_read(pin).toggled();
        self.digital_write(pin, next);
        next
    }

    /// Configure a pull resistor.
    pub fn pull_control(&self, pin: u32, pull: Pull) {
        {
            let mut nodes = self.nodes.lock().unwrap();
            if let Some(node) = nodes.find(pin) {
                node.pull_control(pin, pull);
                return;
            }
        }
        if self.mode == NumberingMode::Sysfs {
            // Pin numbers are kernel sysfs numbers here, not native GPIOs;
            // the register backend must not see them.
            return;
        }
        if let Some(gpio) = self.to_native(pin) {
            self.driver.pull_control(gpio, pull);
        }
    }

    /// Encoded pin function for diagnostics (0 input, 1 output, 2+ alt),
    /// -1 where unknown or the pin is owned by an extension node.
    pub fn get_alt(&self, pin: u32) -> i32 {
        if self.nodes.lock().unwrap().owns(pin) || self.mode == NumberingMode::Sysfs {
            return -1;
        }
        match self.to_native(pin) {
            Some(gpio) => self.driver.get_alt(gpio),
            None => -1,
        }
    }

    /// Encoded pull state (0 off, 1 down, 2 up), -1 where unreported.
    pub fn get_pull(&self, pin: u32) -> i32 {
        if self.nodes.lock().unwrap().owns(pin) || self.mode == NumberingMode::Sysfs {
            return -1;
        }
        match self.to_native(pin) {
            Some(gpio) => self.driver.get_pull(gpio),
            None => -1,
        }
    }

    /// Read an analog channel; extension nodes (ADCs) first, then the
    /// board's own ADC. The pin is passed unresolved since ADC channels
    /// have no native GPIO number.
    pub fn analog_read(&self, pin: u32) -> i32 {
        {
            let mut nodes = self.nodes.lock().unwrap();
            if let Some(node) = nodes.find(pin) {
                return node.analog_read(pin);
            }
        }
        self.driver.analog_read(pin)
    }

    /// Write an analog value; only extension nodes (DACs) can take it.
    pub fn analog_write(&self, pin: u32, value: i32) {
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(node) = nodes.find(pin) {
            node.analog_write(pin, value);
        }
    }

    /// Write a PWM value: a node owning the pin takes it, otherwise a
    /// running soft-PWM worker on the pin gets the new duty value.
    pub fn pwm_write(&self, pin: u32, value: i32) {
        {
            let mut nodes = self.nodes.lock().unwrap();
            if let Some(node) = nodes.find(pin) {
                node.pwm_write(pin, value);
                return;
            }
        }
        self.soft_pwm_write(pin, value.max(0) as u32);
    }

    /// Set pad drive strength where the board supports it.
    pub fn set_pad_drive(&self, pin: u32, value: u32) {
        if self.mode == NumberingMode::Sysfs {
            return;
        }
        if let Some(gpio) = self.to_native(pin) {
            self.driver.set_pad_drive(gpio, value);
        }
    }

    /// Read pad drive strength, -1 where unsupported.
    pub fn get_pad_drive(&self, pin: u32) -> i32 {
        if self.mode == NumberingMode::Sysfs {
            return -1;
        }
        match self.to_native(pin) {
            Some(gpio) => self.driver.get_pad_drive(gpio),
            None => -1,
        }
    }

    /// Read eight consecutive logical pins as one byte (board-specific).
    pub fn digital_read_byte(&self) -> u32 {
        self.driver.digital_read_byte()
    }

    /// Write eight consecutive logical pins from one byte (board-specific).
    pub fn digital_write_byte(&self, value: u8) {
        self.driver.digital_write_byte(value)
    }

    /// Start (or retune) a software PWM worker on `pin`.
    pub fn soft_pwm_create(&self, pin: u32, value: u32, range: u32) {
        let Some(gpio) = self.to_native(pin) else { return };
        self.soft_tones.lock().unwrap().remove(&gpio);
        let mut pwms = self.soft_pwms.lock().unwrap();
        match pwms.get(&gpio) {
            // Re-creating on a live pin retunes instead of stacking threads.
            Some(pwm) => pwm.reconfigure(value, range),
            None => {
                pwms.insert(gpio, SoftPwm::start(Arc::clone(&self.driver), gpio, value, range));
            }
        }
    }

    /// Update the duty value of a running soft-PWM worker; no-op otherwise.
    pub fn soft_pwm_write(&self, pin: u32, value: u32) {
        let Some(gpio) = self.to_native(pin) else { return };
        if let Some(pwm) = self.soft_pwms.lock().unwrap().get(&gpio) {
            pwm.set_value(value);
        }
    }

    /// Stop the soft-PWM worker on `pin`, leaving the pin low.
    pub fn soft_pwm_stop(&self, pin: u32) {
        if let Some(gpio) = self.to_native(pin) {
            if let Some(pwm) = self.soft_pwms.lock().unwrap().remove(&gpio) {
                pwm.stop();
            }
        }
    }

    /// Start a software tone worker on `pin`, initially silent.
    pub fn soft_tone_create(&self, pin: u32) {
        let Some(gpio) = self.to_native(pin) else { return };
        self.soft_pwms.lock().unwrap().remove(&gpio);
        let mut tones = self.soft_tones.lock().unwrap();
        tones
            .entry(gpio)
            .or_insert_with(|| SoftTone::start(Arc::clone(&self.driver), gpio));
    }

    /// Set the frequency of a running tone worker; no-op otherwise.
    pub fn soft_tone_write(&self, pin: u32, freq: u32) {
        let Some(gpio) = self.to_native(pin) else { return };
        if let Some(tone) = self.soft_tones.lock().unwrap().get(&gpio) {
            tone.set_frequency(freq);
        }
    }

    /// Stop the tone worker on `pin`, leaving the pin low.
    pub fn soft_tone_stop(&self, pin: u32) {
        if let Some(gpio) = self.to_native(pin) {
            if let Some(tone) = self.soft_tones.lock().unwrap().remove(&gpio) {
                tone.stop();
            }
        }
    }

    fn stop_soft_workers(&self, gpio: u32) {
        if let Some(pwm) = self.soft_pwms.lock().unwrap().remove(&gpio) {
            pwm.stop();
        }
        if let Some(tone) = self.soft_tones.lock().unwrap().remove(&gpio) {
            tone.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoardModel;

    /// 8-pin in-memory backend mapping logical pin n to native 100 + n.
    #[derive(Default)]
    struct MemDriver {
        levels: Mutex<HashMap<u32, Level>>,
        outputs: Mutex<HashMap<u32, bool>>,
        pulls: Mutex<Vec<u32>>,
    }

    impl PinDriver for MemDriver {
        fn model(&self) -> BoardModel {
            BoardModel::Dummy
        }
        fn pin_base(&self) -> u32 {
            100
        }
        fn logical_to_native(&self, pin: u32) -> Option<u32> {
            (pin < 8).then_some(100 + pin)
        }
        fn phys_to_native(&self, pin: u32) -> Option<u32> {
            ((3..11).contains(&pin)).then_some(100 + pin - 3)
        }
        fn is_valid(&self, gpio: u32) -> bool {
            (100..108).contains(&gpio)
        }
        fn set_direction(&self, gpio: u32, output: bool) {
            self.outputs.lock().unwrap().insert(gpio, output);
        }
        fn digital_read(&self, gpio: u32) -> Level {
            self.levels
                .lock()
                .unwrap()
                .get(&gpio)
                .copied()
                .unwrap_or(Level::Low)
        }
        fn digital_write(&self, gpio: u32, level: Level) {
            if self.is_valid(gpio) {
                self.levels.lock().unwrap().insert(gpio, level);
            }
        }
        fn pull_control(&self, gpio: u32, _pull: Pull) {
            self.pulls.lock().unwrap().push(gpio);
        }
        fn get_alt(&self, gpio: u32) -> i32 {
            match self.outputs.lock().unwrap().get(&gpio) {
                Some(true) => 1,
                Some(false) => 0,
                None => -1,
            }
        }
    }

    struct CaptureNode {
        base: u32,
        pins: u32,
        level: Level,
    }

    impl PinNode for CaptureNode {
        fn pin_base(&self) -> u32 {
            self.base
        }
        fn num_pins(&self) -> u32 {
            self.pins
        }
        fn digital_write(&mut self, _pin: u32, level: Level) {
            self.level = level;
        }
        fn digital_read(&mut self, _pin: u32) -> Level {
            self.level
        }
    }

    fn gpio(mode: NumberingMode) -> (Arc<MemDriver>, Gpio) {
        let driver = Arc::new(MemDriver::default());
        let gpio = Gpio::new(Arc::clone(&driver) as Arc<dyn PinDriver>, mode);
        (driver, gpio)
    }

    #[test]
    fn logical_write_reaches_native_pin() {
        let (driver, gpio) = gpio(NumberingMode::Logical);
        gpio.pin_mode(3, PinMode::Output);
        gpio.digital_write(3, Level::High);
        assert_eq!(driver.digital_read(103), Level::High);
        assert_eq!(gpio.digital_read(3), Level::High);
    }

    #[test]
    fn physical_numbering_uses_header_table() {
        let (driver, gpio) = gpio(NumberingMode::Physical);
        gpio.digital_write(5, Level::High);
        assert_eq!(driver.digital_read(102), Level::High);
    }

    #[test]
    fn unmapped_pin_is_silent_noop() {
        let (driver, gpio) = gpio(NumberingMode::Logical);
        gpio.digital_write(40, Level::High);
        gpio.pin_mode(40, PinMode::Output);
        assert_eq!(gpio.digital_read(40), Level::Low);
        assert_eq!(gpio.get_alt(40), -1);
        assert!(driver.levels.lock().unwrap().is_empty());
    }

    #[test]
    fn node_takes_precedence_over_backend() {
        let (driver, gpio) = gpio(NumberingMode::Native);
        gpio.register_node(Box::new(CaptureNode {
            base: 100,
            pins: 8,
            level: Level::Low,
        }))
        .unwrap();

        // Native 100 is also a valid backend pin; the node must win.
        gpio.digital_write(100, Level::High);
        assert_eq!(gpio.digital_read(100), Level::High);
        assert_eq!(driver.digital_read(100), Level::Low);
    }

    #[test]
    fn toggle_round_trips() {
        let (_driver, gpio) = gpio(NumberingMode::Logical);
        gpio.pin_mode(0, PinMode::Output);
        assert_eq!(gpio.toggle(0), Level::High);
        assert_eq!(gpio.toggle(0), Level::Low);
    }

    #[test]
    fn remode_stops_soft_pwm() {
        let (_driver, gpio) = gpio(NumberingMode::Logical);
        gpio.pin_mode(2, PinMode::SoftPwm);
        assert!(gpio.soft_pwms.lock().unwrap().contains_key(&102));
        gpio.pin_mode(2, PinMode::Output);
        assert!(gpio.soft_pwms.lock().unwrap().is_empty());
    }

    #[test]
    fn soft_pwm_recreate_does_not_stack_workers() {
        let (_driver, gpio) = gpio(NumberingMode::Logical);
        gpio.soft_pwm_create(2, 10, 100);
        gpio.soft_pwm_create(2, 20, 50);
        assert_eq!(gpio.soft_pwms.lock().unwrap().len(), 1);
        gpio.soft_pwm_stop(2);
        assert!(gpio.soft_pwms.lock().unwrap().is_empty());
    }

    #[test]
    fn soft_tone_replaces_pwm_on_same_pin() {
        let (_driver, gpio) = gpio(NumberingMode::Logical);
        gpio.pin_mode(4, PinMode::SoftPwm);
        gpio.pin_mode(4, PinMode::SoftTone);
        assert!(gpio.soft_pwms.lock().unwrap().is_empty());
        assert!(gpio.soft_tones.lock().unwrap().contains_key(&104));
        gpio.soft_tone_stop(4);
    }

    #[test]
    fn sysfs_mode_keeps_register_backend_untouched() {
        let path = std::env::temp_dir().join(format!(
            "pinwire-gpio-sysfs-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        let file = std::fs::File::options()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();

        // Kernel sysfs number with a cached descriptor; it is not a native
        // GPIO and must never reach the register backend.
        let driver = Arc::new(MemDriver::default());
        let table = Arc::new(SysfsTable::new());
        table.insert(150, file);
        let gpio = Gpio::with_sysfs(
            Arc::clone(&driver) as Arc<dyn PinDriver>,
            NumberingMode::Sysfs,
            table,
        );

        gpio.pull_control(150, Pull::Up);
        gpio.pin_mode(150, PinMode::Output);
        gpio.set_pad_drive(150, 2);
        assert!(driver.pulls.lock().unwrap().is_empty());
        assert!(driver.outputs.lock().unwrap().is_empty());
        assert_eq!(gpio.get_alt(150), -1);
        assert_eq!(gpio.get_pull(150), -1);
        assert_eq!(gpio.get_pad_drive(150), -1);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn get_alt_reports_direction() {
        let (_driver, gpio) = gpio(NumberingMode::Logical);
        assert_eq!(gpio.get_alt(1), -1);
        gpio.pin_mode(1, PinMode::Input);
        assert_eq!(gpio.get_alt(1), 0);
        gpio.pin_mode(1, PinMode::Output);
        assert_eq!(gpio.get_alt(1), 1);
    }
}
