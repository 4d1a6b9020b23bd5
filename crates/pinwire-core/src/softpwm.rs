//! Software PWM
//!
//! Mark/space PWM bit-banged from a dedicated thread, for pins without a
//! hardware PWM channel. One time unit is 100 microseconds, so the default
//! range of 100 gives a period of 10ms (100Hz). Jitter is whatever the
//! scheduler gives us; this is for LEDs and slow actuators, not servos with
//! tight timing demands.
//!
//! Mark and range live in atomics shared with the worker, so updating the
//! duty cycle never spawns or joins a thread.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::driver::PinDriver;
use crate::types::Level;

/// Length of one PWM time unit.
pub const PULSE_TIME: Duration = Duration::from_micros(100);

/// Default range, giving percent-style duty values.
pub const DEFAULT_RANGE: u32 = 100;

/// A running software PWM worker for one native pin.
pub struct SoftPwm {
    mark: Arc<AtomicU32>,
    range: Arc<AtomicU32>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SoftPwm {
    /// Configure the pin as an output and start the worker thread with the
    /// given initial duty value.
    pub fn start(driver: Arc<dyn PinDriver>, gpio: u32, value: u32, range: u32) -> Self {
        let range = range.max(1);
        let mark = Arc::new(AtomicU32::new(value.min(range)));
        let range = Arc::new(AtomicU32::new(range));
        let stop = Arc::new(AtomicBool::new(false));

        driver.digital_write(gpio, Level::Low);
        driver.set_direction(gpio, true);

        let handle = {
            let mark = Arc::clone(&mark);
            let range = Arc::clone(&range);
            let stop = Arc::clone(&stop);
            std::thread::Builder::new()
                .name(format!("softpwm-{gpio}"))
                .spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        let mark = mark.load(Ordering::Relaxed);
                        let range = range.load(Ordering::Relaxed);
                        if mark > 0 {
                            driver.digital_write(gpio, Level::High);
                            std::thread::sleep(PULSE_TIME * mark);
                        }
                        let space = range.saturating_sub(mark);
                        if space > 0 {
                            driver.digital_write(gpio, Level::Low);
                            std::thread::sleep(PULSE_TIME * space);
                        }
                    }
                    // Leave the pin in a defined state.
                    driver.digital_write(gpio, Level::Low);
                })
                .unwrap_or_else(|e| panic!("failed to spawn softpwm thread: {e}"))
        };

        SoftPwm {
            mark,
            range,
            stop,
            handle: Some(handle),
        }
    }

    /// Update the duty value; clamped to the current range.
    pub fn set_value(&self, value: u32) {
        let range = self.range.load(Ordering::Relaxed);
        self.mark.store(value.min(range), Ordering::Relaxed);
    }

    /// Update value and range together (a re-create on an already running
    /// pin folds into this).
    pub fn reconfigure(&self, value: u32, range: u32) {
        let range = range.max(1);
        self.range.store(range, Ordering::Relaxed);
        self.mark.store(value.min(range), Ordering::Relaxed);
    }

    /// Stop the worker and wait for it; the pin ends up low.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SoftPwm {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoardModel, Pull};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingDriver {
        writes: Mutex<Vec<Level>>,
    }

    impl PinDriver for RecordingDriver {
        fn model(&self) -> BoardModel {
            BoardModel::Dummy
        }
        fn pin_base(&self) -> u32 {
            0
        }
        fn logical_to_native(&self, pin: u32) -> Option<u32> {
            Some(pin)
        }
        fn phys_to_native(&self, pin: u32) -> Option<u32> {
            Some(pin)
        }
        fn is_valid(&self, _gpio: u32) -> bool {
            true
        }
        fn set_direction(&self, _gpio: u32, _output: bool) {}
        fn digital_read(&self, _gpio: u32) -> Level {
            self.writes.lock().unwrap().last().copied().unwrap_or(Level::Low)
        }
        fn digital_write(&self, _gpio: u32, level: Level) {
            self.writes.lock().unwrap().push(level);
        }
        fn pull_control(&self, _gpio: u32, _pull: Pull) {}
        fn get_alt(&self, _gpio: u32) -> i32 {
            -1
        }
    }

    #[test]
    fn stop_leaves_pin_low() {
        let driver = Arc::new(RecordingDriver::default());
        let pwm = SoftPwm::start(Arc::clone(&driver) as Arc<dyn PinDriver>, 5, 50, 100);
        std::thread::sleep(Duration::from_millis(25));
        pwm.stop();
        let writes = driver.writes.lock().unwrap();
        assert_eq!(writes.last(), Some(&Level::Low));
        // A 50% duty cycle must have produced at least one high phase.
        assert!(writes.contains(&Level::High));
    }

    #[test]
    fn value_is_clamped_to_range() {
        let driver = Arc::new(RecordingDriver::default());
        let pwm = SoftPwm::start(Arc::clone(&driver) as Arc<dyn PinDriver>, 5, 0, 10);
        pwm.set_value(5000);
        assert_eq!(pwm.mark.load(Ordering::Relaxed), 10);
        pwm.reconfigure(7, 4);
        assert_eq!(pwm.range.load(Ordering::Relaxed), 4);
        assert_eq!(pwm.mark.load(Ordering::Relaxed), 4);
        pwm.stop();
    }

    #[test]
    fn zero_duty_never_goes_high() {
        let driver = Arc::new(RecordingDriver::default());
        let pwm = SoftPwm::start(Arc::clone(&driver) as Arc<dyn PinDriver>, 5, 0, 10);
        std::thread::sleep(Duration::from_millis(10));
        pwm.stop();
        assert!(!driver.writes.lock().unwrap().contains(&Level::High));
    }
}
