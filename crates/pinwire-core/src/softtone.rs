//! Software tone generation
//!
//! Square wave bit-banged from a dedicated thread. Frequencies are clamped
//! to 5kHz; above that the scheduler noise dominates the period and the
//! output is junk anyway. A frequency of zero silences the pin while keeping
//! the worker alive.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::driver::PinDriver;
use crate::types::Level;

/// Highest frequency the bit-banged wave can approximate.
pub const MAX_FREQUENCY: u32 = 5_000;

/// A running software tone worker for one native pin.
pub struct SoftTone {
    freq: Arc<AtomicU32>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SoftTone {
    /// Configure the pin as an output and start the worker, silent.
    pub fn start(driver: Arc<dyn PinDriver>, gpio: u32) -> Self {
        let freq = Arc::new(AtomicU32::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        driver.digital_write(gpio, Level::Low);
        driver.set_direction(gpio, true);

        let handle = {
            let freq = Arc::clone(&freq);
            let stop = Arc::clone(&stop);
            std::thread::Builder::new()
                .name(format!("softtone-{gpio}"))
                .spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        let freq = freq.load(Ordering::Relaxed);
                        if freq == 0 {
                            std::thread::sleep(Duration::from_millis(1));
                            continue;
                        }
                        let half = Duration::from_micros(500_000 / u64::from(freq));
                        driver.digital_write(gpio, Level::High);
                        std::thread::sleep(half);
                        driver.digital_write(gpio, Level::Low);
                        std::thread::sleep(half);
                    }
                    driver.digital_write(gpio, Level::Low);
                })
                .unwrap_or_else(|e| panic!("failed to spawn softtone thread: {e}"))
        };

        SoftTone {
            freq,
            stop,
            handle: Some(handle),
        }
    }

    /// Set the frequency in Hz; clamped to [`MAX_FREQUENCY`], 0 silences.
    pub fn set_frequency(&self, freq: u32) {
        self.freq.store(freq.min(MAX_FREQUENCY), Ordering::Relaxed);
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

impl Drop for SoftTone {
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
            Level::Low
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
    fn frequency_is_clamped() {
        let driver = Arc::new(RecordingDriver::default());
        let tone = SoftTone::start(Arc::clone(&driver) as Arc<dyn PinDriver>, 2);
        tone.set_frequency(1_000_000);
        assert_eq!(tone.freq.load(Ordering::Relaxed), MAX_FREQUENCY);
        tone.stop();
    }

    #[test]
    fn silent_worker_does_not_toggle() {
        let driver = Arc::new(RecordingDriver::default());
        let tone = SoftTone::start(Arc::clone(&driver) as Arc<dyn PinDriver>, 2);
        std::thread::sleep(Duration::from_millis(10));
        tone.stop();
        assert!(!driver.writes.lock().unwrap().contains(&Level::High));
    }

    #[test]
    fn audible_tone_toggles_and_stops_low() {
        let driver = Arc::new(RecordingDriver::default());
        let tone = SoftTone::start(Arc::clone(&driver) as Arc<dyn PinDriver>, 2);
        tone.set_frequency(1_000);
        std::thread::sleep(Duration::from_millis(10));
        tone.stop();
        let writes = driver.writes.lock().unwrap();
        assert!(writes.contains(&Level::High));
        assert_eq!(writes.last(), Some(&Level::Low));
    }
}
