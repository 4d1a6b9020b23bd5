//! Process-wide setup
//!
//! Mirrors the classic `wiringPiSetup*` family: the first call builds the
//! global [`Gpio`] with the chosen numbering mode; later calls return the
//! same instance and never re-run board detection or re-open descriptors,
//! regardless of the mode they ask for.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::driver::PinDriver;
use crate::error::Result;
use crate::gpio::Gpio;
use crate::types::NumberingMode;

static GPIO: OnceCell<Gpio> = OnceCell::new();

/// Initialize the global [`Gpio`] with a backend produced by `factory`, or
/// return the already initialized instance (in which case `factory` is not
/// called and `mode` is ignored).
pub fn setup_with<F>(mode: NumberingMode, factory: F) -> Result<&'static Gpio>
where
    F: FnOnce() -> Result<Arc<dyn PinDriver>>,
{
    GPIO.get_or_try_init(|| {
        let driver = factory()?;
        log::info!(
            "pinwire setup: board {} in {:?} numbering",
            driver.model(),
            mode
        );
        Ok(Gpio::new(driver, mode))
    })
}

/// The global [`Gpio`] if setup has run.
pub fn try_gpio() -> Option<&'static Gpio> {
    GPIO.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoardModel, Level, Pull};

    struct NullDriver;

    impl PinDriver for NullDriver {
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
        fn digital_write(&self, _gpio: u32, _level: Level) {}
        fn pull_control(&self, _gpio: u32, _pull: Pull) {}
        fn get_alt(&self, _gpio: u32) -> i32 {
            -1
        }
    }

    #[test]
    fn second_setup_returns_same_instance_without_factory_call() {
        let first = setup_with(NumberingMode::Logical, || {
            Ok(Arc::new(NullDriver) as Arc<dyn PinDriver>)
        })
        .unwrap();

        let second = setup_with(NumberingMode::Native, || {
            panic!("factory must not run on second setup")
        })
        .unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(second.numbering(), NumberingMode::Logical);
        assert!(try_gpio().is_some());
    }
}
