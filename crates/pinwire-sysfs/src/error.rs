//! Error types for the sysfs GPIO layer

use std::io;

use thiserror::Error;

/// Failures talking to `/sys/class/gpio`.
#[derive(Debug, Error)]
pub enum SysfsError {
    /// Writing or opening one of a pin's sysfs attributes failed.
    #[error("gpio{gpio}: {op} failed (check permissions on /sys/class/gpio): {source}")]
    Attr {
        /// Kernel sysfs GPIO number
        gpio: u32,
        /// The attribute operation that failed
        op: &'static str,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The pin's directory never appeared after writing to `export`.
    #[error("gpio{gpio} did not appear in sysfs after export")]
    ExportTimeout {
        /// Kernel sysfs GPIO number
        gpio: u32,
    },

    /// The pin number does not fit the shared descriptor table.
    #[error("gpio{gpio} is beyond the descriptor table and cannot be cached")]
    PinOutOfRange {
        /// Kernel sysfs GPIO number
        gpio: u32,
    },

    /// The interrupt poll loop could not be set up.
    #[error("gpio{gpio}: interrupt setup failed: {source}")]
    Interrupt {
        /// Kernel sysfs GPIO number
        gpio: u32,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, SysfsError>;
