//! Sysfs GPIO layer: attribute control plus edge-triggered interrupts
//!
//! Two pieces. [`SysfsGpio`] wraps the `/sys/class/gpio` attribute files
//! (export, direction, edge, value). [`IsrRegistry`] runs one watcher
//! thread per interrupt pin, dispatching user callbacks on kernel edge
//! notifications and sharing its `value` descriptors with the dispatch
//! layer through the process-wide [`SysfsTable`](pinwire_core::SysfsTable).

pub mod attrs;
pub mod error;
pub mod isr;

pub use attrs::SysfsGpio;
pub use error::{Result, SysfsError};
pub use isr::IsrRegistry;
