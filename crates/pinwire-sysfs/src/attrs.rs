//! Sysfs GPIO attribute access
//!
//! Thin wrapper over `/sys/class/gpio`: export/unexport, direction and edge
//! attributes, and opening a pin's `value` file. The class root is a
//! parameter so tests can point it at a scratch directory.
//!
//! Pin numbers here are the *kernel's* sysfs numbers; the board driver's
//! `sysfs_number` translates from native numbering first.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use pinwire_core::types::Edge;
use pinwire_core::SysfsTable;

use crate::error::{Result, SysfsError};

const DEFAULT_ROOT: &str = "/sys/class/gpio";

/// How long to wait for udev to fix up permissions on a fresh export.
const EXPORT_SETTLE: Duration = Duration::from_millis(1000);

/// Handle on a sysfs GPIO class directory.
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    root: PathBuf,
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsGpio {
    /// Handle on the real `/sys/class/gpio`.
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT)
    }

    /// Handle on an alternate class root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        SysfsGpio { root: root.into() }
    }

    fn pin_dir(&self, gpio: u32) -> PathBuf {
        self.root.join(format!("gpio{gpio}"))
    }

    fn attr_path(&self, gpio: u32, attr: &str) -> PathBuf {
        self.pin_dir(gpio).join(attr)
    }

    /// Whether the pin's directory exists (i.e. it is exported).
    pub fn is_exported(&self, gpio: u32) -> bool {
        self.pin_dir(gpio).is_dir()
    }

    fn write_class_file(&self, name: &'static str, gpio: u32) -> Result<()> {
        let path = self.root.join(name);
        write_string(&path, &gpio.to_string()).map_err(|source| SysfsError::Attr {
            gpio,
            op: name,
            source,
        })
    }

    /// Export the pin. Already exported pins are left alone, so setup is
    /// idempotent. Waits briefly for the pin directory to appear.
    pub fn export(&self, gpio: u32) -> Result<()> {
        if self.is_exported(gpio) {
            return Ok(());
        }
        self.write_class_file("export", gpio)?;

        let deadline = Instant::now() + EXPORT_SETTLE;
        while !self.is_exported(gpio) {
            if Instant::now() >= deadline {
                return Err(SysfsError::ExportTimeout { gpio });
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    }

    /// Return the pin to the kernel. Errors are reported but harmless to
    /// ignore on teardown.
    pub fn unexport(&self, gpio: u32) -> Result<()> {
        self.write_class_file("unexport", gpio)
    }

    /// Write the `direction` attribute.
    pub fn set_direction(&self, gpio: u32, output: bool) -> Result<()> {
        let value = if output { "out" } else { "in" };
        write_string(&self.attr_path(gpio, "direction"), value).map_err(|source| {
            SysfsError::Attr {
                gpio,
                op: "direction",
                source,
            }
        })
    }

    /// Write the `edge` attribute. [`Edge::Setup`] leaves the attribute as
    /// someone else configured it.
    pub fn set_edge(&self, gpio: u32, edge: Edge) -> Result<()> {
        let Some(attr) = edge.attr() else {
            return Ok(());
        };
        write_string(&self.attr_path(gpio, "edge"), attr).map_err(|source| SysfsError::Attr {
            gpio,
            op: "edge",
            source,
        })
    }

    /// Write `none` to the `edge` attribute, disabling edge notifications.
    pub fn clear_edge(&self, gpio: u32) -> Result<()> {
        write_string(&self.attr_path(gpio, "edge"), "none").map_err(|source| SysfsError::Attr {
            gpio,
            op: "edge",
            source,
        })
    }

    /// Open the pin's `value` file read/write.
    pub fn open_value(&self, gpio: u32) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.attr_path(gpio, "value"))
            .map_err(|source| SysfsError::Attr {
                gpio,
                op: "open value",
                source,
            })
    }

    /// Exported pin numbers currently visible under the class root.
    pub fn exported_pins(&self) -> Vec<u32> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut pins: Vec<u32> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                e.file_name()
                    .to_str()?
                    .strip_prefix("gpio")?
                    .parse::<u32>()
                    .ok()
            })
            .collect();
        pins.sort_unstable();
        pins
    }

    /// Open the `value` descriptor of every exported pin into `table`: the
    /// classic "setup sys" pass, run once when sysfs numbering is selected.
    /// Slots that are already cached are left alone, so a second setup never
    /// re-opens a descriptor. Returns the number of freshly opened pins;
    /// pins whose `value` file cannot be opened are skipped.
    pub fn open_exported_values(&self, table: &SysfsTable) -> usize {
        let mut opened = 0;
        for gpio in self.exported_pins() {
            if table.is_open(gpio) {
                continue;
            }
            match self.open_value(gpio) {
                Ok(file) => {
                    if table.insert(gpio, file).is_some() {
                        opened += 1;
                    }
                }
                Err(e) => log::debug!("gpio{gpio}: not cached for sysfs numbering: {e}"),
            }
        }
        opened
    }

    /// Read a pin attribute as a trimmed string (for diagnostics listings).
    pub fn read_attr(&self, gpio: u32, attr: &str) -> Option<String> {
        std::fs::read_to_string(self.attr_path(gpio, attr))
            .ok()
            .map(|s| s.trim().to_string())
    }
}

fn write_string(path: &Path, value: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).open(path)?;
    file.write_all(value.as_bytes())
}
