//! Extension node registry
//!
//! Lets a driver for an off-chip peripheral (I2C/SPI expander, ADC, shift
//! register) claim a disjoint range of virtual pin numbers and supply its
//! own operations, transparently interposed ahead of the board backend.
//!
//! Every operation has a safe no-op default body, so a chip driver only
//! implements the capabilities its hardware actually has; anything else
//! degrades to a harmless no-op instead of crashing.
//!
//! Nodes are registered during single-threaded setup and live for the rest
//! of the process. The registry keeps them sorted by pin base and finds the
//! owner of a pin by binary search, which the disjointness invariant makes
//! unambiguous.

use crate::error::{Error, Result};
use crate::types::{Level, PinMode, Pull};

/// Lowest pin base an extension node may claim; 0..63 is reserved for
/// on-board pins.
pub const EXTENSION_PIN_BASE: u32 = 64;

/// Operations of one extension node. Pin arguments are the *absolute*
/// virtual pin numbers; implementations subtract their own
/// [`pin_base`](PinNode::pin_base) to get a chip-local index.
pub trait PinNode: Send {
    /// First virtual pin this node owns. Must be at least
    /// [`EXTENSION_PIN_BASE`] and stable for the node's lifetime.
    fn pin_base(&self) -> u32;

    /// Number of pins this node owns (at least 1).
    fn num_pins(&self) -> u32;

    /// Configure a pin. Default: no-op.
    fn pin_mode(&mut self, _pin: u32, _mode: PinMode) {}

    /// Configure a pull resistor. Default: no-op.
    fn pull_control(&mut self, _pin: u32, _pull: Pull) {}

    /// Read a pin. Default: `Low`.
    fn digital_read(&mut self, _pin: u32) -> Level {
        Level::Low
    }

    /// Drive a pin. Default: no-op.
    fn digital_write(&mut self, _pin: u32, _level: Level) {}

    /// Read an analog channel. Default: 0.
    fn analog_read(&mut self, _pin: u32) -> i32 {
        0
    }

    /// Write an analog value. Default: no-op.
    fn analog_write(&mut self, _pin: u32, _value: i32) {}

    /// Write a PWM value. Default: no-op.
    fn pwm_write(&mut self, _pin: u32, _value: i32) {}
}

struct Entry {
    pin_base: u32,
    pin_max: u32,
    node: Box<dyn PinNode>,
}

/// Ordered collection of registered extension nodes with disjoint ranges.
#[derive(Default)]
pub struct NodeRegistry {
    entries: Vec<Entry>,
}

impl NodeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        NodeRegistry { entries: Vec::new() }
    }

    /// Register a node, enforcing the pin-base floor and range
    /// disjointness. On success the registry owns the node for the rest of
    /// the process.
    pub fn insert(&mut self, node: Box<dyn PinNode>) -> Result<()> {
        let pin_base = node.pin_base();
        let num_pins = node.num_pins();

        if pin_base < EXTENSION_PIN_BASE {
            return Err(Error::PinBaseTooLow {
                pin_base,
                min: EXTENSION_PIN_BASE,
            });
        }
        if num_pins == 0 {
            return Err(Error::EmptyNode { pin_base });
        }
        let pin_max = pin_base + num_pins - 1;

        // Ranges are kept sorted by base; only the neighbours can collide.
        let idx = self
            .entries
            .partition_point(|e| e.pin_base < pin_base);
        if let Some(prev) = idx.checked_sub(1).and_then(|i| self.entries.get(i)) {
            if prev.pin_max >= pin_base {
                return Err(Error::NodeOverlap {
                    new_base: pin_base,
                    new_max: pin_max,
                    old_base: prev.pin_base,
                    old_max: prev.pin_max,
                });
            }
        }
        if let Some(next) = self.entries.get(idx) {
            if next.pin_base <= pin_max {
                return Err(Error::NodeOverlap {
                    new_base: pin_base,
                    new_max: pin_max,
                    old_base: next.pin_base,
                    old_max: next.pin_max,
                });
            }
        }

        log::debug!("registered extension node at pins {pin_base}..={pin_max}");
        self.entries.insert(
            idx,
            Entry {
                pin_base,
                pin_max,
                node,
            },
        );
        Ok(())
    }

    /// The node owning `pin`, if any.
    pub fn find(&mut self, pin: u32) -> Option<&mut dyn PinNode> {
        let idx = self.entries.partition_point(|e| e.pin_base <= pin);
        let entry = self.entries.get_mut(idx.checked_sub(1)?)?;
        if pin <= entry.pin_max {
            Some(entry.node.as_mut())
        } else {
            None
        }
    }

    /// Whether any node owns `pin`.
    pub fn owns(&self, pin: u32) -> bool {
        let idx = self.entries.partition_point(|e| e.pin_base <= pin);
        idx.checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .is_some_and(|e| pin <= e.pin_max)
    }

    /// Registered ranges, sorted by base (for diagnostics/readall).
    pub fn ranges(&self) -> Vec<(u32, u32)> {
        self.entries.iter().map(|e| (e.pin_base, e.pin_max)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestNode {
        base: u32,
        pins: u32,
        last_write: Option<(u32, Level)>,
    }

    impl TestNode {
        fn boxed(base: u32, pins: u32) -> Box<dyn PinNode> {
            Box::new(TestNode {
                base,
                pins,
                last_write: None,
            })
        }
    }

    impl PinNode for TestNode {
        fn pin_base(&self) -> u32 {
            self.base
        }
        fn num_pins(&self) -> u32 {
            self.pins
        }
        fn digital_write(&mut self, pin: u32, level: Level) {
            self.last_write = Some((pin - self.base, level));
        }
        fn digital_read(&mut self, pin: u32) -> Level {
            match self.last_write {
                Some((local, level)) if local == pin - self.base => level,
                _ => Level::Low,
            }
        }
    }

    #[test]
    fn pin_base_below_floor_is_rejected() {
        let mut reg = NodeRegistry::new();
        for pins in [1, 8, 64] {
            let err = reg.insert(TestNode::boxed(63, pins)).unwrap_err();
            assert!(matches!(err, Error::PinBaseTooLow { pin_base: 63, .. }));
        }
        assert!(reg.insert(TestNode::boxed(64, 8)).is_ok());
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let mut reg = NodeRegistry::new();
        reg.insert(TestNode::boxed(100, 16)).unwrap();

        // Tail overlap, head overlap, full containment.
        assert!(reg.insert(TestNode::boxed(110, 8)).is_err());
        assert!(reg.insert(TestNode::boxed(95, 6)).is_err());
        assert!(reg.insert(TestNode::boxed(100, 16)).is_err());

        // Adjacent ranges are fine.
        assert!(reg.insert(TestNode::boxed(116, 4)).is_ok());
        assert!(reg.insert(TestNode::boxed(96, 4)).is_ok());
    }

    #[test]
    fn find_routes_whole_range_to_owner() {
        let mut reg = NodeRegistry::new();
        reg.insert(TestNode::boxed(64, 8)).unwrap();
        reg.insert(TestNode::boxed(200, 4)).unwrap();

        for pin in 64..72 {
            assert!(reg.find(pin).is_some(), "pin {pin} should be owned");
        }
        assert!(reg.find(72).is_none());
        assert!(reg.find(63).is_none());
        assert!(reg.find(199).is_none());
        assert!(reg.find(203).is_some());
        assert!(reg.find(204).is_none());
    }

    #[test]
    fn node_sees_absolute_pin_and_subtracts_base() {
        let mut reg = NodeRegistry::new();
        reg.insert(TestNode::boxed(100, 8)).unwrap();

        let node = reg.find(105).unwrap();
        node.digital_write(105, Level::High);
        assert_eq!(node.digital_read(105), Level::High);
        assert_eq!(reg.find(104).unwrap().digital_read(104), Level::Low);
    }

    #[test]
    fn unimplemented_ops_are_safe_stubs() {
        let mut reg = NodeRegistry::new();
        reg.insert(TestNode::boxed(300, 2)).unwrap();
        let node = reg.find(300).unwrap();
        node.pin_mode(300, PinMode::Output);
        node.pull_control(300, Pull::Up);
        node.pwm_write(300, 512);
        assert_eq!(node.analog_read(300), 0);
    }
}
