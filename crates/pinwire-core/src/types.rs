//! Shared pin-level types
//!
//! These mirror the classic wiringPi constant blocks (pin modes, pull
//! states, interrupt edges, numbering schemes) as plain enums.

use core::fmt;

/// Logic level of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Logic low (0)
    Low,
    /// Logic high (1)
    High,
}

impl Level {
    /// Level for a raw register/ASCII bit, `0` is low and anything else high.
    pub fn from_bit(bit: u32) -> Self {
        if bit == 0 {
            Level::Low
        } else {
            Level::High
        }
    }

    /// `0` for low, `1` for high.
    pub fn as_bit(self) -> u32 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }

    /// The opposite level.
    pub fn toggled(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "0"),
            Level::High => write!(f, "1"),
        }
    }
}

/// Requested function of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// High-impedance input
    Input,
    /// Push-pull output
    Output,
    /// Software-emulated PWM on a dedicated thread
    SoftPwm,
    /// Software-emulated tone (square wave) on a dedicated thread
    SoftTone,
}

/// Pull resistor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    /// No pull resistor
    Off,
    /// Pull towards ground
    Down,
    /// Pull towards the supply rail
    Up,
}

impl Pull {
    /// The wiringPi integer encoding (0 = off, 1 = down, 2 = up), shared by
    /// `get_pull` introspection across boards.
    pub fn code(self) -> i32 {
        match self {
            Pull::Off => 0,
            Pull::Down => 1,
            Pull::Up => 2,
        }
    }
}

/// Kernel edge-trigger configuration for an interrupt pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// The edge attribute is already configured by someone else; skip setup.
    Setup,
    /// Trigger on falling edges
    Falling,
    /// Trigger on rising edges
    Rising,
    /// Trigger on both edges
    Both,
}

impl Edge {
    /// The string written to `/sys/class/gpio/gpioN/edge`, or `None` for
    /// [`Edge::Setup`] which leaves the attribute alone.
    pub fn attr(self) -> Option<&'static str> {
        match self {
            Edge::Setup => None,
            Edge::Falling => Some("falling"),
            Edge::Rising => Some("rising"),
            Edge::Both => Some("both"),
        }
    }
}

/// The pin numbering scheme a [`Gpio`](crate::Gpio) instance resolves
/// abstract pin numbers through. Chosen once at setup, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingMode {
    /// wiringPi logical numbering (0..63, board-specific table)
    Logical,
    /// Native SoC GPIO numbering, passed through unchanged
    Native,
    /// Physical header (silkscreen) numbering
    Physical,
    /// sysfs GPIO numbering; only pins with an open value descriptor resolve
    Sysfs,
}

/// Detected board model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardModel {
    /// Khadas VIM1 (Amlogic S905X)
    Vim1,
    /// Khadas VIM2 (Amlogic S912)
    Vim2,
    /// Khadas VIM3 (Amlogic A311D)
    Vim3,
    /// Khadas Edge (Rockchip RK3399)
    Edge,
    /// In-memory board emulator
    Dummy,
}

impl BoardModel {
    /// Canonical lowercase name, as accepted by `--board`.
    pub fn name(self) -> &'static str {
        match self {
            BoardModel::Vim1 => "vim1",
            BoardModel::Vim2 => "vim2",
            BoardModel::Vim3 => "vim3",
            BoardModel::Edge => "edge",
            BoardModel::Dummy => "dummy",
        }
    }
}

impl fmt::Display for BoardModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bit_round_trip() {
        assert_eq!(Level::from_bit(0), Level::Low);
        assert_eq!(Level::from_bit(1), Level::High);
        assert_eq!(Level::High.as_bit(), 1);
        assert_eq!(Level::High.toggled(), Level::Low);
    }

    #[test]
    fn edge_attr_strings() {
        assert_eq!(Edge::Rising.attr(), Some("rising"));
        assert_eq!(Edge::Falling.attr(), Some("falling"));
        assert_eq!(Edge::Both.attr(), Some("both"));
        assert_eq!(Edge::Setup.attr(), None);
    }

    #[test]
    fn pull_codes_match_wiringpi() {
        assert_eq!(Pull::Off.code(), 0);
        assert_eq!(Pull::Down.code(), 1);
        assert_eq!(Pull::Up.code(), 2);
    }
}
