//! Error types for pinwire-core
//!
//! Only *setup-time* conditions surface as errors; steady-state pin
//! operations follow the wiringPi contract of silent sentinel returns.

use crate::types::BoardModel;
use thiserror::Error;

/// Setup-time errors. The CLI treats every variant as fatal; library users
/// may recover (e.g. retry with a different board).
#[derive(Debug, Error)]
pub enum Error {
    /// Extension node pin base below the reserved on-board range.
    #[error("extension pin base {pin_base} is below the minimum of {min} (0..{} is reserved for on-board pins)", min - 1)]
    PinBaseTooLow {
        /// Requested pin base
        pin_base: u32,
        /// Lowest allowed pin base
        min: u32,
    },

    /// Extension node pin range collides with an already registered node.
    #[error("pin range {new_base}..={new_max} overlaps existing node {old_base}..={old_max}")]
    NodeOverlap {
        /// Base of the new node
        new_base: u32,
        /// Last pin of the new node
        new_max: u32,
        /// Base of the already registered node
        old_base: u32,
        /// Last pin of the already registered node
        old_max: u32,
    },

    /// Extension node with zero pins.
    #[error("extension node at pin base {pin_base} must own at least one pin")]
    EmptyNode {
        /// Requested pin base
        pin_base: u32,
    },

    /// Board model could not be determined from the device tree.
    #[error("unable to detect a supported board (is this a Khadas VIM/Edge?)")]
    UnknownBoard,

    /// The detected/requested board has no backend compiled in.
    #[error("board {0} is not supported by this build")]
    UnsupportedBoard(BoardModel),

    /// A board backend failed to come up (mmap, /dev/mem access, ...).
    #[error("board backend setup failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result alias for setup paths.
pub type Result<T> = std::result::Result<T, Error>;
