//! Board selection and backend construction
//!
//! Feature-gated registry of the board backends compiled into this build,
//! plus the glue between `--board`, device-tree detection and the backend
//! constructors.

use std::sync::Arc;

use pinwire_core::types::BoardModel;
use pinwire_core::{detect, Error, PinDriver, Result};

/// A board backend this build can drive.
pub struct BoardInfo {
    /// Name accepted by `--board`
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Boards enabled at compile time.
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_boards() -> Vec<BoardInfo> {
    let mut boards = Vec::new();

    #[cfg(feature = "vim1")]
    boards.push(BoardInfo {
        name: "vim1",
        description: "Khadas VIM1 (Amlogic S905X)",
    });

    #[cfg(feature = "vim2")]
    boards.push(BoardInfo {
        name: "vim2",
        description: "Khadas VIM2 (Amlogic S912)",
    });

    #[cfg(feature = "vim3")]
    boards.push(BoardInfo {
        name: "vim3",
        description: "Khadas VIM3 (Amlogic A311D)",
    });

    #[cfg(feature = "edge")]
    boards.push(BoardInfo {
        name: "edge",
        description: "Khadas Edge / Edge-V / Captain (Rockchip RK3399)",
    });

    #[cfg(feature = "dummy")]
    boards.push(BoardInfo {
        name: "dummy",
        description: "In-memory board emulator (no hardware access)",
    });

    boards
}

/// Parse a `--board` argument.
pub fn parse_board(name: &str) -> Option<BoardModel> {
    match name.to_ascii_lowercase().as_str() {
        "vim1" | "vim" => Some(BoardModel::Vim1),
        "vim2" => Some(BoardModel::Vim2),
        "vim3" | "vim3l" => Some(BoardModel::Vim3),
        "edge" | "edge-v" | "captain" => Some(BoardModel::Edge),
        "dummy" => Some(BoardModel::Dummy),
        _ => None,
    }
}

/// The board to drive: the `--board` override if given, otherwise whatever
/// the device tree says this machine is.
pub fn select_board(requested: Option<&str>) -> Result<BoardModel> {
    match requested {
        Some(name) => parse_board(name).ok_or(Error::UnknownBoard),
        None => detect::detect_board(),
    }
}

/// Construct the backend for `model`, or fail if it was compiled out.
#[allow(unreachable_patterns)]
pub fn open_driver(model: BoardModel) -> Result<Arc<dyn PinDriver>> {
    match model {
        #[cfg(feature = "vim1")]
        BoardModel::Vim1 => pinwire_amlogic::driver_for(model),

        #[cfg(feature = "vim2")]
        BoardModel::Vim2 => pinwire_amlogic::driver_for(model),

        #[cfg(feature = "vim3")]
        BoardModel::Vim3 => pinwire_amlogic::driver_for(model),

        #[cfg(feature = "edge")]
        BoardModel::Edge => pinwire_rockchip::driver(),

        #[cfg(feature = "dummy")]
        BoardModel::Dummy => Ok(pinwire_dummy::driver()),

        _ => Err(Error::UnsupportedBoard(model)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_names_round_trip() {
        for info in available_boards() {
            let model = parse_board(info.name).unwrap();
            assert_eq!(model.name(), info.name);
        }
    }

    #[test]
    fn aliases_map_to_models() {
        assert_eq!(parse_board("VIM3L"), Some(BoardModel::Vim3));
        assert_eq!(parse_board("captain"), Some(BoardModel::Edge));
        assert_eq!(parse_board("rpi4"), None);
    }

    #[test]
    fn explicit_board_overrides_detection() {
        assert_eq!(select_board(Some("dummy")).unwrap(), BoardModel::Dummy);
        assert!(matches!(
            select_board(Some("rpi4")),
            Err(Error::UnknownBoard)
        ));
    }
}
