//! Board detection
//!
//! Identifies the board from the device-tree model string the kernel
//! exposes at `/proc/device-tree/model`. The file is NUL-terminated and the
//! vendor strings vary in casing across firmware releases, so matching is
//! case-insensitive substring search. Variants (VIM3L, Edge-V, Edge with
//! Captain carrier) map onto their base model.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::BoardModel;

const MODEL_PATH: &str = "proc/device-tree/model";

/// Detect the board model from the running kernel's device tree.
pub fn detect_board() -> Result<BoardModel> {
    detect_board_at(Path::new("/"))
}

/// Detection against an alternate filesystem root (tests point this at a
/// temp directory).
pub fn detect_board_at(root: &Path) -> Result<BoardModel> {
    let raw = std::fs::read(root.join(MODEL_PATH)).map_err(|e| {
        log::debug!("cannot read device-tree model: {e}");
        Error::UnknownBoard
    })?;
    let model = String::from_utf8_lossy(&raw);
    let model = model.trim_end_matches('\0').trim();
    log::debug!("device-tree model: {model:?}");
    parse_model(model).ok_or(Error::UnknownBoard)
}

/// Map a device-tree model string onto a supported board, `None` when the
/// string names no board we drive.
pub fn parse_model(model: &str) -> Option<BoardModel> {
    let lower = model.to_ascii_lowercase();
    if !lower.contains("khadas") {
        return None;
    }
    // VIM3 before VIM so the bare substring does not shadow it.
    if lower.contains("vim3") {
        Some(BoardModel::Vim3)
    } else if lower.contains("vim2") {
        Some(BoardModel::Vim2)
    } else if lower.contains("vim") {
        Some(BoardModel::Vim1)
    } else if lower.contains("edge") || lower.contains("captain") {
        Some(BoardModel::Edge)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_strings() {
        assert_eq!(parse_model("Khadas VIM"), Some(BoardModel::Vim1));
        assert_eq!(parse_model("Khadas VIM2"), Some(BoardModel::Vim2));
        assert_eq!(parse_model("Khadas VIM3"), Some(BoardModel::Vim3));
        assert_eq!(parse_model("Khadas VIM3L"), Some(BoardModel::Vim3));
        assert_eq!(parse_model("Khadas Edge"), Some(BoardModel::Edge));
        assert_eq!(parse_model("Khadas Edge-V"), Some(BoardModel::Edge));
        assert_eq!(parse_model("Khadas Edge Captain"), Some(BoardModel::Edge));
    }

    #[test]
    fn foreign_models_are_rejected() {
        assert_eq!(parse_model("Raspberry Pi 4 Model B"), None);
        assert_eq!(parse_model("NVIDIA Jetson Nano"), None);
        assert_eq!(parse_model(""), None);
    }

    #[test]
    fn detect_reads_nul_terminated_model() {
        let dir = std::env::temp_dir().join(format!(
            "pinwire-detect-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::create_dir_all(dir.join("proc/device-tree")).unwrap();
        std::fs::write(dir.join(MODEL_PATH), b"Khadas VIM3\0").unwrap();

        assert_eq!(detect_board_at(&dir).unwrap(), BoardModel::Vim3);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_model_file_is_unknown_board() {
        let dir = std::env::temp_dir().join("pinwire-detect-missing");
        assert!(matches!(detect_board_at(&dir), Err(Error::UnknownBoard)));
    }
}
