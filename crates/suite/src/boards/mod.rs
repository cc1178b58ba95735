//! Per-board scenario tables.

use sdr_hil_devices::Board;
use sdr_hil_harness::ScenarioGroup;

/// One zipped parameter row; each element goes through `json!`.
macro_rules! row {
    ($($value:tt)*) => {
        ::serde_json::json!([$($value)*])
            .as_array()
            .cloned()
            .unwrap_or_default()
    };
}

pub mod daq2;
pub mod fmcomms5;

/// Scenario groups for `board`.
pub fn groups(board: Board) -> Vec<ScenarioGroup> {
    match board {
        Board::Fmcomms5 => fmcomms5::groups(),
        Board::Daq2 => daq2::groups(),
    }
}
