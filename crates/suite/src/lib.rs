//! Production scenario tables for FMComms5 and DAQ2.
//!
//! Each board module lists its scenario groups: a test name, the parameter
//! matrix it runs over and a thin body that binds the case and calls the
//! matching generic test function. The tables are data; the harness decides
//! what runs, what is skipped and how results are reported.

#![deny(clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod boards;

use sdr_hil_devices::Board;
use sdr_hil_errors::ValidationError;
use sdr_hil_harness::{Scenario, ScenarioGroup, expand_all};

/// Every scenario group, boards in [`Board::ALL`] order.
pub fn all_groups() -> Vec<ScenarioGroup> {
    Board::ALL.into_iter().flat_map(boards::groups).collect()
}

/// Every scenario.
pub fn all_scenarios() -> Result<Vec<Scenario>, ValidationError> {
    expand_all(&all_groups())
}

/// Scenarios for one board.
pub fn board_scenarios(board: Board) -> Result<Vec<Scenario>, ValidationError> {
    expand_all(&boards::groups(board))
}
