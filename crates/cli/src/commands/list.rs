//! Scenario listing

use anyhow::Result;
use clap::Args;
use sdr_hil_devices::Board;
use sdr_hil_harness::Scenario;

use crate::error::CliError;
use crate::output;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list scenarios for this board (fmcomms5, daq2)
    #[arg(short, long)]
    pub board: Option<Board>,

    /// Only list scenarios whose id contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Scenarios selected by `board` and `filter`, in table order.
pub fn select(board: Option<Board>, filter: Option<&str>) -> Result<Vec<Scenario>, CliError> {
    let scenarios = match board {
        Some(board) => sdr_hil_suite::board_scenarios(board)?,
        None => sdr_hil_suite::all_scenarios()?,
    };
    Ok(match filter {
        Some(pattern) => scenarios
            .into_iter()
            .filter(|s| s.id().contains(pattern))
            .collect(),
        None => scenarios,
    })
}

pub fn execute(args: &ListArgs, json: bool) -> Result<()> {
    let scenarios = select(args.board, args.filter.as_deref())?;
    output::print_scenarios(&scenarios, json);
    Ok(())
}
