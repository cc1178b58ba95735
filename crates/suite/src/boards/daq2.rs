//! DAQ2 production scenarios.

use sdr_hil_devices::Board;
use sdr_hil_errors::HilResult;
use sdr_hil_harness::{Case, Matrix, ScenarioGroup, Session};
use serde_json::json;

const BOARD: Board = Board::Daq2;

/// Minimum DDS loopback peak (dBFS).
pub const PEAK_MIN: i64 = -45;

fn tx_data(session: &Session<'_>, case: &Case) -> HilResult<()> {
    session.fixtures().dma_tx(session.target(), &case.bind()?)
}

fn rx_data(session: &Session<'_>, case: &Case) -> HilResult<()> {
    session.fixtures().dma_rx(session.target(), &case.bind()?)
}

fn dds_loopback(session: &Session<'_>, case: &Case) -> HilResult<()> {
    session.fixtures().dds_loopback(session.target(), &case.bind()?)
}

fn cw_loopback(session: &Session<'_>, case: &Case) -> HilResult<()> {
    session.fixtures().cw_loopback(session.target(), &case.bind()?)
}

/// Every DAQ2 scenario group, in table order.
pub fn groups() -> Vec<ScenarioGroup> {
    let channels = || Matrix::new().param("channel", [json!(0), json!(1), json!([0, 1])]);
    vec![
        ScenarioGroup::new("test_daq2_tx_data", BOARD, channels(), tx_data),
        ScenarioGroup::new("test_daq2_rx_data", BOARD, channels(), rx_data),
        ScenarioGroup::new(
            "test_daq2_dds_loopback",
            BOARD,
            Matrix::new()
                .param("channel", [0])
                .param("param_set", [json!({})])
                .params(
                    &["frequency", "scale"],
                    [
                        row!(5_000_000, 0.12),
                        row!(10_000_000, 0.06),
                        row!(10_000_000, 0.12),
                        row!(15_000_000, 0.12),
                        row!(15_000_000, 0.5),
                        row!(200_000_000, 0.5),
                    ],
                )
                .param("peak_min", [PEAK_MIN]),
            dds_loopback,
        ),
        ScenarioGroup::new(
            "test_daq2_cw_loopback",
            BOARD,
            Matrix::new()
                .param("channel", [0, 1])
                .param("param_set", [json!({})]),
            cw_loopback,
        ),
    ]
}
