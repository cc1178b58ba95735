//! FMComms5 production scenarios.

use sdr_hil_devices::fmcomms5::AD7291;
use sdr_hil_devices::{AttrValue, Board, Chip, Role, parse_reading};
use sdr_hil_errors::prelude::*;
use sdr_hil_harness::{Case, Matrix, ScenarioGroup, Session};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

const BOARD: Board = Board::Fmcomms5;

/// Housekeeping channel, as `in_<id>`, with its raw bounds.
pub const AD7291_BOUNDS: &[(&str, i64, i64)] = &[
    ("in_temp0", 80, 160),
    ("in_voltage0", 1578, 2087),
    ("in_voltage1", 2893, 3826),
    ("in_voltage2", 2893, 3826),
    ("in_voltage3", 3459, 4005),
    ("in_voltage4", 1140, 1507),
    ("in_voltage5", 1140, 1507),
    ("in_voltage6", 1140, 1507),
    ("in_voltage7", 1140, 1507),
];

/// LO used by the phase synchronisation scenario.
pub const PHASE_SYNC_LO: i64 = 2_400_000_000;

/// Boot image holding the master DCXO calibration.
pub const DCXO_MASTERFILE: &str = "/boot/fmcomms5_eeprom/fmcomms5.bin";

/// FRU EEPROM of the board.
pub const DCXO_EEPROM: &str = "/sys/devices/soc0/fpga-axi@0/41600000.i2c/i2c-0/i2c-6/6-0050/eeprom";

#[derive(Debug, Deserialize)]
struct HousekeepingRow {
    voltage_raw: String,
    low: f64,
    high: f64,
}

fn ad7291(session: &Session<'_>, case: &Case) -> HilResult<()> {
    let row: HousekeepingRow = case.bind()?;
    let ctx = session.connect()?;
    let dev = ctx.device(AD7291)?;
    for channel in dev.channels() {
        let prefix = if channel.is_output() { "out" } else { "in" };
        if format!("{prefix}_{}", channel.id()) != row.voltage_raw {
            continue;
        }
        for attr in channel.attrs().filter(|a| *a == "raw") {
            let raw = match channel.read_attr(attr) {
                Ok(raw) => raw,
                Err(e) if e.is_attribute_io() => {
                    warn!(channel = %row.voltage_raw, error = %e, "skipping unreadable attribute");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let value = parse_reading(&row.voltage_raw, &raw)?;
            info!(channel = %row.voltage_raw, value, "ad7291");
            within(&row.voltage_raw, value, row.low, row.high)?;
        }
    }
    Ok(())
}

/// Channels reset by the init scenario on each data core.
const CORE_CHANNELS: u32 = 4;
/// Round-trip tolerance on calibration registers.
const CALIB_TOLERANCE: f64 = 1e-3;

fn init(session: &Session<'_>, _: &Case) -> HilResult<()> {
    let sdr = session.open()?;
    for chip in [Chip::A, Chip::B] {
        for n in 0..CORE_CHANNELS {
            let id = format!("voltage{n}");
            for (role, output) in [(Role::RxAdc, false), (Role::TxDac, true)] {
                let ch = sdr.find_channel(role, chip, &id, output)?;
                for (attr, value, expected) in [("calibphase", "0.0", 0.0), ("calibscale", "1.0", 1.0)] {
                    ch.write_attr(attr, value)?;
                    let read = parse_reading(attr, &ch.read_attr(attr)?)?;
                    deviation_within(&format!("{role}/{id}/{attr}"), expected, read, CALIB_TOLERANCE)?;
                }
            }
        }
    }
    for chip in [Chip::A, Chip::B] {
        sdr.set_iio_attr("out", "voltage_filter_fir_en", false, &AttrValue::Int(0), chip)?;
        for n in 0..3 {
            sdr.set_iio_attr(&format!("voltage{n}"), "filter_fir_en", false, &AttrValue::Int(0), chip)?;
        }
    }
    for chip in [Chip::A, Chip::B] {
        for n in 0..3 {
            sdr.set_iio_attr(&format!("voltage{n}"), "quadrature_tracking_en", false, &AttrValue::Int(1), chip)?;
        }
    }
    info!(board = %BOARD, "initial state restored");
    Ok(())
}

fn attr(session: &Session<'_>, case: &Case) -> HilResult<()> {
    session.fixtures().attribute_single_value(session.target(), &case.bind()?)
}

fn loopback(session: &Session<'_>, case: &Case) -> HilResult<()> {
    session.fixtures().dma_loopback(session.target(), &case.bind()?)
}

fn rssi(session: &Session<'_>, case: &Case) -> HilResult<()> {
    session.fixtures().gain_check(session.target(), &case.bind()?)
}

fn hardware_gain(session: &Session<'_>, case: &Case) -> HilResult<()> {
    session.fixtures().hardwaregain(session.target(), &case.bind()?)
}

fn dcxo(session: &Session<'_>, case: &Case) -> HilResult<()> {
    session.fixtures().dcxo_calibration(session.target(), &case.bind()?)
}

fn harmonics(session: &Session<'_>, case: &Case) -> HilResult<()> {
    session.fixtures().harmonics(session.target(), &case.bind()?)
}

fn peaks(session: &Session<'_>, case: &Case) -> HilResult<()> {
    session.fixtures().sfdrl(session.target(), &case.bind()?)
}

fn phase_sync(session: &Session<'_>, case: &Case) -> HilResult<()> {
    let lo: i64 = case.value("lo")?;
    let sync = session.phase_sync()?;
    let sdr = session.open()?;
    sync.phase_sync(sdr.context(), lo)?;
    info!(board = %BOARD, lo, "phase synchronised");
    Ok(())
}

/// Sweep rows for chip A (`""`) or chip B (`"_chip_b"`).
fn sweep_rows(marker: &str) -> Vec<Vec<Value>> {
    vec![
        row!(format!("tx_hardwaregain{marker}_chan0"), -40.0, -7.0, 0.25, 0),
        row!(format!("tx_hardwaregain{marker}_chan1"), -40.0, -7.0, 0.25, 0),
        row!(format!("rx_lo{marker}"), 2_300_000_000_i64, 2_500_000_000_i64, 1, 8),
        row!(format!("tx_lo{marker}"), 2_300_000_000_i64, 2_500_000_000_i64, 1, 8),
        row!("sample_rate", 30_700_000, 30_740_000, 1, 4),
        row!(format!("rx_rf_bandwidth{marker}"), 16_000_000, 19_000_000, 1, 4),
        row!(format!("tx_rf_bandwidth{marker}"), 16_000_000, 19_000_000, 1, 4),
    ]
}

fn rssi_rows(chip: Chip) -> Vec<Vec<Value>> {
    match chip {
        Chip::A => vec![
            row!(0.0, 75, 150, {
                "sample_rate": 30_720_000,
                "tx_lo": 2_300_000_000_i64,
                "rx_lo": 2_400_000_000_i64,
                "gain_control_mode_chan0": "slow_attack",
                "gain_control_mode_chan1": "slow_attack",
                "rx_rf_bandwidth": 18_000_000,
                "tx_rf_bandwidth": 18_000_000,
            }),
            row!(0.125, 10, 50, chip_a_tone_params()),
        ],
        Chip::B => vec![
            row!(0.0, 60, 150, {
                "sample_rate": 30_720_000,
                "tx_lo_chip_b": 2_300_000_000_i64,
                "rx_lo_chip_b": 2_400_000_000_i64,
                "gain_control_mode_chip_b_chan0": "slow_attack",
                "gain_control_mode_chip_b_chan1": "slow_attack",
                "tx_hardwaregain_chip_b_chan0": -10,
                "tx_hardwaregain_chip_b_chan1": -10,
                "rx_rf_bandwidth_chip_b": 18_000_000,
                "tx_rf_bandwidth_chip_b": 18_000_000,
            }),
            row!(0.125, 10, 50, chip_b_tone_params()),
        ],
    }
}

fn chip_a_tone_params() -> Value {
    json!({
        "gain_control_mode_chan0": "slow_attack",
        "gain_control_mode_chan1": "slow_attack",
        "rx_lo": 2_400_000_000_i64,
        "tx_lo": 2_400_000_000_i64,
        "tx_hardwaregain_chan0": -10,
        "tx_hardwaregain_chan1": -10,
        "sample_rate": 30_720_000,
        "rx_rf_bandwidth": 18_000_000,
        "tx_rf_bandwidth": 18_000_000,
    })
}

fn chip_b_tone_params() -> Value {
    json!({
        "gain_control_mode_chip_b_chan0": "slow_attack",
        "gain_control_mode_chip_b_chan1": "slow_attack",
        "rx_lo_chip_b": 2_400_000_000_i64,
        "tx_lo_chip_b": 2_400_000_000_i64,
        "tx_hardwaregain_chip_b_chan0": -10,
        "tx_hardwaregain_chip_b_chan1": -10,
        "sample_rate": 30_720_000,
        "rx_rf_bandwidth_chip_b": 18_000_000,
        "tx_rf_bandwidth_chip_b": 18_000_000,
    })
}

fn hardware_gain_rows(params: &Value) -> Vec<Vec<Value>> {
    vec![
        row!(0.0, 999_859, 50, 80, params.clone()),
        row!(0.125, 999_859, 0.0, 28, params.clone()),
    ]
}

fn spectrum_params(lo: i64) -> Value {
    json!({
        "tx_lo": lo,
        "rx_lo": lo,
        "tx_hardwaregain_chan0": -10,
        "tx_hardwaregain_chan1": -10,
        "tx_hardwaregain_chip_b_chan0": -10,
        "tx_hardwaregain_chip_b_chan1": -10,
        "sample_rate": 30_720_000,
    })
}

/// Every FMComms5 scenario group, in table order.
pub fn groups() -> Vec<ScenarioGroup> {
    let ad7291_rows = AD7291_BOUNDS
        .iter()
        .map(|(name, low, high)| row!(name, low, high));
    let sweep_names = ["attr", "start", "stop", "step", "tol"];
    let rssi_names = ["dds_scale", "min_rssi", "max_rssi", "param_set"];
    let gain_names = ["dds_scale", "frequency", "hardwaregain_low", "hardwaregain_high", "param_set"];
    let tone = ["param_set", "frequency", "scale"];
    let bounds = ["low", "high"];

    vec![
        ScenarioGroup::new(
            "test_ad7291",
            BOARD,
            Matrix::new().params(&["voltage_raw", "low", "high"], ad7291_rows),
            ad7291,
        ),
        ScenarioGroup::new("test_init_fmcomms5", BOARD, Matrix::new(), init),
        ScenarioGroup::new(
            "test_fmcomms5_attr",
            BOARD,
            Matrix::new().params(&sweep_names, sweep_rows(Chip::A.marker())),
            attr,
        ),
        ScenarioGroup::new(
            "test_fmcomms5_chip_b_attr",
            BOARD,
            Matrix::new().params(&sweep_names, sweep_rows(Chip::B.marker())),
            attr,
        ),
        ScenarioGroup::new(
            "test_fmcomms5_loopback",
            BOARD,
            Matrix::new().param("channel", [0, 1, 2, 3]),
            loopback,
        ),
        ScenarioGroup::new(
            "test_rssi",
            BOARD,
            Matrix::new()
                .param("channel", [0, 1])
                .params(&rssi_names, rssi_rows(Chip::A)),
            rssi,
        ),
        ScenarioGroup::new(
            "test_rssi_chip_b",
            BOARD,
            Matrix::new()
                .param("channel", [2, 3])
                .params(&rssi_names, rssi_rows(Chip::B)),
            rssi,
        ),
        ScenarioGroup::new(
            "test_hardware_gain",
            BOARD,
            Matrix::new()
                .param("channel", [0, 1])
                .params(&gain_names, hardware_gain_rows(&chip_a_tone_params())),
            hardware_gain,
        ),
        ScenarioGroup::new(
            "test_hardware_gain_chip_b",
            BOARD,
            Matrix::new()
                .param("channel", [2, 3])
                .params(&gain_names, hardware_gain_rows(&chip_b_tone_params())),
            hardware_gain,
        ),
        ScenarioGroup::new(
            "test_dcxo",
            BOARD,
            Matrix::new()
                .param("masterfile", [DCXO_MASTERFILE])
                .param("eeprom_path", [DCXO_EEPROM]),
            dcxo,
        ),
        ScenarioGroup::new(
            "test_harmonic_values",
            BOARD,
            Matrix::new()
                .param("channel", [0, 1, 2, 3])
                .params(&tone, [row!(spectrum_params(2_400_000_000), 2_999_577, 0.125)])
                .params(
                    &bounds,
                    [row!(
                        [-20.0, -110.0, -120.0, -120.0, -120.0],
                        [-10.0, -60.0, -75.0, -75.0, -80.0]
                    )],
                ),
            harmonics,
        ),
        ScenarioGroup::new(
            "test_peaks",
            BOARD,
            Matrix::new()
                .param("channel", [0, 1, 2, 3])
                .params(&tone, [row!(spectrum_params(3_500_000_000), 2_999_577, 0.125)])
                .params(
                    &bounds,
                    [row!(
                        [-20.0, -120.0, -120.0, -125.0, -125.0],
                        [-10.0, -75.0, -75.0, -80.0, -80.0]
                    )],
                ),
            peaks,
        ),
        ScenarioGroup::new(
            "test_fmcomms5_phase_sync",
            BOARD,
            Matrix::new().param("lo", [PHASE_SYNC_LO]),
            phase_sync,
        ),
    ]
}
