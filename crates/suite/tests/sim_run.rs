//! Scenario tables run against the simulated boards.

use sdr_hil_devices::{Board, sim};
use sdr_hil_harness::{Outcome, RunReport, Runner};
use sdr_hil_iio::AttrPath;
use sdr_hil_suite::{all_scenarios, board_scenarios};
use sdr_hil_test_helpers::prelude::*;

fn outcome_of(report: &RunReport, id: &str) -> Option<Outcome> {
    report.scenarios.iter().find(|s| s.id == id).map(|s| s.outcome)
}

#[test]
fn test_recorded_run_covers_every_fixture() -> TestResult {
    let lab = SimLab::new();
    let recorder = RecordingFixtures::new();
    let report = Runner::builder(lab.config(), lab.connector())
        .fixtures(Box::new(recorder.clone()))
        .build()
        .run(&all_scenarios()?);

    assert_eq!(report.summary.total, 68);
    assert_eq!(report.summary.passed, 67);
    assert_eq!(report.summary.errors, 1);
    assert_eq!(
        outcome_of(&report, "test_fmcomms5_phase_sync[2400000000]"),
        Some(Outcome::Error)
    );

    assert_eq!(recorder.calls_to("attribute_single_value").len(), 14);
    assert_eq!(recorder.calls_to("gain_check").len(), 8);
    assert_eq!(recorder.calls_to("hardwaregain").len(), 8);
    assert_eq!(recorder.calls_to("dma_loopback").len(), 4);
    assert_eq!(recorder.calls_to("harmonics").len(), 4);
    assert_eq!(recorder.calls_to("sfdrl").len(), 4);
    assert_eq!(recorder.calls_to("dcxo_calibration").len(), 1);
    assert_eq!(recorder.calls_to("dds_loopback").len(), 6);
    assert_eq!(recorder.calls_to("cw_loopback").len(), 2);
    assert!(
        recorder
            .calls_to("dma_tx")
            .iter()
            .all(|c| c.target.uri == DAQ2_URI && c.target.board == Board::Daq2)
    );
    Ok(())
}

#[test]
fn test_absent_daq2_is_skipped() -> TestResult {
    let lab = SimLab::new();
    let recorder = RecordingFixtures::new();
    let report = Runner::builder(lab.fmcomms5_only(), lab.connector())
        .fixtures(Box::new(recorder.clone()))
        .build()
        .run(&board_scenarios(Board::Daq2)?);
    assert_eq!(report.summary.skipped, 14);
    assert!(recorder.calls().is_empty());
    assert!(report.success());
    Ok(())
}

#[test]
fn test_ad7291_out_of_range_fails_only_that_channel() -> TestResult {
    let lab = SimLab::new();
    lab.fmcomms5.seed(AttrPath::channel(sim::AD7291_ID, "voltage0", false, "raw"), "2500");
    let report = Runner::builder(lab.config(), lab.connector())
        .fixtures(Box::new(RecordingFixtures::new()))
        .filter("test_ad7291")
        .build()
        .run(&all_scenarios()?);
    assert_eq!(report.summary.total, 9);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(
        outcome_of(&report, "test_ad7291[in_voltage0-1578-2087]"),
        Some(Outcome::Failed)
    );
    Ok(())
}

#[test]
fn test_ad7291_unreadable_attribute_is_skipped() -> TestResult {
    let lab = SimLab::new();
    lab.fmcomms5.fail(AttrPath::channel(sim::AD7291_ID, "temp0", false, "raw"), 5);
    let report = Runner::builder(lab.config(), lab.connector())
        .fixtures(Box::new(RecordingFixtures::new()))
        .filter("in_temp0")
        .build()
        .run(&all_scenarios()?);
    assert_eq!(outcome_of(&report, "test_ad7291[in_temp0-80-160]"), Some(Outcome::Passed));
    Ok(())
}

#[test]
fn test_init_resets_both_chips() -> TestResult {
    let lab = SimLab::new();
    let report = Runner::builder(lab.config(), lab.connector())
        .filter("test_init_fmcomms5")
        .build()
        .run(&all_scenarios()?);
    assert_eq!(report.summary.passed, 1);
    // four channels, two cores, two chips
    assert_eq!(lab.fmcomms5.writes_to("calibscale").len(), 16);
    assert_eq!(lab.fmcomms5.writes_to("quadrature_tracking_en").len(), 6);
    assert_eq!(
        lab.fmcomms5
            .value(&AttrPath::channel(sim::CTRL_B_ID, "out", false, "voltage_filter_fir_en"))
            .as_deref(),
        Some("0")
    );
    Ok(())
}

#[test]
fn test_daq2_with_echo_bench_passes() -> TestResult {
    let lab = SimLab::new();
    let bench = ScriptedBench::new();
    let report = Runner::builder(lab.config(), lab.connector())
        .bench(Box::new(bench.clone()))
        .build()
        .run(&board_scenarios(Board::Daq2)?);
    assert_eq!(report.summary.passed, 14, "{:?}", report.with_outcome(Outcome::Error).collect::<Vec<_>>());
    assert!(bench.calls().contains(&"dma_tx:[0, 1]".to_string()));
    let tones = lab.daq2.writes_to("frequency");
    assert!(tones.iter().any(|(_, v)| v == "200000000"));
    Ok(())
}

#[test]
fn test_weak_peak_fails_dds_loopback() -> TestResult {
    let lab = SimLab::new();
    let report = Runner::builder(lab.config(), lab.connector())
        .bench(Box::new(ScriptedBench::new().with_peak(5_000_000.0, -60.0)))
        .filter("test_daq2_dds_loopback")
        .build()
        .run(&board_scenarios(Board::Daq2)?);
    assert_eq!(report.summary.failed, 6);
    Ok(())
}

#[test]
fn test_spectrum_scenarios_without_bench_error() -> TestResult {
    let lab = SimLab::new();
    let report = Runner::builder(lab.config(), lab.connector())
        .filter("test_peaks")
        .build()
        .run(&all_scenarios()?);
    assert_eq!(report.summary.errors, 4);
    assert!(
        report
            .scenarios
            .iter()
            .all(|s| s.reason.as_deref() == Some("signal bench not configured"))
    );
    Ok(())
}

#[test]
fn test_harmonics_with_scripted_levels() -> TestResult {
    let lab = SimLab::new();
    let bench = ScriptedBench::new().with_harmonics(vec![-15.0, -80.0, -90.0, -90.0, -100.0]);
    let report = Runner::builder(lab.config(), lab.connector())
        .bench(Box::new(bench))
        .filter("test_harmonic_values")
        .build()
        .run(&all_scenarios()?);
    assert_eq!(report.summary.passed, 4);
    Ok(())
}
