//! Run results.

use core::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use sdr_hil_devices::Board;
use sdr_hil_errors::{HilError, HilResult};
use serde::{Deserialize, Serialize};

/// Scenario outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Every check held
    Passed,
    /// A measurement was out of bounds
    Failed,
    /// The board was not available
    Skipped,
    /// The scenario could not be carried out
    Error,
}

impl Outcome {
    /// Classify a scenario result.
    pub fn of(result: &HilResult<()>) -> Self {
        match result {
            Ok(()) => Outcome::Passed,
            Err(e) if e.is_check_failure() => Outcome::Failed,
            Err(_) => Outcome::Error,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Passed => "PASSED",
            Outcome::Failed => "FAILED",
            Outcome::Skipped => "SKIPPED",
            Outcome::Error => "ERROR",
        };
        f.pad(s)
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// `test[case]`
    pub id: String,
    /// Board
    pub board: Board,
    /// Outcome
    pub outcome: Outcome,
    /// Skip reason or error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// Outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Scenarios run
    pub total: usize,
    /// Passed
    pub passed: usize,
    /// Failed
    pub failed: usize,
    /// Skipped
    pub skipped: usize,
    /// Errored
    pub errors: usize,
}

impl Summary {
    fn count(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Error => self.errors += 1,
        }
    }
}

/// A whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Start time
    pub started: DateTime<Utc>,
    /// End time
    pub finished: DateTime<Utc>,
    /// Counts
    pub summary: Summary,
    /// Per scenario, in run order
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    /// Empty report starting now.
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            started: now,
            finished: now,
            summary: Summary::default(),
            scenarios: Vec::new(),
        }
    }

    /// Record a scenario.
    pub fn push(&mut self, report: ScenarioReport) {
        self.summary.count(report.outcome);
        self.scenarios.push(report);
    }

    /// Stamp the end time.
    pub fn finish(mut self) -> Self {
        self.finished = Utc::now();
        self
    }

    /// No failures and no errors. Skips do not count against a run.
    pub fn success(&self) -> bool {
        self.summary.failed == 0 && self.summary.errors == 0
    }

    /// Scenarios with `outcome`.
    pub fn with_outcome(&self, outcome: Outcome) -> impl Iterator<Item = &ScenarioReport> {
        self.scenarios.iter().filter(move |s| s.outcome == outcome)
    }

    /// Pretty JSON.
    pub fn to_json(&self) -> HilResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| HilError::other(format!("report serialization: {e}")))
    }

    /// Write pretty JSON to `path`.
    pub fn write(&self, path: &Path) -> HilResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdr_hil_errors::{CheckError, DeviceError};

    fn scenario(id: &str, outcome: Outcome) -> ScenarioReport {
        ScenarioReport {
            id: id.to_string(),
            board: Board::Daq2,
            outcome,
            reason: None,
            duration_ms: 3,
        }
    }

    #[test]
    fn test_outcome_classification() {
        assert_eq!(Outcome::of(&Ok(())), Outcome::Passed);
        assert_eq!(
            Outcome::of(&Err(CheckError::failed("low").into())),
            Outcome::Failed
        );
        assert_eq!(
            Outcome::of(&Err(DeviceError::not_found("ad7291").into())),
            Outcome::Error
        );
        assert_eq!(
            Outcome::of(&Err(HilError::missing("libad9361-iio not installed/configured"))),
            Outcome::Error
        );
    }

    #[test]
    fn test_skips_do_not_fail_run() {
        let mut report = RunReport::start();
        report.push(scenario("a", Outcome::Passed));
        report.push(scenario("b", Outcome::Skipped));
        assert!(report.success());
        report.push(scenario("c", Outcome::Error));
        assert!(!report.success());
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.with_outcome(Outcome::Skipped).count(), 1);
    }

    #[test]
    fn test_json_uses_lowercase_outcomes() -> HilResult<()> {
        let mut report = RunReport::start();
        report.push(scenario("test_daq2_rx_data[0]", Outcome::Failed));
        let json = report.finish().to_json()?;
        assert!(json.contains("\"outcome\": \"failed\""));
        assert!(json.contains("\"board\": \"daq2\""));
        Ok(())
    }

    #[test]
    fn test_write_report() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.json");
        let mut report = RunReport::start();
        report.push(scenario("x", Outcome::Passed));
        report.write(&path)?;
        let back: RunReport = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(back.summary.passed, 1);
        Ok(())
    }
}
