//! Sequential scenario runner.
//!
//! Scenarios run one after another. Each one is resolved against the
//! session descriptors first; a scenario whose board is not present is
//! skipped before anything touches the hardware. A failing or erroring
//! scenario never stops the run.

use std::sync::Arc;
use std::time::Instant;

use sdr_hil_iio::Connector;
use tracing::{error, info, warn};

use crate::bench::{DcxoCalibrator, PhaseSync, SignalBench};
use crate::config::HilConfig;
use crate::fixtures::{BenchFixtures, Fixtures};
use crate::report::{Outcome, RunReport, ScenarioReport};
use crate::resolver::{Resolution, resolve};
use crate::scenario::{Scenario, Session};

/// Runs scenarios against the boards of one configuration.
pub struct Runner {
    config: HilConfig,
    connector: Arc<dyn Connector>,
    fixtures: Box<dyn Fixtures>,
    phase_sync: Option<Box<dyn PhaseSync>>,
    filter: Option<String>,
}

/// Builder for [`Runner`].
pub struct RunnerBuilder {
    config: HilConfig,
    connector: Arc<dyn Connector>,
    fixtures: Option<Box<dyn Fixtures>>,
    bench: Option<Box<dyn SignalBench>>,
    dcxo: Option<Box<dyn DcxoCalibrator>>,
    phase_sync: Option<Box<dyn PhaseSync>>,
    filter: Option<String>,
}

impl RunnerBuilder {
    /// Signal bench for the shipped fixtures.
    pub fn bench(mut self, bench: Box<dyn SignalBench>) -> Self {
        self.bench = Some(bench);
        self
    }

    /// DCXO calibrator for the shipped fixtures.
    pub fn dcxo(mut self, dcxo: Box<dyn DcxoCalibrator>) -> Self {
        self.dcxo = Some(dcxo);
        self
    }

    /// Phase synchroniser.
    pub fn phase_sync(mut self, phase_sync: Box<dyn PhaseSync>) -> Self {
        self.phase_sync = Some(phase_sync);
        self
    }

    /// Replace the shipped fixtures entirely.
    pub fn fixtures(mut self, fixtures: Box<dyn Fixtures>) -> Self {
        self.fixtures = Some(fixtures);
        self
    }

    /// Only run scenarios whose id contains `pattern`.
    pub fn filter(mut self, pattern: impl Into<String>) -> Self {
        self.filter = Some(pattern.into());
        self
    }

    /// Build.
    pub fn build(self) -> Runner {
        let fixtures = match self.fixtures {
            Some(fixtures) => fixtures,
            None => {
                let mut fixtures = BenchFixtures::new(Arc::clone(&self.connector))
                    .with_sweep(self.config.sweep.clone())
                    .with_dcxo_overrides(self.config.dcxo.clone())
                    .with_settle(self.config.gain.settle());
                if let Some(serial) = &self.config.serial_number {
                    fixtures = fixtures.with_serial_number(serial.clone());
                }
                if let Some(bench) = self.bench {
                    fixtures = fixtures.with_bench(bench);
                }
                if let Some(dcxo) = self.dcxo {
                    fixtures = fixtures.with_dcxo(dcxo);
                }
                Box::new(fixtures)
            }
        };
        Runner {
            config: self.config,
            connector: self.connector,
            fixtures,
            phase_sync: self.phase_sync,
            filter: self.filter,
        }
    }
}

impl Runner {
    /// Start building a runner.
    pub fn builder(config: HilConfig, connector: Arc<dyn Connector>) -> RunnerBuilder {
        RunnerBuilder {
            config,
            connector,
            fixtures: None,
            bench: None,
            dcxo: None,
            phase_sync: None,
            filter: None,
        }
    }

    /// Session configuration.
    pub fn config(&self) -> &HilConfig {
        &self.config
    }

    /// Whether `scenario` passes the id filter.
    pub fn selects(&self, scenario: &Scenario) -> bool {
        self.filter
            .as_deref()
            .is_none_or(|pattern| scenario.id().contains(pattern))
    }

    /// Run one scenario.
    pub fn run_one(&self, scenario: &Scenario) -> ScenarioReport {
        let id = scenario.id();
        let started = Instant::now();
        let (outcome, reason) = match resolve(&self.config.contexts, scenario.board.tag()) {
            Resolution::Skip(reason) => {
                info!(scenario = %id, %reason, "skipped");
                (Outcome::Skipped, Some(reason))
            }
            Resolution::Found(descriptor) => {
                info!(scenario = %id, uri = %descriptor.uri, "running");
                let session = Session::new(
                    scenario.board,
                    &descriptor,
                    &self.config,
                    self.connector.as_ref(),
                    self.fixtures.as_ref(),
                )
                .with_phase_sync(self.phase_sync.as_deref());
                let result = scenario.run(&session);
                let outcome = Outcome::of(&result);
                match &result {
                    Ok(()) => info!(scenario = %id, "passed"),
                    Err(e) if outcome == Outcome::Failed => warn!(scenario = %id, error = %e, "failed"),
                    Err(e) => error!(scenario = %id, error = %e, category = ?e.category(), "error"),
                }
                (outcome, result.err().map(|e| e.to_string()))
            }
        };
        ScenarioReport {
            id,
            board: scenario.board,
            outcome,
            reason,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Run every selected scenario in order.
    pub fn run(&self, scenarios: &[Scenario]) -> RunReport {
        let mut report = RunReport::start();
        for scenario in scenarios.iter().filter(|s| self.selects(s)) {
            report.push(self.run_one(scenario));
        }
        let report = report.finish();
        info!(
            total = report.summary.total,
            passed = report.summary.passed,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            errors = report.summary.errors,
            "run complete"
        );
        report
    }
}

impl core::fmt::Debug for Runner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Runner")
            .field("contexts", &self.config.contexts.len())
            .field("phase_sync", &self.phase_sync.is_some())
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
