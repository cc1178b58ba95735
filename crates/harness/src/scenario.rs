//! Scenarios and the session a scenario body runs in.

use core::fmt;

use sdr_hil_devices::{Board, DeviceFacade};
use sdr_hil_errors::{HilError, HilResult, ValidationError};
use sdr_hil_iio::{Connector, Context};

use crate::bench::PhaseSync;
use crate::case::Case;
use crate::config::{HardwareDescriptor, HilConfig};
use crate::fixtures::{Fixtures, Target};
use crate::matrix::Matrix;

/// Message for a session without a phase synchroniser.
pub const PHASE_SYNC_MISSING: &str = "libad9361-iio not installed/configured";

/// Scenario body.
pub type ScenarioFn = fn(&Session<'_>, &Case) -> HilResult<()>;

/// One runnable invocation: a test function bound to one case.
#[derive(Clone)]
pub struct Scenario {
    /// Test function name
    pub test: &'static str,
    /// Board the scenario needs
    pub board: Board,
    /// Parameters
    pub case: Case,
    /// Body
    pub body: ScenarioFn,
}

impl Scenario {
    /// `test[case-id]`, or just `test` for a case without parameters.
    pub fn id(&self) -> String {
        let case = self.case.id();
        if case.is_empty() {
            self.test.to_string()
        } else {
            format!("{}[{case}]", self.test)
        }
    }

    /// Run the body in `session`.
    pub fn run(&self, session: &Session<'_>) -> HilResult<()> {
        (self.body)(session, &self.case)
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id())
            .field("board", &self.board)
            .finish_non_exhaustive()
    }
}

/// A test function and the matrix it is parametrized over.
pub struct ScenarioGroup {
    test: &'static str,
    board: Board,
    matrix: Matrix,
    body: ScenarioFn,
}

impl ScenarioGroup {
    /// New group.
    pub fn new(test: &'static str, board: Board, matrix: Matrix, body: ScenarioFn) -> Self {
        Self {
            test,
            board,
            matrix,
            body,
        }
    }

    /// Test function name.
    pub fn test(&self) -> &'static str {
        self.test
    }

    /// One scenario per case.
    pub fn expand(&self) -> Result<Vec<Scenario>, ValidationError> {
        Ok(self
            .matrix
            .expand()?
            .into_iter()
            .map(|case| Scenario {
                test: self.test,
                board: self.board,
                case,
                body: self.body,
            })
            .collect())
    }
}

impl fmt::Debug for ScenarioGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioGroup")
            .field("test", &self.test)
            .field("board", &self.board)
            .field("matrix", &self.matrix)
            .finish_non_exhaustive()
    }
}

/// Expand every group, in order.
pub fn expand_all(groups: &[ScenarioGroup]) -> Result<Vec<Scenario>, ValidationError> {
    let mut scenarios = Vec::new();
    for group in groups {
        scenarios.extend(group.expand()?);
    }
    Ok(scenarios)
}

/// What a scenario body can reach: the resolved board and collaborators.
pub struct Session<'a> {
    target: Target,
    descriptor: &'a HardwareDescriptor,
    config: &'a HilConfig,
    connector: &'a dyn Connector,
    fixtures: &'a dyn Fixtures,
    phase_sync: Option<&'a dyn PhaseSync>,
}

impl<'a> Session<'a> {
    /// Session for a resolved descriptor.
    pub fn new(
        board: Board,
        descriptor: &'a HardwareDescriptor,
        config: &'a HilConfig,
        connector: &'a dyn Connector,
        fixtures: &'a dyn Fixtures,
    ) -> Self {
        Self {
            target: Target::new(descriptor.uri.clone(), board),
            descriptor,
            config,
            connector,
            fixtures,
            phase_sync: None,
        }
    }

    /// Attach a phase synchroniser.
    pub fn with_phase_sync(mut self, phase_sync: Option<&'a dyn PhaseSync>) -> Self {
        self.phase_sync = phase_sync;
        self
    }

    /// Resolved target.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Resolved descriptor.
    pub fn descriptor(&self) -> &HardwareDescriptor {
        self.descriptor
    }

    /// Session configuration.
    pub fn config(&self) -> &HilConfig {
        self.config
    }

    /// Generic test functions.
    pub fn fixtures(&self) -> &dyn Fixtures {
        self.fixtures
    }

    /// Raw context on the target URI.
    pub fn connect(&self) -> HilResult<Context> {
        Ok(self.connector.connect(&self.target.uri)?)
    }

    /// Board facade on the target URI.
    pub fn open(&self) -> HilResult<Box<dyn DeviceFacade>> {
        Ok(self.target.board.connect(self.connector, &self.target.uri)?)
    }

    /// Phase synchroniser; its absence is an error, not a skip.
    pub fn phase_sync(&self) -> HilResult<&dyn PhaseSync> {
        self.phase_sync
            .ok_or_else(|| HilError::missing(PHASE_SYNC_MISSING))
    }
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("target", &self.target)
            .field("phase_sync", &self.phase_sync.is_some())
            .finish_non_exhaustive()
    }
}
