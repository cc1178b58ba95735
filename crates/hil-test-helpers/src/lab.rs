//! Simulated bench with both boards attached.

use std::sync::Arc;

use sdr_hil_devices::sim;
use sdr_hil_harness::{HardwareDescriptor, HilConfig};
use sdr_hil_iio::Connector;
use sdr_hil_iio::mock::{MockBackend, MockConnector};

/// URI of the simulated FMComms5.
pub const FMCOMMS5_URI: &str = "mock:fmcomms5";
/// URI of the simulated DAQ2.
pub const DAQ2_URI: &str = "mock:daq2";

/// Simulated FMComms5 and DAQ2 behind one connector.
#[derive(Debug, Clone)]
pub struct SimLab {
    /// FMComms5 attribute store
    pub fmcomms5: MockBackend,
    /// DAQ2 attribute store
    pub daq2: MockBackend,
}

impl Default for SimLab {
    fn default() -> Self {
        Self {
            fmcomms5: sim::fmcomms5(),
            daq2: sim::daq2(),
        }
    }
}

impl SimLab {
    /// Both boards with idle readings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector serving both boards.
    pub fn connector(&self) -> Arc<dyn Connector> {
        Arc::new(
            MockConnector::new()
                .with_context(FMCOMMS5_URI, self.fmcomms5.clone())
                .with_context(DAQ2_URI, self.daq2.clone()),
        )
    }

    /// Configuration listing both boards as present.
    pub fn config(&self) -> HilConfig {
        HilConfig::default()
            .with_descriptor(HardwareDescriptor::new("fmcomms5", FMCOMMS5_URI))
            .with_descriptor(HardwareDescriptor::new("daq2", DAQ2_URI))
    }

    /// Configuration with only the FMComms5 present.
    pub fn fmcomms5_only(&self) -> HilConfig {
        HilConfig::default()
            .with_descriptor(HardwareDescriptor::new("fmcomms5", FMCOMMS5_URI))
            .with_descriptor(HardwareDescriptor::new("daq2", DAQ2_URI).absent())
    }
}
