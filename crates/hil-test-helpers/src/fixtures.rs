//! Fixtures that record calls instead of touching hardware.

use std::sync::Arc;

use parking_lot::Mutex;
use sdr_hil_errors::{CheckError, HilResult};
use sdr_hil_harness::fixtures::{
    CwLoopbackRequest, DcxoRequest, DdsLoopbackRequest, DmaRequest, GainCheckRequest,
    HardwareGainRequest, SpectrumRequest, SweepRequest,
};
use sdr_hil_harness::{Fixtures, Target};

/// One recorded fixture call.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureCall {
    /// Fixture method
    pub method: &'static str,
    /// Target passed in
    pub target: Target,
    /// `Debug` rendering of the request
    pub request: String,
}

#[derive(Debug, Default)]
struct Log {
    calls: Vec<FixtureCall>,
    failing: Vec<&'static str>,
}

/// [`Fixtures`] that log every call and pass, unless told to fail a method.
#[derive(Debug, Clone, Default)]
pub struct RecordingFixtures {
    log: Arc<Mutex<Log>>,
}

impl RecordingFixtures {
    /// Recorder where every method passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `method` fail its check.
    pub fn failing(self, method: &'static str) -> Self {
        self.log.lock().failing.push(method);
        self
    }

    /// Calls so far.
    pub fn calls(&self) -> Vec<FixtureCall> {
        self.log.lock().calls.clone()
    }

    /// Calls of `method`.
    pub fn calls_to(&self, method: &str) -> Vec<FixtureCall> {
        self.log
            .lock()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    fn record(&self, method: &'static str, target: &Target, request: &dyn std::fmt::Debug) -> HilResult<()> {
        let mut log = self.log.lock();
        log.calls.push(FixtureCall {
            method,
            target: target.clone(),
            request: format!("{request:?}"),
        });
        if log.failing.contains(&method) {
            return Err(CheckError::failed(format!("{method} scripted to fail")).into());
        }
        Ok(())
    }
}

impl Fixtures for RecordingFixtures {
    fn dma_tx(&self, target: &Target, req: &DmaRequest) -> HilResult<()> {
        self.record("dma_tx", target, req)
    }

    fn dma_rx(&self, target: &Target, req: &DmaRequest) -> HilResult<()> {
        self.record("dma_rx", target, req)
    }

    fn dma_loopback(&self, target: &Target, req: &DmaRequest) -> HilResult<()> {
        self.record("dma_loopback", target, req)
    }

    fn dds_loopback(&self, target: &Target, req: &DdsLoopbackRequest) -> HilResult<()> {
        self.record("dds_loopback", target, req)
    }

    fn cw_loopback(&self, target: &Target, req: &CwLoopbackRequest) -> HilResult<()> {
        self.record("cw_loopback", target, req)
    }

    fn attribute_single_value(&self, target: &Target, req: &SweepRequest) -> HilResult<()> {
        self.record("attribute_single_value", target, req)
    }

    fn gain_check(&self, target: &Target, req: &GainCheckRequest) -> HilResult<()> {
        self.record("gain_check", target, req)
    }

    fn hardwaregain(&self, target: &Target, req: &HardwareGainRequest) -> HilResult<()> {
        self.record("hardwaregain", target, req)
    }

    fn harmonics(&self, target: &Target, req: &SpectrumRequest) -> HilResult<()> {
        self.record("harmonics", target, req)
    }

    fn sfdrl(&self, target: &Target, req: &SpectrumRequest) -> HilResult<()> {
        self.record("sfdrl", target, req)
    }

    fn dcxo_calibration(&self, target: &Target, req: &DcxoRequest) -> HilResult<()> {
        self.record("dcxo_calibration", target, req)
    }
}
