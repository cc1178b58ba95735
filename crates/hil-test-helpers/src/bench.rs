//! Scripted signal bench.

use std::sync::Arc;

use parking_lot::Mutex;
use sdr_hil_devices::facade::DDS_PER_CHANNEL;
use sdr_hil_devices::{DeviceFacade, Role, parse_reading};
use sdr_hil_errors::{HilError, HilResult};
use sdr_hil_harness::{SignalBench, TonePeak};

/// Level reported for echoed tones.
pub const ECHO_LEVEL: f64 = -12.0;

#[derive(Debug)]
struct Script {
    peak: Option<TonePeak>,
    rx_magnitude: f64,
    mismatches: usize,
    harmonics: Vec<f64>,
    spurs: Vec<f64>,
    fail: Option<String>,
    calls: Vec<String>,
}

/// [`SignalBench`] returning scripted measurements.
///
/// Without a scripted peak, `capture_peak` echoes the DDS frequency
/// programmed on the channel's transmit core and `cw_loopback` echoes the
/// requested frequency. Clones share their script and call log.
#[derive(Debug, Clone)]
pub struct ScriptedBench {
    script: Arc<Mutex<Script>>,
}

impl Default for ScriptedBench {
    fn default() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                peak: None,
                rx_magnitude: 1.0,
                mismatches: 0,
                harmonics: Vec::new(),
                spurs: Vec::new(),
                fail: None,
                calls: Vec::new(),
            })),
        }
    }
}

impl ScriptedBench {
    /// Bench that echoes tones and reports clean captures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed capture peak.
    pub fn with_peak(self, frequency: f64, level: f64) -> Self {
        self.script.lock().peak = Some(TonePeak { frequency, level });
        self
    }

    /// Summed sample magnitude of DMA captures.
    pub fn with_rx_magnitude(self, magnitude: f64) -> Self {
        self.script.lock().rx_magnitude = magnitude;
        self
    }

    /// Mismatching samples after loopback.
    pub fn with_mismatches(self, mismatches: usize) -> Self {
        self.script.lock().mismatches = mismatches;
        self
    }

    /// Harmonic levels.
    pub fn with_harmonics(self, levels: Vec<f64>) -> Self {
        self.script.lock().harmonics = levels;
        self
    }

    /// Spur levels.
    pub fn with_spurs(self, levels: Vec<f64>) -> Self {
        self.script.lock().spurs = levels;
        self
    }

    /// Every call fails with `msg`.
    pub fn failing(self, msg: impl Into<String>) -> Self {
        self.script.lock().fail = Some(msg.into());
        self
    }

    /// Calls so far, as `method:channel`.
    pub fn calls(&self) -> Vec<String> {
        self.script.lock().calls.clone()
    }

    fn record(&self, call: String) -> HilResult<()> {
        let mut script = self.script.lock();
        script.calls.push(call);
        match &script.fail {
            Some(msg) => Err(HilError::other(msg.clone())),
            None => Ok(()),
        }
    }
}

fn dds_frequency(sdr: &dyn DeviceFacade, channel: u32) -> HilResult<f64> {
    let (chip, local) = sdr.properties().split_channel(channel)?;
    let tone = sdr.find_channel(
        Role::TxDac,
        chip,
        &format!("altvoltage{}", local * DDS_PER_CHANNEL),
        true,
    )?;
    Ok(parse_reading("frequency", &tone.read_attr("frequency")?)?)
}

impl SignalBench for ScriptedBench {
    fn dma_tx(&self, _sdr: &dyn DeviceFacade, channels: &[u32]) -> HilResult<()> {
        self.record(format!("dma_tx:{channels:?}"))
    }

    fn dma_rx(&self, _sdr: &dyn DeviceFacade, channels: &[u32]) -> HilResult<f64> {
        self.record(format!("dma_rx:{channels:?}"))?;
        Ok(self.script.lock().rx_magnitude)
    }

    fn dma_loopback(&self, _sdr: &dyn DeviceFacade, channel: u32) -> HilResult<usize> {
        self.record(format!("dma_loopback:{channel}"))?;
        Ok(self.script.lock().mismatches)
    }

    fn capture_peak(&self, sdr: &dyn DeviceFacade, channel: u32) -> HilResult<TonePeak> {
        self.record(format!("capture_peak:{channel}"))?;
        if let Some(peak) = self.script.lock().peak {
            return Ok(peak);
        }
        Ok(TonePeak {
            frequency: dds_frequency(sdr, channel)?,
            level: ECHO_LEVEL,
        })
    }

    fn cw_loopback(&self, _sdr: &dyn DeviceFacade, channel: u32, frequency: f64) -> HilResult<TonePeak> {
        self.record(format!("cw_loopback:{channel}"))?;
        Ok(self.script.lock().peak.unwrap_or(TonePeak {
            frequency,
            level: ECHO_LEVEL,
        }))
    }

    fn harmonic_levels(&self, _sdr: &dyn DeviceFacade, channel: u32, _frequency: f64) -> HilResult<Vec<f64>> {
        self.record(format!("harmonic_levels:{channel}"))?;
        Ok(self.script.lock().harmonics.clone())
    }

    fn spur_levels(&self, _sdr: &dyn DeviceFacade, channel: u32, _frequency: f64) -> HilResult<Vec<f64>> {
        self.record(format!("spur_levels:{channel}"))?;
        Ok(self.script.lock().spurs.clone())
    }
}
