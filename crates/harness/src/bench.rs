//! External measurement collaborators.
//!
//! DMA streaming, spectral estimation, DCXO calibration and multi-chip phase
//! synchronisation live outside the suite. Scenarios reach them through
//! these traits and only compare what comes back against their bounds.

use std::path::Path;

use sdr_hil_devices::DeviceFacade;
use sdr_hil_errors::HilResult;
use sdr_hil_iio::Context;
use serde::{Deserialize, Serialize};

/// Strongest tone found in a capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TonePeak {
    /// Frequency in Hz
    pub frequency: f64,
    /// Level in dBFS
    pub level: f64,
}

/// DMA buffers and spectral measurements on an open board.
///
/// Implementations own buffer sizing and DSP. The facade passed in has
/// already been configured (parameter set applied, DDS tone emitted) by the
/// calling fixture.
pub trait SignalBench: Send + Sync {
    /// Push a cyclic buffer to the listed transmit channels.
    fn dma_tx(&self, sdr: &dyn DeviceFacade, channels: &[u32]) -> HilResult<()>;

    /// Capture one buffer from the listed receive channels and return the
    /// summed sample magnitude.
    fn dma_rx(&self, sdr: &dyn DeviceFacade, channels: &[u32]) -> HilResult<f64>;

    /// Send a known sequence with digital loopback enabled and return how
    /// many received samples differ from it.
    fn dma_loopback(&self, sdr: &dyn DeviceFacade, channel: u32) -> HilResult<usize>;

    /// Capture and locate the strongest tone.
    fn capture_peak(&self, sdr: &dyn DeviceFacade, channel: u32) -> HilResult<TonePeak>;

    /// Transmit a continuous wave at `frequency` through DMA, capture it
    /// back and locate the strongest tone.
    fn cw_loopback(&self, sdr: &dyn DeviceFacade, channel: u32, frequency: f64) -> HilResult<TonePeak>;

    /// Fundamental followed by harmonic levels, in dBFS.
    fn harmonic_levels(&self, sdr: &dyn DeviceFacade, channel: u32, frequency: f64) -> HilResult<Vec<f64>>;

    /// Fundamental followed by the strongest spurs, in dBFS.
    fn spur_levels(&self, sdr: &dyn DeviceFacade, channel: u32, frequency: f64) -> HilResult<Vec<f64>>;
}

/// Writes the DCXO trim derived from a master calibration into EEPROM.
#[cfg_attr(test, mockall::automock)]
pub trait DcxoCalibrator: Send + Sync {
    /// Calibrate the board at `uri`.
    fn calibrate(&self, uri: &str, serial_number: &str, masterfile: &Path, eeprom_path: &Path) -> HilResult<()>;
}

/// Aligns the LO phase of both FMComms5 transceivers.
#[cfg_attr(test, mockall::automock)]
pub trait PhaseSync: Send + Sync {
    /// Synchronise at local oscillator frequency `lo` (Hz).
    fn phase_sync(&self, ctx: &Context, lo: i64) -> HilResult<()>;
}
