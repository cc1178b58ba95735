//! Generic test functions shared by every board.
//!
//! Each scenario table row ends up calling one [`Fixtures`] method with the
//! resolved [`Target`] and a request bound from its case. The method applies
//! the parameters, performs the stimulus/measurement cycle and fails with a
//! [`CheckError`] when the measured quantity falls outside its bounds.
//!
//! [`BenchFixtures`] implements the attribute-only checks natively and hands
//! buffer and spectrum work to a [`SignalBench`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sdr_hil_devices::{AttrValue, Board, ChannelSelector, DeviceFacade, ParamSet, Role};
use sdr_hil_errors::error_context;
use sdr_hil_errors::prelude::*;
use sdr_hil_iio::Connector;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::bench::{DcxoCalibrator, SignalBench, TonePeak};
use crate::config::{DcxoConfig, GainConfig, SweepConfig};
use crate::sweep;

/// Relative frequency error accepted for a recovered tone.
pub const TONE_FREQUENCY_TOLERANCE: f64 = 0.01;

/// Fraction of the receive sample rate used for test tones.
pub const TONE_RATE_FRACTION: f64 = 0.1;

/// Board under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Context URI
    pub uri: String,
    /// Facade to open on it
    pub board: Board,
}

impl Target {
    /// New target.
    pub fn new(uri: impl Into<String>, board: Board) -> Self {
        Self {
            uri: uri.into(),
            board,
        }
    }
}

/// Write each sampled step of a range and read it back.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepRequest {
    /// Property name
    pub attr: String,
    /// First value
    pub start: f64,
    /// Last value (inclusive)
    pub stop: f64,
    /// Step between values
    pub step: f64,
    /// Accepted readback deviation
    pub tol: f64,
}

/// RSSI with a DDS tone of a given scale.
#[derive(Debug, Clone, Deserialize)]
pub struct GainCheckRequest {
    /// Board-wide channel
    pub channel: u32,
    /// Properties applied first
    #[serde(rename = "param_set", default)]
    pub params: ParamSet,
    /// DDS scale, 0 for no tone
    pub dds_scale: f64,
    /// Lowest accepted RSSI (dB)
    pub min_rssi: f64,
    /// Highest accepted RSSI (dB)
    pub max_rssi: f64,
}

/// AGC gain with a DDS tone of a given scale.
#[derive(Debug, Clone, Deserialize)]
pub struct HardwareGainRequest {
    /// Board-wide channel
    pub channel: u32,
    /// Properties applied first
    #[serde(rename = "param_set", default)]
    pub params: ParamSet,
    /// DDS scale, 0 for no tone
    pub dds_scale: f64,
    /// Tone frequency (Hz)
    pub frequency: f64,
    /// Lowest accepted gain (dB)
    pub hardwaregain_low: f64,
    /// Highest accepted gain (dB)
    pub hardwaregain_high: f64,
}

/// DMA on one channel or a group.
#[derive(Debug, Clone, Deserialize)]
pub struct DmaRequest {
    /// Channels to enable
    pub channel: ChannelSelector,
}

/// DDS tone received back at the expected frequency.
#[derive(Debug, Clone, Deserialize)]
pub struct DdsLoopbackRequest {
    /// Board-wide channel
    pub channel: u32,
    /// Properties applied first
    #[serde(rename = "param_set", default)]
    pub params: ParamSet,
    /// Tone frequency (Hz)
    pub frequency: f64,
    /// DDS scale
    pub scale: f64,
    /// Minimum peak level (dBFS)
    pub peak_min: f64,
}

/// DMA continuous wave received back at the expected frequency.
#[derive(Debug, Clone, Deserialize)]
pub struct CwLoopbackRequest {
    /// Board-wide channel
    pub channel: u32,
    /// Properties applied first
    #[serde(rename = "param_set", default)]
    pub params: ParamSet,
}

/// Spectral levels of a DDS tone against per-bin bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct SpectrumRequest {
    /// Board-wide channel
    pub channel: u32,
    /// Properties applied first
    #[serde(rename = "param_set", default)]
    pub params: ParamSet,
    /// Tone frequency (Hz)
    pub frequency: f64,
    /// DDS scale
    pub scale: f64,
    /// Lower bound per level
    pub low: Vec<f64>,
    /// Upper bound per level
    pub high: Vec<f64>,
}

/// DCXO calibration inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct DcxoRequest {
    /// Boot image holding the master calibration
    pub masterfile: PathBuf,
    /// EEPROM the result is written to
    pub eeprom_path: PathBuf,
}

/// The generic test functions.
pub trait Fixtures {
    /// Transmit a DMA buffer.
    fn dma_tx(&self, target: &Target, req: &DmaRequest) -> HilResult<()>;

    /// Receive a DMA buffer with non-zero content.
    fn dma_rx(&self, target: &Target, req: &DmaRequest) -> HilResult<()>;

    /// Digital loopback with bit-exact data.
    fn dma_loopback(&self, target: &Target, req: &DmaRequest) -> HilResult<()>;

    /// DDS tone received at its frequency and above a level.
    fn dds_loopback(&self, target: &Target, req: &DdsLoopbackRequest) -> HilResult<()>;

    /// DMA continuous wave received at its frequency.
    fn cw_loopback(&self, target: &Target, req: &CwLoopbackRequest) -> HilResult<()>;

    /// Sweep a property and verify readback.
    fn attribute_single_value(&self, target: &Target, req: &SweepRequest) -> HilResult<()>;

    /// RSSI bounds.
    fn gain_check(&self, target: &Target, req: &GainCheckRequest) -> HilResult<()>;

    /// AGC gain bounds.
    fn hardwaregain(&self, target: &Target, req: &HardwareGainRequest) -> HilResult<()>;

    /// Harmonic levels.
    fn harmonics(&self, target: &Target, req: &SpectrumRequest) -> HilResult<()>;

    /// Spurious-free dynamic range.
    fn sfdrl(&self, target: &Target, req: &SpectrumRequest) -> HilResult<()>;

    /// DCXO calibration.
    fn dcxo_calibration(&self, target: &Target, req: &DcxoRequest) -> HilResult<()>;
}

/// Shipped [`Fixtures`] implementation.
pub struct BenchFixtures {
    connector: Arc<dyn Connector>,
    bench: Option<Box<dyn SignalBench>>,
    dcxo: Option<Box<dyn DcxoCalibrator>>,
    sweep: SweepConfig,
    dcxo_overrides: DcxoConfig,
    serial_number: Option<String>,
    settle: Duration,
}

impl BenchFixtures {
    /// Fixtures without collaborators; only attribute checks can run.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            bench: None,
            dcxo: None,
            sweep: SweepConfig::default(),
            dcxo_overrides: DcxoConfig::default(),
            serial_number: None,
            settle: GainConfig::default().settle(),
        }
    }

    /// Attach a signal bench.
    pub fn with_bench(mut self, bench: Box<dyn SignalBench>) -> Self {
        self.bench = Some(bench);
        self
    }

    /// Attach a DCXO calibrator.
    pub fn with_dcxo(mut self, dcxo: Box<dyn DcxoCalibrator>) -> Self {
        self.dcxo = Some(dcxo);
        self
    }

    /// Sweep sampling.
    pub fn with_sweep(mut self, sweep: SweepConfig) -> Self {
        self.sweep = sweep;
        self
    }

    /// DCXO path overrides.
    pub fn with_dcxo_overrides(mut self, overrides: DcxoConfig) -> Self {
        self.dcxo_overrides = overrides;
        self
    }

    /// Board serial number.
    pub fn with_serial_number(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    /// Wait between enabling a tone and reading AGC-controlled levels.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    fn settle(&self) {
        if !self.settle.is_zero() {
            debug!(settle = ?self.settle, "waiting for AGC to settle");
            std::thread::sleep(self.settle);
        }
    }

    fn open(&self, target: &Target) -> HilResult<Box<dyn DeviceFacade>> {
        Ok(target.board.connect(self.connector.as_ref(), &target.uri)?)
    }

    fn bench(&self) -> HilResult<&dyn SignalBench> {
        self.bench
            .as_deref()
            .ok_or_else(|| HilError::missing("signal bench not configured"))
    }

    fn open_configured(&self, target: &Target, params: &ParamSet) -> HilResult<Box<dyn DeviceFacade>> {
        let sdr = self.open(target)?;
        if !params.is_empty() {
            debug!(board = %target.board, count = params.len(), "applying parameter set");
            sdr.apply(params)?;
        }
        Ok(sdr)
    }
}

impl core::fmt::Debug for BenchFixtures {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BenchFixtures")
            .field("bench", &self.bench.is_some())
            .field("dcxo", &self.dcxo.is_some())
            .field("sweep", &self.sweep)
            .field("serial_number", &self.serial_number)
            .field("settle", &self.settle)
            .finish_non_exhaustive()
    }
}

/// Test tone frequency for the board's current receive sample rate.
fn tone_frequency(sdr: &dyn DeviceFacade) -> HilResult<f64> {
    let rate = sdr.get_f64(sdr.board().rx_sample_rate_property())?;
    Ok((rate * TONE_RATE_FRACTION).floor())
}

fn check_tone(quantity: &str, peak: TonePeak, expected: f64) -> Result<(), CheckError> {
    let tol = expected * TONE_FREQUENCY_TOLERANCE;
    if (peak.frequency - expected).abs() < tol {
        Ok(())
    } else {
        Err(CheckError::deviation(quantity, expected, peak.frequency, tol))
    }
}

impl Fixtures for BenchFixtures {
    fn dma_tx(&self, target: &Target, req: &DmaRequest) -> HilResult<()> {
        let bench = self.bench()?;
        let sdr = self.open(target)?;
        bench.dma_tx(sdr.as_ref(), &req.channel.channels())?;
        info!(board = %target.board, channel = %req.channel, "DMA transmit complete");
        Ok(())
    }

    fn dma_rx(&self, target: &Target, req: &DmaRequest) -> HilResult<()> {
        let bench = self.bench()?;
        let sdr = self.open(target)?;
        let magnitude = bench.dma_rx(sdr.as_ref(), &req.channel.channels())?;
        info!(board = %target.board, channel = %req.channel, magnitude, "DMA receive");
        if magnitude > 0.0 {
            Ok(())
        } else {
            Err(CheckError::failed(format!("channel {}: received only zeros", req.channel)).into())
        }
    }

    fn dma_loopback(&self, target: &Target, req: &DmaRequest) -> HilResult<()> {
        let bench = self.bench()?;
        let sdr = self.open(target)?;
        for channel in req.channel.channels() {
            let (chip, _) = sdr.properties().split_channel(channel)?;
            let ctrl = sdr.device(Role::Control, chip)?;
            ctrl.write_debug_attr("loopback", "1")?;
            let result = bench.dma_loopback(sdr.as_ref(), channel);
            if let Err(e) = ctrl.write_debug_attr("loopback", "0") {
                warn!(channel, error = %e, "could not disable digital loopback");
            }
            let mismatches = result?;
            info!(board = %target.board, channel, mismatches, "DMA loopback");
            if mismatches > 0 {
                return Err(CheckError::failed(format!(
                    "channel {channel}: {mismatches} samples differ after loopback"
                ))
                .into());
            }
        }
        Ok(())
    }

    fn dds_loopback(&self, target: &Target, req: &DdsLoopbackRequest) -> HilResult<()> {
        let bench = self.bench()?;
        let sdr = self.open_configured(target, &req.params)?;
        sdr.dds_single_tone(req.frequency, req.scale, req.channel)?;
        let peak = bench.capture_peak(sdr.as_ref(), req.channel)?;
        info!(
            board = %target.board,
            channel = req.channel,
            level = peak.level,
            frequency = peak.frequency,
            "DDS loopback peak"
        );
        if peak.level <= req.peak_min {
            return Err(CheckError::below_minimum("peak level", peak.level, req.peak_min).into());
        }
        check_tone("peak frequency", peak, req.frequency)?;
        Ok(())
    }

    fn cw_loopback(&self, target: &Target, req: &CwLoopbackRequest) -> HilResult<()> {
        let bench = self.bench()?;
        let sdr = self.open_configured(target, &req.params)?;
        let frequency = tone_frequency(sdr.as_ref())?;
        let peak = bench.cw_loopback(sdr.as_ref(), req.channel, frequency)?;
        info!(
            board = %target.board,
            channel = req.channel,
            level = peak.level,
            frequency = peak.frequency,
            "CW loopback peak"
        );
        check_tone("peak frequency", peak, frequency)?;
        Ok(())
    }

    fn attribute_single_value(&self, target: &Target, req: &SweepRequest) -> HilResult<()> {
        let plan = sweep::plan(&req.attr, req.start, req.stop, req.step, &self.sweep)?;
        let sdr = self.open(target)?;
        for value in &plan.points {
            sdr.set(&req.attr, &AttrValue::Float(*value))?;
            let read = sdr.get_f64(&req.attr)?;
            deviation_within(&req.attr, *value, read, req.tol)?;
        }
        info!(
            board = %target.board,
            attr = %req.attr,
            written = plan.points.len(),
            total = plan.total,
            seed = ?plan.seed,
            "attribute sweep passed"
        );
        Ok(())
    }

    fn gain_check(&self, target: &Target, req: &GainCheckRequest) -> HilResult<()> {
        let sdr = self.open_configured(target, &req.params)?;
        let frequency = tone_frequency(sdr.as_ref())?;
        sdr.dds_single_tone(frequency, req.dds_scale, req.channel)?;
        self.settle();
        let name = sdr.properties().channel_property("rssi", req.channel)?;
        let rssi = sdr.get_f64(&name)?;
        info!(board = %target.board, channel = req.channel, rssi, "RSSI");
        within(&name, rssi, req.min_rssi, req.max_rssi)?;
        Ok(())
    }

    fn hardwaregain(&self, target: &Target, req: &HardwareGainRequest) -> HilResult<()> {
        let sdr = self.open_configured(target, &req.params)?;
        sdr.dds_single_tone(req.frequency, req.dds_scale, req.channel)?;
        self.settle();
        let name = sdr.properties().channel_property("rx_hardwaregain", req.channel)?;
        let gain = sdr.get_f64(&name)?;
        info!(board = %target.board, channel = req.channel, gain, "hardware gain");
        within(&name, gain, req.hardwaregain_low, req.hardwaregain_high)?;
        Ok(())
    }

    fn harmonics(&self, target: &Target, req: &SpectrumRequest) -> HilResult<()> {
        let bench = self.bench()?;
        let sdr = self.open_configured(target, &req.params)?;
        sdr.dds_single_tone(req.frequency, req.scale, req.channel)?;
        let levels = bench.harmonic_levels(sdr.as_ref(), req.channel, req.frequency)?;
        info!(board = %target.board, channel = req.channel, ?levels, "harmonic levels");
        all_within("harmonic", &levels, &req.low, &req.high)?;
        Ok(())
    }

    fn sfdrl(&self, target: &Target, req: &SpectrumRequest) -> HilResult<()> {
        let bench = self.bench()?;
        let sdr = self.open_configured(target, &req.params)?;
        sdr.dds_single_tone(req.frequency, req.scale, req.channel)?;
        let levels = bench.spur_levels(sdr.as_ref(), req.channel, req.frequency)?;
        info!(board = %target.board, channel = req.channel, ?levels, "spur levels");
        all_within("peak", &levels, &req.low, &req.high)?;
        Ok(())
    }

    fn dcxo_calibration(&self, target: &Target, req: &DcxoRequest) -> HilResult<()> {
        let calibrator = self
            .dcxo
            .as_deref()
            .ok_or_else(|| HilError::missing("DCXO calibrator not configured"))?;
        let serial = self
            .serial_number
            .as_deref()
            .ok_or_else(|| HilError::config("serial_number is required for DCXO calibration"))?;
        let masterfile = self.dcxo_overrides.masterfile.as_ref().unwrap_or(&req.masterfile);
        let eeprom = self.dcxo_overrides.eeprom_path.as_ref().unwrap_or(&req.eeprom_path);
        info!(
            board = %target.board,
            serial,
            masterfile = %masterfile.display(),
            eeprom = %eeprom.display(),
            "DCXO calibration"
        );
        calibrator
            .calibrate(&target.uri, serial, masterfile, eeprom)
            .context(error_context!(
                "dcxo_calibration",
                "uri" => target.uri.as_str(),
                "serial" => serial
            ))
    }
}
