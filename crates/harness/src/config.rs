//! Session configuration: which boards are attached and where.
//!
//! Loaded once at start-up from `hil.yaml` / `hil.json` (format chosen by
//! extension) and then passed by reference to everything that needs it.
//!
//! ```yaml
//! contexts:
//!   - hw: fmcomms5
//!     uri: ip:192.168.2.1
//! serial_number: "0123456789"
//! sweep:
//!   max_points: 128
//!   seed: 7
//! gain:
//!   settle_ms: 3000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use sdr_hil_errors::{HilError, HilResult, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default cap on written values per attribute sweep.
pub const DEFAULT_SWEEP_POINTS: usize = 256;

/// Default wait for the AGC after enabling a test tone, in milliseconds.
pub const DEFAULT_AGC_SETTLE_MS: u64 = 3000;

fn default_true() -> bool {
    true
}

/// One attached (or expected) board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareDescriptor {
    /// Board tag, e.g. `fmcomms5`
    pub hw: String,
    /// Context URI, e.g. `ip:192.168.2.1`
    pub uri: String,
    /// Whether the board is actually reachable for this session
    #[serde(default = "default_true")]
    pub present: bool,
}

impl HardwareDescriptor {
    /// Present descriptor.
    pub fn new(hw: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            hw: hw.into(),
            uri: uri.into(),
            present: true,
        }
    }

    /// Mark as absent.
    pub fn absent(mut self) -> Self {
        self.present = false;
        self
    }
}

/// Attribute sweep sampling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Sweeps with more steps than this are randomly sampled
    pub max_points: usize,
    /// Sampling seed; random per sweep when unset
    pub seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_SWEEP_POINTS,
            seed: None,
        }
    }
}

/// Overrides for the DCXO calibration scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcxoConfig {
    /// Boot image holding the master calibration
    pub masterfile: Option<PathBuf>,
    /// EEPROM the result is written to
    pub eeprom_path: Option<PathBuf>,
}

/// Receive gain measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainConfig {
    /// Time the AGC gets to converge on a new tone before RSSI or
    /// hardware gain is read
    pub settle_ms: u64,
}

impl GainConfig {
    /// [`GainConfig::settle_ms`] as a duration.
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for GainConfig {
    fn default() -> Self {
        Self {
            settle_ms: DEFAULT_AGC_SETTLE_MS,
        }
    }
}

/// Whole session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HilConfig {
    /// Hardware descriptors
    pub contexts: Vec<HardwareDescriptor>,
    /// Board serial number, needed by DCXO calibration
    pub serial_number: Option<String>,
    /// Sweep sampling
    pub sweep: SweepConfig,
    /// DCXO overrides
    pub dcxo: DcxoConfig,
    /// AGC settle timing
    pub gain: GainConfig,
}

impl HilConfig {
    /// Load from a YAML or JSON file.
    pub fn load(path: &Path) -> HilResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config = match ext.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&raw)?,
            Some("json") => Self::from_json_str(&raw)?,
            _ => {
                return Err(HilError::config(format!(
                    "{}: expected a .yaml, .yml or .json file",
                    path.display()
                )));
            }
        };
        debug!(path = %path.display(), contexts = config.contexts.len(), "loaded configuration");
        Ok(config)
    }

    /// Parse YAML.
    pub fn from_yaml_str(raw: &str) -> HilResult<Self> {
        let config: Self =
            serde_yaml::from_str(raw).map_err(|e| HilError::config(format!("invalid YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON.
    pub fn from_json_str(raw: &str) -> HilResult<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| HilError::config(format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Append a descriptor.
    pub fn with_descriptor(mut self, descriptor: HardwareDescriptor) -> Self {
        self.contexts.push(descriptor);
        self
    }

    /// Reject descriptors without a tag or URI and a zero sweep cap.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (i, ctx) in self.contexts.iter().enumerate() {
            if ctx.hw.trim().is_empty() {
                return Err(ValidationError::required(format!("contexts[{i}].hw")));
            }
            if ctx.uri.trim().is_empty() {
                return Err(ValidationError::required(format!("contexts[{i}].uri")));
            }
        }
        if self.sweep.max_points == 0 {
            return Err(ValidationError::out_of_range(
                "sweep.max_points",
                0,
                1,
                usize::MAX,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_defaults() -> HilResult<()> {
        let config = HilConfig::from_yaml_str(
            "contexts:\n  - hw: fmcomms5\n    uri: ip:192.168.2.1\n",
        )?;
        assert_eq!(config.contexts, vec![HardwareDescriptor::new("fmcomms5", "ip:192.168.2.1")]);
        assert_eq!(config.sweep.max_points, DEFAULT_SWEEP_POINTS);
        assert!(config.serial_number.is_none());
        assert_eq!(config.gain.settle(), Duration::from_secs(3));
        Ok(())
    }

    #[test]
    fn test_gain_settle_override() -> HilResult<()> {
        let config = HilConfig::from_yaml_str("gain:\n  settle_ms: 250\n")?;
        assert_eq!(config.gain.settle(), Duration::from_millis(250));
        Ok(())
    }

    #[test]
    fn test_json_with_absent_board() -> HilResult<()> {
        let config = HilConfig::from_json_str(
            r#"{"contexts":[{"hw":"daq2","uri":"ip:10.0.0.2","present":false}],"sweep":{"seed":3}}"#,
        )?;
        assert!(config.contexts.iter().all(|c| !c.present));
        assert_eq!(config.sweep.seed, Some(3));
        Ok(())
    }

    #[test]
    fn test_empty_uri_rejected() {
        let err = HilConfig::from_yaml_str("contexts:\n  - hw: daq2\n    uri: ''\n").err();
        assert!(matches!(err, Some(HilError::Validation(ValidationError::Required(f))) if f == "contexts[0].uri"));
    }

    #[test]
    fn test_zero_sweep_points_rejected() {
        assert!(HilConfig::from_yaml_str("sweep:\n  max_points: 0\n").is_err());
    }

    #[test]
    fn test_unknown_extension() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hil.toml");
        std::fs::write(&path, "contexts = []")?;
        let err = HilConfig::load(&path).err();
        assert!(matches!(err, Some(HilError::Config(_))));
        Ok(())
    }

    #[test]
    fn test_load_yaml_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hil.yml");
        std::fs::write(&path, "contexts:\n  - hw: daq2\n    uri: ip:10.0.0.2\n")?;
        let config = HilConfig::load(&path)?;
        assert_eq!(config.contexts.len(), 1);
        Ok(())
    }
}
