//! FMComms5: two AD9361 transceivers on one carrier.

use sdr_hil_iio::Context;

use crate::DeviceResult;
use crate::board::{Board, require_devices};
use crate::facade::DeviceFacade;
use crate::property::{self, Chip, PropertyTable, Role};

/// Control device of chip A.
pub const CTRL: &str = "ad9361-phy";
/// Control device of chip B.
pub const CTRL_B: &str = "ad9361-phy-B";
/// Receive core of chip A.
pub const RXADC: &str = "cf-ad9361-A";
/// Receive core of chip B.
pub const RXADC_B: &str = "cf-ad9361-B";
/// Transmit core of chip A.
pub const TXDAC: &str = "cf-ad9361-dds-core-lpc";
/// Transmit core of chip B.
pub const TXDAC_B: &str = "cf-ad9361-dds-core-B";
/// Housekeeping ADC on the carrier.
pub const AD7291: &str = "ad7291";

/// FMComms5 facade.
#[derive(Debug)]
pub struct Fmcomms5 {
    ctx: Context,
}

impl Fmcomms5 {
    /// Wrap `ctx`; all six transceiver devices must be present.
    pub fn new(ctx: Context) -> DeviceResult<Self> {
        require_devices(
            Board::Fmcomms5,
            &ctx,
            &[CTRL, CTRL_B, RXADC, RXADC_B, TXDAC, TXDAC_B],
        )?;
        Ok(Self { ctx })
    }

    /// Consume the facade, returning the context.
    pub fn into_context(self) -> Context {
        self.ctx
    }
}

impl DeviceFacade for Fmcomms5 {
    fn board(&self) -> Board {
        Board::Fmcomms5
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn properties(&self) -> &'static PropertyTable {
        &property::FMCOMMS5
    }

    fn device_name(&self, role: Role, chip: Chip) -> Option<&str> {
        match (role, chip) {
            (Role::Control, Chip::A) => Some(CTRL),
            (Role::Control, Chip::B) => Some(CTRL_B),
            (Role::RxAdc, Chip::A) => Some(RXADC),
            (Role::RxAdc, Chip::B) => Some(RXADC_B),
            (Role::TxDac, Chip::A) => Some(TXDAC),
            (Role::TxDac, Chip::B) => Some(TXDAC_B),
            (Role::Housekeeping, Chip::A) => Some(AD7291),
            (Role::Housekeeping, Chip::B) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttrValue, ParamSet};
    use crate::sim;
    use sdr_hil_errors::DeviceError;
    use sdr_hil_iio::AttrPath;

    fn open() -> DeviceResult<(sdr_hil_iio::mock::MockBackend, Fmcomms5)> {
        let backend = sim::fmcomms5();
        let facade = Fmcomms5::new(backend.open("mock:fmcomms5")?)?;
        Ok((backend, facade))
    }

    #[test]
    fn test_set_and_get_lo() -> DeviceResult<()> {
        let (_, sdr) = open()?;
        sdr.set("rx_lo", &AttrValue::Int(2_450_000_000))?;
        assert_eq!(sdr.get("rx_lo")?, "2450000000");
        Ok(())
    }

    #[test]
    fn test_sample_rate_written_to_both_chips() -> DeviceResult<()> {
        let (backend, sdr) = open()?;
        sdr.set("sample_rate", &AttrValue::Int(30_720_000))?;
        let writes = backend.writes_to("sampling_frequency");
        let devices: Vec<&str> = writes.iter().map(|(p, _)| p.device.as_str()).collect();
        assert_eq!(devices, vec![sim::CTRL_ID, sim::CTRL_B_ID]);
        Ok(())
    }

    #[test]
    fn test_chip_b_hardwaregain_quantized() -> DeviceResult<()> {
        let (_, sdr) = open()?;
        sdr.set("tx_hardwaregain_chip_b_chan1", &AttrValue::Float(-10.1))?;
        let read = sdr.get_f64("tx_hardwaregain_chip_b_chan1")?;
        assert!((read + 10.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_apply_in_declaration_order() -> Result<(), Box<dyn std::error::Error>> {
        let (backend, sdr) = open()?;
        let params = ParamSet::new()
            .with("tx_lo", 2_400_000_000_i64)?
            .with("gain_control_mode_chan0", "slow_attack")?
            .with("tx_hardwaregain_chan0", -10_i32)?;
        sdr.apply(&params)?;
        let attrs: Vec<String> = backend.writes().into_iter().map(|(p, _)| p.attr).collect();
        assert_eq!(attrs, vec!["frequency", "gain_control_mode", "hardwaregain"]);
        Ok(())
    }

    #[test]
    fn test_dds_single_tone_chip_b() -> DeviceResult<()> {
        let (backend, sdr) = open()?;
        sdr.dds_single_tone(3_072_000.0, 0.125, 3)?;
        let i_tone = AttrPath::channel(sim::TXDAC_B_ID, "altvoltage4", true, "phase");
        let q_tone = AttrPath::channel(sim::TXDAC_B_ID, "altvoltage6", true, "scale");
        let muted = AttrPath::channel(sim::TXDAC_ID, "altvoltage0", true, "scale");
        assert_eq!(backend.value(&i_tone).as_deref(), Some("90000"));
        assert_eq!(backend.value(&q_tone).as_deref(), Some("0.125"));
        assert_eq!(backend.value(&muted).as_deref(), Some("0"));
        Ok(())
    }

    #[test]
    fn test_missing_chip_b_rejected() -> DeviceResult<()> {
        let backend = sim::fmcomms5_without(CTRL_B);
        let err = Fmcomms5::new(backend.open("mock:half")?).err();
        assert!(matches!(err, Some(DeviceError::NotFound(msg)) if msg.contains(CTRL_B)));
        Ok(())
    }

    #[test]
    fn test_raw_attr_on_chip_b_control() -> DeviceResult<()> {
        let (backend, sdr) = open()?;
        sdr.set_iio_attr("out", "voltage_filter_fir_en", false, &AttrValue::Bool(false), Chip::B)?;
        let path = AttrPath::channel(sim::CTRL_B_ID, "out", false, "voltage_filter_fir_en");
        assert_eq!(backend.value(&path).as_deref(), Some("0"));
        Ok(())
    }
}
