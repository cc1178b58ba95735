//! DAQ2: AD9680 dual ADC and AD9144 quad DAC behind JESD204B.

use sdr_hil_iio::Context;

use crate::DeviceResult;
use crate::board::{Board, require_devices};
use crate::facade::DeviceFacade;
use crate::property::{self, Chip, PropertyTable, Role};

/// Receive core.
pub const RXADC: &str = "axi-ad9680-hpc";
/// Transmit core, hosts the DDS.
pub const TXDAC: &str = "axi-ad9144-hpc";

/// DAQ2 facade. The board has no separate control device; the data cores
/// carry their own configuration attributes.
#[derive(Debug)]
pub struct Daq2 {
    ctx: Context,
}

impl Daq2 {
    /// Wrap `ctx`; both data cores must be present.
    pub fn new(ctx: Context) -> DeviceResult<Self> {
        require_devices(Board::Daq2, &ctx, &[RXADC, TXDAC])?;
        Ok(Self { ctx })
    }
}

impl DeviceFacade for Daq2 {
    fn board(&self) -> Board {
        Board::Daq2
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn properties(&self) -> &'static PropertyTable {
        &property::DAQ2
    }

    fn device_name(&self, role: Role, chip: Chip) -> Option<&str> {
        match (role, chip) {
            (Role::RxAdc, Chip::A) => Some(RXADC),
            (Role::TxDac, Chip::A) => Some(TXDAC),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttrValue;
    use crate::sim;
    use sdr_hil_errors::DeviceError;

    #[test]
    fn test_sample_rates_live_on_data_cores() -> DeviceResult<()> {
        let backend = sim::daq2();
        let sdr = Daq2::new(backend.open("mock:daq2")?)?;
        assert!((sdr.get_f64("rx_sample_rate")? - 1_000_000_000.0).abs() < 1.0);
        sdr.set("tx_sample_rate", &AttrValue::Int(1_000_000_000))?;
        assert_eq!(backend.writes_to("sampling_frequency").len(), 1);
        Ok(())
    }

    #[test]
    fn test_no_control_device() -> DeviceResult<()> {
        let sdr = Daq2::new(sim::daq2().open("mock:daq2")?)?;
        let err = sdr
            .set_iio_attr("voltage0", "hardwaregain", false, &AttrValue::Int(0), Chip::A)
            .err();
        assert!(matches!(err, Some(DeviceError::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_dds_tone_channel_one() -> DeviceResult<()> {
        let backend = sim::daq2();
        let sdr = Daq2::new(backend.open("mock:daq2")?)?;
        sdr.dds_single_tone(10_000_000.0, 0.5, 1)?;
        let tones: Vec<String> = backend
            .writes_to("frequency")
            .into_iter()
            .map(|(p, v)| format!("{p}={v}"))
            .collect();
        assert_eq!(
            tones,
            vec![
                format!("{}/out_altvoltage4/frequency=10000000", sim::DAQ2_TXDAC_ID),
                format!("{}/out_altvoltage6/frequency=10000000", sim::DAQ2_TXDAC_ID),
            ]
        );
        assert!(sdr.dds_single_tone(10_000_000.0, 0.5, 2).is_err());
        Ok(())
    }
}
