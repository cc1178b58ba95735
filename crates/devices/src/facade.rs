//! The board facade trait.

use sdr_hil_errors::DeviceError;
use sdr_hil_iio::{Channel, Context, Device};
use tracing::{debug, info};

use crate::DeviceResult;
use crate::attribute::{AttrValue, ParamSet, parse_reading};
use crate::board::Board;
use crate::property::{Chip, PropertyTable, Role};

/// Phase written to the I tone of a DDS pair, in millidegrees.
pub const DDS_I_PHASE: u32 = 90_000;

/// DDS tone generators per transmit channel (I/Q, two tones each).
pub const DDS_PER_CHANNEL: u32 = 4;

/// Typed access to one board over an open context.
///
/// Implementors supply the context, the property table and the device for
/// each role; everything else is provided on top of those.
pub trait DeviceFacade {
    /// Board variant.
    fn board(&self) -> Board;

    /// Underlying context.
    fn context(&self) -> &Context;

    /// Property table.
    fn properties(&self) -> &'static PropertyTable;

    /// Device name for `role` on `chip`, if the board has one.
    fn device_name(&self, role: Role, chip: Chip) -> Option<&str>;

    /// Device for `role` on `chip`.
    fn device(&self, role: Role, chip: Chip) -> DeviceResult<Device<'_>> {
        let name = self.device_name(role, chip).ok_or_else(|| {
            DeviceError::not_found(format!("{} has no {role} device on chip {chip:?}", self.board()))
        })?;
        self.context().device(name)
    }

    /// Channel `id` of the `role` device on `chip`.
    fn find_channel(&self, role: Role, chip: Chip, id: &str, output: bool) -> DeviceResult<Channel<'_>> {
        self.device(role, chip)?.channel(id, output)
    }

    /// Write a named property.
    fn set(&self, name: &str, value: &AttrValue) -> DeviceResult<()> {
        let raw = value.to_attr_string();
        for target in self.properties().resolve(name)? {
            debug!(property = name, chip = ?target.chip, value = %raw, "set");
            self.find_channel(target.role, target.chip, &target.channel, target.output)?
                .write_attr(target.attr, &raw)?;
        }
        Ok(())
    }

    /// Read a named property as text.
    fn get(&self, name: &str) -> DeviceResult<String> {
        let targets = self.properties().resolve(name)?;
        let target = targets
            .first()
            .ok_or_else(|| DeviceError::unknown_property(self.properties().board, name))?;
        self.find_channel(target.role, target.chip, &target.channel, target.output)?
            .read_attr(target.attr)
    }

    /// Read a named property as a number.
    fn get_f64(&self, name: &str) -> DeviceResult<f64> {
        let raw = self.get(name)?;
        parse_reading(name, &raw)
    }

    /// Apply every assignment of `params`, in order.
    fn apply(&self, params: &ParamSet) -> DeviceResult<()> {
        for (name, value) in params.iter() {
            self.set(name, value)?;
        }
        Ok(())
    }

    /// Write a raw attribute on a control device channel.
    fn set_iio_attr(&self, channel: &str, attr: &str, output: bool, value: &AttrValue, chip: Chip) -> DeviceResult<()> {
        debug!(channel, attr, output, ?chip, value = %value, "set_iio_attr");
        self.find_channel(Role::Control, chip, channel, output)?
            .write_attr(attr, &value.to_attr_string())
    }

    /// Read a raw attribute from a control device channel.
    fn get_iio_attr(&self, channel: &str, attr: &str, output: bool, chip: Chip) -> DeviceResult<String> {
        self.find_channel(Role::Control, chip, channel, output)?
            .read_attr(attr)
    }

    /// Emit a single complex tone on a transmit channel, muting every other
    /// DDS first.
    fn dds_single_tone(&self, frequency: f64, scale: f64, channel: u32) -> DeviceResult<()> {
        let (chip, local) = self.properties().split_channel(channel)?;
        self.disable_dds()?;
        let dac = self.device(Role::TxDac, chip)?;
        let base = local * DDS_PER_CHANNEL;
        // I on the first tone of the pair, Q two generators later
        for (offset, phase) in [(0, DDS_I_PHASE), (2, 0)] {
            let tone = dac.channel(&format!("altvoltage{}", base + offset), true)?;
            tone.write_attr("frequency", &AttrValue::Float(frequency).to_attr_string())?;
            tone.write_attr("scale", &AttrValue::Float(scale).to_attr_string())?;
            tone.write_attr("phase", &phase.to_string())?;
            tone.write_attr("raw", "1")?;
        }
        info!(board = %self.board(), channel, frequency, scale, "DDS single tone");
        Ok(())
    }

    /// Zero the scale of every DDS generator on every chip.
    fn disable_dds(&self) -> DeviceResult<()> {
        for chip in self.properties().chips {
            let dac = self.device(Role::TxDac, *chip)?;
            for tone in dac.channels() {
                if tone.is_output() && tone.id().starts_with("altvoltage") && tone.has_attr("scale") {
                    tone.write_attr("scale", "0")?;
                }
            }
        }
        Ok(())
    }
}
