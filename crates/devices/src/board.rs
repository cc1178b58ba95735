//! Board variants and facade construction.

use core::fmt;
use core::str::FromStr;

use sdr_hil_errors::DeviceError;
use sdr_hil_iio::{Connector, Context};
use serde::{Deserialize, Serialize};

use crate::DeviceResult;
use crate::daq2::Daq2;
use crate::facade::DeviceFacade;
use crate::fmcomms5::Fmcomms5;
use crate::property::{self, PropertyTable};

/// Supported boards.
///
/// The tag is what hardware descriptors carry in their `hw` field. The
/// class name (`adi.FMComms5`) is accepted on the command line and shown
/// in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Board {
    /// Dual AD9361 transceiver board
    Fmcomms5,
    /// AD9680 ADC + AD9144 DAC board
    Daq2,
}

impl Board {
    /// Every board, in report order.
    pub const ALL: [Board; 2] = [Board::Fmcomms5, Board::Daq2];

    /// Hardware tag matched against descriptors.
    pub fn tag(self) -> &'static str {
        match self {
            Board::Fmcomms5 => "fmcomms5",
            Board::Daq2 => "daq2",
        }
    }

    /// Facade class name.
    pub fn classname(self) -> &'static str {
        match self {
            Board::Fmcomms5 => "adi.FMComms5",
            Board::Daq2 => "adi.DAQ2",
        }
    }

    /// Property table.
    pub fn properties(self) -> &'static PropertyTable {
        match self {
            Board::Fmcomms5 => &property::FMCOMMS5,
            Board::Daq2 => &property::DAQ2,
        }
    }

    /// Property holding the receive sample rate.
    pub fn rx_sample_rate_property(self) -> &'static str {
        match self {
            Board::Fmcomms5 => "sample_rate",
            Board::Daq2 => "rx_sample_rate",
        }
    }

    /// Wrap an open context in this board's facade.
    ///
    /// Fails with [`DeviceError::NotFound`] when a required device is absent
    /// from the context.
    pub fn open(self, ctx: Context) -> DeviceResult<Box<dyn DeviceFacade>> {
        match self {
            Board::Fmcomms5 => Ok(Box::new(Fmcomms5::new(ctx)?)),
            Board::Daq2 => Ok(Box::new(Daq2::new(ctx)?)),
        }
    }

    /// Connect to `uri` and open the facade.
    pub fn connect(self, connector: &dyn Connector, uri: &str) -> DeviceResult<Box<dyn DeviceFacade>> {
        self.open(connector.connect(uri)?)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Board {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::ALL
            .into_iter()
            .find(|b| b.tag() == s || b.classname() == s)
            .ok_or_else(|| DeviceError::not_found(format!("board '{s}'")))
    }
}

/// Fail unless every listed device is present in `ctx`.
pub(crate) fn require_devices(board: Board, ctx: &Context, names: &[&str]) -> DeviceResult<()> {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|n| ctx.find_device(n).is_none())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DeviceError::not_found(format!(
            "{board} context {} lacks {}",
            ctx.uri(),
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_and_classname() {
        assert_eq!(Board::Fmcomms5.tag(), "fmcomms5");
        assert_eq!(Board::Daq2.classname(), "adi.DAQ2");
    }

    #[test]
    fn test_from_str_accepts_tag_or_classname() -> Result<(), DeviceError> {
        assert_eq!("daq2".parse::<Board>()?, Board::Daq2);
        assert_eq!("adi.FMComms5".parse::<Board>()?, Board::Fmcomms5);
        assert!("pluto".parse::<Board>().is_err());
        Ok(())
    }

    #[test]
    fn test_serde_uses_tag() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&Board::Fmcomms5)?, "\"fmcomms5\"");
        let b: Board = serde_json::from_str("\"daq2\"")?;
        assert_eq!(b, Board::Daq2);
        Ok(())
    }
}
