//! Board facades for the SDR HIL suite.
//!
//! A facade owns one IIO [`Context`](sdr_hil_iio::Context) and exposes the
//! board as named properties (`rx_lo`, `tx_hardwaregain_chip_b_chan0`, ...)
//! plus raw attribute and DDS access. Boards are selected through the
//! [`Board`] enum rather than by class name.
//!
//! # Example
//!
//! ```
//! use sdr_hil_devices::{AttrValue, Board, sim};
//!
//! # fn main() -> Result<(), sdr_hil_errors::DeviceError> {
//! let backend = sim::fmcomms5();
//! let sdr = Board::Fmcomms5.open(backend.open("mock:fmcomms5")?)?;
//! sdr.set("tx_lo", &AttrValue::Int(2_400_000_000))?;
//! assert_eq!(sdr.get("tx_lo")?, "2400000000");
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod attribute;
pub mod board;
pub mod daq2;
pub mod facade;
pub mod fmcomms5;
pub mod property;
pub mod sim;

pub use attribute::{AttrValue, ChannelSelector, ParamSet, parse_reading};
pub use board::Board;
pub use daq2::Daq2;
pub use facade::DeviceFacade;
pub use fmcomms5::Fmcomms5;
pub use property::{Chip, PropertyTable, Role};

pub use sdr_hil_iio::DeviceResult;
