//! Named board properties and the IIO attributes they map to.
//!
//! Property names are built from a base name, an optional
//! `_chip_b` marker and, for per-channel properties, a `_chanN` suffix
//! (`tx_hardwaregain_chip_b_chan1`). Each board carries a static table of
//! base names; [`PropertyTable::resolve`] turns a full name into the
//! concrete attribute targets.

use core::fmt;

use sdr_hil_errors::DeviceError;

/// Which device of a board an attribute lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Transceiver control/PHY device
    Control,
    /// Receive data path (ADC core)
    RxAdc,
    /// Transmit data path (DAC core, hosts the DDS)
    TxDac,
    /// Housekeeping monitor ADC
    Housekeeping,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Control => "ctrl",
            Role::RxAdc => "rxadc",
            Role::TxDac => "txdac",
            Role::Housekeeping => "housekeeping",
        };
        f.write_str(s)
    }
}

/// Transceiver instance on multi-chip boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Chip {
    /// First (or only) chip
    A,
    /// Second chip
    B,
}

impl Chip {
    /// Suffix inserted into property names.
    pub fn marker(self) -> &'static str {
        match self {
            Chip::A => "",
            Chip::B => "_chip_b",
        }
    }
}

/// Channel naming for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRef {
    /// Always this channel id
    Fixed(&'static str),
    /// `voltage{N}` where N comes from the `_chanN` suffix
    PerChannel,
}

/// One row of a board's property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDef {
    /// Base name without chip or channel suffix
    pub name: &'static str,
    /// Device holding the attribute
    pub role: Role,
    /// Channel id
    pub channel: ChannelRef,
    /// Output channel
    pub output: bool,
    /// sysfs attribute
    pub attr: &'static str,
    /// Write to every chip; reads use chip A
    pub all_chips: bool,
}

const fn def(
    name: &'static str,
    role: Role,
    channel: ChannelRef,
    output: bool,
    attr: &'static str,
) -> PropertyDef {
    PropertyDef {
        name,
        role,
        channel,
        output,
        attr,
        all_chips: false,
    }
}

/// Resolved attribute location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTarget {
    /// Chip
    pub chip: Chip,
    /// Device role
    pub role: Role,
    /// Channel id
    pub channel: String,
    /// Output channel
    pub output: bool,
    /// Attribute name
    pub attr: &'static str,
}

/// All properties of one board.
#[derive(Debug)]
pub struct PropertyTable {
    /// Board tag, used in error messages
    pub board: &'static str,
    /// Chips present
    pub chips: &'static [Chip],
    /// Channels per chip addressable through `_chanN`
    pub channels_per_chip: u32,
    /// Rows
    pub defs: &'static [PropertyDef],
}

struct ParsedName<'a> {
    base: &'a str,
    chip: Chip,
    channel: Option<u32>,
}

fn parse_name(name: &str) -> ParsedName<'_> {
    let (rest, channel) = match name.rsplit_once("_chan") {
        Some((head, digits)) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            (head, digits.parse::<u32>().ok())
        }
        _ => (name, None),
    };
    match rest.strip_suffix(Chip::B.marker()) {
        Some(base) => ParsedName {
            base,
            chip: Chip::B,
            channel,
        },
        None => ParsedName {
            base: rest,
            chip: Chip::A,
            channel,
        },
    }
}

impl PropertyTable {
    /// Map a full property name to its attribute targets.
    ///
    /// Writes go to every returned target, reads use the first.
    pub fn resolve(&self, name: &str) -> Result<Vec<PropertyTarget>, DeviceError> {
        let unknown = || DeviceError::unknown_property(self.board, name);
        let parsed = parse_name(name);
        let def = self
            .defs
            .iter()
            .find(|d| d.name == parsed.base)
            .ok_or_else(unknown)?;
        if !self.chips.contains(&parsed.chip) || (def.all_chips && parsed.chip != Chip::A) {
            return Err(unknown());
        }

        let channel = match (def.channel, parsed.channel) {
            (ChannelRef::Fixed(id), None) => id.to_string(),
            (ChannelRef::PerChannel, Some(n)) if n < self.channels_per_chip => format!("voltage{n}"),
            _ => return Err(unknown()),
        };

        let chips: Vec<Chip> = if def.all_chips {
            self.chips.to_vec()
        } else {
            vec![parsed.chip]
        };
        Ok(chips
            .into_iter()
            .map(|chip| PropertyTarget {
                chip,
                role: def.role,
                channel: channel.clone(),
                output: def.output,
                attr: def.attr,
            })
            .collect())
    }

    /// Property name for a per-channel base on a board-wide channel index.
    ///
    /// Board channel 3 on a two-chip board is `<base>_chip_b_chan1`.
    pub fn channel_property(&self, base: &str, channel: u32) -> Result<String, DeviceError> {
        let (chip, local) = self.split_channel(channel)?;
        Ok(format!("{base}{}_chan{local}", chip.marker()))
    }

    /// Split a board-wide channel index into chip and chip-local index.
    pub fn split_channel(&self, channel: u32) -> Result<(Chip, u32), DeviceError> {
        let per_chip = self.channels_per_chip.max(1);
        let index = usize::try_from(channel / per_chip).unwrap_or(usize::MAX);
        self.chips
            .get(index)
            .map(|chip| (*chip, channel % per_chip))
            .ok_or_else(|| {
                DeviceError::channel_not_found(self.board, format!("board channel {channel}"), false)
            })
    }

    /// Total addressable channels.
    pub fn channel_count(&self) -> u32 {
        self.channels_per_chip * u32::try_from(self.chips.len()).unwrap_or(u32::MAX)
    }
}

use ChannelRef::{Fixed, PerChannel};

/// AD9361 properties shared by both chips of an FMComms5.
pub static FMCOMMS5: PropertyTable = PropertyTable {
    board: "fmcomms5",
    chips: &[Chip::A, Chip::B],
    channels_per_chip: 2,
    defs: &[
        def("rx_lo", Role::Control, Fixed("altvoltage0"), true, "frequency"),
        def("tx_lo", Role::Control, Fixed("altvoltage1"), true, "frequency"),
        PropertyDef {
            all_chips: true,
            ..def("sample_rate", Role::Control, Fixed("voltage0"), false, "sampling_frequency")
        },
        def("rx_rf_bandwidth", Role::Control, Fixed("voltage0"), false, "rf_bandwidth"),
        def("tx_rf_bandwidth", Role::Control, Fixed("voltage0"), true, "rf_bandwidth"),
        def("gain_control_mode", Role::Control, PerChannel, false, "gain_control_mode"),
        def("rx_hardwaregain", Role::Control, PerChannel, false, "hardwaregain"),
        def("tx_hardwaregain", Role::Control, PerChannel, true, "hardwaregain"),
        def("rssi", Role::Control, PerChannel, false, "rssi"),
        def("filter_fir_en", Role::Control, PerChannel, false, "filter_fir_en"),
        def("quadrature_tracking_en", Role::Control, PerChannel, false, "quadrature_tracking_en"),
        def("rf_port_select", Role::Control, PerChannel, false, "rf_port_select"),
        def("tx_rf_port_select", Role::Control, PerChannel, true, "rf_port_select"),
    ],
};

/// DAQ2 properties (AD9680 receive, AD9144 transmit).
pub static DAQ2: PropertyTable = PropertyTable {
    board: "daq2",
    chips: &[Chip::A],
    channels_per_chip: 2,
    defs: &[
        def("rx_sample_rate", Role::RxAdc, Fixed("voltage0"), false, "sampling_frequency"),
        def("tx_sample_rate", Role::TxDac, Fixed("voltage0"), true, "sampling_frequency"),
        def("rx_test_mode", Role::RxAdc, PerChannel, false, "test_mode"),
    ],
};
