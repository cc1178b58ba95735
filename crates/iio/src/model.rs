//! Static description of an IIO context: devices, channels and the
//! attributes each exposes.
//!
//! The description is read once when a context is opened (the iiod `PRINT`
//! XML, or a hand-built tree for the in-memory backend) and never changes
//! afterwards. Attribute *values* are not part of it.

use core::fmt;

/// Channel direction as seen from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// ADC side, samples flow to the host
    Input,
    /// DAC side, samples flow to the device
    Output,
}

impl Direction {
    /// Build from the `output` flag used throughout the facades.
    pub fn from_output(output: bool) -> Self {
        if output {
            Direction::Output
        } else {
            Direction::Input
        }
    }

    /// True for [`Direction::Output`].
    pub fn is_output(self) -> bool {
        matches!(self, Direction::Output)
    }

    /// Keyword used by the iiod protocol.
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Input => "INPUT",
            Direction::Output => "OUTPUT",
        }
    }

    /// sysfs style prefix (`in` / `out`).
    pub fn prefix(self) -> &'static str {
        match self {
            Direction::Input => "in",
            Direction::Output => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// One channel of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Channel id, e.g. `voltage0` or `altvoltage1`
    pub id: String,
    /// Optional extended name, e.g. `TX_LO`
    pub name: Option<String>,
    /// Direction
    pub direction: Direction,
    /// Attribute names in declaration order
    pub attrs: Vec<String>,
}

impl ChannelInfo {
    /// New input channel without attributes.
    pub fn input(id: impl Into<String>) -> Self {
        Self::new(id, Direction::Input)
    }

    /// New output channel without attributes.
    pub fn output(id: impl Into<String>) -> Self {
        Self::new(id, Direction::Output)
    }

    /// New channel.
    pub fn new(id: impl Into<String>, direction: Direction) -> Self {
        Self {
            id: id.into(),
            name: None,
            direction,
            attrs: Vec::new(),
        }
    }

    /// Set the extended name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append attributes.
    pub fn with_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attrs.extend(attrs.into_iter().map(Into::into));
        self
    }

    /// Matches by id or extended name, and direction.
    pub fn matches(&self, id_or_name: &str, output: bool) -> bool {
        self.direction.is_output() == output
            && (self.id == id_or_name || self.name.as_deref() == Some(id_or_name))
    }

    /// Whether the channel exposes `attr`.
    pub fn has_attr(&self, attr: &str) -> bool {
        self.attrs.iter().any(|a| a == attr)
    }
}

/// One IIO device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Device id, e.g. `iio:device1`
    pub id: String,
    /// Driver name, e.g. `ad9361-phy`
    pub name: Option<String>,
    /// Optional label
    pub label: Option<String>,
    /// Device attributes
    pub attrs: Vec<String>,
    /// Debug attributes
    pub debug_attrs: Vec<String>,
    /// Buffer attributes
    pub buffer_attrs: Vec<String>,
    /// Channels in declaration order
    pub channels: Vec<ChannelInfo>,
}

impl DeviceInfo {
    /// New device.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            label: None,
            attrs: Vec::new(),
            debug_attrs: Vec::new(),
            buffer_attrs: Vec::new(),
            channels: Vec::new(),
        }
    }

    /// Append device attributes.
    pub fn with_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attrs.extend(attrs.into_iter().map(Into::into));
        self
    }

    /// Append debug attributes.
    pub fn with_debug_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.debug_attrs.extend(attrs.into_iter().map(Into::into));
        self
    }

    /// Append a channel.
    pub fn with_channel(mut self, channel: ChannelInfo) -> Self {
        self.channels.push(channel);
        self
    }

    /// Name if present, otherwise id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Matches by id, name or label.
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.name.as_deref() == Some(key) || self.label.as_deref() == Some(key)
    }

    /// Find a channel by id or extended name and direction.
    pub fn find_channel(&self, id_or_name: &str, output: bool) -> Option<&ChannelInfo> {
        self.channels.iter().find(|c| c.matches(id_or_name, output))
    }
}

/// Whole context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextDescription {
    /// Backend name reported by the context, e.g. `network`
    pub name: String,
    /// Free-form description (kernel, board)
    pub description: String,
    /// Context attributes (`hw_carrier`, `serial`, ...)
    pub attrs: Vec<(String, String)>,
    /// Devices
    pub devices: Vec<DeviceInfo>,
}

impl ContextDescription {
    /// New empty context.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a device.
    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.devices.push(device);
        self
    }

    /// Append a context attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    /// Find a device by id, name or label.
    pub fn find_device(&self, key: &str) -> Option<&DeviceInfo> {
        self.devices.iter().find(|d| d.matches(key))
    }

    /// Look up a context attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phy() -> DeviceInfo {
        DeviceInfo::new("iio:device1", "ad9361-phy")
            .with_channel(ChannelInfo::input("voltage0").with_attrs(["hardwaregain", "rssi"]))
            .with_channel(ChannelInfo::output("voltage0").with_attrs(["hardwaregain"]))
            .with_channel(
                ChannelInfo::output("altvoltage0")
                    .named("RX_LO")
                    .with_attrs(["frequency"]),
            )
    }

    #[test]
    fn test_find_channel_respects_direction() {
        let dev = phy();
        let input = dev.find_channel("voltage0", false);
        let output = dev.find_channel("voltage0", true);
        assert!(input.is_some_and(|c| c.has_attr("rssi")));
        assert!(output.is_some_and(|c| !c.has_attr("rssi")));
    }

    #[test]
    fn test_find_channel_by_extended_name() {
        let dev = phy();
        assert!(dev.find_channel("RX_LO", true).is_some());
        assert!(dev.find_channel("RX_LO", false).is_none());
    }

    #[test]
    fn test_find_device_by_id_or_name() {
        let ctx = ContextDescription::new("mock").with_device(phy());
        assert!(ctx.find_device("ad9361-phy").is_some());
        assert!(ctx.find_device("iio:device1").is_some());
        assert!(ctx.find_device("ad9361-phy-B").is_none());
    }
}
