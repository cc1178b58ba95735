//! Live context handle with borrowed device and channel views.

use parking_lot::Mutex;
use sdr_hil_errors::DeviceError;
use tracing::{debug, trace};

use crate::DeviceResult;
use crate::backend::{AttrPath, IioBackend};
use crate::model::{ChannelInfo, ContextDescription, DeviceInfo, Direction};

/// An open IIO context.
///
/// Owns the backend exclusively; device and channel views borrow the context
/// and funnel every attribute access through the same backend.
pub struct Context {
    uri: String,
    description: ContextDescription,
    backend: Mutex<Box<dyn IioBackend>>,
}

impl Context {
    /// Wrap a backend, reading its description once.
    pub fn new(uri: impl Into<String>, mut backend: Box<dyn IioBackend>) -> DeviceResult<Self> {
        let uri = uri.into();
        let description = backend.describe()?;
        debug!(
            uri = %uri,
            devices = description.devices.len(),
            "opened IIO context"
        );
        Ok(Self {
            uri,
            description,
            backend: Mutex::new(backend),
        })
    }

    /// URI the context was opened from.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Static description.
    pub fn description(&self) -> &ContextDescription {
        &self.description
    }

    /// All devices.
    pub fn devices(&self) -> impl Iterator<Item = Device<'_>> {
        self.description
            .devices
            .iter()
            .map(move |info| Device { ctx: self, info })
    }

    /// Find a device by id, name or label.
    pub fn find_device(&self, key: &str) -> Option<Device<'_>> {
        self.description
            .find_device(key)
            .map(|info| Device { ctx: self, info })
    }

    /// Like [`Context::find_device`] but missing devices are an error.
    pub fn device(&self, key: &str) -> DeviceResult<Device<'_>> {
        self.find_device(key)
            .ok_or_else(|| DeviceError::not_found(key))
    }

    fn read(&self, path: &AttrPath) -> DeviceResult<String> {
        let value = self.backend.lock().read_attr(path)?;
        trace!(%path, %value, "read");
        Ok(value)
    }

    fn write(&self, path: &AttrPath, value: &str) -> DeviceResult<()> {
        trace!(%path, %value, "write");
        self.backend.lock().write_attr(path, value)
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("uri", &self.uri)
            .field("devices", &self.description.devices.len())
            .finish()
    }
}

/// Borrowed device view.
#[derive(Clone, Copy)]
pub struct Device<'a> {
    ctx: &'a Context,
    info: &'a DeviceInfo,
}

impl<'a> Device<'a> {
    /// Device id.
    pub fn id(&self) -> &'a str {
        &self.info.id
    }

    /// Driver name, or id when unnamed.
    pub fn name(&self) -> &'a str {
        self.info.display_name()
    }

    /// Static description.
    pub fn info(&self) -> &'a DeviceInfo {
        self.info
    }

    /// Channels in declaration order.
    pub fn channels(&self) -> impl Iterator<Item = Channel<'a>> + use<'a> {
        let ctx = self.ctx;
        let device = self.info;
        device
            .channels
            .iter()
            .map(move |info| Channel { ctx, device, info })
    }

    /// Find a channel by id or extended name.
    pub fn find_channel(&self, id: &str, output: bool) -> Option<Channel<'a>> {
        self.info.find_channel(id, output).map(|info| Channel {
            ctx: self.ctx,
            device: self.info,
            info,
        })
    }

    /// Like [`Device::find_channel`] but missing channels are an error.
    pub fn channel(&self, id: &str, output: bool) -> DeviceResult<Channel<'a>> {
        self.find_channel(id, output)
            .ok_or_else(|| DeviceError::channel_not_found(self.name(), id, output))
    }

    /// Read a device attribute.
    pub fn read_attr(&self, attr: &str) -> DeviceResult<String> {
        if !self.info.attrs.iter().any(|a| a == attr) {
            return Err(DeviceError::attribute_not_found(self.name(), attr));
        }
        self.ctx.read(&AttrPath::device(&self.info.id, attr))
    }

    /// Write a device attribute.
    pub fn write_attr(&self, attr: &str, value: &str) -> DeviceResult<()> {
        if !self.info.attrs.iter().any(|a| a == attr) {
            return Err(DeviceError::attribute_not_found(self.name(), attr));
        }
        self.ctx.write(&AttrPath::device(&self.info.id, attr), value)
    }

    /// Read a debug attribute.
    pub fn read_debug_attr(&self, attr: &str) -> DeviceResult<String> {
        if !self.info.debug_attrs.iter().any(|a| a == attr) {
            return Err(DeviceError::attribute_not_found(
                format!("{}/debug", self.name()),
                attr,
            ));
        }
        self.ctx.read(&AttrPath::debug(&self.info.id, attr))
    }

    /// Write a debug attribute.
    pub fn write_debug_attr(&self, attr: &str, value: &str) -> DeviceResult<()> {
        if !self.info.debug_attrs.iter().any(|a| a == attr) {
            return Err(DeviceError::attribute_not_found(
                format!("{}/debug", self.name()),
                attr,
            ));
        }
        self.ctx.write(&AttrPath::debug(&self.info.id, attr), value)
    }
}

/// Borrowed channel view.
#[derive(Clone, Copy)]
pub struct Channel<'a> {
    ctx: &'a Context,
    device: &'a DeviceInfo,
    info: &'a ChannelInfo,
}

impl<'a> Channel<'a> {
    /// Channel id.
    pub fn id(&self) -> &'a str {
        &self.info.id
    }

    /// Extended name.
    pub fn name(&self) -> Option<&'a str> {
        self.info.name.as_deref()
    }

    /// Direction.
    pub fn direction(&self) -> Direction {
        self.info.direction
    }

    /// True for output channels.
    pub fn is_output(&self) -> bool {
        self.info.direction.is_output()
    }

    /// Attribute names.
    pub fn attrs(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.info.attrs.iter().map(String::as_str)
    }

    /// Whether the channel exposes `attr`.
    pub fn has_attr(&self, attr: &str) -> bool {
        self.info.has_attr(attr)
    }

    fn path(&self, attr: &str) -> DeviceResult<AttrPath> {
        if !self.info.has_attr(attr) {
            return Err(DeviceError::attribute_not_found(
                format!(
                    "{}/{}_{}",
                    self.device.display_name(),
                    self.info.direction.prefix(),
                    self.info.id
                ),
                attr,
            ));
        }
        Ok(AttrPath::channel(
            &self.device.id,
            &self.info.id,
            self.is_output(),
            attr,
        ))
    }

    /// Read a channel attribute.
    pub fn read_attr(&self, attr: &str) -> DeviceResult<String> {
        let path = self.path(attr)?;
        self.ctx.read(&path)
    }

    /// Write a channel attribute.
    pub fn write_attr(&self, attr: &str, value: &str) -> DeviceResult<()> {
        let path = self.path(attr)?;
        self.ctx.write(&path, value)
    }
}
