//! Transport seam between a [`Context`](crate::Context) and the board.

use core::fmt;
use std::time::Duration;

use crate::DeviceResult;
use crate::model::{ContextDescription, Direction};

/// Where an attribute lives on a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Device attribute
    Device,
    /// Debug attribute
    Debug,
    /// Channel attribute
    Channel {
        /// Channel id
        id: String,
        /// Direction
        direction: Direction,
    },
}

/// Fully qualified attribute address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrPath {
    /// Device id as understood by the backend
    pub device: String,
    /// Device, debug or channel scope
    pub scope: Scope,
    /// Attribute name
    pub attr: String,
}

impl AttrPath {
    /// Device attribute.
    pub fn device(device: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            scope: Scope::Device,
            attr: attr.into(),
        }
    }

    /// Debug attribute.
    pub fn debug(device: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            scope: Scope::Debug,
            attr: attr.into(),
        }
    }

    /// Channel attribute.
    pub fn channel(
        device: impl Into<String>,
        channel: impl Into<String>,
        output: bool,
        attr: impl Into<String>,
    ) -> Self {
        Self {
            device: device.into(),
            scope: Scope::Channel {
                id: channel.into(),
                direction: Direction::from_output(output),
            },
            attr: attr.into(),
        }
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Scope::Device => write!(f, "{}/{}", self.device, self.attr),
            Scope::Debug => write!(f, "{}/debug/{}", self.device, self.attr),
            Scope::Channel { id, direction } => {
                write!(f, "{}/{}_{}/{}", self.device, direction.prefix(), id, self.attr)
            }
        }
    }
}

/// Attribute transport.
///
/// Implementations are driven from a single thread; the owning context
/// serializes access.
pub trait IioBackend: Send {
    /// Read the static context description.
    fn describe(&mut self) -> DeviceResult<ContextDescription>;

    /// Read one attribute as text.
    fn read_attr(&mut self, path: &AttrPath) -> DeviceResult<String>;

    /// Write one attribute from text.
    fn write_attr(&mut self, path: &AttrPath, value: &str) -> DeviceResult<()>;

    /// Adjust the transport timeout.
    fn set_timeout(&mut self, _timeout: Duration) -> DeviceResult<()> {
        Ok(())
    }
}
