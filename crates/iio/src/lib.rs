//! IIO context access for the SDR HIL suite.
//!
//! A [`Context`] is opened from a URI through a [`Connector`]. Two backends
//! are provided:
//!
//! - [`iiod::IiodBackend`]: blocking client for the iiod text protocol
//!   (`ip:` URIs, TCP port 30431 by default)
//! - [`mock::MockBackend`]: in-memory attribute store used by tests and by
//!   `mock:` URIs
//!
//! The context description (devices, channels, attribute names) is read once
//! at open time. Attribute values are always fetched from the backend.

#![deny(clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod backend;
pub mod connector;
pub mod context;
pub mod iiod;
pub mod mock;
pub mod model;
pub mod uri;
pub mod xml;

pub use backend::{AttrPath, IioBackend, Scope};
pub use connector::{Connector, NetworkConnector};
pub use context::{Channel, Context, Device};
pub use model::{ChannelInfo, ContextDescription, DeviceInfo, Direction};
pub use uri::ContextUri;

pub use sdr_hil_errors::DeviceError;

/// Result alias for IIO operations.
pub type DeviceResult<T> = Result<T, DeviceError>;
