//! Opening contexts from URIs.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use sdr_hil_errors::DeviceError;
use tracing::{debug, info, warn};

use crate::DeviceResult;
use crate::context::Context;
use crate::iiod::IiodClient;
use crate::uri::ContextUri;

/// Default socket timeout for network contexts.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a [`Context`] for a URI.
pub trait Connector: Send + Sync {
    /// Connect to `uri`.
    fn connect(&self, uri: &str) -> DeviceResult<Context>;
}

/// Connector for `ip:` URIs served by iiod.
#[derive(Debug, Clone)]
pub struct NetworkConnector {
    timeout: Duration,
}

impl Default for NetworkConnector {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl NetworkConnector {
    /// Connector with a custom socket timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn open_stream(&self, uri: &str, host: &str, port: u16) -> DeviceResult<TcpStream> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| DeviceError::connection_failed(uri, e.to_string()))?;

        let mut last_err = None;
        for addr in addrs {
            debug!(%addr, "connecting to iiod");
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    let configured = stream
                        .set_read_timeout(Some(self.timeout))
                        .and_then(|()| stream.set_write_timeout(Some(self.timeout)))
                        .and_then(|()| stream.set_nodelay(true));
                    if let Err(e) = configured {
                        warn!(%addr, error = %e, "could not configure socket");
                    }
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(DeviceError::connection_failed(
            uri,
            last_err.map_or_else(|| "no address resolved".to_string(), |e| e.to_string()),
        ))
    }
}

impl Connector for NetworkConnector {
    fn connect(&self, uri: &str) -> DeviceResult<Context> {
        match ContextUri::parse(uri)? {
            ContextUri::Network { host, port } => {
                let stream = self.open_stream(uri, &host, port)?;
                let client = IiodClient::new(stream, uri).with_timeout_hint(self.timeout);
                let ctx = Context::new(uri, Box::new(client))?;
                info!(uri, devices = ctx.description().devices.len(), "connected");
                Ok(ctx)
            }
            ContextUri::Mock(_) | ContextUri::Unsupported(_) => {
                Err(DeviceError::UnsupportedUri(uri.to_string()))
            }
        }
    }
}
