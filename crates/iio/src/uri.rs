//! Context URI parsing.
//!
//! Recognised forms are `ip:<host>[:<port>]`, `mock:<name>`, and the local,
//! USB and serial schemes which are parsed only to be rejected with a clear
//! message. A bare host without a scheme is treated as `ip:`.

use core::fmt;
use core::str::FromStr;

use sdr_hil_errors::DeviceError;

/// Default iiod TCP port.
pub const IIOD_PORT: u16 = 30431;

/// Parsed context URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextUri {
    /// Network context served by iiod
    Network {
        /// Host name or address
        host: String,
        /// TCP port
        port: u16,
    },
    /// In-memory context registered under `name`
    Mock(String),
    /// Local, USB or serial context; not reachable from this crate
    Unsupported(String),
}

impl ContextUri {
    /// Parse a URI string.
    pub fn parse(uri: &str) -> Result<Self, DeviceError> {
        let uri = uri.trim();
        if let Some(rest) = uri.strip_prefix("ip:") {
            return parse_network(uri, rest);
        }
        if let Some(name) = uri.strip_prefix("mock:") {
            return Ok(ContextUri::Mock(name.to_string()));
        }
        if ["local:", "usb:", "serial:"].iter().any(|p| uri.starts_with(p)) {
            return Ok(ContextUri::Unsupported(uri.to_string()));
        }
        if uri.is_empty() || (uri.contains(':') && !looks_like_host_port(uri)) {
            return Err(DeviceError::UnsupportedUri(uri.to_string()));
        }
        parse_network(uri, uri)
    }

    /// True for network URIs.
    pub fn is_network(&self) -> bool {
        matches!(self, ContextUri::Network { .. })
    }
}

fn looks_like_host_port(s: &str) -> bool {
    s.rsplit_once(':')
        .is_some_and(|(host, port)| !host.contains(':') && port.parse::<u16>().is_ok())
}

fn parse_network(original: &str, rest: &str) -> Result<ContextUri, DeviceError> {
    if rest.is_empty() {
        return Err(DeviceError::UnsupportedUri(original.to_string()));
    }
    // IPv6 literal: ip:[::1]:30431
    if let Some(inner) = rest.strip_prefix('[') {
        let (host, tail) = inner
            .split_once(']')
            .filter(|(host, _)| !host.is_empty())
            .ok_or_else(|| DeviceError::UnsupportedUri(original.to_string()))?;
        let port = match tail.strip_prefix(':') {
            Some(p) => parse_port(original, p)?,
            None if tail.is_empty() => IIOD_PORT,
            None => return Err(DeviceError::UnsupportedUri(original.to_string())),
        };
        return Ok(ContextUri::Network {
            host: host.to_string(),
            port,
        });
    }
    match rest.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && !host.contains(':') => Ok(ContextUri::Network {
            host: host.to_string(),
            port: parse_port(original, port)?,
        }),
        Some(_) => Err(DeviceError::UnsupportedUri(original.to_string())),
        None => Ok(ContextUri::Network {
            host: rest.to_string(),
            port: IIOD_PORT,
        }),
    }
}

fn parse_port(original: &str, port: &str) -> Result<u16, DeviceError> {
    port.parse::<u16>()
        .map_err(|e| DeviceError::UnsupportedUri(format!("{original} ({e})")))
}

impl FromStr for ContextUri {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ContextUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextUri::Network { host, port } if host.contains(':') => {
                write!(f, "ip:[{host}]:{port}")
            }
            ContextUri::Network { host, port } => write!(f, "ip:{host}:{port}"),
            ContextUri::Mock(name) => write!(f, "mock:{name}"),
            ContextUri::Unsupported(uri) => f.write_str(uri),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_default_port() -> Result<(), DeviceError> {
        let uri = ContextUri::parse("ip:analog.local")?;
        assert_eq!(
            uri,
            ContextUri::Network {
                host: "analog.local".into(),
                port: IIOD_PORT
            }
        );
        Ok(())
    }

    #[test]
    fn test_ip_explicit_port() -> Result<(), DeviceError> {
        let uri: ContextUri = "ip:192.168.2.1:5000".parse()?;
        assert_eq!(uri.to_string(), "ip:192.168.2.1:5000");
        Ok(())
    }

    #[test]
    fn test_ipv6_literal() -> Result<(), DeviceError> {
        let uri = ContextUri::parse("ip:[fe80::1]")?;
        assert_eq!(uri.to_string(), "ip:[fe80::1]:30431");
        Ok(())
    }

    #[test]
    fn test_bare_host_is_network() -> Result<(), DeviceError> {
        assert!(ContextUri::parse("10.0.0.5")?.is_network());
        assert!(ContextUri::parse("10.0.0.5:30431")?.is_network());
        Ok(())
    }

    #[test]
    fn test_local_schemes_are_unsupported() -> Result<(), DeviceError> {
        for uri in ["local:", "usb:1.2.5", "serial:/dev/ttyUSB0,115200"] {
            assert!(matches!(ContextUri::parse(uri)?, ContextUri::Unsupported(_)));
        }
        Ok(())
    }

    #[test]
    fn test_empty_host_rejected() {
        assert!(ContextUri::parse("ip:").is_err());
        assert!(ContextUri::parse("").is_err());
        assert!(ContextUri::parse("ip:host:notaport").is_err());
        assert!(ContextUri::parse("ip:[]:30431").is_err());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_network_uri_display_reparses(
                host in "[a-z][a-z0-9-]{0,15}(\\.[a-z0-9-]{1,15}){0,3}",
                port in any::<u16>(),
            ) {
                let uri = ContextUri::Network { host, port };
                let text = uri.to_string();
                prop_assert_eq!(ContextUri::parse(&text)?, uri);
            }

            #[test]
            fn prop_ipv6_uri_display_reparses(
                groups in proptest::collection::vec("[0-9a-f]{1,4}", 2..8),
                port in any::<u16>(),
            ) {
                let uri = ContextUri::Network { host: groups.join(":"), port };
                let text = uri.to_string();
                prop_assert!(text.starts_with("ip:["), "{}", text);
                prop_assert_eq!(ContextUri::parse(&text)?, uri);
            }

            #[test]
            fn prop_network_host_never_empty(raw in "\\PC{0,40}") {
                if let Ok(ContextUri::Network { host, .. }) = ContextUri::parse(&raw) {
                    prop_assert!(!host.is_empty(), "empty host from {:?}", raw);
                }
            }
        }
    }
}
