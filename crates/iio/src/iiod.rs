//! Blocking client for the iiod text protocol.
//!
//! Every command is one `\r\n` terminated line. The server answers with a
//! decimal integer line: a negative value is an errno, a non-negative value
//! is a payload length (for `PRINT` and `READ`) or a byte count (for
//! `WRITE`). Payloads are followed by a single `\n`.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use sdr_hil_errors::DeviceError;
use tracing::{debug, trace};

use crate::DeviceResult;
use crate::backend::{AttrPath, IioBackend, Scope};
use crate::model::ContextDescription;
use crate::xml::parse_context;

/// Largest payload accepted from the server.
const MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// iiod backend over TCP.
pub type IiodBackend = IiodClient<TcpStream>;

/// iiod client over any byte stream.
pub struct IiodClient<S: Read + Write> {
    stream: BufReader<S>,
    peer: String,
    timeout_ms: u64,
}

impl<S: Read + Write> IiodClient<S> {
    /// Wrap a connected stream. `peer` is used in error messages.
    pub fn new(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream: BufReader::new(stream),
            peer: peer.into(),
            timeout_ms: 0,
        }
    }

    /// Record the timeout used in error messages.
    pub fn with_timeout_hint(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    fn io_error(&self, err: io::Error) -> DeviceError {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                DeviceError::timeout(self.peer.clone(), self.timeout_ms)
            }
            _ => DeviceError::Disconnected(format!("{}: {err}", self.peer)),
        }
    }

    fn send(&mut self, line: &str) -> DeviceResult<()> {
        trace!(peer = %self.peer, command = line.trim_end(), "iiod >");
        let result = {
            let stream = self.stream.get_mut();
            stream
                .write_all(line.as_bytes())
                .and_then(|()| stream.flush())
        };
        result.map_err(|e| self.io_error(e))
    }

    fn send_bytes(&mut self, data: &[u8]) -> DeviceResult<()> {
        let result = {
            let stream = self.stream.get_mut();
            stream.write_all(data).and_then(|()| stream.flush())
        };
        result.map_err(|e| self.io_error(e))
    }

    fn read_integer(&mut self) -> DeviceResult<i64> {
        let mut line = String::new();
        let n = self
            .stream
            .read_line(&mut line)
            .map_err(|e| self.io_error(e))?;
        if n == 0 {
            return Err(DeviceError::Disconnected(format!(
                "{}: connection closed",
                self.peer
            )));
        }
        trace!(peer = %self.peer, reply = line.trim_end(), "iiod <");
        line.trim()
            .parse::<i64>()
            .map_err(|e| DeviceError::Protocol(format!("expected integer, got '{}': {e}", line.trim())))
    }

    fn read_payload(&mut self, len: i64) -> DeviceResult<Vec<u8>> {
        let len = usize::try_from(len)
            .map_err(|e| DeviceError::Protocol(format!("invalid payload length {len}: {e}")))?;
        if len > MAX_PAYLOAD {
            return Err(DeviceError::Protocol(format!(
                "payload of {len} bytes exceeds limit"
            )));
        }
        let mut buf = vec![0u8; len];
        self.stream
            .read_exact(&mut buf)
            .map_err(|e| self.io_error(e))?;
        let mut newline = [0u8; 1];
        self.stream
            .read_exact(&mut newline)
            .map_err(|e| self.io_error(e))?;
        let [terminator] = newline;
        if terminator != b'\n' {
            return Err(DeviceError::Protocol("payload not terminated by newline".into()));
        }
        Ok(buf)
    }

    fn command_target(path: &AttrPath) -> String {
        match &path.scope {
            Scope::Device => format!("{} {}", path.device, path.attr),
            Scope::Debug => format!("{} DEBUG {}", path.device, path.attr),
            Scope::Channel { id, direction } => {
                format!("{} {} {} {}", path.device, direction.keyword(), id, path.attr)
            }
        }
    }

    /// Fetch and parse the context XML.
    pub fn print(&mut self) -> DeviceResult<ContextDescription> {
        self.send("PRINT\r\n")?;
        let len = self.read_integer()?;
        if len < 0 {
            return Err(DeviceError::Protocol(format!("PRINT failed: errno {}", -len)));
        }
        let raw = self.read_payload(len)?;
        let xml = String::from_utf8_lossy(&raw);
        let ctx = parse_context(xml.trim_end_matches('\0'))?;
        debug!(peer = %self.peer, devices = ctx.devices.len(), "context description received");
        Ok(ctx)
    }

    /// Read one attribute.
    pub fn read(&mut self, path: &AttrPath) -> DeviceResult<String> {
        self.send(&format!("READ {}\r\n", Self::command_target(path)))?;
        let len = self.read_integer()?;
        if len < 0 {
            return Err(DeviceError::attribute_io(path.to_string(), errno(len)));
        }
        let raw = self.read_payload(len)?;
        let value = String::from_utf8_lossy(&raw);
        Ok(value.trim_end_matches('\0').trim().to_string())
    }

    /// Write one attribute.
    pub fn write(&mut self, path: &AttrPath, value: &str) -> DeviceResult<()> {
        self.send(&format!(
            "WRITE {} {}\r\n",
            Self::command_target(path),
            value.len()
        ))?;
        self.send_bytes(value.as_bytes())?;
        let ret = self.read_integer()?;
        if ret < 0 {
            return Err(DeviceError::attribute_io(path.to_string(), errno(ret)));
        }
        Ok(())
    }

    /// Ask the server to apply `timeout` to its side of the connection.
    pub fn set_server_timeout(&mut self, timeout: Duration) -> DeviceResult<()> {
        let ms = timeout.as_millis();
        self.send(&format!("TIMEOUT {ms}\r\n"))?;
        let ret = self.read_integer()?;
        if ret < 0 {
            return Err(DeviceError::Protocol(format!("TIMEOUT failed: errno {}", -ret)));
        }
        self.timeout_ms = u64::try_from(ms).unwrap_or(u64::MAX);
        Ok(())
    }

    /// Consume the client, returning the stream.
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}

fn errno(ret: i64) -> i32 {
    i32::try_from(-ret).unwrap_or(i32::MAX)
}

impl<S: Read + Write + Send> IioBackend for IiodClient<S> {
    fn describe(&mut self) -> DeviceResult<ContextDescription> {
        self.print()
    }

    fn read_attr(&mut self, path: &AttrPath) -> DeviceResult<String> {
        self.read(path)
    }

    fn write_attr(&mut self, path: &AttrPath, value: &str) -> DeviceResult<()> {
        self.write(path, value)
    }

    fn set_timeout(&mut self, timeout: Duration) -> DeviceResult<()> {
        self.set_server_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Replays canned server output and records what the client sent.
    struct Script {
        reply: Cursor<Vec<u8>>,
        sent: Vec<u8>,
    }

    impl Script {
        fn new(reply: &[u8]) -> Self {
            Self {
                reply: Cursor::new(reply.to_vec()),
                sent: Vec::new(),
            }
        }
    }

    impl Read for Script {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reply.read(buf)
        }
    }

    impl Write for Script {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.sent.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sent(client: IiodClient<Script>) -> String {
        String::from_utf8_lossy(&client.into_inner().sent).into_owned()
    }

    #[test]
    fn test_read_channel_attribute() -> DeviceResult<()> {
        let mut client = IiodClient::new(Script::new(b"8\n71.75 dB\n"), "test");
        let path = AttrPath::channel("iio:device1", "voltage0", true, "hardwaregain");
        assert_eq!(client.read(&path)?, "71.75 dB");
        assert_eq!(sent(client), "READ iio:device1 OUTPUT voltage0 hardwaregain\r\n");
        Ok(())
    }

    #[test]
    fn test_read_strips_trailing_nul() -> DeviceResult<()> {
        let mut client = IiodClient::new(Script::new(b"7\nmanual\0\n"), "test");
        let path = AttrPath::channel("iio:device1", "voltage0", false, "gain_control_mode");
        assert_eq!(client.read(&path)?, "manual");
        Ok(())
    }

    #[test]
    fn test_read_negative_errno() {
        let mut client = IiodClient::new(Script::new(b"-22\n"), "test");
        let path = AttrPath::debug("iio:device1", "loopback");
        let err = client.read(&path).err();
        assert!(matches!(err, Some(DeviceError::AttributeIo { errno: 22, .. })));
    }

    #[test]
    fn test_write_sends_length_then_data() -> DeviceResult<()> {
        let mut client = IiodClient::new(Script::new(b"10\n"), "test");
        let path = AttrPath::channel("iio:device1", "altvoltage0", true, "frequency");
        client.write(&path, "2400000000")?;
        assert_eq!(
            sent(client),
            "WRITE iio:device1 OUTPUT altvoltage0 frequency 10\r\n2400000000"
        );
        Ok(())
    }

    #[test]
    fn test_print_parses_context() -> DeviceResult<()> {
        let xml = r#"<context name="network"><device id="iio:device0" name="ad7291"/></context>"#;
        let reply = format!("{}\n{}\n", xml.len(), xml);
        let mut client = IiodClient::new(Script::new(reply.as_bytes()), "test");
        let ctx = client.print()?;
        assert!(ctx.find_device("ad7291").is_some());
        Ok(())
    }

    #[test]
    fn test_closed_connection_is_disconnect() {
        let mut client = IiodClient::new(Script::new(b""), "test");
        let err = client.read(&AttrPath::device("iio:device0", "name")).err();
        assert!(matches!(err, Some(DeviceError::Disconnected(_))));
    }

    #[test]
    fn test_garbage_reply_is_protocol_error() {
        let mut client = IiodClient::new(Script::new(b"hello\n"), "test");
        let err = client.read(&AttrPath::device("iio:device0", "name")).err();
        assert!(matches!(err, Some(DeviceError::Protocol(_))));
    }
}
