//! Parser for the context XML served by iiod's `PRINT` command.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use sdr_hil_errors::DeviceError;

use crate::DeviceResult;
use crate::model::{ChannelInfo, ContextDescription, DeviceInfo, Direction};

#[derive(Default)]
struct Tag {
    id: Option<String>,
    name: Option<String>,
    label: Option<String>,
    kind: Option<String>,
    value: Option<String>,
    description: Option<String>,
}

fn protocol(msg: impl core::fmt::Display) -> DeviceError {
    DeviceError::Protocol(format!("context XML: {msg}"))
}

fn read_tag(element: &BytesStart<'_>) -> DeviceResult<Tag> {
    let mut tag = Tag::default();
    for attr in element.attributes().with_checks(false) {
        let attr = attr.map_err(protocol)?;
        let value = attr.unescape_value().map_err(protocol)?.into_owned();
        match attr.key.as_ref() {
            b"id" => tag.id = Some(value),
            b"name" => tag.name = Some(value),
            b"label" => tag.label = Some(value),
            b"type" => tag.kind = Some(value),
            b"value" => tag.value = Some(value),
            b"description" => tag.description = Some(value),
            _ => {}
        }
    }
    Ok(tag)
}

fn required(field: Option<String>, element: &str, attr: &str) -> DeviceResult<String> {
    field.ok_or_else(|| protocol(format!("<{element}> without '{attr}'")))
}

#[derive(Default)]
struct Builder {
    ctx: ContextDescription,
    device: Option<DeviceInfo>,
    channel: Option<ChannelInfo>,
}

impl Builder {
    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> DeviceResult<()> {
        let name = element.name();
        match name.as_ref() {
            b"context" => {
                let tag = read_tag(element)?;
                self.ctx.name = tag.name.unwrap_or_default();
                self.ctx.description = tag.description.unwrap_or_default();
            }
            b"context-attribute" => {
                let tag = read_tag(element)?;
                let key = required(tag.name, "context-attribute", "name")?;
                self.ctx.attrs.push((key, tag.value.unwrap_or_default()));
            }
            b"device" => {
                let tag = read_tag(element)?;
                let device = DeviceInfo {
                    id: required(tag.id, "device", "id")?,
                    name: tag.name,
                    label: tag.label,
                    attrs: Vec::new(),
                    debug_attrs: Vec::new(),
                    buffer_attrs: Vec::new(),
                    channels: Vec::new(),
                };
                if empty {
                    self.ctx.devices.push(device);
                } else {
                    self.device = Some(device);
                }
            }
            b"channel" => {
                let tag = read_tag(element)?;
                let direction = match tag.kind.as_deref() {
                    Some("output") => Direction::Output,
                    Some("input") | None => Direction::Input,
                    Some(other) => return Err(protocol(format!("channel type '{other}'"))),
                };
                let mut channel = ChannelInfo::new(required(tag.id, "channel", "id")?, direction);
                channel.name = tag.name;
                if empty {
                    self.push_channel(channel)?;
                } else {
                    self.channel = Some(channel);
                }
            }
            b"attribute" => {
                let attr = required(read_tag(element)?.name, "attribute", "name")?;
                if let Some(channel) = self.channel.as_mut() {
                    channel.attrs.push(attr);
                } else if let Some(device) = self.device.as_mut() {
                    device.attrs.push(attr);
                }
            }
            b"debug-attribute" => {
                let attr = required(read_tag(element)?.name, "debug-attribute", "name")?;
                if let Some(device) = self.device.as_mut() {
                    device.debug_attrs.push(attr);
                }
            }
            b"buffer-attribute" => {
                let attr = required(read_tag(element)?.name, "buffer-attribute", "name")?;
                if let Some(device) = self.device.as_mut() {
                    device.buffer_attrs.push(attr);
                }
            }
            // scan-element and anything newer carries nothing we use
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> DeviceResult<()> {
        match name {
            b"channel" => {
                if let Some(channel) = self.channel.take() {
                    self.push_channel(channel)?;
                }
            }
            b"device" => {
                if let Some(device) = self.device.take() {
                    self.ctx.devices.push(device);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn push_channel(&mut self, channel: ChannelInfo) -> DeviceResult<()> {
        let device = self
            .device
            .as_mut()
            .ok_or_else(|| protocol(format!("channel {} outside a device", channel.id)))?;
        device.channels.push(channel);
        Ok(())
    }
}

/// Parse a context description.
pub fn parse_context(raw: &str) -> DeviceResult<ContextDescription> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);
    let mut builder = Builder::default();
    let mut seen_root = false;

    loop {
        match reader.read_event().map_err(protocol)? {
            Event::Start(element) => {
                seen_root |= element.name().as_ref() == b"context";
                builder.open(&element, false)?;
            }
            Event::Empty(element) => {
                seen_root |= element.name().as_ref() == b"context";
                builder.open(&element, true)?;
            }
            Event::End(end) => builder.close(end.name().as_ref())?,
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(protocol("missing <context> root"));
    }
    Ok(builder.ctx)
}
