//! Attribute values, ordered parameter sets and channel selectors.

use core::fmt;

use sdr_hil_errors::{DeviceError, ValidationError};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A value written to, or compared against, a device attribute.
///
/// Untagged so that parameter tables can be written as plain JSON/YAML
/// scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Written as `1` / `0`
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Anything else, e.g. `slow_attack`
    Text(String),
}

impl AttrValue {
    /// Text written to sysfs.
    pub fn to_attr_string(&self) -> String {
        match self {
            AttrValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Float(f) => f.to_string(),
            AttrValue::Text(s) => s.clone(),
        }
    }

    /// Numeric view, if any.
    #[allow(clippy::cast_precision_loss, reason = "attribute integers fit in 53 bits")]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            AttrValue::Int(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            AttrValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Convert a JSON scalar.
    pub fn from_json(key: &str, value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Bool(b) => Ok(AttrValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(AttrValue::Int)
                .or_else(|| n.as_f64().map(AttrValue::Float))
                .ok_or_else(|| ValidationError::invalid_format(key, format!("number {n} out of range"))),
            Value::String(s) => Ok(AttrValue::Text(s.clone())),
            other => Err(ValidationError::invalid_format(
                key,
                format!("expected a scalar, got {other}"),
            )),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_attr_string())
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(i64::from(v))
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

/// Parse an attribute reading. Only the first token counts, so `"71.75 dB"`
/// reads as `71.75`.
pub fn parse_reading(target: &str, raw: &str) -> Result<f64, DeviceError> {
    raw.split_whitespace()
        .next()
        .and_then(|token| token.parse::<f64>().ok())
        .ok_or_else(|| DeviceError::invalid_value(target, raw))
}

/// Ordered `property -> value` assignments applied to a facade.
///
/// Order is the declaration order of the source table, which matters on real
/// hardware (the LO has to settle before gains are set).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    entries: Vec<(String, AttrValue)>,
}

impl ParamSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one assignment. Re-declaring a property is rejected.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Result<Self, ValidationError> {
        self.insert(name, value)?;
        Ok(self)
    }

    /// Append one assignment in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Result<(), ValidationError> {
        let name = name.into();
        if self.entries.iter().any(|(k, _)| *k == name) {
            return Err(ValidationError::DuplicateParameter(name));
        }
        self.entries.push((name, value.into()));
        Ok(())
    }

    /// Assignments in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Value of `name`.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<&Map<String, Value>> for ParamSet {
    type Error = ValidationError;

    fn try_from(map: &Map<String, Value>) -> Result<Self, Self::Error> {
        let mut set = ParamSet::new();
        for (key, value) in map {
            set.insert(key.clone(), AttrValue::from_json(key, value)?)?;
        }
        Ok(set)
    }
}

impl TryFrom<&Value> for ParamSet {
    type Error = ValidationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => ParamSet::try_from(map),
            Value::Null => Ok(ParamSet::new()),
            other => Err(ValidationError::invalid_format(
                "param_set",
                format!("expected an object, got {other}"),
            )),
        }
    }
}

impl Serialize for ParamSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParamSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ParamSet::try_from(&value).map_err(de::Error::custom)
    }
}

/// One channel or an ordered group of channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelSelector {
    /// Single channel
    One(u32),
    /// Several channels, enabled together
    Many(Vec<u32>),
}

impl ChannelSelector {
    /// Channels in order.
    pub fn channels(&self) -> Vec<u32> {
        match self {
            ChannelSelector::One(c) => vec![*c],
            ChannelSelector::Many(cs) => cs.clone(),
        }
    }

    /// First channel; the one a single-channel measurement uses.
    pub fn primary(&self) -> Option<u32> {
        match self {
            ChannelSelector::One(c) => Some(*c),
            ChannelSelector::Many(cs) => cs.first().copied(),
        }
    }
}

impl From<u32> for ChannelSelector {
    fn from(c: u32) -> Self {
        ChannelSelector::One(c)
    }
}

impl fmt::Display for ChannelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSelector::One(c) => write!(f, "{c}"),
            ChannelSelector::Many(cs) => {
                let parts: Vec<String> = cs.iter().map(u32::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}
