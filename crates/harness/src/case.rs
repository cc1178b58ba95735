//! One row of an expanded scenario matrix.

use core::fmt;

use sdr_hil_errors::ValidationError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Named parameter values for one scenario invocation, in axis order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Case {
    values: Vec<(String, Value)>,
    id_parts: Vec<String>,
}

impl Case {
    /// Empty case; the single case of a matrix without axes.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: &str, value: Value, row: usize) {
        self.id_parts.push(id_part(name, &value, row));
        self.values.push((name.to_string(), value));
    }

    /// Stable id: one token per parameter joined with `-`.
    ///
    /// Scalars render as themselves; objects and arrays render as the
    /// parameter name followed by the row index (`param_set0`).
    pub fn id(&self) -> String {
        self.id_parts.join("-")
    }

    /// Value of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Parameters in axis order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parameters as a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        self.values.iter().cloned().collect()
    }

    /// Bind the parameters into a typed request.
    ///
    /// Parameters the target type does not name are ignored, so one case can
    /// feed several request types.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, ValidationError> {
        serde_json::from_value(Value::Object(self.to_map()))
            .map_err(|e| ValidationError::invalid_format(format!("case [{}]", self.id()), e.to_string()))
    }

    /// Bind a single parameter.
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> Result<T, ValidationError> {
        let value = self.get(name).ok_or_else(|| ValidationError::required(name))?;
        serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::invalid_format(name, e.to_string()))
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

fn id_part(name: &str, value: &Value, row: usize) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => format!("{name}{row}"),
    }
}
