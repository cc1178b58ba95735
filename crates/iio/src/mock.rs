//! In-memory IIO backend.
//!
//! [`MockBackend`] keeps attribute values in a shared map so a test can hold
//! one clone for seeding and inspection while the [`Context`] owns another.
//! Values round-trip as text. A per-attribute quantization step mimics
//! drivers that round writes to the nearest supported value.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sdr_hil_errors::DeviceError;

use crate::DeviceResult;
use crate::backend::{AttrPath, IioBackend, Scope};
use crate::connector::Connector;
use crate::context::Context;
use crate::model::ContextDescription;

/// `ENOENT`, returned for attributes that were never seeded or written.
pub const ENOENT: i32 = 2;

#[derive(Debug, Default)]
struct State {
    description: ContextDescription,
    values: HashMap<AttrPath, String>,
    failures: HashMap<AttrPath, i32>,
    steps: HashMap<AttrPath, f64>,
    writes: Vec<(AttrPath, String)>,
    reads: usize,
}

/// Shared in-memory attribute store.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<State>>,
}

impl MockBackend {
    /// Backend exposing `description`, with no values.
    pub fn new(description: ContextDescription) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                description,
                ..State::default()
            })),
        }
    }

    /// Set the value returned by reads of `path`.
    pub fn seed(&self, path: AttrPath, value: impl Into<String>) {
        self.state.lock().values.insert(path, value.into());
    }

    /// Make every access to `path` fail with `errno`.
    pub fn fail(&self, path: AttrPath, errno: i32) {
        self.state.lock().failures.insert(path, errno);
    }

    /// Stop failing `path`.
    pub fn heal(&self, path: &AttrPath) {
        self.state.lock().failures.remove(path);
    }

    /// Round numeric writes to `path` to the nearest multiple of `step`.
    pub fn quantize(&self, path: AttrPath, step: f64) {
        self.state.lock().steps.insert(path, step);
    }

    /// Current value of `path`.
    pub fn value(&self, path: &AttrPath) -> Option<String> {
        self.state.lock().values.get(path).cloned()
    }

    /// Every successful write so far, oldest first.
    pub fn writes(&self) -> Vec<(AttrPath, String)> {
        self.state.lock().writes.clone()
    }

    /// Successful writes whose attribute name is `attr`.
    pub fn writes_to(&self, attr: &str) -> Vec<(AttrPath, String)> {
        self.state
            .lock()
            .writes
            .iter()
            .filter(|(p, _)| p.attr == attr)
            .cloned()
            .collect()
    }

    /// Number of reads served.
    pub fn read_count(&self) -> usize {
        self.state.lock().reads
    }

    /// Open a context over a clone of this backend.
    pub fn open(&self, uri: &str) -> DeviceResult<Context> {
        Context::new(uri, Box::new(self.clone()))
    }

    fn check_exists(state: &State, path: &AttrPath) -> DeviceResult<()> {
        let device = state
            .description
            .devices
            .iter()
            .find(|d| d.id == path.device)
            .ok_or_else(|| DeviceError::not_found(path.device.clone()))?;
        let listed = match &path.scope {
            Scope::Device => device.attrs.iter().any(|a| *a == path.attr),
            Scope::Debug => device.debug_attrs.iter().any(|a| *a == path.attr),
            Scope::Channel { id, direction } => device
                .channels
                .iter()
                .any(|c| c.id == *id && c.direction == *direction && c.has_attr(&path.attr)),
        };
        if listed {
            Ok(())
        } else {
            Err(DeviceError::attribute_not_found(path.device.clone(), path.attr.clone()))
        }
    }
}

fn quantized(value: &str, step: f64) -> Option<String> {
    let parsed: f64 = value.split_whitespace().next()?.parse().ok()?;
    let rounded = (parsed / step).round() * step;
    Some(format_number(rounded))
}

/// Render a number the way sysfs does: integers without a fraction.
pub fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

impl IioBackend for MockBackend {
    fn describe(&mut self) -> DeviceResult<ContextDescription> {
        Ok(self.state.lock().description.clone())
    }

    fn read_attr(&mut self, path: &AttrPath) -> DeviceResult<String> {
        let mut state = self.state.lock();
        Self::check_exists(&state, path)?;
        if let Some(errno) = state.failures.get(path) {
            return Err(DeviceError::attribute_io(path.to_string(), *errno));
        }
        state.reads += 1;
        state
            .values
            .get(path)
            .cloned()
            .ok_or_else(|| DeviceError::attribute_io(path.to_string(), ENOENT))
    }

    fn write_attr(&mut self, path: &AttrPath, value: &str) -> DeviceResult<()> {
        let mut state = self.state.lock();
        Self::check_exists(&state, path)?;
        if let Some(errno) = state.failures.get(path) {
            return Err(DeviceError::attribute_io(path.to_string(), *errno));
        }
        let stored = state
            .steps
            .get(path)
            .and_then(|step| quantized(value, *step))
            .unwrap_or_else(|| value.to_string());
        state.values.insert(path.clone(), stored);
        state.writes.push((path.clone(), value.to_string()));
        Ok(())
    }
}

/// Connector resolving URIs to registered mock backends.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    contexts: HashMap<String, MockBackend>,
}

impl MockConnector {
    /// Empty connector; every URI fails to connect.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `backend` for `uri`.
    pub fn with_context(mut self, uri: impl Into<String>, backend: MockBackend) -> Self {
        self.contexts.insert(uri.into(), backend);
        self
    }

    /// Registered backend for `uri`.
    pub fn backend(&self, uri: &str) -> Option<&MockBackend> {
        self.contexts.get(uri)
    }
}

impl Connector for MockConnector {
    fn connect(&self, uri: &str) -> DeviceResult<Context> {
        let backend = self
            .contexts
            .get(uri)
            .ok_or_else(|| DeviceError::connection_failed(uri, "no context registered"))?;
        backend.open(uri)
    }
}
