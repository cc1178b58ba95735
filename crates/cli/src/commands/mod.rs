//! Command implementations for hilctl

pub mod list;
pub mod probe;
pub mod run;

pub use list::ListArgs;
pub use probe::ProbeArgs;
pub use run::RunArgs;

use std::path::Path;

use sdr_hil_harness::{HardwareDescriptor, HilConfig};
use tracing::debug;

use crate::error::CliError;

/// Build the session configuration from the config file and the `--uri`/`--hw` pair.
///
/// The flag pair appends one descriptor after those read from the file.
pub fn load_config(path: Option<&Path>, uri: Option<&str>, hw: Option<&str>) -> Result<HilConfig, CliError> {
    let mut config = match path {
        Some(path) => HilConfig::load(path)
            .map_err(|e| CliError::InvalidConfiguration(format!("{}: {e}", path.display())))?,
        None => HilConfig::default(),
    };

    match (uri, hw) {
        (Some(uri), Some(hw)) => {
            config = config.with_descriptor(HardwareDescriptor::new(hw, uri));
        }
        (Some(_), None) => {
            return Err(CliError::InvalidConfiguration("--uri needs --hw".to_string()));
        }
        (None, Some(_)) => {
            return Err(CliError::InvalidConfiguration("--hw needs --uri".to_string()));
        }
        (None, None) => {}
    }

    config.validate()?;
    debug!(contexts = config.contexts.len(), "session configuration ready");
    Ok(config)
}
