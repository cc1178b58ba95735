//! Context probing

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use sdr_hil_iio::{Connector, NetworkConnector};

use crate::error::CliError;
use crate::output;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Context URI; defaults to --uri
    pub uri: Option<String>,
}

pub fn execute(args: &ProbeArgs, global_uri: Option<&str>, timeout: Duration, json: bool) -> Result<()> {
    let uri = args
        .uri
        .as_deref()
        .or(global_uri)
        .ok_or_else(|| CliError::InvalidConfiguration("no URI to probe; pass one or set --uri".to_string()))?;

    let ctx = NetworkConnector::with_timeout(timeout)
        .connect(uri)
        .map_err(CliError::Connection)?;
    output::print_context(&ctx, json);
    Ok(())
}
