//! hilctl - SDR hardware-in-the-loop suite runner
//!
//! Lists the scenario tables, runs them against the boards named in the
//! session configuration, and probes IIO contexts.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{ListArgs, ProbeArgs, RunArgs};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "hilctl")]
#[command(about = "SDR hardware-in-the-loop suite - run FMComms5 and DAQ2 validation scenarios")]
#[command(version)]
#[command(long_about = "
hilctl runs the FMComms5 and DAQ2 validation scenarios against IIO contexts.

Boards come from a hil.yaml / hil.json file (--config) and/or a single
--uri/--hw pair. Scenarios whose board is not attached are skipped.
Use --json for machine-readable output.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Session configuration file (.yaml, .yml or .json)
    #[arg(short, long, global = true, env = "HIL_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Context URI of an attached board, e.g. ip:192.168.2.1
    #[arg(long, global = true, env = "HIL_URI")]
    uri: Option<String>,

    /// Board tag for --uri (fmcomms5, daq2)
    #[arg(long, global = true, env = "HIL_HW")]
    hw: Option<String>,

    /// Socket timeout for network contexts, in milliseconds
    #[arg(long, global = true, default_value_t = 5000, value_name = "MS")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios and report outcomes
    #[command(after_help = commands::run::RUN_AFTER_HELP)]
    Run(RunArgs),

    /// List scenarios without running them
    List(ListArgs),

    /// Connect to a context and list its devices
    Probe(ProbeArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let default_filter = ["hilctl", "sdr_hil_iio", "sdr_hil_devices", "sdr_hil_harness", "sdr_hil_suite"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let cli_error = e.downcast_ref::<CliError>();
            // A failed run already printed its report.
            let reported = matches!(cli_error, Some(CliError::ScenariosFailed { .. }));
            if cli.json && !reported {
                output::print_error_json(&e);
            } else if !cli.json {
                output::print_error_human(&e);
            }
            ExitCode::from(cli_error.map_or(1, CliError::exit_code))
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    let timeout = Duration::from_millis(cli.timeout_ms);
    match &cli.command {
        Commands::Run(args) => {
            let config = commands::load_config(cli.config.as_deref(), cli.uri.as_deref(), cli.hw.as_deref())?;
            commands::run::execute(args, config, timeout, cli.json)
        }
        Commands::List(args) => commands::list::execute(args, cli.json),
        Commands::Probe(args) => commands::probe::execute(args, cli.uri.as_deref(), timeout, cli.json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdr_hil_devices::Board;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_run_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["hilctl", "run"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.timeout_ms, 5000);
        match &cli.command {
            Commands::Run(args) => {
                assert!(args.board.is_none());
                assert!(args.filter.is_none());
                assert!(args.report.is_none());
            }
            _ => return Err("expected Run command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from([
            "hilctl", "run", "--json", "-vv", "--uri", "ip:192.168.2.1", "--hw", "fmcomms5",
        ])?;
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.uri.as_deref(), Some("ip:192.168.2.1"));
        assert_eq!(cli.hw.as_deref(), Some("fmcomms5"));
        Ok(())
    }

    #[test]
    fn parse_run_board_and_report() -> TestResult {
        let cli = Cli::try_parse_from([
            "hilctl", "run", "--board", "daq2", "--filter", "tx_data", "--report", "out.json", "--seed", "7",
        ])?;
        match &cli.command {
            Commands::Run(args) => {
                assert_eq!(args.board, Some(Board::Daq2));
                assert_eq!(args.filter.as_deref(), Some("tx_data"));
                assert_eq!(args.report, Some(PathBuf::from("out.json")));
                assert_eq!(args.seed, Some(7));
            }
            _ => return Err("expected Run command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_repeated_exclude() -> TestResult {
        let cli = Cli::try_parse_from([
            "hilctl", "run", "-x", "loopback", "--exclude", "test_dcxo", "--settle-ms", "0",
        ])?;
        match &cli.command {
            Commands::Run(args) => {
                assert_eq!(args.exclude, vec!["loopback".to_string(), "test_dcxo".to_string()]);
                assert_eq!(args.settle_ms, Some(0));
            }
            _ => return Err("expected Run command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_board_by_class_name() -> TestResult {
        let cli = Cli::try_parse_from(["hilctl", "list", "--board", "adi.FMComms5"])?;
        match &cli.command {
            Commands::List(args) => assert_eq!(args.board, Some(Board::Fmcomms5)),
            _ => return Err("expected List command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_unknown_board_rejected() {
        assert!(matches!(Cli::try_parse_from(["hilctl", "list", "--board", "pluto"]), Err(_)));
    }

    #[test]
    fn parse_probe_positional_uri() -> TestResult {
        let cli = Cli::try_parse_from(["hilctl", "probe", "ip:10.0.0.2"])?;
        match &cli.command {
            Commands::Probe(args) => assert_eq!(args.uri.as_deref(), Some("ip:10.0.0.2")),
            _ => return Err("expected Probe command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_missing_subcommand_rejected() {
        assert!(matches!(Cli::try_parse_from(["hilctl"]), Err(_)));
    }
}
