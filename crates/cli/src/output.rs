//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use sdr_hil_harness::{Outcome, RunReport, Scenario};
use sdr_hil_iio::Context;
use serde_json::json;

use crate::error::CliError;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn error_type_name(error: &Error) -> &'static str {
    match error.downcast_ref::<CliError>() {
        Some(CliError::InvalidConfiguration(_)) => "InvalidConfiguration",
        Some(CliError::Connection(_)) => "Connection",
        Some(CliError::Validation(_)) => "Validation",
        Some(CliError::ScenariosFailed { .. }) => "ScenariosFailed",
        Some(CliError::Io(_)) => "Io",
        Some(CliError::Hil(_)) => "Hil",
        None => "Unknown",
    }
}

fn outcome_label(outcome: Outcome) -> ColoredString {
    let label = format!("{outcome:<7}");
    match outcome {
        Outcome::Passed => label.green(),
        Outcome::Failed => label.red().bold(),
        Outcome::Skipped => label.yellow(),
        Outcome::Error => label.magenta().bold(),
    }
}

/// Print a run report
pub fn print_report(report: &RunReport, json: bool) {
    if json {
        match report.to_json() {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format report as JSON: {e}"),
        }
        return;
    }

    for scenario in &report.scenarios {
        match &scenario.reason {
            Some(reason) => println!(
                "{} {} {}",
                outcome_label(scenario.outcome),
                scenario.id,
                format!("({reason})").dimmed()
            ),
            None => println!("{} {}", outcome_label(scenario.outcome), scenario.id),
        }
    }

    let s = &report.summary;
    let elapsed = report.finished - report.started;
    println!();
    println!(
        "{} {} total, {} passed, {} failed, {} skipped, {} errors in {:.2}s",
        "Summary:".bold(),
        s.total,
        s.passed.to_string().green(),
        s.failed.to_string().red(),
        s.skipped.to_string().yellow(),
        s.errors.to_string().magenta(),
        elapsed.num_milliseconds() as f64 / 1000.0
    );
}

/// Print the scenario table
pub fn print_scenarios(scenarios: &[Scenario], json: bool) {
    if json {
        let entries: Vec<_> = scenarios
            .iter()
            .map(|s| {
                json!({
                    "id": s.id(),
                    "test": s.test,
                    "board": s.board,
                    "class": s.board.classname(),
                })
            })
            .collect();
        let output = json!({
            "success": true,
            "count": scenarios.len(),
            "scenarios": entries
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format scenario list as JSON: {e}"),
        }
        return;
    }

    if scenarios.is_empty() {
        println!("{}", "No scenarios selected".yellow());
        return;
    }

    let mut board = None;
    for scenario in scenarios {
        if board != Some(scenario.board) {
            board = Some(scenario.board);
            println!("{} ({})", scenario.board.tag().bold(), scenario.board.classname().dimmed());
        }
        println!("  {}", scenario.id());
    }
    println!("{} scenarios", scenarios.len());
}

/// Print the devices of a probed context
pub fn print_context(ctx: &Context, json: bool) {
    if json {
        let devices: Vec<_> = ctx
            .devices()
            .map(|d| {
                json!({
                    "id": d.id(),
                    "name": d.name(),
                    "channels": d.channels().count(),
                    "attrs": d.info().attrs.len(),
                })
            })
            .collect();
        let output = json!({
            "success": true,
            "uri": ctx.uri(),
            "name": ctx.description().name,
            "devices": devices
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format context as JSON: {e}"),
        }
        return;
    }

    println!("{} {}", "Context:".bold(), ctx.uri());
    if !ctx.description().description.is_empty() {
        println!("  {}", ctx.description().description.dimmed());
    }
    for device in ctx.devices() {
        println!(
            "  {} {} ({}, {} channels)",
            "●".green(),
            device.name().bold(),
            device.id().dimmed(),
            device.channels().count()
        );
    }
}
