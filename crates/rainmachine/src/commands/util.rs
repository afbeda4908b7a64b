//! Shared helpers for command handlers.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use rainmachine_api::models::Ack;
use rainmachine_core::{Client, Controller};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Pick the controller to run against: the one matching `mac`, or the
/// first (by MAC) when no MAC was given.
pub fn select_controller(client: &Client, mac: Option<&str>) -> Result<Arc<Controller>, CliError> {
    let found = match mac {
        Some(mac) => client
            .controllers()
            .into_iter()
            .find(|c| c.mac().eq_ignore_ascii_case(mac)),
        None => client.controllers().into_iter().next(),
    };
    found.ok_or_else(|| CliError::NotFound {
        resource_type: "controller".into(),
        identifier: mac.unwrap_or("(any)").into(),
        list_command: "controllers".into(),
    })
}

/// Parse an optional `YYYY-MM-DD` argument.
pub fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, CliError> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|e| CliError::Validation {
                field: "date".into(),
                reason: format!("expected YYYY-MM-DD, got '{v}': {e}"),
            })
        })
        .transpose()
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool, action: &str) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Report a mutation: a status line in table mode, the raw ack otherwise.
pub fn report_ack(ack: &Ack, done: &str, global: &GlobalOpts) -> Result<(), CliError> {
    match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            output::print_done(done, global.quiet, output::should_color(&global.color));
            Ok(())
        }
        _ => print_serialized(ack, global),
    }
}

fn print_serialized<T: Serialize>(data: &T, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, data, |_| String::new(), |_| String::new())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
