//! `controllers` and `versions`.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use rainmachine_api::models::ApiVersions;
use rainmachine_core::{Client, Controller};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Serializable snapshot of a registered controller.
#[derive(Serialize)]
struct ControllerSummary {
    mac: String,
    name: String,
    remote: bool,
    base_url: String,
    api_version: Option<String>,
    hardware_version: Option<String>,
    software_version: Option<String>,
}

impl From<&Arc<Controller>> for ControllerSummary {
    fn from(c: &Arc<Controller>) -> Self {
        Self {
            mac: c.mac().to_owned(),
            name: c.name().to_owned(),
            remote: c.is_remote(),
            base_url: c.base_url().to_owned(),
            api_version: c.api_version().map(str::to_owned),
            hardware_version: c.hardware_version().map(str::to_owned),
            software_version: c.software_version().map(str::to_owned),
        }
    }
}

#[derive(Tabled)]
struct ControllerRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Via")]
    via: &'static str,
    #[tabled(rename = "HW")]
    hardware: String,
    #[tabled(rename = "Firmware")]
    software: String,
}

impl From<&ControllerSummary> for ControllerRow {
    fn from(s: &ControllerSummary) -> Self {
        Self {
            mac: s.mac.clone(),
            name: s.name.clone(),
            via: if s.remote { "cloud" } else { "lan" },
            hardware: s.hardware_version.clone().unwrap_or_default(),
            software: s.software_version.clone().unwrap_or_default(),
        }
    }
}

pub fn list(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let summaries: Vec<ControllerSummary> =
        client.controllers().iter().map(ControllerSummary::from).collect();
    let out = output::render_list(
        &global.output,
        &summaries,
        |s| ControllerRow::from(s),
        |s| s.mac.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn versions(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let versions = controller.api().versions().await?;
    let out = output::render_single(
        &global.output,
        &versions,
        |v: &ApiVersions| {
            output::detail(&[
                ("API", v.api_version.clone()),
                ("Hardware", v.hardware_version.clone()),
                ("Firmware", v.software_version.clone()),
            ])
        },
        |v| v.api_version.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
