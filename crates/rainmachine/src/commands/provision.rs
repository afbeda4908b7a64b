//! Provisioning: name, network, and system settings.

use serde_json::json;

use rainmachine_api::models::WifiSettings;
use rainmachine_core::Controller;

use crate::cli::{GlobalOpts, ProvisionArgs, ProvisionCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn wifi_detail(w: &WifiSettings) -> String {
    output::detail(&[
        ("MAC", w.mac_address.clone()),
        ("IP", w.ip_address.clone().unwrap_or_default()),
        ("SSID", w.ssid.clone().unwrap_or_default()),
    ])
}

pub async fn handle(
    controller: &Controller,
    args: ProvisionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let provisioning = controller.provisioning();
    match args.command {
        ProvisionCommand::Settings => {
            let settings = provisioning.settings().await?;
            let value = json!({ "system": settings.system, "location": settings.location });
            output::print_output(&output::render_value(&global.output, &value)?, global.quiet);
            Ok(())
        }

        ProvisionCommand::Name => {
            let name = provisioning.device_name().await?;
            let view = json!({ "name": name });
            let out =
                output::render_single(&global.output, &view, |_| name.clone(), |_| name.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProvisionCommand::SetName { name } => {
            if name.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "must not be empty".into(),
                });
            }
            let ack = provisioning.set_name(&name).await?;
            util::report_ack(&ack, &format!("Renamed to '{name}'"), global)
        }

        ProvisionCommand::Wifi => {
            let wifi = provisioning.wifi().await?;
            let out = output::render_single(&global.output, &wifi, wifi_detail, |w| {
                w.mac_address.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
