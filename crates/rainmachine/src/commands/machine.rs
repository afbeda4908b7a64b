//! Firmware and reboot.

use rainmachine_api::models::FirmwareUpdate;
use rainmachine_core::Controller;

use crate::cli::{GlobalOpts, MachineArgs, MachineCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn update_detail(u: &FirmwareUpdate) -> String {
    output::detail(&[
        ("Update available", u.update.to_string()),
        ("Status", u.update_status.to_string()),
        (
            "Last checked",
            u.last_update_check.clone().unwrap_or_else(|| "-".into()),
        ),
        ("Packages", u.package_details.len().to_string()),
    ])
}

pub async fn handle(
    controller: &Controller,
    args: MachineArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let machine = controller.machine();
    match args.command {
        MachineCommand::UpdateStatus => {
            let status = machine.firmware_update_status().await?;
            let out = output::render_single(&global.output, &status, update_detail, |u| {
                u.update.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MachineCommand::UpdateCheck => {
            let ack = machine.check_firmware_update().await?;
            util::report_ack(&ack, "Update check requested", global)
        }

        MachineCommand::Update => {
            if !util::confirm(
                "Install pending firmware? The controller restarts when done.",
                global.yes,
                "update",
            )? {
                return Ok(());
            }
            let ack = machine.update_firmware().await?;
            util::report_ack(&ack, "Firmware update started", global)
        }

        MachineCommand::Reboot => {
            if !util::confirm("Reboot the controller?", global.yes, "reboot")? {
                return Ok(());
            }
            let ack = machine.reboot().await?;
            util::report_ack(&ack, "Reboot requested", global)
        }
    }
}
