//! Diagnostics.

use rainmachine_core::Controller;

use crate::cli::{DiagArgs, DiagCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &Controller,
    args: DiagArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let diagnostics = controller.diagnostics();
    match args.command {
        DiagCommand::Show => {
            let state = diagnostics.current().await?;
            output::print_output(&output::render_value(&global.output, &state)?, global.quiet);
        }
        DiagCommand::Log => {
            let log = diagnostics.log().await?;
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => log,
                _ => output::render_value(&global.output, &serde_json::json!({ "log": log }))?,
            };
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}
