//! Weather parsers.

use tabled::Tabled;

use rainmachine_api::models::Parser;
use rainmachine_core::Controller;

use crate::cli::{GlobalOpts, ParsersArgs, ParsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ParserRow {
    #[tabled(rename = "ID")]
    uid: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

pub async fn handle(
    controller: &Controller,
    args: ParsersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let parsers = controller.parsers();
    match args.command {
        ParsersCommand::List => {
            let color = output::should_color(&global.color);
            let listed = parsers.current().await?;
            let out = output::render_list(
                &global.output,
                &listed,
                |p: &Parser| ParserRow {
                    uid: p.uid,
                    name: p.name.clone(),
                    enabled: output::flag(p.enabled, color),
                },
                |p| p.uid.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ParsersCommand::PostData { from_file } => {
            let payload = util::read_json_file(&from_file)?;
            let ack = parsers.post_data(payload).await?;
            util::report_ack(&ack, "Weather data submitted", global)
        }
    }
}
