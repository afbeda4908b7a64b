//! Watering history, queue, and global controls.

use tabled::Tabled;

use rainmachine_api::models::{PastRun, QueuedRun, WaterLogDay};
use rainmachine_core::Controller;

use crate::cli::{DateWindow, GlobalOpts, WateringArgs, WateringCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Programs")]
    programs: usize,
}

impl From<&WaterLogDay> for LogRow {
    fn from(d: &WaterLogDay) -> Self {
        Self {
            date: d.date.clone(),
            programs: d.programs.len(),
        }
    }
}

#[derive(Tabled)]
struct PastRunRow {
    #[tabled(rename = "Program")]
    pid: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Used")]
    used: String,
}

#[derive(Tabled)]
struct QueueRow {
    #[tabled(rename = "Program")]
    pid: String,
    #[tabled(rename = "Zone")]
    zid: String,
    #[tabled(rename = "State")]
    state: String,
}

fn opt_id(id: Option<u32>) -> String {
    id.map_or_else(|| "-".into(), |v| v.to_string())
}

pub async fn handle(
    controller: &Controller,
    args: WateringArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let watering = controller.watering();
    let color = output::should_color(&global.color);

    match args.command {
        WateringCommand::Log { window, details } => {
            let DateWindow { date, days } = window;
            let date = util::parse_date(date.as_deref())?;
            let log = watering.log(date, days, details).await?;
            let out = output::render_list(&global.output, &log, |d| LogRow::from(d), |d| d.date.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WateringCommand::Runs { window } => {
            let date = util::parse_date(window.date.as_deref())?;
            let runs = watering.runs(date, window.days).await?;
            let out = output::render_list(
                &global.output,
                &runs,
                |r: &PastRun| PastRunRow {
                    pid: opt_id(r.pid),
                    when: r.date_time.clone().unwrap_or_default(),
                    used: output::flag(r.used, color),
                },
                |r| opt_id(r.pid),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WateringCommand::Queue => {
            let queue = watering.queue().await?;
            let out = output::render_list(
                &global.output,
                &queue,
                |q: &QueuedRun| QueueRow {
                    pid: opt_id(q.pid),
                    zid: opt_id(q.zid),
                    state: if q.running {
                        output::running(true, color)
                    } else {
                        "queued".into()
                    },
                },
                |q| opt_id(q.zid),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WateringCommand::Pause { seconds } => {
            let ack = watering.pause_all(seconds).await?;
            util::report_ack(&ack, &format!("Watering paused for {seconds}s"), global)
        }

        WateringCommand::Unpause => {
            let ack = watering.unpause_all().await?;
            util::report_ack(&ack, "Watering resumed", global)
        }

        WateringCommand::StopAll => {
            if !util::confirm("Stop all watering now?", global.yes, "stop-all")? {
                return Ok(());
            }
            let ack = watering.stop_all().await?;
            util::report_ack(&ack, "All watering stopped", global)
        }

        WateringCommand::Flowmeter => {
            let readings = watering.flowmeter().await?;
            let out = output::render_value(&global.output, &readings)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
