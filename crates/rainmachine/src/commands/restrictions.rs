//! Restrictions and rain delay.

use serde_json::json;
use tabled::Tabled;

use rainmachine_api::models::{CurrentRestrictions, HourlyRestriction};
use rainmachine_core::Controller;

use crate::cli::{GlobalOpts, RestrictionsArgs, RestrictionsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct HourlyRow {
    #[tabled(rename = "ID")]
    uid: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "From")]
    start: String,
    #[tabled(rename = "Minutes")]
    minutes: u32,
}

impl From<&HourlyRestriction> for HourlyRow {
    fn from(r: &HourlyRestriction) -> Self {
        Self {
            uid: r.uid,
            name: r.name.clone().unwrap_or_default(),
            start: clock(r.day_start_minute),
            minutes: r.minute_duration,
        }
    }
}

/// Minutes after midnight as `HH:MM`.
fn clock(minute_of_day: u32) -> String {
    format!("{:02}:{:02}", minute_of_day / 60, minute_of_day % 60)
}

fn current_detail(r: &CurrentRestrictions, color: bool) -> String {
    let mut pairs = vec![
        ("Hourly", output::flag(r.hourly, color)),
        ("Freeze", output::flag(r.freeze, color)),
        ("Month", output::flag(r.month, color)),
        ("Weekday", output::flag(r.week_day, color)),
        ("Rain sensor", output::flag(r.rain_sensor, color)),
        ("Rain delay", output::flag(r.rain_delay, color)),
    ];
    if r.rain_delay {
        pairs.push(("Delay left", format!("{}s", r.rain_delay_counter)));
    }
    output::detail(&pairs)
}

pub async fn handle(
    controller: &Controller,
    args: RestrictionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let restrictions = controller.restrictions();
    let color = output::should_color(&global.color);

    match args.command {
        RestrictionsCommand::Current => {
            let current = restrictions.current().await?;
            let out = output::render_single(
                &global.output,
                &current,
                |r| current_detail(r, color),
                |r| r.rain_delay.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RestrictionsCommand::Hourly => {
            let windows = restrictions.hourly().await?;
            let out = output::render_list(&global.output, &windows, |r| HourlyRow::from(r), |r| {
                r.uid.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RestrictionsCommand::Raindelay => {
            let delay = restrictions.raindelay().await?;
            let days = delay.days_remaining();
            let view = json!({ "delayCounter": delay.delay_counter, "daysRemaining": days });
            let out = output::render_single(
                &global.output,
                &view,
                |_| {
                    if days > 0 {
                        format!("Rain delay active: {days} day(s) left")
                    } else {
                        "No rain delay".into()
                    }
                },
                |_| days.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RestrictionsCommand::SetRaindelay { days } => {
            let ack = restrictions.set_raindelay(days).await?;
            let done = if days == 0 {
                "Rain delay cleared".to_owned()
            } else {
                format!("Watering delayed for {days} day(s)")
            };
            util::report_ack(&ack, &done, global)
        }

        RestrictionsCommand::Global => {
            let global_restrictions = restrictions.universal().await?;
            output::print_output(
                &output::render_value(&global.output, &global_restrictions)?,
                global.quiet,
            );
            Ok(())
        }

        RestrictionsCommand::SetGlobal { from_file } => {
            let payload = util::read_json_file(&from_file)?;
            if !payload.is_object() {
                return Err(CliError::Validation {
                    field: "from-file".into(),
                    reason: "expected a JSON object".into(),
                });
            }
            let ack = restrictions.set_universal(payload).await?;
            util::report_ack(&ack, "Global restrictions updated", global)
        }
    }
}
