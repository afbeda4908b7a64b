//! Daily statistics.

use tabled::Tabled;

use rainmachine_api::models::DailyStat;
use rainmachine_core::Controller;

use crate::cli::{GlobalOpts, StatsArgs, StatsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Percentage")]
    percentage: String,
    #[tabled(rename = "Min / Max °C")]
    temperature: String,
}

fn number(stat: &DailyStat, key: &str) -> Option<f64> {
    stat.extra.get(key).and_then(serde_json::Value::as_f64)
}

impl From<&DailyStat> for StatRow {
    fn from(s: &DailyStat) -> Self {
        let percentage =
            number(s, "percentage").map_or_else(String::new, |p| format!("{:.0}%", p * 100.0));
        let temperature = match (number(s, "mintemp"), number(s, "maxtemp")) {
            (Some(min), Some(max)) => format!("{min:.1} / {max:.1}"),
            _ => String::new(),
        };
        Self {
            day: s.day.clone(),
            percentage,
            temperature,
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: StatsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let stats = controller.stats();
    match args.command {
        StatsCommand::Day { date } => {
            let date = util::parse_date(date.as_deref())?;
            let day = stats.on_date(date).await?;
            output::print_output(&output::render_value(&global.output, &day)?, global.quiet);
        }
        StatsCommand::Upcoming { details } => {
            let upcoming = stats.upcoming(details).await?;
            let out =
                output::render_list(&global.output, &upcoming, |s| StatRow::from(s), |s| s.day.clone())?;
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}
