//! Zone command handlers.

use tabled::Tabled;

use rainmachine_api::models::Zone;
use rainmachine_core::Controller;

use crate::cli::{GlobalOpts, ZonesArgs, ZonesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "ID")]
    uid: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Valve")]
    valve: String,
    #[tabled(rename = "State")]
    state: String,
}

impl ZoneRow {
    fn new(z: &Zone, color: bool) -> Self {
        let state = match z.state {
            1 => output::running(true, color),
            2 => "queued".into(),
            _ => String::new(),
        };
        Self {
            uid: z.uid,
            name: z.name.clone(),
            active: output::flag(z.active, color),
            valve: z
                .properties
                .as_ref()
                .and_then(|p| p.valve_id)
                .map_or_else(String::new, |v| v.to_string()),
            state,
        }
    }
}

fn detail(z: &Zone) -> String {
    let mut pairs = vec![
        ("ID", z.uid.to_string()),
        ("Name", z.name.clone()),
        ("Active", z.active.to_string()),
        ("Watering", z.is_running().to_string()),
    ];
    if let Some(valve) = z.properties.as_ref().and_then(|p| p.valve_id) {
        pairs.push(("Valve", valve.to_string()));
    }
    output::detail(&pairs)
}

fn print_zones(zones: &[Zone], global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        zones,
        |z| ZoneRow::new(z, color),
        |z| z.uid.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    controller: &Controller,
    args: ZonesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let zones = controller.zones();
    match args.command {
        ZonesCommand::List { all, details } => {
            let listed: Vec<Zone> = zones.all(details, all).await?.into_values().collect();
            print_zones(&listed, global)
        }

        ZonesCommand::Get { uid, details } => {
            let zone = zones.get(uid, details).await?;
            let out =
                output::render_single(&global.output, &zone, detail, |z| z.uid.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ZonesCommand::Start { uid, seconds } => {
            let ack = zones.start(uid, seconds).await?;
            util::report_ack(&ack, &format!("Zone {uid} watering for {seconds}s"), global)
        }

        ZonesCommand::Stop { uid } => {
            let ack = zones.stop(uid).await?;
            util::report_ack(&ack, &format!("Zone {uid} stopped"), global)
        }

        ZonesCommand::Enable { uid } => {
            let ack = zones.enable(uid).await?;
            util::report_ack(&ack, &format!("Zone {uid} enabled"), global)
        }

        ZonesCommand::Disable { uid } => {
            let ack = zones.disable(uid).await?;
            util::report_ack(&ack, &format!("Zone {uid} disabled"), global)
        }

        ZonesCommand::Running => print_zones(&zones.running().await?, global),
    }
}
