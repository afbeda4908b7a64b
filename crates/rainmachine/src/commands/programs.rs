//! Program command handlers.

use tabled::Tabled;

use rainmachine_api::models::{NextRun, Program};
use rainmachine_core::Controller;

use crate::cli::{GlobalOpts, ProgramsArgs, ProgramsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProgramRow {
    #[tabled(rename = "ID")]
    uid: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl ProgramRow {
    fn new(p: &Program, color: bool) -> Self {
        let status = match p.status {
            1 => output::running(true, color),
            2 => "queued".into(),
            _ => String::new(),
        };
        Self {
            uid: p.uid,
            name: p.name.clone(),
            active: output::flag(p.active, color),
            status,
        }
    }
}

#[derive(Tabled)]
struct NextRunRow {
    #[tabled(rename = "Program")]
    pid: u32,
    #[tabled(rename = "Starts")]
    start: String,
}

impl From<&NextRun> for NextRunRow {
    fn from(n: &NextRun) -> Self {
        Self {
            pid: n.pid,
            start: n.start_time.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

fn detail(p: &Program) -> String {
    let status = match p.status {
        1 => "running",
        2 => "queued",
        _ => "idle",
    };
    output::detail(&[
        ("ID", p.uid.to_string()),
        ("Name", p.name.clone()),
        ("Active", p.active.to_string()),
        ("Status", status.into()),
    ])
}

fn print_programs(programs: &[Program], global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        programs,
        |p| ProgramRow::new(p, color),
        |p| p.uid.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ProgramsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let programs = controller.programs();
    match args.command {
        ProgramsCommand::List { all } => {
            let listed: Vec<Program> = programs.all(all).await?.into_values().collect();
            print_programs(&listed, global)
        }

        ProgramsCommand::Get { uid } => {
            let program = programs.get(uid).await?;
            let out = output::render_single(&global.output, &program, detail, |p| {
                p.uid.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProgramsCommand::Start { uid } => {
            let ack = programs.start(uid).await?;
            util::report_ack(&ack, &format!("Program {uid} started"), global)
        }

        ProgramsCommand::Stop { uid } => {
            let ack = programs.stop(uid).await?;
            util::report_ack(&ack, &format!("Program {uid} stopped"), global)
        }

        ProgramsCommand::Enable { uid } => {
            let ack = programs.enable(uid).await?;
            util::report_ack(&ack, &format!("Program {uid} enabled"), global)
        }

        ProgramsCommand::Disable { uid } => {
            let ack = programs.disable(uid).await?;
            util::report_ack(&ack, &format!("Program {uid} disabled"), global)
        }

        ProgramsCommand::Next => {
            let upcoming = programs.next().await?;
            let out = output::render_list(&global.output, &upcoming, |n| NextRunRow::from(n), |n| {
                n.pid.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProgramsCommand::Running => print_programs(&programs.running().await?, global),
    }
}
