//! Command dispatch.
//!
//! Offline commands (config, completions, discover) run without logging
//! in. Everything else resolves a connection, loads the controllers it
//! reaches, and runs against the one selected by `--mac`.

pub mod config_cmd;
pub mod controllers;
pub mod diag;
pub mod discover;
pub mod machine;
pub mod parsers;
pub mod programs;
pub mod provision;
pub mod restrictions;
pub mod stats;
pub mod util;
pub mod watering;
pub mod zones;

use clap::CommandFactory;
use tracing::debug;

use rainmachine_core::{Client, Controller};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            let mut cli = Cli::command();
            clap_complete::generate(args.shell, &mut cli, "rainmachine", &mut std::io::stdout());
            Ok(())
        }
        Command::Discover(args) => discover::handle(&args, global).await,
        cmd => {
            let client = connect(global).await?;
            let result = match cmd {
                Command::Controllers => controllers::list(&client, global),
                cmd => {
                    let controller = util::select_controller(&client, global.mac.as_deref())?;
                    debug!(mac = controller.mac(), command = ?cmd, "dispatching command");
                    on_controller(cmd, &controller, global).await
                }
            };
            client.close();
            result
        }
    }
}

async fn connect(global: &GlobalOpts) -> Result<Client, CliError> {
    let conn = config::resolve_connection(global)?;
    debug!(profile = %conn.profile, kind = conn.target.kind(), "resolved connection");

    let client = Client::new(conn.client)?;
    client.connect(&conn.target, true).await?;
    Ok(client)
}

async fn on_controller(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Versions => controllers::versions(controller, global).await,
        Command::Programs(args) => programs::handle(controller, args, global).await,
        Command::Zones(args) => zones::handle(controller, args, global).await,
        Command::Watering(args) => watering::handle(controller, args, global).await,
        Command::Diag(args) => diag::handle(controller, args, global).await,
        Command::Provision(args) => provision::handle(controller, args, global).await,
        Command::Restrictions(args) => restrictions::handle(controller, args, global).await,
        Command::Stats(args) => stats::handle(controller, args, global).await,
        Command::Machine(args) => machine::handle(controller, args, global).await,
        Command::Parsers(args) => parsers::handle(controller, args, global).await,
        Command::Controllers
        | Command::Discover(_)
        | Command::Config(_)
        | Command::Completions(_) => unreachable!("handled before controller selection"),
    }
}
