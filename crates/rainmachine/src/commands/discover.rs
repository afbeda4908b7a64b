//! `discover`: find a controller on the LAN.

use std::time::Duration;

use rainmachine_api::{DiscoveredController, DiscoveryConfig, discover};

use crate::cli::{DiscoverArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn detail(found: &DiscoveredController) -> String {
    let scheme = if found.use_ssl { "https" } else { "http" };
    output::detail(&[
        ("Name", found.name.clone()),
        ("MAC", found.mac.clone()),
        ("Address", format!("{scheme}://{}:{}", found.host, found.port)),
    ])
}

pub async fn handle(args: &DiscoverArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = DiscoveryConfig {
        timeout: Duration::from_secs(args.wait),
        ..DiscoveryConfig::default()
    };
    let found = discover(&config).await?;

    let out = output::render_single(&global.output, &found, detail, |f| f.host.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
