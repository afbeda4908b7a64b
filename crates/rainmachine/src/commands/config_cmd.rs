//! Config subcommand handlers.

use rainmachine_config::{KEYRING_SERVICE, config_path, load_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

fn keyring_err(e: &keyring::Error) -> CliError {
    CliError::Validation {
        field: "keyring".into(),
        reason: e.to_string(),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = load_config()?;
            output::print_output(&cfg.redacted().to_toml()?, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword { for_profile } => {
            let cfg = load_config()?;
            let name = for_profile.unwrap_or_else(|| active_profile_name(global, &cfg));

            let password = rpassword::prompt_password(format!("Password for '{name}': "))?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "must not be empty".into(),
                });
            }

            keyring::Entry::new(KEYRING_SERVICE, &format!("{name}/password"))
                .and_then(|entry| entry.set_password(&password))
                .map_err(|e| keyring_err(&e))?;

            output::print_done(
                &format!("Password for '{name}' stored in the system keyring"),
                global.quiet,
                output::should_color(&global.color),
            );
            Ok(())
        }
    }
}
