//! CLI-side connection resolution.
//!
//! Picks a profile (or builds one from `--host` / `--email`), layers flag
//! overrides on top, and resolves the password, prompting on a terminal
//! when nothing else supplies one.

use std::io::IsTerminal;
use std::time::Duration;

use secrecy::SecretString;

use rainmachine_config::{
    Config, ConfigError, Profile, client_config, config_path, load_config,
    profile_to_target_with_password, resolve_password,
};
use rainmachine_core::{ClientConfig, ConnectTarget};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything needed to build a client and log in.
#[derive(Debug)]
pub struct Connection {
    pub profile: String,
    pub client: ClientConfig,
    pub target: ConnectTarget,
}

/// Resolve the active profile name from flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the connection for this run from config, environment and flags.
pub fn resolve_connection(global: &GlobalOpts) -> Result<Connection, CliError> {
    let cfg = load_config()?;
    let (name, mut profile) = select_profile(global, &cfg)?;
    apply_overrides(&mut profile, global);

    let password = password_or_prompt(&profile, &name)?;
    let target = profile_to_target_with_password(&profile, password)?;

    let mut client = client_config(&cfg.defaults, Some(&profile));
    if let Some(secs) = global.timeout {
        client.transport.timeout = Duration::from_secs(secs);
    }

    Ok(Connection {
        profile: name,
        client,
        target,
    })
}

/// `--host` and `--email` build an ad-hoc profile; otherwise the named
/// (or default) profile from the file is used.
fn select_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, cfg);

    if let Some(ref host) = global.host {
        return Ok((name, Profile::local(host.clone())));
    }
    if let Some(ref email) = global.email {
        return Ok((name, Profile::remote(email.clone())));
    }

    match cfg.profile(global.profile.as_deref()) {
        Ok((name, profile)) => Ok((name, profile.clone())),
        Err(ConfigError::UnknownProfile { name }) if global.profile.is_some() => {
            Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(cfg),
            })
        }
        Err(ConfigError::UnknownProfile { .. }) => Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        }),
        Err(other) => Err(other.into()),
    }
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(port) = global.port {
        profile.port = Some(port);
    }
    if global.no_ssl {
        profile.ssl = Some(false);
    }
    if let Some(ref var) = global.password_env {
        profile.password_env = Some(var.clone());
    }
}

fn password_or_prompt(profile: &Profile, name: &str) -> Result<SecretString, CliError> {
    match resolve_password(profile, name) {
        Ok(password) => Ok(password),
        Err(ConfigError::NoCredentials { .. }) if std::io::stdin().is_terminal() => {
            let entered = rpassword::prompt_password(format!("Password for '{name}': "))?;
            Ok(SecretString::from(entered))
        }
        Err(other) => Err(other.into()),
    }
}
