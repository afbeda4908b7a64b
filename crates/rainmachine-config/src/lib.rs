//! Shared configuration for RainMachine tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `rainmachine_core::{ClientConfig, ConnectTarget}`. The CLI
//! layers its flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rainmachine_core::{ClientConfig, ConnectTarget, LocalTarget};

/// Keyring service name credentials are stored under.
pub const KEYRING_SERVICE: &str = "rainmachine";

/// Environment variable consulted before the keyring.
pub const PASSWORD_ENV: &str = "RAINMACHINE_PASSWORD";

const ENV_PREFIX: &str = "RAINMACHINE_";
const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Share one connection pool across every call of a run.
    #[serde(default = "default_reuse_session")]
    pub reuse_session: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            reuse_session: default_reuse_session(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_reuse_session() -> bool {
    true
}

/// How a profile reaches its controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// One controller on the LAN.
    Local,
    /// Every controller linked to a cloud account.
    Remote,
}

/// A named profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    pub kind: ProfileKind,

    /// Controller address (local profiles).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// `false` talks plain HTTP to the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl: Option<bool>,

    /// Account email (remote profiles).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Plaintext password (prefer the keyring or an env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Override the per-call timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn local(host: impl Into<String>) -> Self {
        Self::empty(ProfileKind::Local, Some(host.into()), None)
    }

    pub fn remote(email: impl Into<String>) -> Self {
        Self::empty(ProfileKind::Remote, None, Some(email.into()))
    }

    fn empty(kind: ProfileKind, host: Option<String>, email: Option<String>) -> Self {
        Self {
            kind,
            host,
            port: None,
            ssl: None,
            email,
            password: None,
            password_env: None,
            timeout: None,
        }
    }
}

impl Config {
    /// Look up a profile by name, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile)),
            None => Err(ConfigError::UnknownProfile { name }),
        }
    }

    /// A copy safe to print: plaintext passwords are masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for profile in copy.profiles.values_mut() {
            if profile.password.is_some() {
                profile.password = Some(REDACTED.into());
            }
        }
        copy
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "rainmachine", "rainmachine").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("rainmachine");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the canonical file plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` plus `RAINMACHINE_*` environment overrides.
///
/// Nested keys use a double underscore, e.g.
/// `RAINMACHINE_DEFAULTS__TIMEOUT=30`. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__").ignore(&["password"]));

    Ok(figment.extract()?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a profile's password.
///
/// Order: the profile's `password_env` variable, [`PASSWORD_ENV`], the
/// system keyring (`rainmachine` / `{profile}/password`), then the
/// plaintext value in the file.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        keyring_password,
    )
}

fn keyring_password(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .ok()?
        .get_password()
        .ok()
}

fn resolve_password_with(
    source: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile-specific env var
    if let Some(ref var) = source.password_env {
        if let Some(pw) = env(var) {
            return Ok(SecretString::from(pw));
        }
    }

    // 2. Global env var
    if let Some(pw) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 3. Keyring
    if let Some(pw) = keyring(profile_name) {
        return Ok(SecretString::from(pw));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = source.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation to core types ───────────────────────────────────────

/// Build the login target for a profile, resolving its password.
pub fn profile_to_target(
    profile: &Profile,
    profile_name: &str,
) -> Result<ConnectTarget, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    profile_to_target_with_password(profile, password)
}

/// Build the login target for a profile with an already-resolved password.
pub fn profile_to_target_with_password(
    profile: &Profile,
    password: SecretString,
) -> Result<ConnectTarget, ConfigError> {
    match profile.kind {
        ProfileKind::Local => {
            let host = required(profile.host.as_deref(), "host")?;
            let mut target = LocalTarget::new(host);
            if let Some(port) = profile.port {
                target = target.port(port);
            }
            if let Some(ssl) = profile.ssl {
                target = target.use_ssl(ssl);
            }
            Ok(ConnectTarget::Local { target, password })
        }
        ProfileKind::Remote => {
            let email = required(profile.email.as_deref(), "email")?;
            if !email.contains('@') {
                return Err(ConfigError::Validation {
                    field: "email".into(),
                    reason: format!("'{email}' is not an email address"),
                });
            }
            Ok(ConnectTarget::Remote {
                email: email.to_owned(),
                password,
            })
        }
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ConfigError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Validation {
            field: field.into(),
            reason: "must be set".into(),
        })
}

/// Client settings for a profile: its timeout override wins over defaults.
pub fn client_config(defaults: &Defaults, profile: Option<&Profile>) -> ClientConfig {
    let secs = profile
        .and_then(|p| p.timeout)
        .unwrap_or(defaults.timeout);
    let mut config = ClientConfig {
        reuse_session: defaults.reuse_session,
        ..ClientConfig::default()
    };
    config.transport.timeout = Duration::from_secs(secs);
    config
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "garden"

[defaults]
timeout = 20

[profiles.garden]
kind = "local"
host = "192.168.1.101"
port = 8081
password = "plain"

[profiles.cloud]
kind = "remote"
email = "me@example.com"
password_env = "MY_RM_PASSWORD"
timeout = 45
"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn loads_both_profile_kinds() {
        let file = write_config(SAMPLE);
        let config = load_config_from(file.path()).unwrap();

        assert_eq!(config.defaults.timeout, 20);
        assert!(config.defaults.reuse_session);

        let (name, garden) = config.profile(None).unwrap();
        assert_eq!(name, "garden");
        assert_eq!(garden.kind, ProfileKind::Local);
        assert_eq!(garden.port, Some(8081));

        let (_, cloud) = config.profile(Some("cloud")).unwrap();
        assert_eq!(cloud.kind, ProfileKind::Remote);
        assert_eq!(cloud.timeout, Some(45));
        assert_eq!(cloud.password_env.as_deref(), Some("MY_RM_PASSWORD"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.profiles.is_empty());
        assert_eq!(config.defaults.output, "table");
    }

    #[test]
    fn unknown_profile_is_reported() {
        let err = Config::default().profile(Some("nope")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { ref name } if name == "nope"));
    }

    #[test]
    fn unknown_kind_fails_to_load() {
        let file = write_config("[profiles.x]\nkind = \"bluetooth\"\nhost = \"h\"\n");
        assert!(matches!(
            load_config_from(file.path()),
            Err(ConfigError::Figment(_))
        ));
    }

    #[test]
    fn password_chain_order() {
        let source = Profile {
            password: Some("plain".into()),
            password_env: Some("MY_RM_PASSWORD".into()),
            ..Profile::local("h")
        };

        let profile_env = |name: &str| (name == "MY_RM_PASSWORD").then(|| "from-profile-env".into());
        let pw = resolve_password_with(&source, "p", profile_env, |_| Some("kr".into())).unwrap();
        assert_eq!(pw.expose_secret(), "from-profile-env");

        let global_env = |name: &str| (name == PASSWORD_ENV).then(|| "from-global-env".into());
        let pw = resolve_password_with(&source, "p", global_env, |_| Some("kr".into())).unwrap();
        assert_eq!(pw.expose_secret(), "from-global-env");

        let pw = resolve_password_with(&source, "p", no_env, |p| Some(format!("kr-{p}"))).unwrap();
        assert_eq!(pw.expose_secret(), "kr-p");

        let pw = resolve_password_with(&source, "p", no_env, |_| None).unwrap();
        assert_eq!(pw.expose_secret(), "plain");
    }

    #[test]
    fn no_password_anywhere() {
        let err =
            resolve_password_with(&Profile::local("h"), "garden", no_env, |_| None)
                .unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { ref profile } if profile == "garden"));
    }

    #[test]
    fn local_profile_becomes_target() {
        let file = write_config(SAMPLE);
        let config = load_config_from(file.path()).unwrap();
        let (_, garden) = config.profile(Some("garden")).unwrap();

        let target =
            profile_to_target_with_password(garden, SecretString::from("pw")).unwrap();
        let ConnectTarget::Local { target, .. } = target else {
            panic!("expected a local target");
        };
        assert_eq!(target.base_url(), "https://192.168.1.101:8081/api/4");
    }

    #[test]
    fn remote_profile_requires_email() {
        let profile = Profile::remote("not-an-email");
        let err = profile_to_target_with_password(&profile, SecretString::from("pw")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "email"));
    }

    #[test]
    fn local_profile_requires_host() {
        let profile = Profile {
            host: Some("  ".into()),
            ..Profile::local("x")
        };
        let err = profile_to_target_with_password(&profile, SecretString::from("pw")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "host"));
    }

    #[test]
    fn profile_timeout_overrides_default() {
        let defaults = Defaults::default();
        let profile = Profile {
            timeout: Some(45),
            ..Profile::remote("a@b.c")
        };
        assert_eq!(
            client_config(&defaults, Some(&profile)).transport.timeout,
            Duration::from_secs(45)
        );
        assert_eq!(
            client_config(&defaults, None).transport.timeout,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn redaction_masks_plaintext_only() {
        let file = write_config(SAMPLE);
        let config = load_config_from(file.path()).unwrap().redacted();
        let text = config.to_toml().unwrap();
        assert!(!text.contains("plain"), "{text}");
        assert!(text.contains("MY_RM_PASSWORD"), "{text}");
    }
}
