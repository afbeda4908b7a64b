//! CLI error types with miette diagnostics.
//!
//! Folds library errors into user-facing errors with help text and a
//! stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use rainmachine_api::Error as ApiError;
use rainmachine_config::ConfigError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {url}")]
    #[diagnostic(
        code(rainmachine::connection_failed),
        help(
            "Check that the controller is powered on and reachable.\n\
             LAN controllers listen on port 8080 over HTTPS unless --no-ssl is given."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No controller answered the discovery probe: {reason}")]
    #[diagnostic(
        code(rainmachine::discovery_failed),
        help("Make sure this machine is on the same network segment, or pass --host directly.")
    )]
    DiscoveryFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(rainmachine::auth_failed),
        help(
            "Verify the password for this controller or account.\n\
             Store it with: rainmachine config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No password available for profile '{profile}'")]
    #[diagnostic(
        code(rainmachine::no_credentials),
        help(
            "Set RAINMACHINE_PASSWORD, point password_env at a variable,\n\
             or run: rainmachine config set-password"
        )
    )]
    NoCredentials { profile: String },

    #[error("The account email address has not been validated")]
    #[diagnostic(
        code(rainmachine::unvalidated_email),
        help("Follow the link in the validation email, then try again.")
    )]
    UnvalidatedEmail,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(rainmachine::not_found),
        help("Run: rainmachine {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Device ───────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(rainmachine::api_error))]
    ApiError { code: i64, message: String },

    #[error("The controller does not support this call: {message}")]
    #[diagnostic(
        code(rainmachine::unsupported),
        help("First-generation hardware and older firmware lack some endpoints.")
    )]
    Unsupported { message: String },

    #[error("Request failed: {message}")]
    #[diagnostic(code(rainmachine::request))]
    Request { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(rainmachine::timeout),
        help("Increase the budget with --timeout or check the controller.")
    )]
    Timeout { seconds: u64 },

    // ── Validation / configuration ──────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rainmachine::validation))]
    Validation { field: String, reason: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(rainmachine::profile_not_found),
        help(
            "Configured profiles: {available}\n\
             Or skip profiles with --host / --email."
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(rainmachine::no_config),
        help(
            "Pass --host (LAN) or --email (cloud), or add a profile to:\n  {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(rainmachine::config))]
    Config(Box<ConfigError>),

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(rainmachine::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(rainmachine::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::DiscoveryFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::UnvalidatedEmail => {
                exit_code::AUTH
            }
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library error mapping ────────────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport { url, source } => Self::ConnectionFailed {
                url,
                source: Box::new(source),
            },
            ApiError::Timeout { timeout, .. } => Self::Timeout {
                seconds: timeout.as_secs(),
            },
            ApiError::TokenExpired { message, .. } => Self::AuthFailed { message },
            ApiError::UnvalidatedEmail { .. } => Self::UnvalidatedEmail,
            ApiError::UnsupportedCall { url, message } => Self::Unsupported {
                message: format!("{message} ({url})"),
            },
            ApiError::Api { code, message, .. } => Self::ApiError { code, message },
            ApiError::DiscoveryFailed(cause) => Self::DiscoveryFailed {
                reason: cause.to_string(),
            },
            other => Self::Request {
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}
