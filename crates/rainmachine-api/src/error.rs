use std::time::Duration;

use strum::{AsRefStr, Display};
use thiserror::Error;

// ── Device / relay error code tables ────────────────────────────────

/// Local `statusCode` values that mean success.
pub const LOCAL_SUCCESS_CODES: [i64; 2] = [0, 200];

/// Local `statusCode`: request not authenticated (token missing, revoked or expired).
pub const LOCAL_CODE_NOT_AUTHENTICATED: i64 = 2;

/// Local `statusCode`: the firmware does not implement the requested call.
pub const LOCAL_CODE_NOT_IMPLEMENTED: i64 = 4;

/// Cloud relay `errorType`: the account email has not been validated yet.
pub const REMOTE_CODE_EMAIL_NOT_VALIDATED: i64 = 1;

/// Coarse classification of every [`Error`].
///
/// Match on this when only the category matters (e.g. re-authenticate on
/// [`ErrorKind::TokenExpired`]); match on [`Error`] itself for the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    Request,
    Timeout,
    TokenExpired,
    UnsupportedCall,
    UnvalidatedEmail,
    DiscoveryFailed,
}

/// Top-level error type for the `rainmachine-api` crate.
///
/// Every variant that originates from an HTTP call carries the URL that was
/// requested (without the `access_token` query parameter).
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Network-level failure (connection refused, DNS, TLS, reset).
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Generic failure talking to the API (non-2xx status, bad request shape).
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The per-call timeout budget elapsed.
    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Building the underlying HTTP client failed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Authentication ──────────────────────────────────────────────
    /// The access token is expired or was rejected.
    #[error("Access token expired ({url}): {message}")]
    TokenExpired { url: String, message: String },

    /// The cloud account exists but its email address is not validated.
    #[error("Email address has not been validated ({url})")]
    UnvalidatedEmail { url: String },

    // ── Device ──────────────────────────────────────────────────────
    /// The controller does not support this call, either reported by the
    /// device or refused up front for generation-1 hardware.
    #[error("Unsupported call {url}: {message}")]
    UnsupportedCall { url: String, message: String },

    /// A device or relay error code with no dedicated variant.
    #[error("API error {code} from {url}: {message}")]
    Api {
        url: String,
        code: i64,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON decoding failed, with the raw body for debugging.
    #[error("Deserialization error from {url}: {message}")]
    Deserialization {
        url: String,
        message: String,
        body: String,
    },

    // ── Discovery ───────────────────────────────────────────────────
    #[error("Discovery failed: {0}")]
    DiscoveryFailed(#[from] DiscoveryFailure),
}

/// Internal cause of an [`Error::DiscoveryFailed`].
///
/// Callers that only care whether a unit was found can ignore the cause;
/// every variant maps to [`ErrorKind::DiscoveryFailed`].
#[derive(Debug, Error)]
pub enum DiscoveryFailure {
    #[error("no reply within {timeout:?}")]
    NoReply { timeout: Duration },

    #[error("no valid unit found (reply kind {0:?})")]
    UnexpectedKind(String),

    #[error("malformed reply: {0}")]
    Malformed(String),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map a local-device `statusCode` onto an error.
    ///
    /// Unmapped codes fall back to [`Error::Api`] carrying the raw code and message.
    pub fn from_local_code(url: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        let url = url.into();
        let message = message.into();
        match code {
            LOCAL_CODE_NOT_AUTHENTICATED => Self::TokenExpired { url, message },
            LOCAL_CODE_NOT_IMPLEMENTED => Self::UnsupportedCall { url, message },
            _ => Self::Api { url, code, message },
        }
    }

    /// Map a cloud relay `errorType` onto an error.
    ///
    /// The relay sends no message alongside the code, so unmapped codes get
    /// a synthetic one.
    pub fn from_remote_code(url: impl Into<String>, code: i64) -> Self {
        let url = url.into();
        match code {
            REMOTE_CODE_EMAIL_NOT_VALIDATED => Self::UnvalidatedEmail { url },
            _ => Self::Api {
                url,
                code,
                message: format!("cloud relay error type {code}"),
            },
        }
    }

    /// The coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::TokenExpired { .. } => ErrorKind::TokenExpired,
            Self::UnsupportedCall { .. } => ErrorKind::UnsupportedCall,
            Self::UnvalidatedEmail { .. } => ErrorKind::UnvalidatedEmail,
            Self::DiscoveryFailed(_) => ErrorKind::DiscoveryFailed,
            Self::Transport { .. }
            | Self::Request { .. }
            | Self::InvalidUrl(_)
            | Self::ClientBuild(_)
            | Self::Api { .. }
            | Self::Deserialization { .. } => ErrorKind::Request,
        }
    }

    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_token_expired(&self) -> bool {
        self.kind() == ErrorKind::TokenExpired
    }

    /// Returns `true` if the controller cannot perform the call at all.
    pub fn is_unsupported(&self) -> bool {
        self.kind() == ErrorKind::UnsupportedCall
    }

    /// The URL (or guarded operation path) this error relates to, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Transport { url, .. }
            | Self::Request { url, .. }
            | Self::Timeout { url, .. }
            | Self::TokenExpired { url, .. }
            | Self::UnvalidatedEmail { url }
            | Self::UnsupportedCall { url, .. }
            | Self::Api { url, .. }
            | Self::Deserialization { url, .. } => Some(url),
            Self::InvalidUrl(_) | Self::ClientBuild(_) | Self::DiscoveryFailed(_) => None,
        }
    }

    /// The raw device/relay error code, if the error came from one.
    pub fn api_error_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
