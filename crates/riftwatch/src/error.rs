//! CLI error types with miette diagnostics.
//!
//! Maps core, config, and store errors into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use riftwatch_api::RequestError;
use riftwatch_config::ConfigError;
use riftwatch_core::{AccountStoreError, FeatureError, LaunchError, LoginError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("League client is not running")]
    #[diagnostic(
        code(riftwatch::not_running),
        help(
            "Start the League client and log in, then try again.\n\
             If it is running, point at it with --port and --token,\n\
             or set resolver.lockfile in the config."
        )
    )]
    NotRunning,

    #[error("Lost the connection to the League client")]
    #[diagnostic(
        code(riftwatch::connection_lost),
        help("The client closed or restarted mid-request. Run: riftwatch status")
    )]
    ConnectionLost,

    // ── Authentication ───────────────────────────────────────────────
    #[error("The League client rejected our credentials (HTTP {status})")]
    #[diagnostic(
        code(riftwatch::auth_failed),
        help("The auth token changes on every client start. Drop --token to rediscover it.")
    )]
    AuthFailed { status: u16 },

    // ── Requests ─────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(riftwatch::request))]
    Request(RequestError),

    #[error("League client request timed out after {timeout_ms}ms")]
    #[diagnostic(
        code(riftwatch::timeout),
        help("Increase the timeout with --timeout or connection.request_timeout_ms.")
    )]
    Timeout { timeout_ms: u64 },

    #[error("Not available right now: {reason}")]
    #[diagnostic(code(riftwatch::unavailable))]
    Unavailable { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(riftwatch::validation))]
    Validation { field: String, reason: String },

    // ── Accounts ─────────────────────────────────────────────────────
    #[error("No saved account named '{username}'")]
    #[diagnostic(
        code(riftwatch::account_not_found),
        help("Run: riftwatch accounts list")
    )]
    AccountNotFound { username: String },

    #[error(transparent)]
    #[diagnostic(code(riftwatch::account_store))]
    AccountStore(AccountStoreError),

    #[error("The League client didn't come up within {secs}s")]
    #[diagnostic(
        code(riftwatch::login_timeout),
        help("The Riot Client may still be logging in. Run: riftwatch status")
    )]
    LoginTimeout { secs: u64 },

    #[error(transparent)]
    #[diagnostic(
        code(riftwatch::launch),
        help("Set accounts.launcher in the config to the Riot Client executable.")
    )]
    Launch(LaunchError),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(riftwatch::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(riftwatch::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(riftwatch::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotRunning | Self::ConnectionLost => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout { .. } | Self::LoginTimeout { .. } => exit_code::TIMEOUT,
            Self::AccountNotFound { .. } => exit_code::NOT_FOUND,
            Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library error → CliError mapping ─────────────────────────────────

impl From<RequestError> for CliError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::ConnectionRefused => Self::ConnectionLost,
            RequestError::Timeout { timeout_ms } => Self::Timeout { timeout_ms },
            RequestError::HttpError { status, .. } if matches!(status, 401 | 403) => {
                Self::AuthFailed { status }
            }
            other => Self::Request(other),
        }
    }
}

impl From<FeatureError> for CliError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::NotConnected => Self::NotRunning,
            FeatureError::ValidationFailed { field, reason } => Self::Validation { field, reason },
            FeatureError::Remote(e) => e.into(),
        }
    }
}

impl From<AccountStoreError> for CliError {
    fn from(err: AccountStoreError) -> Self {
        match err {
            AccountStoreError::NotFound { username } => Self::AccountNotFound { username },
            AccountStoreError::EmptyUsername => Self::Validation {
                field: "username".into(),
                reason: "must not be empty".into(),
            },
            other => Self::AccountStore(other),
        }
    }
}

impl From<LoginError> for CliError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::Store(e) => e.into(),
            LoginError::Launch(e) => Self::Launch(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::AlreadyExists { path } => Self::ConfigExists {
                path: path.display().to_string(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_connected_maps_to_connection_exit() {
        let err = CliError::from(FeatureError::NotConnected);
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn remote_errors_keep_their_category() {
        let timeout = CliError::from(FeatureError::Remote(RequestError::Timeout { timeout_ms: 5 }));
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let auth = CliError::from(FeatureError::Remote(RequestError::HttpError {
            status: 401,
            message: String::new(),
        }));
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let rejected = CliError::from(FeatureError::Remote(RequestError::HttpError {
            status: 500,
            message: "boom".into(),
        }));
        assert_eq!(rejected.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn validation_and_missing_account_exit_codes() {
        let invalid = CliError::from(FeatureError::ValidationFailed {
            field: "iconId".into(),
            reason: "must not be negative".into(),
        });
        assert_eq!(invalid.exit_code(), exit_code::USAGE);
        assert_eq!(invalid.to_string(), "Invalid value for iconId: must not be negative");

        let missing = CliError::from(LoginError::Store(AccountStoreError::NotFound {
            username: "smurf".into(),
        }));
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
    }
}
