// ── Core error types ──
//
// Errors returned by feature modules, the account store, and the login
// flow. Transport-level failures from `riftwatch-api` are carried
// verbatim inside `FeatureError::Remote` so callers can still tell a
// rejected call from a dead connection.

use std::path::PathBuf;

use riftwatch_api::RequestError;
use thiserror::Error;

/// Failure of a feature operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeatureError {
    /// Rejected locally. No request was sent.
    #[error("Invalid {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    /// No session is published yet (the game client isn't connected).
    #[error("League client is not connected")]
    NotConnected,

    /// The service answered with an error, or went away mid-call.
    #[error(transparent)]
    Remote(#[from] RequestError),
}

impl FeatureError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Failure reading or writing the saved-accounts file.
#[derive(Debug, Error)]
pub enum AccountStoreError {
    #[error("Failed to access account store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Account store {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No saved account named {username:?}")]
    NotFound { username: String },

    #[error("Account username must not be empty")]
    EmptyUsername,
}

/// Failure to start the external client launcher.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Riot Client executable not found (set accounts.launcher in the config)")]
    NotFound,

    #[error("Failed to launch {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of the saved-account login flow.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Store(#[from] AccountStoreError),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}
