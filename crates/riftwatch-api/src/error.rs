use std::path::PathBuf;

use thiserror::Error;

/// Failure to discover the local service's port and auth token.
///
/// Every variant means "the service can't be reached right now"; the
/// poller treats them alike and simply stays disconnected.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// No lockfile and no matching process -- the service isn't running.
    #[error("League client not found (is it running?)")]
    NotFound,

    /// The lockfile exists but its contents don't parse. Usually a partial
    /// write while the service is starting up.
    #[error("Malformed endpoint data in {source_name}: {reason}")]
    ParseError { source_name: String, reason: String },

    /// The lockfile exists but couldn't be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolutionError {
    /// Ordering used when several resolvers fail: the most informative
    /// failure wins.
    pub(crate) fn specificity(&self) -> u8 {
        match self {
            Self::NotFound => 0,
            Self::Io { .. } => 1,
            Self::ParseError { .. } => 2,
        }
    }
}

/// Failure of a single request against the local service.
///
/// Only [`ConnectionRefused`](Self::ConnectionRefused) and
/// [`Timeout`](Self::Timeout) are network-level. Everything else means the
/// service answered (or we never sent anything) and the session is
/// presumed alive.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    // ── Network level ───────────────────────────────────────────────
    /// Nothing is listening on the port, or the connection dropped.
    #[error("Connection refused by the League client")]
    ConnectionRefused,

    /// The request didn't complete within the configured timeout.
    #[error("League client request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ── Application level ───────────────────────────────────────────
    /// The service rejected the call with a non-2xx status.
    #[error("League client returned HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The response body wasn't the JSON we expected.
    #[error("Malformed response from the League client: {message}")]
    ParseError { message: String },

    /// Rejected locally before any I/O.
    #[error("Invalid request path: {path:?}")]
    InvalidPath { path: String },
}

impl RequestError {
    /// Returns `true` for failures that mean the service went away.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::ConnectionRefused | Self::Timeout { .. })
    }

    /// HTTP status, if the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a 404 from the service.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_ms }
        } else if err.is_decode() {
            Self::ParseError {
                message: err.to_string(),
            }
        } else {
            // connect failures, resets, and truncated bodies all mean the
            // listener is gone
            Self::ConnectionRefused
        }
    }
}

/// Failure to build the underlying HTTP client.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("TLS configuration error: {0}")]
    Tls(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
