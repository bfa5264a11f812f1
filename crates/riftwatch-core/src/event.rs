// Connection state and the edge-triggered events derived from it.

use chrono::{DateTime, Utc};
use riftwatch_api::{Credentials, RequestError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Connection state observable by consumers.
///
/// `Connecting` is only visible while a connect attempt is outstanding;
/// every tick settles on one of the other three.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Why a live session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
    ConnectionRefused,
    Timeout,
}

impl From<&RequestError> for DisconnectReason {
    fn from(err: &RequestError) -> Self {
        match err {
            RequestError::Timeout { .. } => Self::Timeout,
            _ => Self::ConnectionRefused,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectEvent {
    pub timestamp: DateTime<Utc>,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectEvent {
    pub timestamp: DateTime<Utc>,
    pub reason: DisconnectReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub timestamp: DateTime<Utc>,
    pub error: String,
}

/// One state transition. Emitted exactly once per edge, never replayed.
#[derive(Debug, Clone)]
pub enum LcuEvent {
    Connected(ConnectEvent),
    Disconnected(DisconnectEvent),
    Error(ErrorEvent),
}

impl LcuEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Connected(e) => e.timestamp,
            Self::Disconnected(e) => e.timestamp,
            Self::Error(e) => e.timestamp,
        }
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected(_))
    }
}
