// Connection credentials for the local League client service.
//
// The auth token is a per-session secret. It's held in a `SecretString` so
// it never leaks through `Debug`, and only the port and protocol ever cross
// the relay boundary.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Scheme the local service listens on. The game client always reports
/// `https`, but the lockfile carries it explicitly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Https,
    Http,
}

/// Everything needed to talk to one running instance of the service.
///
/// Values are only valid for the lifetime of that instance: a restart
/// hands out a new port and a new token.
#[derive(Clone)]
pub struct Credentials {
    pub port: u16,
    pub protocol: Protocol,
    auth_token: SecretString,
}

impl Credentials {
    pub fn new(port: u16, auth_token: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            port,
            protocol,
            auth_token: SecretString::from(auth_token.into()),
        }
    }

    /// The raw token. Only the HTTP client should need this.
    pub fn auth_token(&self) -> &str {
        self.auth_token.expose_secret()
    }

    /// Port and protocol only, safe to log or ship to a UI.
    pub fn sanitized(&self) -> SanitizedCredentials {
        SanitizedCredentials {
            port: self.port,
            protocol: self.protocol,
        }
    }
}

impl PartialEq for Credentials {
    fn eq(&self, other: &Self) -> bool {
        self.port == other.port
            && self.protocol == other.protocol
            && self.auth_token.expose_secret() == other.auth_token.expose_secret()
    }
}

impl Eq for Credentials {}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("auth_token", &"[REDACTED]")
            .finish()
    }
}

/// The parts of [`Credentials`] that are not secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedCredentials {
    pub port: u16,
    pub protocol: Protocol,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let creds = Credentials::new(54321, "hunter2", Protocol::Https);
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("54321"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn protocol_parses_case_insensitively() {
        assert_eq!("HTTPS".parse::<Protocol>().ok(), Some(Protocol::Https));
        assert_eq!("http".parse::<Protocol>().ok(), Some(Protocol::Http));
        assert!("ftp".parse::<Protocol>().is_err());
    }

    #[test]
    fn sanitized_drops_the_token() {
        let json = serde_json::to_string(&Credentials::new(1, "tok", Protocol::Https).sanitized())
            .unwrap_or_default();
        assert_eq!(json, r#"{"port":1,"protocol":"https"}"#);
    }
}
