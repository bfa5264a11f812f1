// Shared transport configuration for building reqwest::Client instances.
//
// The service only ever listens on loopback with a self-signed
// certificate, so the defaults differ from a general-purpose client:
// no proxy, no redirects, and invalid certs accepted unless a CA is given.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::TransportError;

/// How to verify the service's TLS certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Accept the self-signed certificate. Safe only because every request
    /// goes to 127.0.0.1.
    #[default]
    LoopbackAcceptInvalid,
    /// Pin the service's root certificate from a PEM file.
    CustomCa(PathBuf),
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            timeout: Duration::from_secs(2),
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, TransportError> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .user_agent(concat!("riftwatch/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::LoopbackAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| TransportError::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| TransportError::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
        }

        builder
            .build()
            .map_err(|e| TransportError::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Timeout in whole milliseconds, as reported in errors.
    pub(crate) fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/riot.pem")),
            ..TransportConfig::default()
        };
        assert!(matches!(config.build_client(), Err(TransportError::Tls(_))));
    }
}
