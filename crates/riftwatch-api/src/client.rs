// HTTP client for the local League client service
//
// A thin wrapper over `reqwest::Client` that pins every request to the
// loopback address, attaches the per-session basic auth, and folds
// transport failures into the two-level `RequestError` taxonomy that the
// poller keys its state machine on.

use serde::de::DeserializeOwned;
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::{debug, trace};
use url::Url;

use crate::credentials::Credentials;
use crate::error::{RequestError, TransportError};
use crate::transport::TransportConfig;

/// Basic-auth user the service expects. The password is the session token.
pub const AUTH_USER: &str = "riot";

const LOOPBACK: &str = "127.0.0.1";

/// HTTP verbs the service's REST surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}

/// A successful (2xx) response. `body` is `None` for empty bodies such as
/// `204 No Content`.
#[derive(Debug, Clone, PartialEq)]
pub struct LcuResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl LcuResponse {
    /// Deserialize the body into `T`. An empty body is treated as JSON `null`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, RequestError> {
        serde_json::from_value(self.body.unwrap_or(Value::Null)).map_err(|e| {
            RequestError::ParseError {
                message: e.to_string(),
            }
        })
    }
}

/// Error bodies look like `{"errorCode":"RPC_ERROR","httpStatus":404,"message":"..."}`.
#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Raw HTTP client for one session of the local service.
///
/// Cheap to share behind an `Arc`; a new client is built whenever the
/// service hands out new credentials.
pub struct LcuClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    timeout_ms: u64,
}

impl LcuClient {
    /// Create a client for `https://127.0.0.1:{port}` (or `http`, when the
    /// credentials say so).
    pub fn new(credentials: Credentials, transport: &TransportConfig) -> Result<Self, TransportError> {
        let base_url = Url::parse(&format!(
            "{}://{LOOPBACK}:{}",
            credentials.protocol, credentials.port
        ))?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            credentials,
            timeout_ms: transport.timeout_ms(),
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve a service path (with optional query string) against the
    /// loopback base URL. Anything that would escape the base is rejected.
    fn url_for(&self, path: &str) -> Result<Url, RequestError> {
        let invalid = || RequestError::InvalidPath {
            path: path.to_owned(),
        };
        if !path.starts_with('/') || path.starts_with("//") || path.chars().any(char::is_control)
        {
            return Err(invalid());
        }
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{base}{path}")).map_err(|_| invalid())?;
        if url.host_str() != Some(LOOPBACK) || url.port() != Some(self.credentials.port) {
            return Err(invalid());
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Issue one request. Non-2xx statuses become [`RequestError::HttpError`]
    /// carrying the service's `message` when it sent one.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<LcuResponse, RequestError> {
        let url = self.url_for(path)?;
        debug!("{method} {path}");

        let mut builder = self
            .http
            .request(method.into(), url)
            .basic_auth(AUTH_USER, Some(self.credentials.auth_token()))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| RequestError::from_transport(&e, self.timeout_ms))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| RequestError::from_transport(&e, self.timeout_ms))?;
        trace!(status = status.as_u16(), len = bytes.len(), "response");

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|b| b.message)
                .or_else(|| {
                    let text = String::from_utf8_lossy(&bytes);
                    let text = text.trim();
                    (!text.is_empty()).then(|| text.chars().take(200).collect())
                })
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned());
            return Err(RequestError::HttpError {
                status: status.as_u16(),
                message,
            });
        }

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(
                serde_json::from_slice(&bytes).map_err(|e| RequestError::ParseError {
                    message: e.to_string(),
                })?,
            )
        };

        Ok(LcuResponse {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn get(&self, path: &str) -> Result<LcuResponse, RequestError> {
        self.request(Method::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<LcuResponse, RequestError> {
        self.request(Method::Post, path, body).await
    }

    pub async fn put(&self, path: &str, body: Option<&Value>) -> Result<LcuResponse, RequestError> {
        self.request(Method::Put, path, body).await
    }

    pub async fn patch(&self, path: &str, body: Option<&Value>) -> Result<LcuResponse, RequestError> {
        self.request(Method::Patch, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<LcuResponse, RequestError> {
        self.request(Method::Delete, path, None).await
    }

    /// GET and deserialize in one step.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        self.get(path).await?.json()
    }
}

impl std::fmt::Debug for LcuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LcuClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Protocol;

    fn client() -> LcuClient {
        LcuClient::new(
            Credentials::new(2999, "tok", Protocol::Https),
            &TransportConfig::default(),
        )
        .unwrap_or_else(|e| panic!("client: {e}"))
    }

    #[test]
    fn base_url_is_loopback() {
        assert_eq!(client().base_url().as_str(), "https://127.0.0.1:2999/");
    }

    #[test]
    fn paths_that_escape_the_base_are_rejected() {
        let c = client();
        for bad in ["lol-summoner", "//evil.example/x", "/a\nb", "@evil.example/"] {
            assert!(
                matches!(c.url_for(bad), Err(RequestError::InvalidPath { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn query_strings_are_kept() {
        let url = client()
            .url_for("/lol-login/v1/session/invoke?destination=lcdsServiceProxy")
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(url.query(), Some("destination=lcdsServiceProxy"));
    }
}
