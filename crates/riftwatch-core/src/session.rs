use std::sync::Arc;

use arc_swap::ArcSwapOption;
use riftwatch_api::{Credentials, LcuClient, SanitizedCredentials, TransportConfig, TransportError};

use crate::error::FeatureError;

/// Shared handle to the currently published client.
///
/// The Poller publishes a fresh [`LcuClient`] on every connect and clears
/// it on disconnect. Feature modules hold a clone and take a snapshot per
/// call; a snapshot that goes stale mid-call just produces a
/// `RequestError` from the dead port.
#[derive(Clone, Default)]
pub struct Session {
    current: Arc<ArcSwapOption<LcuClient>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session permanently bound to one set of credentials. Used for
    /// one-shot commands and tests where no Poller runs.
    pub fn fixed(credentials: Credentials, transport: &TransportConfig) -> Result<Self, TransportError> {
        let session = Self::new();
        session.publish(Arc::new(LcuClient::new(credentials, transport)?));
        Ok(session)
    }

    /// The client for the live session, or `NotConnected`.
    pub fn client(&self) -> Result<Arc<LcuClient>, FeatureError> {
        self.current.load_full().ok_or(FeatureError::NotConnected)
    }

    pub fn is_connected(&self) -> bool {
        self.current.load().is_some()
    }

    /// Port and protocol of the live session, safe to show anywhere.
    pub fn credentials(&self) -> Option<SanitizedCredentials> {
        self.current
            .load()
            .as_ref()
            .map(|c| c.credentials().sanitized())
    }

    pub(crate) fn publish(&self, client: Arc<LcuClient>) {
        self.current.store(Some(client));
    }

    pub(crate) fn clear(&self) {
        self.current.store(None);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credentials", &self.credentials())
            .finish()
    }
}
