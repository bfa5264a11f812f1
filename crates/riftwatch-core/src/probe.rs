use async_trait::async_trait;
use riftwatch_api::{LcuClient, RequestError};

/// Reachability check run against a freshly built client.
///
/// Any `Ok` means the service is up. The error kind decides the state
/// transition: only network-level failures count as "gone".
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, client: &LcuClient) -> Result<(), RequestError>;
}

/// GETs a cheap endpoint and ignores the body.
#[derive(Debug, Clone)]
pub struct ClientProbe {
    path: String,
}

impl ClientProbe {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Probe for ClientProbe {
    async fn probe(&self, client: &LcuClient) -> Result<(), RequestError> {
        client.get(&self.path).await.map(drop)
    }
}
