//! Endpoint discovery for the local service.
//!
//! A [`Resolve`] implementation turns "is the game client running?" into
//! [`Credentials`] or a [`ResolutionError`]. Resolvers are consulted fresh
//! on every connection attempt; the service hands out a new port and
//! token each time it restarts, so nothing is cached here.

mod lockfile;
mod process;

use async_trait::async_trait;
use tracing::trace;

use crate::credentials::Credentials;
use crate::error::ResolutionError;

pub use lockfile::{LockfileResolver, parse_lockfile};
pub use process::{ProcessResolver, ProcessTarget, parse_command_line};

/// Something that can locate the running service.
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self) -> Result<Credentials, ResolutionError>;

    /// Short label used in logs.
    fn name(&self) -> &'static str;
}

/// Tries each resolver in order and returns the first success.
///
/// When all of them fail, the most informative error wins: a malformed
/// lockfile says more than "no process found".
pub struct ChainResolver {
    resolvers: Vec<Box<dyn Resolve>>,
}

impl ChainResolver {
    pub fn new(resolvers: Vec<Box<dyn Resolve>>) -> Self {
        Self { resolvers }
    }

    /// Lockfile first (cheap, and exact when present), then the process table.
    pub fn platform_default(install_dir: Option<std::path::PathBuf>) -> Self {
        Self::new(vec![
            Box::new(LockfileResolver::new(install_dir)),
            Box::new(ProcessResolver::new()),
        ])
    }
}

#[async_trait]
impl Resolve for ChainResolver {
    async fn resolve(&self) -> Result<Credentials, ResolutionError> {
        let mut best = ResolutionError::NotFound;
        for resolver in &self.resolvers {
            match resolver.resolve().await {
                Ok(creds) => return Ok(creds),
                Err(e) => {
                    trace!(resolver = resolver.name(), error = %e, "resolver failed");
                    if e.specificity() > best.specificity() {
                        best = e;
                    }
                }
            }
        }
        Err(best)
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

/// Always yields the same credentials. Used when the caller already knows
/// the port and token (command-line overrides, tests).
pub struct StaticResolver {
    credentials: Credentials,
}

impl StaticResolver {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl Resolve for StaticResolver {
    async fn resolve(&self) -> Result<Credentials, ResolutionError> {
        Ok(self.credentials.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
