// riftwatch-api: endpoint discovery and async HTTP client for the local League client service

pub mod client;
pub mod credentials;
pub mod error;
pub mod resolver;
pub mod transport;

pub use client::{LcuClient, LcuResponse, Method};
pub use credentials::{Credentials, Protocol, SanitizedCredentials};
pub use error::{RequestError, ResolutionError, TransportError};
pub use resolver::{
    ChainResolver, LockfileResolver, ProcessResolver, ProcessTarget, Resolve, StaticResolver,
};
pub use transport::{TlsMode, TransportConfig};
