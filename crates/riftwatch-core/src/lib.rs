//! Connection lifecycle and feature logic between `riftwatch-api` and the
//! display surface (the `riftwatch` CLI and its stdio relay).
//!
//! - **[`Poller`]**: owns the single authoritative [`ConnectionState`].
//!   Each tick resolves credentials, probes the service, and emits at most
//!   one [`LcuEvent`] per edge. The live client is published through a
//!   shared [`Session`].
//!
//! - **[`Features`]**: on-demand and reactive request sequences (auto-accept,
//!   champ select, chat, profile, lobby, stats). Each takes a `Session` and
//!   answers [`FeatureError::NotConnected`] while there is none.
//!
//! - **[`spawn_automation`]**: runs the reactive features on every Poller
//!   heartbeat and clears per-session caches on disconnect.
//!
//! - **[`Relay`]**: JSON intents in, events and responses out.
//!
//! - **[`AccountStore`]** / **[`LoginCoordinator`]**: saved accounts and the
//!   launch-then-reconnect login flow.

pub mod accounts;
pub mod automation;
pub mod config;
pub mod error;
pub mod event;
pub mod features;
pub mod launcher;
pub mod login;
pub mod poller;
pub mod probe;
pub mod relay;
pub mod session;
pub mod stats;

// ── Primary re-exports ──────────────────────────────────────────────
pub use accounts::{Account, AccountStore};
pub use automation::spawn_automation;
pub use config::CoreConfig;
pub use error::{AccountStoreError, FeatureError, LaunchError, LoginError};
pub use event::{
    ConnectEvent, ConnectionState, DisconnectEvent, DisconnectReason, ErrorEvent, LcuEvent,
};
pub use features::{FeatureConfig, Features};
pub use launcher::{Launcher, ProcessLauncher};
pub use login::LoginCoordinator;
pub use poller::{Poller, Subscription, TickOutcome};
pub use probe::{ClientProbe, Probe};
pub use relay::{ActionResponse, Intent, IntentEnvelope, Relay, RelayMessage, RelayResponse};
pub use session::Session;
pub use stats::Stats;
