use std::time::Duration;

use riftwatch_api::TransportConfig;

/// Default Poller tick.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);
/// Default delay between a login request and the reconnect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(8000);
/// Cheap endpoint used for connect and liveness probes.
pub const DEFAULT_PROBE_PATH: &str = "/lol-gameflow/v1/gameflow-phase";

/// Runtime settings for the core. Built from the on-disk config by
/// `riftwatch-config`; the core itself never reads files.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub poll_interval: Duration,
    pub transport: TransportConfig,
    pub probe_path: String,
    pub reconnect_delay: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            transport: TransportConfig::default(),
            probe_path: DEFAULT_PROBE_PATH.to_owned(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}
