use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::accounts::{Account, AccountStore};
use crate::error::LoginError;
use crate::event::ConnectionState;
use crate::launcher::Launcher;
use crate::poller::Poller;

/// Saved-account login: start the client, then have the Poller pick up
/// the new session after `reconnect_delay`.
#[derive(Clone)]
pub struct LoginCoordinator {
    store: Arc<AccountStore>,
    launcher: Arc<dyn Launcher>,
    poller: Poller,
}

impl LoginCoordinator {
    pub fn new(store: Arc<AccountStore>, launcher: Arc<dyn Launcher>, poller: Poller) -> Self {
        Self {
            store,
            launcher,
            poller,
        }
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    pub async fn login(&self, username: &str) -> Result<Account, LoginError> {
        let account = self.store.get(username).await?;
        self.launcher.launch(&account).await?;
        let delay = self.poller.config().reconnect_delay;
        self.poller.reconnect_after(delay).await;
        info!(username, delay_ms = delay.as_millis(), "login started, reconnect scheduled");
        Ok(account)
    }

    /// Poll every `poll_interval` until the client accepts a connection or
    /// `timeout` runs out, then stop the timer. Replaces the delayed tick
    /// scheduled by [`login`](Self::login).
    pub async fn wait_connected(&self, timeout: Duration) -> bool {
        let mut state = self.poller.watch_state();
        self.poller.start(self.poller.config().poll_interval).await;
        let connected = tokio::time::timeout(
            timeout,
            state.wait_for(|s| *s == ConnectionState::Connected),
        )
        .await
        .is_ok_and(|r| r.is_ok());
        self.poller.stop().await;
        if !connected {
            warn!(timeout_ms = timeout.as_millis(), "client did not come up in time");
        }
        connected
    }
}
