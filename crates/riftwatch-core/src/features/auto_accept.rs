use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::FeatureError;
use crate::session::Session;

const READY_CHECK: &str = "/lol-matchmaking/v1/ready-check";
const READY_CHECK_ACCEPT: &str = "/lol-matchmaking/v1/ready-check/accept";
const READY_CHECK_DECLINE: &str = "/lol-matchmaking/v1/ready-check/decline";

/// `GET /lol-matchmaking/v1/ready-check`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadyCheck {
    pub state: String,
    pub player_response: String,
    pub timer: f64,
}

impl ReadyCheck {
    /// A match was found and this player hasn't answered yet.
    pub fn is_pending(&self) -> bool {
        self.state == "InProgress" && self.player_response == "None"
    }
}

/// Accepts match-found ready checks.
pub struct AutoAccept {
    session: Session,
    enabled: AtomicBool,
    /// The current ready check has already been answered.
    answered: AtomicBool,
}

impl AutoAccept {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            enabled: AtomicBool::new(false),
            answered: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Turn auto-accept on or off. Enabling while a ready check is
    /// already pending accepts it right away. Enabling while disconnected
    /// takes effect on the next session.
    pub async fn set(&self, enabled: bool) -> Result<(), FeatureError> {
        if enabled
            && self.session.is_connected()
            && self.ready_check().await?.is_some_and(|c| c.is_pending())
        {
            self.accept().await?;
            self.answered.store(true, Ordering::Release);
        }
        self.enabled.store(enabled, Ordering::Release);
        info!(enabled, "auto-accept updated");
        Ok(())
    }

    pub async fn accept(&self) -> Result<(), FeatureError> {
        self.session.client()?.post(READY_CHECK_ACCEPT, None).await?;
        info!("ready check accepted");
        Ok(())
    }

    pub async fn decline(&self) -> Result<(), FeatureError> {
        self.session.client()?.post(READY_CHECK_DECLINE, None).await?;
        info!("ready check declined");
        Ok(())
    }

    /// Current ready check, or `None` when not in queue.
    pub async fn ready_check(&self) -> Result<Option<ReadyCheck>, FeatureError> {
        match self.session.client()?.get_json::<ReadyCheck>(READY_CHECK).await {
            Ok(check) => Ok(Some(check)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Accept the pending ready check, once per ready check. Returns
    /// `true` if this call accepted one.
    pub async fn react(&self) -> Result<bool, FeatureError> {
        if !self.is_enabled() {
            return Ok(false);
        }
        let pending = self.ready_check().await?.is_some_and(|c| c.is_pending());
        if !pending {
            self.answered.store(false, Ordering::Release);
            return Ok(false);
        }
        if self.answered.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }
        debug!("match found, accepting");
        if let Err(e) = self.accept().await {
            // retry on the next heartbeat
            self.answered.store(false, Ordering::Release);
            return Err(e);
        }
        Ok(true)
    }

    pub(crate) fn reset(&self) {
        self.answered.store(false, Ordering::Release);
    }
}
