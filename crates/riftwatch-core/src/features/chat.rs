use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;
use tracing::info;

use crate::error::FeatureError;
use crate::session::Session;

pub(crate) const CHAT_ME: &str = "/lol-chat/v1/me";

/// Appear offline in chat while staying logged in.
pub struct Chat {
    session: Session,
    disconnected: AtomicBool,
}

impl Chat {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            disconnected: AtomicBool::new(false),
        }
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    pub async fn set_disconnected(&self, disconnected: bool) -> Result<(), FeatureError> {
        let availability = if disconnected { "offline" } else { "chat" };
        self.session
            .client()?
            .put(CHAT_ME, Some(&json!({ "availability": availability })))
            .await?;
        self.disconnected.store(disconnected, Ordering::Release);
        info!(availability, "chat availability updated");
        Ok(())
    }
}
