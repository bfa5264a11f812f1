//! Automation task: drives the reactive features off the Poller.
//!
//! There is no timer here. Every tick that ends `Connected` bumps the
//! Poller heartbeat, and each bump runs one reaction pass. A disconnect
//! drops the per-session caches so the next client starts clean.

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::features::Features;
use crate::poller::Poller;

/// Spawn the automation loop. It runs until `cancel` fires or the
/// Poller is dropped.
pub fn spawn_automation(
    poller: &Poller,
    features: Features,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut heartbeat = poller.heartbeat();
    let mut events = poller.events();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                event = events.recv() => match event {
                    Ok(event) if event.is_disconnect() => {
                        debug!("client gone, clearing session caches");
                        features.reset_session().await;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "automation lagged behind poller events");
                        features.reset_session().await;
                    }
                    Err(RecvError::Closed) => break,
                },

                changed = heartbeat.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    react(&features).await;
                }
            }
        }
        debug!("automation task stopped");
    })
}

/// One reaction pass. Failures are logged and retried on the next beat.
pub async fn react(features: &Features) {
    let (accept, champ) = tokio::join!(
        features.auto_accept.react(),
        features.champ_select.react(),
    );
    match accept {
        Ok(true) => info!("ready check accepted"),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "auto-accept failed"),
    }
    match champ {
        Ok(0) => {}
        Ok(n) => debug!(actions = n, "champ select actions completed"),
        Err(e) => warn!(error = %e, "champ select automation failed"),
    }
}
