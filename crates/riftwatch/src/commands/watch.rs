//! `riftwatch watch`: follow the connection and run automation until Ctrl-C.

use riftwatch_config::Config;
use riftwatch_core::features::{AutoBanConfig, AutoPickConfig};
use riftwatch_core::{Features, LcuEvent, RelayMessage, spawn_automation};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

/// Cancel `token` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

/// One line per event for JSON formats, one `---` document per event
/// for YAML, and a short human line otherwise.
fn event_line(event: &LcuEvent, format: &OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            serde_json::to_string(&RelayMessage::from(event)).unwrap_or_default()
        }
        OutputFormat::Yaml => {
            let doc = output::render_yaml(&RelayMessage::from(event));
            format!("---\n{}", doc.trim_end())
        }
        OutputFormat::Table | OutputFormat::Plain => {
            let time = event.timestamp().with_timezone(&chrono::Local).format("%H:%M:%S");
            match event {
                LcuEvent::Connected(e) => format!(
                    "{time} {} on port {}",
                    output::paint("connected", true, color),
                    e.credentials.port
                ),
                LcuEvent::Disconnected(e) => format!(
                    "{time} {} ({})",
                    output::paint("disconnected", false, color),
                    e.reason
                ),
                LcuEvent::Error(e) => {
                    format!("{time} {}: {}", output::paint("error", false, color), e.error)
                }
            }
        }
    }
}

/// Pick and ban need the champion catalog, so they're (re)armed on every
/// connect. Failures are reported and watching continues.
async fn arm(features: &Features, args: &WatchArgs) {
    if let Some(name) = &args.pick {
        let config = AutoPickConfig {
            enabled: true,
            champion_name: name.clone(),
        };
        if let Err(e) = features.champ_select.set_auto_pick(config).await {
            warn!(error = %e, "could not arm auto-pick");
        }
    }
    if let Some(name) = &args.ban {
        let config = AutoBanConfig {
            enabled: true,
            champion_name: name.clone(),
            protect: !args.no_protect,
        };
        if let Err(e) = features.champ_select.set_auto_ban(config).await {
            warn!(error = %e, "could not arm auto-ban");
        }
    }
    if args.offline {
        if let Err(e) = features.chat.set_disconnected(true).await {
            warn!(error = %e, "could not go offline in chat");
        }
    }
}

pub async fn handle(cfg: &Config, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = super::build(cfg, global);
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(&cancel);

    // Takes effect on the first session when nothing is connected yet.
    conn.features.auto_accept.set(args.accept).await?;

    let color = output::should_color(&global.color);
    let mut events = conn.poller.events();
    let automation = spawn_automation(&conn.poller, conn.features.clone(), cancel.clone());
    conn.poller.start(conn.poller.config().poll_interval).await;
    output::print_done("Watching for the League client (Ctrl-C to stop)", global.quiet);

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            event = events.recv() => match event {
                Ok(event) => {
                    output::print_output(&event_line(&event, &global.output, color), global.quiet);
                    if event.is_connect() {
                        arm(&conn.features, &args).await;
                    }
                }
                Err(RecvError::Lagged(missed)) => warn!(missed, "dropped connection events"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    cancel.cancel();
    conn.poller.stop().await;
    let _ = automation.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use riftwatch_api::{Credentials, Protocol};
    use riftwatch_core::{ConnectEvent, DisconnectEvent, DisconnectReason};

    use super::*;

    fn connected() -> LcuEvent {
        LcuEvent::Connected(ConnectEvent {
            timestamp: Utc::now(),
            credentials: Credentials::new(51234, "event-secret", Protocol::Https),
        })
    }

    #[test]
    fn yaml_events_are_separate_documents() {
        let line = event_line(&connected(), &OutputFormat::Yaml, false);
        assert!(line.starts_with("---\n"), "{line}");
        assert!(line.contains("type: lcu-connected"), "{line}");
        assert!(line.contains("port: 51234"), "{line}");
        assert!(!line.contains('{'), "{line}");
        assert!(!line.contains("event-secret"));
    }

    #[test]
    fn json_events_fit_on_one_line() {
        let event = LcuEvent::Disconnected(DisconnectEvent {
            timestamp: Utc::now(),
            reason: DisconnectReason::ConnectionRefused,
        });
        let line = event_line(&event, &OutputFormat::Json, false);
        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap_or_default();
        assert_eq!(value["type"], "lcu-disconnected");
    }

    #[test]
    fn plain_events_are_human_readable() {
        let line = event_line(&connected(), &OutputFormat::Plain, false);
        assert!(line.ends_with("connected on port 51234"), "{line}");
    }
}
