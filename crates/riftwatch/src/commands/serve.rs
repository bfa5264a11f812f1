//! `riftwatch serve`: the relay over stdio.
//!
//! Each stdin line is one JSON intent (`{"id":1,"action":"lcu-status"}`).
//! Stdout carries one JSON message per line: connection events as they
//! happen and a response per intent, tagged with the intent's id.
//! Intents run concurrently, so responses may come back out of order.
//! Logs never go to stdout.

use std::sync::Arc;

use riftwatch_config::Config;
use riftwatch_core::{
    AccountStore, LoginCoordinator, ProcessLauncher, Relay, RelayMessage, spawn_automation,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::GlobalOpts;
use crate::error::CliError;

const OUTBOUND_CAPACITY: usize = 256;

fn spawn_writer(mut rx: mpsc::Receiver<RelayMessage>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = rx.recv().await {
            let mut line = match serde_json::to_vec(&message) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "dropping unserializable relay message");
                    continue;
                }
            };
            line.push(b'\n');
            if stdout.write_all(&line).await.is_err() || stdout.flush().await.is_err() {
                debug!("stdout closed");
                break;
            }
        }
    })
}

pub async fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = super::build(cfg, global);
    let store = Arc::new(AccountStore::new(cfg.accounts_file()));
    let launcher = Arc::new(ProcessLauncher::new(cfg.accounts.launcher.clone()));
    let login = Arc::new(LoginCoordinator::new(store, launcher, conn.poller.clone()));
    let relay = Relay::new(conn.poller.clone(), conn.features.clone(), login);

    let cancel = CancellationToken::new();
    super::watch::cancel_on_ctrl_c(&cancel);

    let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
    let writer = spawn_writer(rx);
    let forward = tokio::spawn({
        let relay = relay.clone();
        let (tx, cancel) = (tx.clone(), cancel.clone());
        async move { relay.forward(tx, cancel).await }
    });
    let automation = spawn_automation(&conn.poller, conn.features.clone(), cancel.clone());
    conn.poller.start(conn.poller.config().poll_interval).await;
    info!("relay serving on stdio");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => {
                    let (relay, tx) = (relay.clone(), tx.clone());
                    in_flight.spawn(async move {
                        let response = relay.handle_line(&line).await;
                        let _ = tx.send(RelayMessage::Response(response)).await;
                    });
                }
                Ok(None) => {
                    debug!("stdin closed");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    break;
                }
            },

            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }

    // Let requests already accepted finish and answer.
    while in_flight.join_next().await.is_some() {}
    cancel.cancel();
    conn.poller.stop().await;
    let _ = forward.await;
    let _ = automation.await;
    drop(tx);
    let _ = writer.await;
    info!("relay stopped");
    Ok(())
}
