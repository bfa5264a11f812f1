//! Command dispatch: bridges CLI args -> core features -> output formatting.

pub mod accounts;
pub mod config_cmd;
pub mod lobby;
pub mod matchmaking;
pub mod profile;
pub mod serve;
pub mod stats;
pub mod status;
pub mod util;
pub mod watch;

use std::sync::Arc;
use std::time::Duration;

use riftwatch_api::{Credentials, ProcessResolver, Protocol, Resolve, StaticResolver};
use riftwatch_config::Config;
use riftwatch_core::{ConnectionState, CoreConfig, Features, Poller, TickOutcome};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a client-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(cfg, global).await,
        Command::Watch(args) => watch::handle(cfg, args, global).await,
        Command::Serve => serve::handle(cfg, global).await,
        Command::Accept => matchmaking::accept(&connect(cfg, global).await?, global).await,
        Command::Decline => matchmaking::decline(&connect(cfg, global).await?, global).await,
        Command::Pick { champion } => {
            matchmaking::pick(&connect(cfg, global).await?, &champion, global).await
        }
        Command::Ban {
            champion,
            no_protect,
        } => matchmaking::ban(&connect(cfg, global).await?, &champion, !no_protect, global).await,
        Command::Chat { mode } => profile::chat(&connect(cfg, global).await?, mode, global).await,
        Command::Profile(args) => profile::handle(&connect(cfg, global).await?, args, global).await,
        Command::Lobby(args) => lobby::handle(&connect(cfg, global).await?, args, global).await,
        Command::Client(args) => lobby::client(&connect(cfg, global).await?, args, global).await,
        Command::Friends(args) => lobby::friends(&connect(cfg, global).await?, args, global).await,
        Command::History(args) => stats::history(&connect(cfg, global).await?, args, global).await,
        Command::Ranked => stats::ranked(&connect(cfg, global).await?, global).await,
        Command::RankCalc(args) => stats::rank_calc(&args, global),
        Command::Accounts(args) => accounts::handle(cfg, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

// ── Connection ──────────────────────────────────────────────────────

/// A poller that has completed one successful tick, plus the features
/// bound to its session.
pub struct Connection {
    pub poller: Poller,
    pub features: Features,
}

/// Core settings with command-line overrides applied.
pub fn core_config(cfg: &Config, global: &GlobalOpts) -> CoreConfig {
    let mut core = cfg.to_core_config();
    if let Some(ms) = global.timeout {
        core.transport = core.transport.with_timeout(Duration::from_millis(ms));
    }
    core
}

/// `--port`/`--token` skip discovery entirely.
pub fn resolver(cfg: &Config, global: &GlobalOpts) -> Arc<dyn Resolve> {
    match (global.port, &global.token) {
        (Some(port), Some(token)) => Arc::new(StaticResolver::new(Credentials::new(
            port,
            token.clone(),
            Protocol::Https,
        ))),
        _ => cfg.build_resolver(),
    }
}

/// Poller and features wired the same way for every command.
pub fn build(cfg: &Config, global: &GlobalOpts) -> Connection {
    let core = core_config(cfg, global);
    let transport = core.transport.clone();
    let poller = Poller::new(core, resolver(cfg, global));
    let features = Features::new(&poller.session())
        .with_riot_client(Arc::new(ProcessResolver::riot_client()), transport);
    Connection { poller, features }
}

/// Build a connection and tick once. Fails unless the client answered.
pub async fn connect(cfg: &Config, global: &GlobalOpts) -> Result<Connection, CliError> {
    let conn = build(cfg, global);
    match conn.poller.tick().await {
        TickOutcome::Completed(ConnectionState::Connected) => Ok(conn),
        outcome => {
            tracing::debug!(?outcome, "client not reachable");
            Err(CliError::NotRunning)
        }
    }
}
