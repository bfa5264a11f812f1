//! `riftwatch status`: one connection attempt, reported.

use riftwatch_config::Config;
use riftwatch_core::ConnectionState;
use riftwatch_core::features::ClientInfo;
use riftwatch_api::Protocol;
use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusView {
    state: ConnectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    protocol: Option<Protocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client: Option<ClientInfo>,
}

fn detail(v: &StatusView, color: bool) -> String {
    let connected = v.state == ConnectionState::Connected;
    let mut pairs = vec![("State", output::paint(&v.state.to_string(), connected, color))];
    if let Some(port) = v.port {
        pairs.push(("Port", port.to_string()));
    }
    if let Some(protocol) = v.protocol {
        pairs.push(("Protocol", protocol.to_string()));
    }
    if let Some(info) = &v.client {
        pairs.push(("Version", info.version.clone().unwrap_or_else(|| "-".into())));
        pairs.push(("Platform", info.platform_id.clone().unwrap_or_else(|| "-".into())));
        pairs.push(("Region", info.region.to_string()));
    }
    output::detail_lines(&pairs)
}

/// Prints the state either way; exits non-zero when the client is down.
pub async fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = super::build(cfg, global);
    conn.poller.tick().await;
    let state = conn.poller.state();
    let creds = conn.poller.session().credentials();
    let client = if state == ConnectionState::Connected {
        conn.features.lobby.client_info().await.ok()
    } else {
        None
    };

    let view = StatusView {
        state,
        port: creds.map(|c| c.port),
        protocol: creds.map(|c| c.protocol),
        client,
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| detail(v, color),
        |v| v.state.to_string(),
    );
    output::print_output(&out, global.quiet);

    if state == ConnectionState::Connected {
        Ok(())
    } else {
        Err(CliError::NotRunning)
    }
}
