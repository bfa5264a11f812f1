//! Lobby, client, and friend-list command handlers.

use riftwatch_core::features::{ClientInfo, LobbyReveal};
use tabled::Tabled;

use crate::cli::{
    ClientArgs, ClientCommand, FriendsArgs, FriendsCommand, GlobalOpts, LobbyArgs, LobbyCommand,
};
use crate::error::CliError;
use crate::output;

use super::{Connection, util};

#[derive(Tabled)]
struct PlayerRow {
    #[tabled(rename = "#")]
    slot: usize,
    #[tabled(rename = "Riot ID")]
    riot_id: String,
}

fn reveal_detail(r: &LobbyReveal) -> String {
    let rows: Vec<PlayerRow> = r
        .players
        .iter()
        .enumerate()
        .map(|(i, p)| PlayerRow {
            slot: i + 1,
            riot_id: p.clone(),
        })
        .collect();
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    format!(
        "{table}\n{}",
        output::detail_lines(&[
            ("Region", r.region.to_string()),
            ("Ranked", r.ranked.to_string()),
            ("Pregame", r.url.clone()),
        ])
    )
}

fn client_detail(c: &ClientInfo) -> String {
    let locale = c.locale.as_ref();
    output::detail_lines(&[
        ("Version", c.version.clone().unwrap_or_else(|| "-".into())),
        ("Platform", c.platform_id.clone().unwrap_or_else(|| "-".into())),
        ("Region", c.region.to_string()),
        ("Locale", locale.map_or_else(|| "-".into(), |l| l.locale.clone())),
    ])
}

pub async fn handle(conn: &Connection, args: LobbyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let lobby = &conn.features.lobby;
    match args.command {
        LobbyCommand::Reveal => {
            let reveal = lobby.reveal().await?;
            let out = output::render_single(&global.output, &reveal, reveal_detail, |r| {
                r.players.join("\n")
            });
            output::print_output(&out, global.quiet);
        }

        LobbyCommand::Dodge => {
            if !util::confirm("dodge", "Leave champion select? Dodging costs LP.", global.yes)? {
                return Ok(());
            }
            lobby.dodge().await?;
            output::print_done("Left champion select", global.quiet);
        }
    }
    Ok(())
}

pub async fn client(conn: &Connection, args: ClientArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let lobby = &conn.features.lobby;
    match args.command {
        ClientCommand::Info => {
            let info = lobby.client_info().await?;
            let out = output::render_single(&global.output, &info, client_detail, |c| {
                c.version.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
        }

        ClientCommand::Restart => {
            lobby.restart_ux().await?;
            output::print_done("Client UX restarting", global.quiet);
        }
    }
    Ok(())
}

pub async fn friends(conn: &Connection, args: FriendsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        FriendsCommand::Purge => {
            if !util::confirm(
                "friends purge",
                "Remove EVERY friend from your list? This cannot be undone.",
                global.yes,
            )? {
                return Ok(());
            }
            let removed = conn.features.lobby.remove_all_friends().await?;
            output::print_done(&format!("Removed {removed} friends"), global.quiet);
        }
    }
    Ok(())
}
