//! Ready check and champion select commands.

use riftwatch_core::features::{AutoBanConfig, AutoPickConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Connection;

pub async fn accept(conn: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    ready_check(conn).await?;
    conn.features.auto_accept.accept().await?;
    output::print_done("Ready check accepted", global.quiet);
    Ok(())
}

pub async fn decline(conn: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    ready_check(conn).await?;
    conn.features.auto_accept.decline().await?;
    output::print_done("Ready check declined", global.quiet);
    Ok(())
}

async fn ready_check(conn: &Connection) -> Result<(), CliError> {
    match conn.features.auto_accept.ready_check().await? {
        Some(check) if check.is_pending() => Ok(()),
        Some(_) => Err(CliError::Unavailable {
            reason: "the ready check was already answered".into(),
        }),
        None => Err(CliError::Unavailable {
            reason: "no match found yet".into(),
        }),
    }
}

/// Arm auto-pick for one reaction. Champion lookup errors (with
/// suggestions) surface before anything is sent.
pub async fn pick(conn: &Connection, champion: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let champ_select = &conn.features.champ_select;
    champ_select
        .set_auto_pick(AutoPickConfig {
            enabled: true,
            champion_name: champion.to_owned(),
        })
        .await?;
    let name = champ_select.auto_pick().champion_name;
    lock_in(conn, &format!("Locked in {name}"), global).await
}

pub async fn ban(
    conn: &Connection,
    champion: &str,
    protect: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let champ_select = &conn.features.champ_select;
    champ_select
        .set_auto_ban(AutoBanConfig {
            enabled: true,
            champion_name: champion.to_owned(),
            protect,
        })
        .await?;
    let name = champ_select.auto_ban().champion_name;
    lock_in(conn, &format!("Banned {name}"), global).await
}

async fn lock_in(conn: &Connection, done: &str, global: &GlobalOpts) -> Result<(), CliError> {
    match conn.features.champ_select.react().await? {
        0 => Err(CliError::Unavailable {
            reason: "no pick or ban is waiting on you (or the champion is unavailable)".into(),
        }),
        _ => {
            output::print_done(done, global.quiet);
            Ok(())
        }
    }
}
