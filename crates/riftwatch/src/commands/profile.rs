//! Profile and chat command handlers.

use riftwatch_core::features::Summoner;

use crate::cli::{ChatMode, GlobalOpts, ProfileArgs, ProfileCommand};
use crate::error::CliError;
use crate::output;

use super::{Connection, util};

fn summoner_detail(s: &Summoner) -> String {
    let xp_total = s.xp_since_last_level + s.xp_until_next_level;
    output::detail_lines(&[
        ("Riot ID", s.riot_id()),
        ("Level", s.summoner_level.to_string()),
        ("XP", format!("{}/{xp_total}", s.xp_since_last_level)),
        ("Icon", s.profile_icon_id.to_string()),
        ("Summoner ID", s.summoner_id.to_string()),
        ("PUUID", s.puuid.clone()),
    ])
}

pub async fn chat(conn: &Connection, mode: ChatMode, global: &GlobalOpts) -> Result<(), CliError> {
    let offline = matches!(mode, ChatMode::Offline);
    conn.features.chat.set_disconnected(offline).await?;
    output::print_done(
        if offline {
            "Chat set to offline"
        } else {
            "Chat set to online"
        },
        global.quiet,
    );
    Ok(())
}

pub async fn handle(conn: &Connection, args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let profile = &conn.features.profile;
    match args.command {
        ProfileCommand::Show => {
            let summoner = profile.current_summoner().await?;
            let out = output::render_single(&global.output, &summoner, summoner_detail, Summoner::riot_id);
            output::print_output(&out, global.quiet);
        }

        ProfileCommand::Icon { id } => {
            profile.change_icon(id).await?;
            output::print_done(&format!("Profile icon set to {id}"), global.quiet);
        }

        ProfileCommand::Background { skin_id } => {
            profile.change_background(skin_id).await?;
            output::print_done(&format!("Profile background set to skin {skin_id}"), global.quiet);
        }

        ProfileCommand::Status { message } => {
            profile.change_status(&message).await?;
            output::print_done("Status message updated", global.quiet);
        }

        ProfileCommand::RiotId {
            game_name,
            tag_line,
        } => {
            if !util::confirm(
                "change-riot-id",
                &format!("Change your Riot ID to {game_name}#{}?", tag_line.trim_start_matches('#')),
                global.yes,
            )? {
                return Ok(());
            }
            profile.change_riot_id(&game_name, &tag_line).await?;
            output::print_done("Riot ID change requested", global.quiet);
        }

        ProfileCommand::Badges => {
            profile.remove_badges().await?;
            output::print_done("Challenge badges cleared", global.quiet);
        }
    }
    Ok(())
}
