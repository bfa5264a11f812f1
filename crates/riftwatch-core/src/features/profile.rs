use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::chat::CHAT_ME;
use crate::error::FeatureError;
use crate::session::Session;

const CURRENT_SUMMONER: &str = "/lol-summoner/v1/current-summoner";
const SUMMONER_ICON: &str = "/lol-summoner/v1/current-summoner/icon";
const SUMMONER_PROFILE: &str = "/lol-summoner/v1/current-summoner/summoner-profile";
const SAVE_ALIAS: &str = "/lol-summoner/v1/save-alias";
const CHALLENGE_PREFERENCES: &str = "/lol-challenges/v1/update-player-preferences/";

const GAME_NAME_LEN: std::ops::RangeInclusive<usize> = 3..=16;
const TAG_LINE_LEN: std::ops::RangeInclusive<usize> = 3..=5;
const MAX_STATUS_LEN: usize = 512;

/// `GET /lol-summoner/v1/current-summoner`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summoner {
    pub summoner_id: i64,
    pub account_id: i64,
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
    pub summoner_level: u32,
    pub profile_icon_id: i64,
    pub xp_since_last_level: u64,
    pub xp_until_next_level: u64,
}

impl Summoner {
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }
}

/// Profile customization. Stateless: every call goes straight to the service.
#[derive(Clone)]
pub struct Profile {
    session: Session,
}

impl Profile {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn current_summoner(&self) -> Result<Summoner, FeatureError> {
        Ok(self.session.client()?.get_json(CURRENT_SUMMONER).await?)
    }

    pub async fn change_icon(&self, icon_id: i64) -> Result<(), FeatureError> {
        if icon_id < 0 {
            return Err(FeatureError::invalid("iconId", "must not be negative"));
        }
        self.session
            .client()?
            .put(SUMMONER_ICON, Some(&json!({ "profileIconId": icon_id })))
            .await?;
        info!(icon_id, "profile icon changed");
        Ok(())
    }

    pub async fn change_background(&self, skin_id: i64) -> Result<(), FeatureError> {
        if skin_id <= 0 {
            return Err(FeatureError::invalid("skinId", "must be a positive skin id"));
        }
        let body = json!({ "key": "backgroundSkinId", "value": skin_id });
        self.session.client()?.post(SUMMONER_PROFILE, Some(&body)).await?;
        info!(skin_id, "profile background changed");
        Ok(())
    }

    pub async fn change_status(&self, message: &str) -> Result<(), FeatureError> {
        if message.chars().count() > MAX_STATUS_LEN {
            return Err(FeatureError::invalid(
                "statusMessage",
                format!("must be at most {MAX_STATUS_LEN} characters"),
            ));
        }
        self.session
            .client()?
            .put(CHAT_ME, Some(&json!({ "statusMessage": message })))
            .await?;
        info!("status message changed");
        Ok(())
    }

    pub async fn change_riot_id(&self, game_name: &str, tag_line: &str) -> Result<(), FeatureError> {
        let game_name = game_name.trim();
        let tag_line = tag_line.trim().trim_start_matches('#');
        if !GAME_NAME_LEN.contains(&game_name.chars().count()) {
            return Err(FeatureError::invalid("gameName", "must be 3 to 16 characters"));
        }
        if !TAG_LINE_LEN.contains(&tag_line.chars().count())
            || !tag_line.chars().all(char::is_alphanumeric)
        {
            return Err(FeatureError::invalid("tagLine", "must be 3 to 5 letters or digits"));
        }
        let body = json!({ "gameName": game_name, "tagLine": tag_line });
        self.session.client()?.post(SAVE_ALIAS, Some(&body)).await?;
        info!(%game_name, %tag_line, "riot id changed");
        Ok(())
    }

    /// Clear every displayed challenge token.
    pub async fn remove_badges(&self) -> Result<(), FeatureError> {
        self.session
            .client()?
            .put(CHALLENGE_PREFERENCES, Some(&json!({ "challengeIds": [] })))
            .await?;
        info!("profile badges cleared");
        Ok(())
    }
}
