use std::fmt;
use std::sync::Arc;

use riftwatch_api::{LcuClient, Resolve, TransportConfig};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, warn};
use url::Url;

use super::champ_select::{ChampSelectSession, TeamMember};
use super::profile::Summoner;
use crate::error::FeatureError;
use crate::session::Session;

const CHAMP_SELECT_SESSION: &str = "/lol-champ-select/v1/session";
const REGION_LOCALE: &str = "/riotclient/region-locale";
const GAME_VERSION: &str = "/lol-patch/v1/game-version";
const LOGIN_DATA_PACKET: &str = "/lol-platform-config/v1/namespaces/LoginDataPacket";
const CHAT_PARTICIPANTS: &str = "/chat/v5/participants";
const FRIENDS: &str = "/lol-chat/v1/friends";
const RESTART_UX: &str = "/riotclient/kill-and-restart-ux";
const QUIT_DRAFT: &str = "/lol-login/v1/session/invoke?destination=lcdsServiceProxy&method=call&args=[\"\",\"teambuilder-draft\",\"quitV2\",\"\"]";
const PREGAME_BASE: &str = "https://porofessor.gg/pregame/";

// ── Region ───────────────────────────────────────────────────────

/// Platform region of the logged-in account. A failed lookup is kept
/// visible as `Unknown` rather than replaced by a guess.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Region {
    Known(String),
    #[default]
    Unknown,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(r) => f.write_str(r),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `GET /riotclient/region-locale`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionLocale {
    pub region: String,
    pub locale: String,
    pub web_region: String,
    pub web_language: String,
}

// ── Results ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbyReveal {
    /// Riot IDs as `name#tag`.
    pub players: Vec<String>,
    pub region: Region,
    pub ranked: bool,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub version: Option<String>,
    pub platform_id: Option<String>,
    pub region: Region,
    pub locale: Option<RegionLocale>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LoginDataPacket {
    platform_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Participants {
    participants: Vec<Participant>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Participant {
    cid: String,
    game_name: String,
    game_tag: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Friend {
    id: String,
}

// ── Lobby ────────────────────────────────────────────────────────

/// Lobby and client-level actions.
#[derive(Clone)]
pub struct Lobby {
    session: Session,
    riot_client: Option<(Arc<dyn Resolve>, TransportConfig)>,
}

impl Lobby {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            riot_client: None,
        }
    }

    /// Read ranked-lobby participants from the Riot Client API, located
    /// by `resolver`. Without this, the League client session is asked.
    pub fn with_riot_client(mut self, resolver: Arc<dyn Resolve>, transport: TransportConfig) -> Self {
        self.riot_client = Some((resolver, transport));
        self
    }

    /// Platform region, or `Unknown` when the client can't tell us.
    pub async fn region(&self) -> Result<Region, FeatureError> {
        let client = self.session.client()?;
        Ok(region_of(&client).await.0)
    }

    /// Riot IDs of everyone on the local team in champ select, plus a
    /// porofessor pregame link. Ranked lobbies hide names in the session,
    /// so those go through the chat participant list instead.
    pub async fn reveal(&self) -> Result<LobbyReveal, FeatureError> {
        let client = self.session.client()?;
        let session: ChampSelectSession = match client.get_json(CHAMP_SELECT_SESSION).await {
            Ok(s) => s,
            Err(e) if e.is_not_found() => {
                return Err(FeatureError::invalid("lobby", "not in champion select"));
            }
            Err(e) => return Err(e.into()),
        };

        let ranked = session
            .my_team
            .iter()
            .any(|m| m.name_visibility_type == "HIDDEN");
        let players = if ranked {
            self.ranked_players(&client).await?
        } else {
            visible_players(&client, &session.my_team).await
        };
        if players.is_empty() {
            return Err(FeatureError::invalid("lobby", "no players found in lobby"));
        }

        let region = match region_of(&client).await.0 {
            Region::Known(r) => r,
            Region::Unknown => {
                return Err(FeatureError::invalid(
                    "region",
                    "could not determine the client region",
                ));
            }
        };
        let url = pregame_url(&region, &players)?;
        info!(count = players.len(), ranked, "lobby revealed");
        Ok(LobbyReveal {
            players,
            region: Region::Known(region),
            ranked,
            url,
        })
    }

    async fn ranked_players(&self, lcu: &LcuClient) -> Result<Vec<String>, FeatureError> {
        let riot = match &self.riot_client {
            Some((resolver, transport)) => match resolver.resolve().await {
                Ok(creds) => Some(LcuClient::new(creds, transport).map_err(|e| {
                    FeatureError::invalid("riotClient", e.to_string())
                })?),
                Err(e) => {
                    warn!(error = %e, "riot client not found, asking the league client");
                    None
                }
            },
            None => None,
        };
        let client = riot.as_ref().unwrap_or(lcu);
        let participants: Participants = client.get_json(CHAT_PARTICIPANTS).await?;
        Ok(participants
            .participants
            .into_iter()
            .filter(|p| p.cid.contains("champ-select"))
            .filter(|p| !p.game_name.is_empty() && !p.game_tag.is_empty())
            .map(|p| format!("{}#{}", p.game_name, p.game_tag))
            .collect())
    }

    /// Leave champ select without closing the client.
    pub async fn dodge(&self) -> Result<(), FeatureError> {
        self.session.client()?.post(QUIT_DRAFT, None).await?;
        warn!("champ select dodged");
        Ok(())
    }

    /// Restart the client UX process (the game client stays logged in).
    pub async fn restart_ux(&self) -> Result<(), FeatureError> {
        self.session.client()?.post(RESTART_UX, None).await?;
        info!("client UX restart requested");
        Ok(())
    }

    /// Remove every friend. Returns how many were removed; individual
    /// failures are logged and skipped.
    pub async fn remove_all_friends(&self) -> Result<usize, FeatureError> {
        let client = self.session.client()?;
        let friends: Vec<Friend> = client.get_json(FRIENDS).await?;
        let mut removed = 0;
        for friend in friends {
            if friend.id.is_empty() || friend.id.contains(['/', '?', '#']) {
                warn!(id = %friend.id, "skipping friend with unusable id");
                continue;
            }
            match client.delete(&format!("{FRIENDS}/{}", friend.id)).await {
                Ok(_) => removed += 1,
                Err(e) if e.is_disconnect() => return Err(e.into()),
                Err(e) => warn!(id = %friend.id, error = %e, "failed to remove friend"),
            }
        }
        warn!(removed, "friends removed");
        Ok(removed)
    }

    /// Game version, platform, and region. Each part is fetched
    /// independently; a missing part is `None` / `Unknown`.
    pub async fn client_info(&self) -> Result<ClientInfo, FeatureError> {
        let client = self.session.client()?;
        let (version, login, (region, locale)) = tokio::join!(
            client.get_json::<String>(GAME_VERSION),
            client.get_json::<LoginDataPacket>(LOGIN_DATA_PACKET),
            region_of(&client),
        );
        Ok(ClientInfo {
            version: version
                .inspect_err(|e| debug!(error = %e, "game version unavailable"))
                .ok(),
            platform_id: login.ok().and_then(|l| l.platform_id),
            region,
            locale,
        })
    }
}

async fn region_of(client: &LcuClient) -> (Region, Option<RegionLocale>) {
    match client.get_json::<RegionLocale>(REGION_LOCALE).await {
        Ok(locale) if !locale.web_region.is_empty() => {
            (Region::Known(locale.web_region.to_lowercase()), Some(locale))
        }
        Ok(locale) => {
            warn!("client reported no web region");
            (Region::Unknown, Some(locale))
        }
        Err(e) => {
            warn!(error = %e, "region lookup failed");
            (Region::Unknown, None)
        }
    }
}

async fn visible_players(client: &LcuClient, team: &[TeamMember]) -> Vec<String> {
    let mut players = Vec::with_capacity(team.len());
    for member in team {
        if !member.game_name.is_empty() && !member.tag_line.is_empty() {
            players.push(format!("{}#{}", member.game_name, member.tag_line));
            continue;
        }
        if member.summoner_id <= 0 {
            continue;
        }
        let path = format!("/lol-summoner/v1/summoners/{}", member.summoner_id);
        match client.get_json::<Summoner>(&path).await {
            Ok(s) if !s.game_name.is_empty() && !s.tag_line.is_empty() => players.push(s.riot_id()),
            Ok(_) => debug!(summoner_id = member.summoner_id, "summoner has no riot id"),
            Err(e) => warn!(summoner_id = member.summoner_id, error = %e, "summoner lookup failed"),
        }
    }
    players
}

fn pregame_url(region: &str, players: &[String]) -> Result<String, FeatureError> {
    let mut url = Url::parse(PREGAME_BASE).map_err(|e| FeatureError::invalid("url", e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| FeatureError::invalid("url", "base cannot hold a path"))?
        .pop_if_empty()
        .push(region)
        .push(&players.join(","));
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pregame_url_escapes_riot_id_separator() {
        let url = pregame_url("euw1", &["Faker#KR1".into(), "Some One#EUW".into()])
            .unwrap_or_default();
        assert_eq!(
            url,
            "https://porofessor.gg/pregame/euw1/Faker%23KR1,Some%20One%23EUW"
        );
    }

    #[test]
    fn unknown_region_displays_as_unknown() {
        assert_eq!(Region::Unknown.to_string(), "unknown");
        assert_eq!(Region::Known("na1".into()).to_string(), "na1");
    }
}
