use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use riftwatch_api::{LcuClient, RequestError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::FeatureError;
use crate::session::Session;

const SESSION: &str = "/lol-champ-select/v1/session";
const GRID_CHAMPIONS: &str = "/lol-champ-select/v1/all-grid-champions";
const OWNED_CHAMPIONS: &str = "/lol-champions/v1/owned-champions-minimal";
const MAX_SUGGESTIONS: usize = 5;
const SUGGESTION_THRESHOLD: f64 = 0.8;

// ── Configuration ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoPickConfig {
    pub enabled: bool,
    pub champion_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoBanConfig {
    pub enabled: bool,
    pub champion_name: String,
    /// Never ban a champion a teammate has picked or hovered.
    pub protect: bool,
}

impl Default for AutoBanConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            champion_name: String::new(),
            protect: true,
        }
    }
}

/// A config plus the champion id it resolved to when it was set.
#[derive(Debug, Default)]
struct Armed<C> {
    config: C,
    champion_id: Option<i64>,
}

// ── Wire types ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Champion {
    pub id: i64,
    pub name: String,
    pub alias: String,
}

/// `GET /lol-champ-select/v1/session`, reduced to what automation and
/// lobby reveal need.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChampSelectSession {
    pub local_player_cell_id: i64,
    pub actions: Vec<Vec<ChampSelectAction>>,
    pub my_team: Vec<TeamMember>,
    pub bans: Bans,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChampSelectAction {
    pub id: i64,
    pub actor_cell_id: i64,
    pub champion_id: i64,
    pub completed: bool,
    pub is_in_progress: bool,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamMember {
    pub cell_id: i64,
    pub champion_id: i64,
    pub champion_pick_intent: i64,
    pub summoner_id: i64,
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
    pub name_visibility_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bans {
    pub my_team_bans: Vec<i64>,
    pub their_team_bans: Vec<i64>,
}

impl ChampSelectSession {
    /// Champions banned so far, from completed ban actions and the ban lists.
    fn banned(&self) -> HashSet<i64> {
        self.actions
            .iter()
            .flatten()
            .filter(|a| a.kind == "ban" && a.completed)
            .map(|a| a.champion_id)
            .chain(self.bans.my_team_bans.iter().copied())
            .chain(self.bans.their_team_bans.iter().copied())
            .filter(|id| *id > 0)
            .collect()
    }

    /// Champions teammates have locked or declared.
    fn teammate_choices(&self) -> HashSet<i64> {
        self.my_team
            .iter()
            .filter(|m| m.cell_id != self.local_player_cell_id)
            .flat_map(|m| [m.champion_id, m.champion_pick_intent])
            .filter(|id| *id > 0)
            .collect()
    }

    fn my_pending_actions(&self) -> impl Iterator<Item = &ChampSelectAction> {
        self.actions
            .iter()
            .flatten()
            .filter(|a| a.actor_cell_id == self.local_player_cell_id && a.is_in_progress && !a.completed)
    }
}

// ── ChampSelect ──────────────────────────────────────────────────

/// Auto-pick and auto-ban.
pub struct ChampSelect {
    session: Session,
    pick: ArcSwap<Armed<AutoPickConfig>>,
    ban: ArcSwap<Armed<AutoBanConfig>>,
    catalog: Mutex<Option<Arc<Vec<Champion>>>>,
    handled: Mutex<HashSet<i64>>,
}

impl ChampSelect {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            pick: ArcSwap::from_pointee(Armed::default()),
            ban: ArcSwap::from_pointee(Armed::default()),
            catalog: Mutex::new(None),
            handled: Mutex::new(HashSet::new()),
        }
    }

    pub fn auto_pick(&self) -> AutoPickConfig {
        self.pick.load().config.clone()
    }

    pub fn auto_ban(&self) -> AutoBanConfig {
        self.ban.load().config.clone()
    }

    pub async fn set_auto_pick(&self, config: AutoPickConfig) -> Result<(), FeatureError> {
        let armed = if config.enabled {
            let champion = self.resolve_armed(&config.champion_name).await?;
            Armed {
                config: AutoPickConfig {
                    enabled: true,
                    champion_name: champion.name,
                },
                champion_id: Some(champion.id),
            }
        } else {
            Armed {
                config,
                champion_id: None,
            }
        };
        info!(enabled = armed.config.enabled, champion = %armed.config.champion_name, "auto-pick updated");
        self.pick.store(Arc::new(armed));
        Ok(())
    }

    pub async fn set_auto_ban(&self, config: AutoBanConfig) -> Result<(), FeatureError> {
        let armed = if config.enabled {
            let champion = self.resolve_armed(&config.champion_name).await?;
            Armed {
                config: AutoBanConfig {
                    enabled: true,
                    champion_name: champion.name,
                    protect: config.protect,
                },
                champion_id: Some(champion.id),
            }
        } else {
            Armed {
                config,
                champion_id: None,
            }
        };
        info!(
            enabled = armed.config.enabled,
            champion = %armed.config.champion_name,
            protect = armed.config.protect,
            "auto-ban updated"
        );
        self.ban.store(Arc::new(armed));
        Ok(())
    }

    async fn resolve_armed(&self, name: &str) -> Result<Champion, FeatureError> {
        if name.trim().is_empty() {
            return Err(FeatureError::invalid(
                "championName",
                "must not be empty when enabled",
            ));
        }
        self.find_champion(name).await
    }

    // ── Champion catalog ─────────────────────────────────────────

    /// Look a champion up by name or alias: exact (case-insensitive) first,
    /// then a unique substring match.
    pub async fn find_champion(&self, query: &str) -> Result<Champion, FeatureError> {
        let catalog = self.catalog().await?;
        match_champion(&catalog, query)
    }

    /// The champion list, fetched once per session.
    pub async fn catalog(&self) -> Result<Arc<Vec<Champion>>, FeatureError> {
        let mut cached = self.catalog.lock().await;
        if let Some(catalog) = cached.as_ref() {
            return Ok(Arc::clone(catalog));
        }
        let client = self.session.client()?;
        let catalog = Arc::new(fetch_catalog(&client).await?);
        debug!(count = catalog.len(), "champion catalog loaded");
        *cached = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    // ── Reaction ─────────────────────────────────────────────────

    /// Complete the local player's in-progress pick/ban actions. Each
    /// action is handled at most once. Returns how many were completed.
    pub async fn react(&self) -> Result<usize, FeatureError> {
        let pick = self.pick.load_full();
        let ban = self.ban.load_full();
        if !pick.config.enabled && !ban.config.enabled {
            return Ok(0);
        }

        let client = self.session.client()?;
        let session: ChampSelectSession = match client.get_json(SESSION).await {
            Ok(s) => s,
            Err(e) if e.is_not_found() => {
                self.handled.lock().await.clear();
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let banned = session.banned();
        let teammates = session.teammate_choices();
        let mut handled = self.handled.lock().await;
        let mut completed = 0;

        for action in session.my_pending_actions() {
            if handled.contains(&action.id) {
                continue;
            }
            let champion_id = match action.kind.as_str() {
                "pick" => match pick.champion_id.filter(|_| pick.config.enabled) {
                    Some(id) if banned.contains(&id) => {
                        warn!(champion = %pick.config.champion_name, "auto-pick champion is banned, skipping");
                        handled.insert(action.id);
                        continue;
                    }
                    other => other,
                },
                "ban" => match ban.champion_id.filter(|_| ban.config.enabled) {
                    Some(id) if ban.config.protect && teammates.contains(&id) => {
                        warn!(champion = %ban.config.champion_name, "teammate wants the auto-ban champion, skipping");
                        handled.insert(action.id);
                        continue;
                    }
                    other => other,
                },
                _ => None,
            };
            let Some(champion_id) = champion_id else {
                continue;
            };

            complete_action(&client, action.id, champion_id).await?;
            info!(action = action.id, kind = %action.kind, champion_id, "champ select action completed");
            handled.insert(action.id);
            completed += 1;
        }
        Ok(completed)
    }

    /// Read the current champ-select session.
    pub async fn current_session(&self) -> Result<ChampSelectSession, FeatureError> {
        Ok(self.session.client()?.get_json(SESSION).await?)
    }

    pub(crate) async fn reset(&self) {
        *self.catalog.lock().await = None;
        self.handled.lock().await.clear();
    }
}

async fn complete_action(client: &LcuClient, action_id: i64, champion_id: i64) -> Result<(), RequestError> {
    let body = json!({ "championId": champion_id, "completed": true });
    client
        .patch(&format!("{SESSION}/actions/{action_id}"), Some(&body))
        .await
        .map(drop)
}

async fn fetch_catalog(client: &LcuClient) -> Result<Vec<Champion>, RequestError> {
    let primary = client.get_json::<Vec<Champion>>(GRID_CHAMPIONS).await;
    let champions = match primary {
        Ok(list) if !list.is_empty() => list,
        other => {
            debug!(ok = other.is_ok(), "grid champions unavailable, falling back to owned champions");
            match client.get_json::<Vec<Champion>>(OWNED_CHAMPIONS).await {
                Ok(list) => list,
                Err(e) => return Err(other.err().unwrap_or(e)),
            }
        }
    };
    Ok(champions.into_iter().filter(|c| c.id > 0).collect())
}

fn match_champion(catalog: &[Champion], query: &str) -> Result<Champion, FeatureError> {
    let q = query.trim().to_lowercase();

    if let Some(exact) = catalog
        .iter()
        .find(|c| c.name.to_lowercase() == q || c.alias.to_lowercase() == q)
    {
        return Ok(exact.clone());
    }

    let partial: Vec<&Champion> = catalog
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&q))
        .collect();
    if let [only] = partial.as_slice() {
        return Ok((*only).clone());
    }

    let mut suggestions: Vec<&str> = partial.iter().map(|c| c.name.as_str()).collect();
    let mut fuzzy: Vec<(f64, &str)> = catalog
        .iter()
        .map(|c| (strsim::jaro_winkler(&q, &c.name.to_lowercase()), c.name.as_str()))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    fuzzy.sort_by(|a, b| b.0.total_cmp(&a.0));
    for (_, name) in fuzzy {
        if !suggestions.contains(&name) {
            suggestions.push(name);
        }
    }
    suggestions.truncate(MAX_SUGGESTIONS);

    let reason = if suggestions.is_empty() {
        format!("no champion named {query:?}")
    } else if partial.len() > 1 {
        format!("{query:?} is ambiguous: {}", suggestions.join(", "))
    } else {
        format!("no champion named {query:?}; did you mean {}?", suggestions.join(", "))
    };
    Err(FeatureError::invalid("championName", reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Champion> {
        [(103, "Ahri", "Ahri"), (84, "Akali", "Akali"), (166, "Akshan", "Akshan"), (62, "Wukong", "MonkeyKing")]
            .into_iter()
            .map(|(id, name, alias)| Champion {
                id,
                name: name.into(),
                alias: alias.into(),
            })
            .collect()
    }

    #[test]
    fn exact_match_ignores_case_and_alias_works() {
        assert_eq!(match_champion(&catalog(), "ahri").map(|c| c.id), Ok(103));
        assert_eq!(match_champion(&catalog(), "monkeyking").map(|c| c.id), Ok(62));
    }

    #[test]
    fn unique_substring_matches() {
        assert_eq!(match_champion(&catalog(), "kong").map(|c| c.id), Ok(62));
    }

    #[test]
    fn ambiguous_substring_is_rejected_with_candidates() {
        let Err(FeatureError::ValidationFailed { reason, .. }) = match_champion(&catalog(), "ak")
        else {
            panic!("expected ValidationFailed");
        };
        assert!(reason.contains("Akali") && reason.contains("Akshan"), "{reason}");
    }

    #[test]
    fn typo_gets_suggestions() {
        let Err(FeatureError::ValidationFailed { reason, .. }) = match_champion(&catalog(), "Akshen")
        else {
            panic!("expected ValidationFailed");
        };
        assert!(reason.contains("Akshan"), "{reason}");
    }

    #[test]
    fn protect_sees_teammate_intent() {
        let session: ChampSelectSession = serde_json::from_value(json!({
            "localPlayerCellId": 0,
            "myTeam": [
                { "cellId": 0, "championId": 0, "championPickIntent": 0 },
                { "cellId": 1, "championId": 0, "championPickIntent": 103 },
                { "cellId": 2, "championId": 84, "championPickIntent": 0 }
            ]
        }))
        .unwrap_or_default();
        let choices = session.teammate_choices();
        assert!(choices.contains(&103) && choices.contains(&84));
        assert_eq!(choices.len(), 2);
    }
}
