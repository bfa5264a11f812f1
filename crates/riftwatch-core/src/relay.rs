//! JSON relay between the core and a display surface.
//!
//! Outbound, [`RelayMessage`] carries connection events and responses as
//! `{"type": …, "data": …}`. Inbound, an [`IntentEnvelope`] names an
//! action and a correlation id: `{"id": 7, "action": "change-icon",
//! "iconId": 29}`. Every intent gets exactly one response, and bad input
//! is answered with `success: false` instead of ending the relay.

use std::fmt::Display;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use riftwatch_api::Protocol;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::accounts::Account;
use crate::event::{ConnectionState, DisconnectReason, LcuEvent};
use crate::features::{AutoBanConfig, AutoPickConfig, Features};
use crate::login::LoginCoordinator;
use crate::poller::{Poller, TickOutcome};
use crate::stats::{
    DEFAULT_HISTORY_COUNT, Division, Tier, aggregate, current_streak, games_to_next_rank,
    most_played,
};

const MOST_PLAYED_COUNT: usize = 5;

// ── Wire types ───────────────────────────────────────────────────

/// Result of one intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    pub fn with_data(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                data: Some(data),
                ..Self::ok()
            },
            Err(e) => Self::fail(e),
        }
    }

    /// Failure carrying the error's display text.
    pub fn fail(error: impl Display) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    /// Echo of the intent id; `None` when the input had no readable id.
    pub id: Option<u64>,
    #[serde(flatten)]
    pub response: ActionResponse,
}

/// Everything the relay writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum RelayMessage {
    LcuConnected {
        port: u16,
        protocol: Protocol,
        timestamp: DateTime<Utc>,
    },
    LcuDisconnected {
        reason: DisconnectReason,
        timestamp: DateTime<Utc>,
    },
    LcuError {
        message: String,
        timestamp: DateTime<Utc>,
    },
    Response(RelayResponse),
}

impl From<&LcuEvent> for RelayMessage {
    fn from(event: &LcuEvent) -> Self {
        match event {
            LcuEvent::Connected(e) => Self::LcuConnected {
                port: e.credentials.port,
                protocol: e.credentials.protocol,
                timestamp: e.timestamp,
            },
            LcuEvent::Disconnected(e) => Self::LcuDisconnected {
                reason: e.reason,
                timestamp: e.timestamp,
            },
            LcuEvent::Error(e) => Self::LcuError {
                message: e.error.clone(),
                timestamp: e.timestamp,
            },
        }
    }
}

fn default_true() -> bool {
    true
}

/// An action requested by the display surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Intent {
    LcuStatus,
    Refresh,
    ToggleAutoAccept {
        enabled: bool,
    },
    SetAutoPick {
        champion_name: String,
        enabled: bool,
    },
    SetAutoBan {
        champion_name: String,
        enabled: bool,
        #[serde(default = "default_true")]
        protect: bool,
    },
    ToggleChat {
        disconnect: bool,
    },
    ChangeIcon {
        icon_id: i64,
    },
    ChangeBackground {
        skin_id: i64,
    },
    ChangeRiotId {
        game_name: String,
        tag_line: String,
    },
    ChangeStatus {
        status_message: String,
    },
    RemoveBadges,
    GetSummoner,
    GetFeatureStates,
    GetMatchHistory {
        /// Defaults to the logged-in player.
        #[serde(default)]
        puuid: Option<String>,
        #[serde(default)]
        count: Option<u32>,
    },
    GetRankedStats,
    CalculateGamesToRank {
        tier: String,
        division: String,
        lp: u32,
        winrate: f64,
    },
    RevealLobby,
    Dodge,
    RemoveFriends,
    RestartClient,
    GetClientInfo,
    LoadAccounts,
    SaveAccount {
        account: Account,
    },
    DeleteAccount {
        username: String,
    },
    LoginAccount {
        username: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentEnvelope {
    pub id: u64,
    #[serde(flatten)]
    pub intent: Intent,
}

// ── Relay ────────────────────────────────────────────────────────

/// Dispatches intents to the core and forwards Poller events.
#[derive(Clone)]
pub struct Relay {
    poller: Poller,
    features: Features,
    login: Arc<LoginCoordinator>,
}

impl Relay {
    pub fn new(poller: Poller, features: Features, login: Arc<LoginCoordinator>) -> Self {
        Self {
            poller,
            features,
            login,
        }
    }

    /// Push every Poller event into `sink`, in emission order, until
    /// `cancel` fires or the sink is closed.
    pub async fn forward(&self, sink: mpsc::Sender<RelayMessage>, cancel: CancellationToken) {
        let mut events = self.poller.events();
        loop {
            let event = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                event = events.recv() => event,
            };
            match event {
                Ok(event) => {
                    if sink.send(RelayMessage::from(event.as_ref())).await.is_err() {
                        debug!("relay sink closed");
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => warn!(missed, "relay dropped poller events"),
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Parse one JSON line and answer it. Never fails: unreadable input
    /// becomes a `success: false` response.
    pub async fn handle_line(&self, line: &str) -> RelayResponse {
        match serde_json::from_str::<IntentEnvelope>(line) {
            Ok(envelope) => RelayResponse {
                id: Some(envelope.id),
                response: self.handle(envelope.intent).await,
            },
            Err(e) => {
                let id = serde_json::from_str::<Value>(line)
                    .ok()
                    .and_then(|v| v.get("id").and_then(Value::as_u64));
                debug!(error = %e, "unparseable intent");
                RelayResponse {
                    id,
                    response: ActionResponse::fail(format!("invalid request: {e}")),
                }
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    pub async fn handle(&self, intent: Intent) -> ActionResponse {
        let f = &self.features;
        match intent {
            Intent::LcuStatus => self.status(),
            Intent::Refresh => self.refresh().await,
            Intent::ToggleAutoAccept { enabled } => {
                respond(f.auto_accept.set(enabled).await.map(|()| f.feature_states()))
            }
            Intent::SetAutoPick {
                champion_name,
                enabled,
            } => {
                let config = AutoPickConfig {
                    enabled,
                    champion_name,
                };
                respond(f.champ_select.set_auto_pick(config).await.map(|()| f.champ_select.auto_pick()))
            }
            Intent::SetAutoBan {
                champion_name,
                enabled,
                protect,
            } => {
                let config = AutoBanConfig {
                    enabled,
                    champion_name,
                    protect,
                };
                respond(f.champ_select.set_auto_ban(config).await.map(|()| f.champ_select.auto_ban()))
            }
            Intent::ToggleChat { disconnect } => {
                respond(f.chat.set_disconnected(disconnect).await.map(|()| f.feature_states()))
            }
            Intent::ChangeIcon { icon_id } => respond_empty(f.profile.change_icon(icon_id).await),
            Intent::ChangeBackground { skin_id } => {
                respond_empty(f.profile.change_background(skin_id).await)
            }
            Intent::ChangeRiotId {
                game_name,
                tag_line,
            } => respond_empty(f.profile.change_riot_id(&game_name, &tag_line).await),
            Intent::ChangeStatus { status_message } => {
                respond_empty(f.profile.change_status(&status_message).await)
            }
            Intent::RemoveBadges => respond_empty(f.profile.remove_badges().await),
            Intent::GetSummoner => respond(f.profile.current_summoner().await),
            Intent::GetFeatureStates => ActionResponse::with_data(f.feature_states()),
            Intent::GetMatchHistory { puuid, count } => self.match_history(puuid, count).await,
            Intent::GetRankedStats => respond(f.stats.ranked_stats().await),
            Intent::CalculateGamesToRank {
                tier,
                division,
                lp,
                winrate,
            } => calculate_games_to_rank(&tier, &division, lp, winrate),
            Intent::RevealLobby => respond(f.lobby.reveal().await),
            Intent::Dodge => respond_empty(f.lobby.dodge().await),
            Intent::RemoveFriends => respond(
                f.lobby
                    .remove_all_friends()
                    .await
                    .map(|removed| json!({ "removed": removed })),
            ),
            Intent::RestartClient => respond_empty(f.lobby.restart_ux().await),
            Intent::GetClientInfo => respond(f.lobby.client_info().await),
            Intent::LoadAccounts => respond(
                self.login
                    .store()
                    .load_all()
                    .await
                    .map(|accounts| accounts.into_iter().map(without_password).collect::<Vec<_>>()),
            ),
            Intent::SaveAccount { account } => {
                respond(self.login.store().upsert(account).await.map(without_password))
            }
            Intent::DeleteAccount { username } => respond(
                self.login
                    .store()
                    .remove(&username)
                    .await
                    .map(|removed| json!({ "removed": removed })),
            ),
            Intent::LoginAccount { username } => respond(
                self.login
                    .login(&username)
                    .await
                    .map(|account| json!({ "username": account.username })),
            ),
        }
    }

    fn status(&self) -> ActionResponse {
        let state = self.poller.state();
        let session = self.poller.session();
        ActionResponse::with_data(json!({
            "state": state,
            "connected": state == ConnectionState::Connected,
            "credentials": session.credentials(),
        }))
    }

    /// Drop session caches and run one connect cycle now.
    async fn refresh(&self) -> ActionResponse {
        self.features.reset_session().await;
        match self.poller.tick().await {
            TickOutcome::Completed(ConnectionState::Connected) => {
                ActionResponse::with_data(json!({ "state": ConnectionState::Connected }))
            }
            TickOutcome::Completed(state) => {
                ActionResponse::fail(format!("could not connect to the League client ({state})"))
            }
            TickOutcome::Skipped => ActionResponse::fail("a connection check is already running"),
        }
    }

    async fn match_history(&self, puuid: Option<String>, count: Option<u32>) -> ActionResponse {
        let puuid = match puuid {
            Some(p) => p,
            None => match self.features.profile.current_summoner().await {
                Ok(s) => s.puuid,
                Err(e) => return ActionResponse::fail(e),
            },
        };
        let count = count.unwrap_or(DEFAULT_HISTORY_COUNT);
        match self.features.stats.match_history(&puuid, count).await {
            Ok(matches) => ActionResponse::with_data(json!({
                "stats": aggregate(&matches),
                "mostPlayed": most_played(&matches, MOST_PLAYED_COUNT),
                "streak": current_streak(&matches),
                "matches": matches,
            })),
            Err(e) => ActionResponse::fail(e),
        }
    }
}

fn calculate_games_to_rank(tier: &str, division: &str, lp: u32, winrate: f64) -> ActionResponse {
    let Ok(tier) = tier.parse::<Tier>() else {
        return ActionResponse::fail(format!("Invalid tier: {tier:?}"));
    };
    let division = if tier.is_apex() {
        Division::I
    } else {
        match division.parse::<Division>() {
            Ok(d) => d,
            Err(_) => return ActionResponse::fail(format!("Invalid division: {division:?}")),
        }
    };
    respond(games_to_next_rank(tier, division, lp, winrate))
}

fn without_password(mut account: Account) -> Account {
    account.password = None;
    account
}

fn respond<T: Serialize, E: Display>(result: Result<T, E>) -> ActionResponse {
    match result {
        Ok(data) => ActionResponse::with_data(data),
        Err(e) => ActionResponse::fail(e),
    }
}

fn respond_empty<E: Display>(result: Result<(), E>) -> ActionResponse {
    match result {
        Ok(()) => ActionResponse::ok(),
        Err(e) => ActionResponse::fail(e),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn intents_use_kebab_actions_and_camel_fields() {
        let envelope: IntentEnvelope = serde_json::from_str(
            r#"{"id": 3, "action": "set-auto-ban", "championName": "Yasuo", "enabled": true}"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(envelope.id, 3);
        assert_eq!(
            envelope.intent,
            Intent::SetAutoBan {
                champion_name: "Yasuo".into(),
                enabled: true,
                protect: true,
            }
        );
    }

    #[test]
    fn unit_intents_need_only_the_action() {
        let envelope: IntentEnvelope =
            serde_json::from_str(r#"{"id": 1, "action": "lcu-status"}"#).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(envelope.intent, Intent::LcuStatus);
    }

    #[test]
    fn responses_flatten_into_data() {
        let msg = RelayMessage::Response(RelayResponse {
            id: Some(9),
            response: ActionResponse::fail("Invalid iconId: must not be negative"),
        });
        let value = serde_json::to_value(&msg).unwrap_or_default();
        assert_eq!(
            value,
            json!({
                "type": "response",
                "data": { "id": 9, "success": false, "error": "Invalid iconId: must not be negative" }
            })
        );
    }

    #[test]
    fn disconnect_reason_is_snake_case_on_the_wire() {
        let msg = RelayMessage::LcuDisconnected {
            reason: DisconnectReason::ConnectionRefused,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        };
        let value = serde_json::to_value(&msg).unwrap_or_default();
        assert_eq!(value["type"], "lcu-disconnected");
        assert_eq!(value["data"]["reason"], "connection_refused");
    }

    #[test]
    fn games_to_rank_rejects_unknown_tier() {
        let response = calculate_games_to_rank("WOOD", "IV", 0, 60.0);
        assert!(!response.success);
        assert!(response.error.unwrap_or_default().contains("WOOD"));
    }

    #[test]
    fn games_to_rank_accepts_lowercase() {
        let response = calculate_games_to_rank("gold", "ii", 60, 60.0);
        assert!(response.success);
        assert_eq!(response.data.unwrap_or_default()["games"], 10);
    }
}
