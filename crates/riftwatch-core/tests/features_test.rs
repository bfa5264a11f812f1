#![allow(clippy::unwrap_used)]
// Feature module tests against a wiremock stand-in for the League client.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use riftwatch_api::{Credentials, Protocol, RequestError, TransportConfig};
use riftwatch_core::features::{AutoBanConfig, AutoPickConfig, Region};
use riftwatch_core::stats::{StreakKind, aggregate, current_streak};
use riftwatch_core::{FeatureError, Features, Session};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Features) {
    let server = MockServer::start().await;
    let session = Session::fixed(
        Credentials::new(server.address().port(), "test-token", Protocol::Http),
        &TransportConfig::default().with_timeout(Duration::from_millis(500)),
    )
    .unwrap();
    (server, Features::new(&session))
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

async fn mount_champions(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/lol-champ-select/v1/all-grid-champions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 103, "name": "Ahri", "alias": "Ahri" },
            { "id": 157, "name": "Yasuo", "alias": "Yasuo" },
            { "id": 777, "name": "Yone", "alias": "Yone" },
            { "id": 62, "name": "Wukong", "alias": "MonkeyKing" },
        ])))
        .mount(server)
        .await;
}

fn champ_select_session(kind: &str, my_team: &Value) -> Value {
    json!({
        "localPlayerCellId": 2,
        "actions": [[
            { "id": 11, "actorCellId": 2, "championId": 0, "completed": false, "isInProgress": true, "type": kind },
            { "id": 12, "actorCellId": 3, "championId": 0, "completed": false, "isInProgress": true, "type": kind }
        ]],
        "myTeam": my_team,
        "bans": { "myTeamBans": [], "theirTeamBans": [] }
    })
}

// ── Connection guard ────────────────────────────────────────────────

#[tokio::test]
async fn test_no_session_is_not_connected() {
    let features = Features::new(&Session::new());
    assert_eq!(
        features.profile.current_summoner().await,
        Err(FeatureError::NotConnected)
    );
    assert_eq!(features.lobby.dodge().await, Err(FeatureError::NotConnected));
}

// ── Auto-pick / auto-ban ────────────────────────────────────────────

#[tokio::test]
async fn test_empty_champion_name_is_rejected_without_request() {
    let (server, features) = setup().await;

    let err = features
        .champ_select
        .set_auto_pick(AutoPickConfig {
            enabled: true,
            champion_name: "  ".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, FeatureError::ValidationFailed { ref field, .. } if field == "championName"));
    assert_eq!(request_count(&server).await, 0);
    assert_eq!(features.champ_select.auto_pick(), AutoPickConfig::default());
}

#[tokio::test]
async fn test_champion_name_resolves_by_alias_case_insensitively() {
    let (server, features) = setup().await;
    mount_champions(&server).await;

    features
        .champ_select
        .set_auto_pick(AutoPickConfig {
            enabled: true,
            champion_name: "monkeyking".into(),
        })
        .await
        .unwrap();
    assert_eq!(features.champ_select.auto_pick().champion_name, "Wukong");
}

#[tokio::test]
async fn test_unknown_champion_suggests_and_keeps_previous_config() {
    let (server, features) = setup().await;
    mount_champions(&server).await;
    features
        .champ_select
        .set_auto_ban(AutoBanConfig {
            enabled: true,
            champion_name: "Ahri".into(),
            protect: true,
        })
        .await
        .unwrap();

    let err = features
        .champ_select
        .set_auto_ban(AutoBanConfig {
            enabled: true,
            champion_name: "Yasou".into(),
            protect: false,
        })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Yasuo"), "{err}");
    let ban = features.champ_select.auto_ban();
    assert_eq!(ban.champion_name, "Ahri");
    assert!(ban.protect);
}

#[tokio::test]
async fn test_disabling_needs_no_request() {
    let (server, features) = setup().await;
    features
        .champ_select
        .set_auto_pick(AutoPickConfig {
            enabled: false,
            champion_name: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_auto_pick_completes_local_action_once() {
    let (server, features) = setup().await;
    mount_champions(&server).await;
    Mock::given(method("GET"))
        .and(path("/lol-champ-select/v1/session"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(champ_select_session("pick", &json!([]))),
        )
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/lol-champ-select/v1/session/actions/11"))
        .and(body_json(json!({ "championId": 103, "completed": true })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    features
        .champ_select
        .set_auto_pick(AutoPickConfig {
            enabled: true,
            champion_name: "ahri".into(),
        })
        .await
        .unwrap();

    assert_eq!(features.champ_select.react().await.unwrap(), 1);
    assert_eq!(features.champ_select.react().await.unwrap(), 0);
}

#[tokio::test]
async fn test_protected_ban_skips_teammate_intent() {
    let (server, features) = setup().await;
    mount_champions(&server).await;
    let team = json!([
        { "cellId": 2, "championId": 0, "championPickIntent": 0 },
        { "cellId": 3, "championId": 0, "championPickIntent": 157 }
    ]);
    Mock::given(method("GET"))
        .and(path("/lol-champ-select/v1/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(champ_select_session("ban", &team)))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    features
        .champ_select
        .set_auto_ban(AutoBanConfig {
            enabled: true,
            champion_name: "Yasuo".into(),
            protect: true,
        })
        .await
        .unwrap();

    assert_eq!(features.champ_select.react().await.unwrap(), 0);
}

#[tokio::test]
async fn test_react_outside_champ_select_is_quiet() {
    let (server, features) = setup().await;
    mount_champions(&server).await;
    Mock::given(method("GET"))
        .and(path("/lol-champ-select/v1/session"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "No active delegate" })),
        )
        .mount(&server)
        .await;

    features
        .champ_select
        .set_auto_pick(AutoPickConfig {
            enabled: true,
            champion_name: "Yone".into(),
        })
        .await
        .unwrap();
    assert_eq!(features.champ_select.react().await.unwrap(), 0);
}

// ── Auto-accept ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_auto_accept_answers_each_ready_check_once() {
    let (server, features) = setup().await;
    Mock::given(method("GET"))
        .and(path("/lol-matchmaking/v1/ready-check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "InProgress", "playerResponse": "None", "timer": 3.0
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/lol-matchmaking/v1/ready-check/accept"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    // enabling while a check is pending accepts right away
    features.auto_accept.set(true).await.unwrap();
    assert!(features.auto_accept.is_enabled());
    assert!(!features.auto_accept.react().await.unwrap());
}

#[tokio::test]
async fn test_auto_accept_enable_outside_queue_only_reads_ready_check() {
    let (server, features) = setup().await;
    Mock::given(method("GET"))
        .and(path("/lol-matchmaking/v1/ready-check"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    features.auto_accept.set(true).await.unwrap();
    assert!(features.auto_accept.is_enabled());
    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_owned())
        .collect();
    assert_eq!(paths, vec!["/lol-matchmaking/v1/ready-check"]);
}

#[tokio::test]
async fn test_auto_accept_disabled_does_nothing() {
    let (server, features) = setup().await;
    assert!(!features.auto_accept.react().await.unwrap());
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_auto_accept_enable_failure_keeps_it_off() {
    let (server, features) = setup().await;
    Mock::given(method("GET"))
        .and(path("/lol-matchmaking/v1/ready-check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "InProgress", "playerResponse": "None"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/lol-matchmaking/v1/ready-check/accept"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = features.auto_accept.set(true).await.unwrap_err();
    assert!(matches!(
        err,
        FeatureError::Remote(RequestError::HttpError { status: 500, .. })
    ));
    assert!(!features.auto_accept.is_enabled());
}

// ── Chat / profile ──────────────────────────────────────────────────

#[tokio::test]
async fn test_chat_toggle_updates_only_after_success() {
    let (server, features) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/lol-chat/v1/me"))
        .and(body_json(json!({ "availability": "offline" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    features.chat.set_disconnected(true).await.unwrap();
    assert!(features.feature_states().chat_disconnected);

    // no mock for "chat": the 404 leaves the flag alone
    assert!(features.chat.set_disconnected(false).await.is_err());
    assert!(features.chat.is_disconnected());
}

#[tokio::test]
async fn test_profile_validation_sends_nothing() {
    let (server, features) = setup().await;

    assert!(features.profile.change_icon(-1).await.is_err());
    assert!(features.profile.change_background(0).await.is_err());
    assert!(features.profile.change_riot_id("ab", "EUW").await.is_err());
    assert!(features.profile.change_riot_id("Faker", "K-R1").await.is_err());
    assert!(features.profile.change_status(&"x".repeat(513)).await.is_err());
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_change_riot_id_strips_hash() {
    let (server, features) = setup().await;
    Mock::given(method("POST"))
        .and(path("/lol-summoner/v1/save-alias"))
        .and(body_json(json!({ "gameName": "Faker", "tagLine": "KR1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    features.profile.change_riot_id(" Faker ", "#KR1").await.unwrap();
}

#[tokio::test]
async fn test_change_icon_puts_icon_id() {
    let (server, features) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/lol-summoner/v1/current-summoner/icon"))
        .and(body_json(json!({ "profileIconId": 29 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "profileIconId": 29 })))
        .expect(1)
        .mount(&server)
        .await;

    features.profile.change_icon(29).await.unwrap();
}

// ── Lobby ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_reveal_visible_lobby_builds_pregame_url() {
    let (server, features) = setup().await;
    Mock::given(method("GET"))
        .and(path("/lol-champ-select/v1/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localPlayerCellId": 0,
            "myTeam": [
                { "cellId": 0, "gameName": "Alpha", "tagLine": "EUW", "nameVisibilityType": "VISIBLE" },
                { "cellId": 1, "summonerId": 42, "nameVisibilityType": "VISIBLE" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lol-summoner/v1/summoners/42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "gameName": "Beta", "tagLine": "0001" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/riotclient/region-locale"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "region": "EUW", "locale": "en_GB", "webRegion": "EUW", "webLanguage": "en"
        })))
        .mount(&server)
        .await;

    let reveal = features.lobby.reveal().await.unwrap();
    assert_eq!(reveal.players, vec!["Alpha#EUW", "Beta#0001"]);
    assert_eq!(reveal.region, Region::Known("euw".into()));
    assert!(!reveal.ranked);
    assert_eq!(
        reveal.url,
        "https://porofessor.gg/pregame/euw/Alpha%23EUW,Beta%230001"
    );
}

#[tokio::test]
async fn test_reveal_fails_on_unknown_region() {
    let (server, features) = setup().await;
    Mock::given(method("GET"))
        .and(path("/lol-champ-select/v1/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "myTeam": [{ "cellId": 0, "gameName": "Alpha", "tagLine": "EUW" }]
        })))
        .mount(&server)
        .await;

    let err = features.lobby.reveal().await.unwrap_err();
    assert!(matches!(err, FeatureError::ValidationFailed { ref field, .. } if field == "region"));
}

#[tokio::test]
async fn test_reveal_outside_champ_select() {
    let (_server, features) = setup().await;
    let err = features.lobby.reveal().await.unwrap_err();
    assert!(err.to_string().contains("not in champion select"), "{err}");
}

#[tokio::test]
async fn test_remove_all_friends_counts_successes() {
    let (server, features) = setup().await;
    Mock::given(method("GET"))
        .and(path("/lol-chat/v1/friends"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a@pvp.net" }, { "id": "b@pvp.net" }, { "id": "bad/id" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/lol-chat/v1/friends/a@pvp.net"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/lol-chat/v1/friends/b@pvp.net"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert_eq!(features.lobby.remove_all_friends().await.unwrap(), 1);
}

#[tokio::test]
async fn test_client_info_tolerates_missing_parts() {
    let (server, features) = setup().await;
    Mock::given(method("GET"))
        .and(path("/lol-patch/v1/game-version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("14.20.1")))
        .mount(&server)
        .await;

    let info = features.lobby.client_info().await.unwrap();
    assert_eq!(info.version.as_deref(), Some("14.20.1"));
    assert_eq!(info.platform_id, None);
    assert_eq!(info.region, Region::Unknown);
}

// ── Stats ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_match_history_newest_first_with_streak() {
    let (server, features) = setup().await;
    let game = |id: i64, created: i64, win: bool| {
        json!({
            "gameId": id, "gameCreation": created, "gameDuration": 1800, "queueId": 420,
            "gameMode": "CLASSIC",
            "participants": [{ "championId": 103, "stats": { "win": win, "kills": 5, "deaths": 2, "assists": 7 } }]
        })
    };
    Mock::given(method("GET"))
        .and(path("/lol-match-history/v1/products/lol/abc-123/matches"))
        .and(query_param("begIndex", "0"))
        .and(query_param("endIndex", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "games": { "games": [game(1, 100, false), game(3, 300, true), game(2, 200, true)] }
        })))
        .mount(&server)
        .await;

    let matches = features.stats.match_history("abc-123", 3).await.unwrap();
    let ids: Vec<i64> = matches.iter().map(|m| m.game_id).collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let streak = current_streak(&matches).unwrap();
    assert_eq!((streak.kind, streak.count), (StreakKind::Win, 2));
    assert_eq!(aggregate(&matches).wins, 2);
}

#[tokio::test]
async fn test_match_history_rejects_bad_count() {
    let (server, features) = setup().await;
    assert!(features.stats.match_history("abc", 0).await.is_err());
    assert!(features.stats.match_history("a/b", 5).await.is_err());
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_ranked_stats_reads_solo_and_flex() {
    let (server, features) = setup().await;
    Mock::given(method("GET"))
        .and(path("/lol-ranked/v1/current-ranked-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queueMap": {
                "RANKED_SOLO_5x5": { "tier": "PLATINUM", "division": "III", "leaguePoints": 45, "wins": 30, "losses": 20 },
                "RANKED_FLEX_SR": { "tier": "NONE", "division": "NA" }
            }
        })))
        .mount(&server)
        .await;

    let ranked = features.stats.ranked_stats().await.unwrap();
    let solo = ranked.solo.unwrap();
    assert_eq!(solo.tier, "PLATINUM");
    assert!((solo.winrate() - 60.0).abs() < f64::EPSILON);
    assert!(ranked.flex.is_none());
    assert!(solo.projection().unwrap().is_some());
}
