//! On-demand and reactive request sequences built on a [`Session`].
//!
//! Setters follow one rule: validate locally, apply remotely, and only
//! then update the local mirror. A failed call leaves the mirror exactly
//! as it was.

mod auto_accept;
mod champ_select;
mod chat;
mod lobby;
mod profile;

use std::sync::Arc;

use riftwatch_api::{Resolve, TransportConfig};
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::stats::Stats;

pub use auto_accept::{AutoAccept, ReadyCheck};
pub use champ_select::{
    AutoBanConfig, AutoPickConfig, ChampSelect, ChampSelectAction, ChampSelectSession, Champion,
    TeamMember,
};
pub use chat::Chat;
pub use lobby::{ClientInfo, Lobby, LobbyReveal, Region, RegionLocale};
pub use profile::{Profile, Summoner};

/// Snapshot of every toggleable feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureConfig {
    pub auto_accept: bool,
    pub auto_pick: AutoPickConfig,
    pub auto_ban: AutoBanConfig,
    pub chat_disconnected: bool,
}

/// All feature modules, sharing one session.
#[derive(Clone)]
pub struct Features {
    pub auto_accept: Arc<AutoAccept>,
    pub champ_select: Arc<ChampSelect>,
    pub chat: Arc<Chat>,
    pub profile: Profile,
    pub lobby: Lobby,
    pub stats: Stats,
}

impl Features {
    pub fn new(session: &Session) -> Self {
        Self {
            auto_accept: Arc::new(AutoAccept::new(session.clone())),
            champ_select: Arc::new(ChampSelect::new(session.clone())),
            chat: Arc::new(Chat::new(session.clone())),
            profile: Profile::new(session.clone()),
            lobby: Lobby::new(session.clone()),
            stats: Stats::new(session.clone()),
        }
    }

    /// Route ranked-lobby participant lookups through the Riot Client API.
    pub fn with_riot_client(mut self, resolver: Arc<dyn Resolve>, transport: TransportConfig) -> Self {
        self.lobby = self.lobby.with_riot_client(resolver, transport);
        self
    }

    pub fn feature_states(&self) -> FeatureConfig {
        FeatureConfig {
            auto_accept: self.auto_accept.is_enabled(),
            auto_pick: self.champ_select.auto_pick(),
            auto_ban: self.champ_select.auto_ban(),
            chat_disconnected: self.chat.is_disconnected(),
        }
    }

    /// Drop caches tied to the previous session. Configuration survives.
    pub async fn reset_session(&self) {
        self.auto_accept.reset();
        self.champ_select.reset().await;
    }
}
