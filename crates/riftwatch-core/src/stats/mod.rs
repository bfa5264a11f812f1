//! Match history and ranked statistics.
//!
//! Fetching goes through [`Stats`]; everything else here is pure
//! computation over the fetched data.

mod matches;
mod ranked;

use tracing::debug;

use crate::error::FeatureError;
use crate::session::Session;

pub use matches::{
    ChampionUsage, MatchAggregate, MatchSummary, Streak, StreakKind, aggregate, current_streak,
    most_played,
};
pub use ranked::{Division, QueueStats, RankProjection, RankedStats, Tier, games_to_next_rank};

pub const DEFAULT_HISTORY_COUNT: u32 = 20;
const MAX_HISTORY_COUNT: u32 = 200;

#[derive(Clone)]
pub struct Stats {
    session: Session,
}

impl Stats {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// The `count` most recent games for `puuid`, newest first.
    pub async fn match_history(&self, puuid: &str, count: u32) -> Result<Vec<MatchSummary>, FeatureError> {
        if puuid.is_empty() || !puuid.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(FeatureError::invalid("puuid", "must be a non-empty player id"));
        }
        if !(1..=MAX_HISTORY_COUNT).contains(&count) {
            return Err(FeatureError::invalid(
                "count",
                format!("must be between 1 and {MAX_HISTORY_COUNT}"),
            ));
        }
        let path = format!(
            "/lol-match-history/v1/products/lol/{puuid}/matches?begIndex=0&endIndex={}",
            count - 1
        );
        let raw: matches::RawHistory = self.session.client()?.get_json(&path).await?;
        let mut games = raw.into_summaries();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        games.truncate(usize::try_from(count).unwrap_or(usize::MAX));
        debug!(count = games.len(), "match history loaded");
        Ok(games)
    }

    /// Solo/duo and flex standings of the logged-in player.
    pub async fn ranked_stats(&self) -> Result<RankedStats, FeatureError> {
        let raw: ranked::RawRankedStats = self
            .session
            .client()?
            .get_json("/lol-ranked/v1/current-ranked-stats")
            .await?;
        Ok(raw.into())
    }
}
