use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FeatureError;

const SOLO_QUEUE: &str = "RANKED_SOLO_5x5";
const FLEX_QUEUE: &str = "RANKED_FLEX_SR";
/// LP swing of an average ranked game.
const LP_PER_GAME: f64 = 20.0;
const LP_PER_DIVISION: u32 = 100;
/// Quotients within this distance of a whole number count as that number.
const GAMES_EPSILON: f64 = 1e-6;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    /// Master and above have no divisions.
    pub fn is_apex(self) -> bool {
        matches!(self, Self::Master | Self::Grandmaster | Self::Challenger)
    }

    fn next(self) -> Option<Self> {
        Some(match self {
            Self::Iron => Self::Bronze,
            Self::Bronze => Self::Silver,
            Self::Silver => Self::Gold,
            Self::Gold => Self::Platinum,
            Self::Platinum => Self::Emerald,
            Self::Emerald => Self::Diamond,
            Self::Diamond => Self::Master,
            Self::Master => Self::Grandmaster,
            Self::Grandmaster => Self::Challenger,
            Self::Challenger => return None,
        })
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Division {
    IV,
    III,
    II,
    I,
}

impl Division {
    fn next(self) -> Option<Self> {
        match self {
            Self::IV => Some(Self::III),
            Self::III => Some(Self::II),
            Self::II => Some(Self::I),
            Self::I => None,
        }
    }
}

/// Estimate for reaching the next division.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankProjection {
    pub next_tier: Tier,
    /// `None` when the next step is an apex tier.
    pub next_division: Option<Division>,
    pub lp_needed: u32,
    pub net_lp_per_game: f64,
    pub games: u32,
}

/// Games needed to climb one division at `winrate` percent.
///
/// Returns `Ok(None)` for apex tiers and for win rates that don't gain LP
/// on average (50% or less).
pub fn games_to_next_rank(
    tier: Tier,
    division: Division,
    lp: u32,
    winrate: f64,
) -> Result<Option<RankProjection>, FeatureError> {
    if !(0.0..=100.0).contains(&winrate) {
        return Err(FeatureError::invalid("winrate", "must be between 0 and 100"));
    }
    if tier.is_apex() {
        return Ok(None);
    }
    let net_lp_per_game = LP_PER_GAME * (2.0 * winrate - 100.0) / 100.0;
    if net_lp_per_game <= 0.0 {
        return Ok(None);
    }

    let (next_tier, next_division) = match division.next() {
        Some(d) => (tier, Some(d)),
        None => {
            let Some(next) = tier.next() else {
                return Ok(None);
            };
            (next, (!next.is_apex()).then_some(Division::IV))
        }
    };

    let lp_needed = LP_PER_DIVISION.saturating_sub(lp).max(1);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
    let games = {
        let raw = f64::from(lp_needed) / net_lp_per_game;
        let snapped = if (raw - raw.round()).abs() < GAMES_EPSILON { raw.round() } else { raw };
        snapped.ceil().max(1.0) as u32
    };

    Ok(Some(RankProjection {
        next_tier,
        next_division,
        lp_needed,
        net_lp_per_game,
        games,
    }))
}

// ── Ranked standings ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueueStats {
    pub tier: String,
    pub division: String,
    pub league_points: u32,
    pub wins: u32,
    pub losses: u32,
    pub is_provisional: bool,
}

impl QueueStats {
    pub fn is_ranked(&self) -> bool {
        self.tier.parse::<Tier>().is_ok()
    }

    pub fn games(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }

    /// Percentage, 0 to 100.
    pub fn winrate(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            n => f64::from(self.wins) * 100.0 / f64::from(n),
        }
    }

    /// Feed this queue's standing into [`games_to_next_rank`].
    pub fn projection(&self) -> Result<Option<RankProjection>, FeatureError> {
        let tier = self
            .tier
            .parse::<Tier>()
            .map_err(|_| FeatureError::invalid("tier", format!("unranked ({:?})", self.tier)))?;
        let division = if tier.is_apex() {
            Division::I
        } else {
            self.division
                .parse::<Division>()
                .map_err(|_| FeatureError::invalid("division", format!("{:?}", self.division)))?
        };
        games_to_next_rank(tier, division, self.league_points, self.winrate())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStats {
    pub solo: Option<QueueStats>,
    pub flex: Option<QueueStats>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct RawRankedStats {
    queue_map: HashMap<String, QueueStats>,
}

impl From<RawRankedStats> for RankedStats {
    fn from(mut raw: RawRankedStats) -> Self {
        let mut take = |queue: &str| raw.queue_map.remove(queue).filter(QueueStats::is_ranked);
        Self {
            solo: take(SOLO_QUEUE),
            flex: take(FLEX_QUEUE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(tier: Tier, division: Division, lp: u32, winrate: f64) -> Option<RankProjection> {
        games_to_next_rank(tier, division, lp, winrate).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn sixty_percent_nets_four_lp() {
        let p = project(Tier::Gold, Division::II, 60, 60.0);
        let p = p.unwrap_or_else(|| panic!("expected a projection"));
        assert_eq!((p.next_tier, p.next_division), (Tier::Gold, Some(Division::I)));
        assert_eq!(p.lp_needed, 40);
        assert_eq!(p.games, 10);
    }

    #[test]
    fn whole_winrates_match_integer_arithmetic() {
        // Net LP per game in hundredths is 40w - 2000 for an integer winrate w.
        for winrate in 51_u32..=100 {
            for lp in (0_u32..100).step_by(5) {
                let p = project(Tier::Silver, Division::III, lp, f64::from(winrate))
                    .unwrap_or_else(|| panic!("no projection at {winrate}%"));
                let needed = 100 - lp;
                let expected = (needed * 100).div_ceil(40 * winrate - 2000);
                assert_eq!(p.games, expected.max(1), "winrate {winrate} lp {lp}");
            }
        }
    }

    #[test]
    fn fractional_winrate_rounds_up_partial_games() {
        // 52.5% nets 1 LP per game.
        let p = project(Tier::Gold, Division::IV, 0, 52.5).unwrap_or_else(|| panic!("none"));
        assert_eq!(p.games, 100);
        let p = project(Tier::Gold, Division::IV, 0, 56.0).unwrap_or_else(|| panic!("none"));
        assert_eq!(p.games, 42);
    }

    #[test]
    fn division_one_promotes_to_next_tier() {
        let p = project(Tier::Silver, Division::I, 90, 75.0).unwrap_or_else(|| panic!("none"));
        assert_eq!((p.next_tier, p.next_division), (Tier::Gold, Some(Division::IV)));
        assert_eq!(p.games, 1);
    }

    #[test]
    fn diamond_one_promotes_to_master_without_division() {
        let p = project(Tier::Diamond, Division::I, 0, 55.0).unwrap_or_else(|| panic!("none"));
        assert_eq!((p.next_tier, p.next_division), (Tier::Master, None));
    }

    #[test]
    fn losing_winrate_and_apex_have_no_projection() {
        assert_eq!(project(Tier::Gold, Division::IV, 0, 50.0), None);
        assert_eq!(project(Tier::Gold, Division::IV, 0, 30.0), None);
        assert_eq!(project(Tier::Master, Division::I, 0, 70.0), None);
    }

    #[test]
    fn winrate_out_of_range_is_rejected() {
        assert!(games_to_next_rank(Tier::Gold, Division::IV, 0, 101.0).is_err());
    }

    #[test]
    fn unranked_queues_are_dropped() {
        let raw: RawRankedStats = serde_json::from_value(serde_json::json!({
            "queueMap": {
                "RANKED_SOLO_5x5": { "tier": "GOLD", "division": "II", "leaguePoints": 12, "wins": 3, "losses": 1 },
                "RANKED_FLEX_SR": { "tier": "", "division": "NA" }
            }
        }))
        .unwrap_or_default();
        let stats = RankedStats::from(raw);
        assert_eq!(stats.solo.map(|q| q.league_points), Some(12));
        assert_eq!(stats.flex, None);
    }
}
