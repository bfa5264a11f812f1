use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One game from the local player's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub game_id: i64,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub duration_secs: i64,
    pub queue_id: i64,
    pub game_mode: String,
    pub champion_id: i64,
    pub win: bool,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

// ── Wire format ──

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawHistory {
    games: RawGames,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGames {
    games: Vec<RawGame>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawGame {
    game_id: i64,
    game_creation: i64,
    game_duration: i64,
    queue_id: i64,
    game_mode: String,
    participants: Vec<RawParticipant>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawParticipant {
    champion_id: i64,
    stats: RawParticipantStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawParticipantStats {
    win: bool,
    kills: u32,
    deaths: u32,
    assists: u32,
}

impl RawHistory {
    /// Personal history only carries the local player as participant.
    pub(super) fn into_summaries(self) -> Vec<MatchSummary> {
        self.games
            .games
            .into_iter()
            .filter_map(|g| {
                let me = g.participants.into_iter().next()?;
                Some(MatchSummary {
                    game_id: g.game_id,
                    created_at: g.game_creation,
                    duration_secs: g.game_duration,
                    queue_id: g.queue_id,
                    game_mode: g.game_mode,
                    champion_id: me.champion_id,
                    win: me.stats.win,
                    kills: me.stats.kills,
                    deaths: me.stats.deaths,
                    assists: me.stats.assists,
                })
            })
            .collect()
    }
}

// ── Aggregations ──

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAggregate {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    /// Percentage, 0 to 100.
    pub winrate: f64,
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
    /// (kills + assists) / deaths, with zero deaths counted as one.
    pub kda: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionUsage {
    pub champion_id: i64,
    pub games: u32,
    pub wins: u32,
    pub winrate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub kind: StreakKind,
    pub count: u32,
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) * 100.0 / f64::from(whole)
    }
}

pub fn aggregate(matches: &[MatchSummary]) -> MatchAggregate {
    if matches.is_empty() {
        return MatchAggregate::default();
    }
    let games = count(matches.len());
    let wins = count(matches.iter().filter(|m| m.win).count());
    let (kills, deaths, assists) = matches.iter().fold((0_u32, 0_u32, 0_u32), |(k, d, a), m| {
        (
            k.saturating_add(m.kills),
            d.saturating_add(m.deaths),
            a.saturating_add(m.assists),
        )
    });
    let n = f64::from(games);
    MatchAggregate {
        games,
        wins,
        losses: games - wins,
        winrate: percent(wins, games),
        avg_kills: f64::from(kills) / n,
        avg_deaths: f64::from(deaths) / n,
        avg_assists: f64::from(assists) / n,
        kda: (f64::from(kills) + f64::from(assists)) / f64::from(deaths.max(1)),
    }
}

/// Top `n` champions by games played; ties go to the lower champion id.
pub fn most_played(matches: &[MatchSummary], n: usize) -> Vec<ChampionUsage> {
    let mut by_champion: HashMap<i64, (u32, u32)> = HashMap::new();
    for m in matches {
        let entry = by_champion.entry(m.champion_id).or_default();
        entry.0 += 1;
        entry.1 += u32::from(m.win);
    }
    let mut usage: Vec<ChampionUsage> = by_champion
        .into_iter()
        .map(|(champion_id, (games, wins))| ChampionUsage {
            champion_id,
            games,
            wins,
            winrate: percent(wins, games),
        })
        .collect();
    usage.sort_by(|a, b| b.games.cmp(&a.games).then(a.champion_id.cmp(&b.champion_id)));
    usage.truncate(n);
    usage
}

/// Run of identical results at the head of a newest-first list.
pub fn current_streak(matches: &[MatchSummary]) -> Option<Streak> {
    let first = matches.first()?;
    let run = matches.iter().take_while(|m| m.win == first.win).count();
    Some(Streak {
        kind: if first.win { StreakKind::Win } else { StreakKind::Loss },
        count: count(run),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(champion_id: i64, win: bool, k: u32, d: u32, a: u32) -> MatchSummary {
        MatchSummary {
            game_id: 0,
            created_at: 0,
            duration_secs: 1800,
            queue_id: 420,
            game_mode: "CLASSIC".into(),
            champion_id,
            win,
            kills: k,
            deaths: d,
            assists: a,
        }
    }

    #[test]
    fn aggregate_computes_winrate_and_kda() {
        let games = [
            game(1, true, 10, 2, 5),
            game(1, false, 2, 6, 4),
            game(2, true, 6, 0, 9),
            game(3, true, 2, 2, 2),
        ];
        let agg = aggregate(&games);
        assert_eq!((agg.games, agg.wins, agg.losses), (4, 3, 1));
        assert!((agg.winrate - 75.0).abs() < f64::EPSILON);
        assert!((agg.avg_kills - 5.0).abs() < f64::EPSILON);
        assert!((agg.kda - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(aggregate(&[]), MatchAggregate::default());
    }

    #[test]
    fn most_played_orders_by_games_then_id() {
        let games = [
            game(7, true, 0, 0, 0),
            game(3, false, 0, 0, 0),
            game(3, true, 0, 0, 0),
            game(5, true, 0, 0, 0),
        ];
        let top: Vec<i64> = most_played(&games, 2).iter().map(|u| u.champion_id).collect();
        assert_eq!(top, vec![3, 5]);
    }

    #[test]
    fn streak_counts_leading_results() {
        let games = [
            game(1, false, 0, 0, 0),
            game(1, false, 0, 0, 0),
            game(1, true, 0, 0, 0),
        ];
        assert_eq!(
            current_streak(&games),
            Some(Streak {
                kind: StreakKind::Loss,
                count: 2
            })
        );
        assert_eq!(current_streak(&[]), None);
    }
}
