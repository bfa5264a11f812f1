//! Match history and ranked command handlers.

use riftwatch_core::stats::{
    ChampionUsage, Division, MatchAggregate, MatchSummary, QueueStats, RankProjection, Streak,
    StreakKind, Tier, aggregate, current_streak, games_to_next_rank, most_played,
};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, HistoryArgs, OutputFormat, RankCalcArgs};
use crate::error::CliError;
use crate::output;

use super::{Connection, util};

const MOST_PLAYED_COUNT: usize = 5;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Champion")]
    champion: String,
    #[tabled(rename = "K/D/A")]
    kda: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Length")]
    length: String,
}

#[derive(Tabled)]
struct QueueRow {
    #[tabled(rename = "Queue")]
    queue: &'static str,
    #[tabled(rename = "Rank")]
    rank: String,
    #[tabled(rename = "LP")]
    lp: u32,
    #[tabled(rename = "W/L")]
    record: String,
    #[tabled(rename = "Win %")]
    winrate: String,
    #[tabled(rename = "Next")]
    next: String,
}

// ── History ─────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryView {
    stats: MatchAggregate,
    most_played: Vec<ChampionUsage>,
    streak: Option<Streak>,
    matches: Vec<MatchSummary>,
}

fn match_row(m: &MatchSummary, color: bool, champion: &dyn Fn(i64) -> String) -> MatchRow {
    MatchRow {
        date: util::format_timestamp_ms(m.created_at),
        result: output::paint(if m.win { "Win" } else { "Loss" }, m.win, color),
        champion: champion(m.champion_id),
        kda: format!("{}/{}/{}", m.kills, m.deaths, m.assists),
        mode: m.game_mode.clone(),
        length: util::format_duration(m.duration_secs),
    }
}

fn streak_text(streak: Option<Streak>) -> String {
    match streak {
        Some(Streak {
            kind: StreakKind::Win,
            count,
        }) => format!("{count} win(s)"),
        Some(Streak {
            kind: StreakKind::Loss,
            count,
        }) => format!("{count} loss(es)"),
        None => "-".into(),
    }
}

pub async fn history(conn: &Connection, args: HistoryArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let features = &conn.features;
    let puuid = match args.puuid {
        Some(p) => p,
        None => features.profile.current_summoner().await?.puuid,
    };
    let matches = features.stats.match_history(&puuid, args.count).await?;

    // Names are a nicety; fall back to ids if the catalog is unavailable.
    let catalog = features.champ_select.catalog().await.ok();
    let champion = |id: i64| {
        catalog
            .as_ref()
            .and_then(|c| c.iter().find(|ch| ch.id == id))
            .map_or_else(|| id.to_string(), |ch| ch.name.clone())
    };

    let view = HistoryView {
        stats: aggregate(&matches),
        most_played: most_played(&matches, MOST_PLAYED_COUNT),
        streak: current_streak(&matches),
        matches,
    };

    let out = match global.output {
        OutputFormat::Table => {
            let color = output::should_color(&global.color);
            let table = output::render_list(
                &OutputFormat::Table,
                &view.matches,
                |m| match_row(m, color, &champion),
                |m| m.game_id.to_string(),
            );
            let s = &view.stats;
            let top = view
                .most_played
                .iter()
                .map(|u| format!("{} ({})", champion(u.champion_id), u.games))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{table}\n{}",
                output::detail_lines(&[
                    ("Record", format!("{}W {}L ({:.1}%)", s.wins, s.losses, s.winrate)),
                    ("KDA", format!("{:.2}", s.kda)),
                    ("Streak", streak_text(view.streak)),
                    ("Most played", top),
                ])
            )
        }
        OutputFormat::Plain => view
            .matches
            .iter()
            .map(|m| m.game_id.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        ref format => output::render_single(format, &view, |_| String::new(), |_| String::new()),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Ranked ──────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueueView {
    queue: &'static str,
    #[serde(flatten)]
    stats: QueueStats,
    winrate: f64,
    projection: Option<RankProjection>,
}

fn projection_text(p: Option<&RankProjection>) -> String {
    match p {
        Some(p) => format!("{} in ~{} games", rank_label(p.next_tier, p.next_division), p.games),
        None => "-".into(),
    }
}

fn rank_label(tier: Tier, division: Option<Division>) -> String {
    match division {
        Some(d) => format!("{tier} {d}"),
        None => tier.to_string(),
    }
}

fn queue_row(v: &QueueView) -> QueueRow {
    let division = if v.stats.division.is_empty() || v.stats.division == "NA" {
        String::new()
    } else {
        format!(" {}", v.stats.division)
    };
    QueueRow {
        queue: v.queue,
        rank: format!("{}{division}", v.stats.tier),
        lp: v.stats.league_points,
        record: format!("{}/{}", v.stats.wins, v.stats.losses),
        winrate: format!("{:.1}", v.winrate),
        next: projection_text(v.projection.as_ref()),
    }
}

pub async fn ranked(conn: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    let ranked = conn.features.stats.ranked_stats().await?;
    let views: Vec<QueueView> = [("Solo/Duo", ranked.solo), ("Flex", ranked.flex)]
        .into_iter()
        .filter_map(|(queue, stats)| {
            let stats = stats?;
            Some(QueueView {
                queue,
                winrate: stats.winrate(),
                projection: stats.projection().ok().flatten(),
                stats,
            })
        })
        .collect();

    if views.is_empty() && matches!(global.output, OutputFormat::Table) {
        output::print_done("Unranked in every queue", global.quiet);
        return Ok(());
    }
    let out = output::render_list(&global.output, &views, queue_row, |v| {
        format!("{} {} {}", v.queue, v.stats.tier, v.stats.division)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Rank calculator ─────────────────────────────────────────────────

fn parse_rank(args: &RankCalcArgs) -> Result<(Tier, Division), CliError> {
    let tier: Tier = args.tier.parse().map_err(|_| CliError::Validation {
        field: "tier".into(),
        reason: format!("unknown tier {:?}", args.tier),
    })?;
    let division: Division = args.division.parse().map_err(|_| CliError::Validation {
        field: "division".into(),
        reason: format!("expected I, II, III, or IV, got {:?}", args.division),
    })?;
    Ok((tier, division))
}

pub fn rank_calc(args: &RankCalcArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (tier, division) = parse_rank(args)?;
    let projection = games_to_next_rank(tier, division, args.lp, args.winrate)?;
    let out = match (&global.output, &projection) {
        (OutputFormat::Table, None) if tier.is_apex() => {
            format!("{tier} has no divisions to climb")
        }
        (OutputFormat::Table, None) => {
            format!("At {}% you won't gain LP on average", args.winrate)
        }
        (OutputFormat::Plain, p) => p.as_ref().map_or_else(|| "-".into(), |p| p.games.to_string()),
        (format, _) => output::render_single(
            format,
            &projection,
            |p| match p {
                Some(p) => output::detail_lines(&[
                    ("Next rank", rank_label(p.next_tier, p.next_division)),
                    ("LP needed", p.lp_needed.to_string()),
                    ("LP per game", format!("{:+.1}", p.net_lp_per_game)),
                    ("Games", p.games.to_string()),
                ]),
                None => String::new(),
            },
            |_| String::new(),
        ),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tier: &str, division: &str) -> RankCalcArgs {
        RankCalcArgs {
            tier: tier.into(),
            division: division.into(),
            lp: 0,
            winrate: 60.0,
        }
    }

    #[test]
    fn rank_names_parse_case_insensitively() {
        let parsed = parse_rank(&args("gold", "ii")).ok();
        assert_eq!(parsed, Some((Tier::Gold, Division::II)));
    }

    #[test]
    fn bad_division_is_a_usage_error() {
        let err = parse_rank(&args("gold", "5")).err();
        assert!(matches!(err, Some(CliError::Validation { ref field, .. }) if field == "division"));
    }

    #[test]
    fn streak_text_names_the_kind() {
        let win = Streak {
            kind: StreakKind::Win,
            count: 3,
        };
        assert_eq!(streak_text(Some(win)), "3 win(s)");
        assert_eq!(streak_text(None), "-");
    }

    #[test]
    fn apex_label_has_no_division() {
        assert_eq!(rank_label(Tier::Master, None), "MASTER");
        assert_eq!(rank_label(Tier::Gold, Some(Division::I)), "GOLD I");
    }
}
