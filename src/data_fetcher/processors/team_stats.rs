//! Team-level normalizers: composite records, conference standings, and
//! league leaders.
//!
//! Joins are strict. A missing column or a team absent from either table makes
//! the whole result `Unavailable`; nothing is filled in with defaults.

use std::cmp::Ordering;
use tracing::debug;

use crate::data_fetcher::models::{
    Conference, ConferenceStandings, FetchOutcome, LeaderCategory, LeaderEntry, LeagueLeaders,
    StandingsEntry, StatRow, StatTable, TeamRecord,
};
use crate::error::AppError;

mod columns {
    pub const STATS_TEAM_ID: &str = "TEAM_ID";
    pub const STATS_TEAM_NAME: &str = "TEAM_NAME";
    pub const PTS: &str = "PTS";
    pub const PLUS_MINUS: &str = "PLUS_MINUS";
    pub const FG_PCT: &str = "FG_PCT";

    pub const STANDINGS_TEAM_ID: &str = "TeamID";
    pub const TEAM_CITY: &str = "TeamCity";
    pub const TEAM_NAME: &str = "TeamName";
    pub const CONFERENCE: &str = "Conference";
    pub const PLAYOFF_RANK: &str = "PlayoffRank";
    pub const WINS: &str = "WINS";
    pub const LOSSES: &str = "LOSSES";

    pub const PLAYER: &str = "PLAYER";
    pub const TEAM: &str = "TEAM";
}

/// Per-game scoring derived from the team stats table.
#[derive(Debug, Clone, PartialEq)]
struct Scoring {
    name: String,
    ppg: f64,
    opp_ppg: f64,
    fg_pct: f64,
    plus_minus: f64,
}

/// Standing derived from the standings table.
#[derive(Debug, Clone, PartialEq)]
struct Standing {
    team_id: i64,
    name: String,
    conference: Conference,
    playoff_rank: i64,
    wins: i64,
    losses: i64,
}

/// Builds the composite record for one team by joining per-game team stats
/// with the standings on team id.
pub fn team_composite(
    team_id: i64,
    team_stats: FetchOutcome<StatTable>,
    standings: FetchOutcome<StatTable>,
) -> FetchOutcome<TeamRecord> {
    team_stats
        .zip(standings)
        .and_then(|(stats, standings)| {
            FetchOutcome::from(composite_from_tables(team_id, &stats, &standings))
        })
}

fn composite_from_tables(
    team_id: i64,
    stats: &StatTable,
    standings: &StatTable,
) -> Result<TeamRecord, AppError> {
    let stats_row = find_team_row(stats, columns::STATS_TEAM_ID, team_id)?;
    let standings_row = find_team_row(standings, columns::STANDINGS_TEAM_ID, team_id)?;

    let scoring = scoring_from_row(&stats.name, &stats_row)?;
    let standing = standing_from_row(&standings.name, &standings_row)?;

    Ok(TeamRecord {
        team: scoring.name,
        record: format!("{}-{}", standing.wins, standing.losses),
        rank: format!("{} in {}", standing.playoff_rank, standing.conference),
        ppg: scoring.ppg,
        opp_ppg: scoring.opp_ppg,
        fg_pct: scoring.fg_pct,
        plus_minus: scoring.plus_minus,
    })
}

/// Joins standings with team stats, then splits them by conference, each side
/// ordered by ascending playoff rank.
pub fn standings_by_conference(
    team_stats: FetchOutcome<StatTable>,
    standings: FetchOutcome<StatTable>,
) -> FetchOutcome<ConferenceStandings> {
    team_stats
        .zip(standings)
        .and_then(|(stats, standings)| FetchOutcome::from(split_standings(&stats, &standings)))
}

fn split_standings(
    stats: &StatTable,
    standings: &StatTable,
) -> Result<ConferenceStandings, AppError> {
    let mut split = ConferenceStandings::default();

    for row in standings.iter() {
        let standing = standing_from_row(&standings.name, &row)?;
        let stats_row = find_team_row(stats, columns::STATS_TEAM_ID, standing.team_id)?;
        let scoring = scoring_from_row(&stats.name, &stats_row)?;

        let entry = StandingsEntry {
            team: standing.name,
            record: format!("{}-{}", standing.wins, standing.losses),
            playoff_rank: standing.playoff_rank,
            ppg: scoring.ppg,
            opp_ppg: scoring.opp_ppg,
            plus_minus: scoring.plus_minus,
        };
        match standing.conference {
            Conference::East => split.east.push(entry),
            Conference::West => split.west.push(entry),
        }
    }

    split.east.sort_by_key(|entry| entry.playoff_rank);
    split.west.sort_by_key(|entry| entry.playoff_rank);
    debug!(
        "Split standings into {} East and {} West teams",
        split.east.len(),
        split.west.len()
    );
    Ok(split)
}

/// Ranks each category independently and keeps the top `top_n` of each.
pub fn league_leaders(leaders: FetchOutcome<StatTable>, top_n: usize) -> FetchOutcome<LeagueLeaders> {
    leaders.and_then(|table| FetchOutcome::from(rank_categories(&table, top_n)))
}

fn rank_categories(table: &StatTable, top_n: usize) -> Result<LeagueLeaders, AppError> {
    table.require_column(columns::PLAYER)?;
    table.require_column(columns::TEAM)?;

    let mut leaders = LeagueLeaders::new();
    for category in LeaderCategory::ALL {
        let column = category.column();
        table.require_column(column)?;

        let mut candidates: Vec<(&str, &str, f64)> = table
            .iter()
            .filter_map(|row| {
                Some((
                    row.get_str(columns::PLAYER)?,
                    row.get_str(columns::TEAM).unwrap_or_default(),
                    row.get_f64(column)?,
                ))
            })
            .collect();
        // Stable sort keeps provider order among ties
        candidates.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));

        let entries = candidates
            .into_iter()
            .take(top_n)
            .enumerate()
            .map(|(i, (player, team, value))| LeaderEntry {
                rank: i + 1,
                player: player.to_string(),
                team: team.to_string(),
                value,
            })
            .collect();
        leaders.insert(category, entries);
    }
    Ok(leaders)
}

fn find_team_row<'a>(
    table: &'a StatTable,
    id_column: &str,
    team_id: i64,
) -> Result<StatRow<'a>, AppError> {
    table.require_column(id_column)?;
    table
        .iter()
        .find(|row| row.get_i64(id_column) == Some(team_id))
        .ok_or_else(|| AppError::missing_column(&table.name, format!("{id_column}={team_id}")))
}

fn scoring_from_row(table: &str, row: &StatRow<'_>) -> Result<Scoring, AppError> {
    let ppg = required_f64(table, row, columns::PTS)?;
    let plus_minus = required_f64(table, row, columns::PLUS_MINUS)?;
    Ok(Scoring {
        name: required_str(table, row, columns::STATS_TEAM_NAME)?.to_string(),
        ppg,
        opp_ppg: ppg - plus_minus,
        fg_pct: required_f64(table, row, columns::FG_PCT)?,
        plus_minus,
    })
}

fn standing_from_row(table: &str, row: &StatRow<'_>) -> Result<Standing, AppError> {
    let conference_label = required_str(table, row, columns::CONFERENCE)?;
    let conference = Conference::parse(conference_label)
        .ok_or_else(|| AppError::missing_column(table, format!("Conference={conference_label}")))?;
    let city = required_str(table, row, columns::TEAM_CITY)?;
    let nickname = required_str(table, row, columns::TEAM_NAME)?;

    Ok(Standing {
        team_id: required_i64(table, row, columns::STANDINGS_TEAM_ID)?,
        name: format!("{city} {nickname}"),
        conference,
        playoff_rank: required_i64(table, row, columns::PLAYOFF_RANK)?,
        wins: required_i64(table, row, columns::WINS)?,
        losses: required_i64(table, row, columns::LOSSES)?,
    })
}

fn required_f64(table: &str, row: &StatRow<'_>, column: &str) -> Result<f64, AppError> {
    row.get_f64(column)
        .ok_or_else(|| AppError::missing_column(table, column))
}

fn required_i64(table: &str, row: &StatRow<'_>, column: &str) -> Result<i64, AppError> {
    row.get_i64(column)
        .ok_or_else(|| AppError::missing_column(table, column))
}

fn required_str<'a>(table: &str, row: &StatRow<'a>, column: &str) -> Result<&'a str, AppError> {
    row.get_str(column)
        .ok_or_else(|| AppError::missing_column(table, column))
}
