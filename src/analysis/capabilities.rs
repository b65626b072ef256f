//! The fixed set of retrieval capabilities a chat model may invoke.
//!
//! A model asks for data by replying with a single JSON object of the form
//! `{"capability": "<name>", "arguments": {..}}`. Anything else is treated as
//! its final answer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use super::context::for_entity;
use super::gateway::strip_code_fences;
use crate::constants::{chat, windows};
use crate::data_fetcher::api::{current_season, current_season_with_date};
use crate::data_fetcher::models::{EntityKind, FetchOutcome, StatRecord, StatTable, Unavailable};
use crate::data_fetcher::{HistoricalDataset, StatsService};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "capability", content = "arguments", rename_all = "snake_case")]
pub enum Capability {
    QueryHistoricalTable {
        #[serde(default)]
        filters: BTreeMap<String, String>,
        #[serde(default = "default_row_limit")]
        limit: usize,
    },
    QueryCurrentPlayer {
        player: String,
        #[serde(default)]
        season: Option<String>,
    },
    QueryCurrentTeam {
        team: String,
        #[serde(default)]
        season: Option<String>,
    },
    QueryPlayerOnDate {
        player: String,
        /// `YYYY-MM-DD`
        date: String,
        #[serde(default)]
        season: Option<String>,
    },
}

fn default_row_limit() -> usize {
    chat::HISTORICAL_ROW_LIMIT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static str,
}

pub const CAPABILITIES: [CapabilityDescriptor; 4] = [
    CapabilityDescriptor {
        name: "query_historical_table",
        description: "Rows from the local per-game historical dataset whose columns equal the given values.",
        arguments: r#"{"filters": {"COLUMN": "value"}, "limit": 20}"#,
    },
    CapabilityDescriptor {
        name: "query_current_player",
        description: "A player's season averages and last 10 games from the live stats provider.",
        arguments: r#"{"player": "Nikola Jokic", "season": "2025-26 (optional)"}"#,
    },
    CapabilityDescriptor {
        name: "query_current_team",
        description: "A team's record, conference rank, scoring, and current injury report.",
        arguments: r#"{"team": "Denver Nuggets", "season": "2025-26 (optional)"}"#,
    },
    CapabilityDescriptor {
        name: "query_player_on_date",
        description: "A player's box score line for the game played on one date.",
        arguments: r#"{"player": "Nikola Jokic", "date": "2025-10-22", "season": "(optional)"}"#,
    },
];

/// What a capability can reach while it runs.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityContext<'a> {
    pub service: &'a StatsService,
    pub dataset: Option<&'a HistoricalDataset>,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::QueryHistoricalTable { .. } => "query_historical_table",
            Capability::QueryCurrentPlayer { .. } => "query_current_player",
            Capability::QueryCurrentTeam { .. } => "query_current_team",
            Capability::QueryPlayerOnDate { .. } => "query_player_on_date",
        }
    }

    /// Runs the capability. Retrieval problems come back inside the JSON as
    /// tagged outcomes; only malformed arguments are errors.
    #[instrument(skip(ctx), fields(capability = self.name()))]
    pub async fn invoke(&self, ctx: &CapabilityContext<'_>) -> Result<Value, AppError> {
        let service = ctx.service;
        let value = match self {
            Capability::QueryHistoricalTable { filters, limit } => {
                let outcome: FetchOutcome<Vec<StatRecord>> = match ctx.dataset {
                    Some(dataset) => {
                        let filters: Vec<(String, String)> = filters
                            .iter()
                            .map(|(column, value)| (column.clone(), value.clone()))
                            .collect();
                        FetchOutcome::from(dataset.query(&filters, *limit)).map(records)
                    }
                    None => FetchOutcome::unavailable(Unavailable::Upstream(
                        "no historical dataset is loaded".to_string(),
                    )),
                };
                serde_json::to_value(outcome)?
            }
            Capability::QueryCurrentPlayer { player, season } => {
                let season = season.clone().unwrap_or_else(current_season);
                let player = service.resolve_entity(EntityKind::Player, player).await;
                let (season_stats, last_games) = futures::join!(
                    for_entity(&player, |p| service.fetch_player_season_stats(p, &season)),
                    for_entity(&player, |p| {
                        service.fetch_player_last_n_games(p, &season, windows::LAST_N_GAMES)
                    }),
                );
                json!({
                    "season": season,
                    "player": player,
                    "season_stats": season_stats.map(records),
                    "last_games": last_games.map(records),
                })
            }
            Capability::QueryCurrentTeam { team, season } => {
                let season = season.clone().unwrap_or_else(current_season);
                let resolved = service.resolve_entity(EntityKind::Team, team).await;
                let record =
                    for_entity(&resolved, |t| service.fetch_team_composite(t, &season)).await;
                let injuries = service.fetch_injury_report(team).await;
                json!({
                    "season": season,
                    "team": resolved,
                    "record": record,
                    "injuries": injuries,
                })
            }
            Capability::QueryPlayerOnDate {
                player,
                date,
                season,
            } => {
                let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
                    AppError::datetime_parse_error(format!("invalid date '{date}': {e}"))
                })?;
                let season = season
                    .clone()
                    .unwrap_or_else(|| current_season_with_date(day));
                let player = service.resolve_entity(EntityKind::Player, player).await;
                let line =
                    for_entity(&player, |p| service.fetch_player_stats_on_date(p, day, &season))
                        .await;
                json!({
                    "season": season,
                    "date": day.format("%Y-%m-%d").to_string(),
                    "player": player,
                    "game": line,
                })
            }
        };
        info!("Capability {} completed", self.name());
        Ok(value)
    }
}

fn records(table: StatTable) -> Vec<StatRecord> {
    table.to_records()
}

/// Decodes a capability call from a model reply.
///
/// `Ok(None)` means the reply is a final answer. A reply that names a
/// capability but whose arguments do not fit is an `Err` describing why.
pub fn parse_capability_call(reply: &str) -> Result<Option<Capability>, String> {
    let text = strip_code_fences(reply);
    if !text.starts_with('{') {
        return Ok(None);
    }
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };
    if value.get("capability").is_none() {
        return Ok(None);
    }
    debug!("Model requested capability {}", value["capability"]);
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| format!("invalid capability call: {e}"))
}
